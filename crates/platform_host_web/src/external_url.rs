//! External URL adapter backed by `window.open`.

use platform_host::{ExternalUrlFuture, ExternalUrlService};

#[derive(Debug, Clone, Copy, Default)]
/// Opens links in a new browsing context with `noopener,noreferrer`.
pub struct WebExternalUrlService;

fn open_in_new_tab(url: &str) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let opened = window
            .open_with_url_and_target_and_features(url, "_blank", "noopener,noreferrer")
            .map_err(|e| format!("window.open failed: {e:?}"))?;
        // `noopener` makes `window.open` return null even on success.
        let _ = opened;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = url;
        Err("Opening links is only available in the browser".to_string())
    }
}

impl ExternalUrlService for WebExternalUrlService {
    fn open_url<'a>(&'a self, url: &'a str) -> ExternalUrlFuture<'a, Result<(), String>> {
        Box::pin(async move { open_in_new_tab(url) })
    }
}
