use std::rc::Rc;

use platform_host::{HostInfo, HostServices, MediaTrack};

use crate::{
    WebClipboardService, WebContentCache, WebDownloadService, WebExternalUrlService,
    WebHttpTransport, WebMediaPlayer, WebPrefsStore, WebRandomSource, WebTimer,
};

/// Reads user agent, language, and platform from `navigator`.
///
/// Native builds and missing fields fall back to [`HostInfo::default`] values.
pub fn host_info() -> HostInfo {
    let fallback = HostInfo::default();

    #[cfg(target_arch = "wasm32")]
    {
        let Some(navigator) = web_sys::window().map(|window| window.navigator()) else {
            return fallback;
        };
        HostInfo {
            user_agent: navigator.user_agent().unwrap_or(fallback.user_agent),
            language: navigator.language().unwrap_or(fallback.language),
            platform: navigator.platform().unwrap_or(fallback.platform),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        fallback
    }
}

/// Builds the browser host-service bundle with `tracks` as the music playlist.
pub fn build_host_services(tracks: Vec<MediaTrack>) -> HostServices {
    log::debug!("building browser host services ({} tracks)", tracks.len());
    HostServices {
        prefs: Rc::new(WebPrefsStore),
        cache: Rc::new(WebContentCache),
        external_urls: Rc::new(WebExternalUrlService),
        timer: Rc::new(WebTimer),
        http: Rc::new(WebHttpTransport),
        clipboard: Rc::new(WebClipboardService),
        downloads: Rc::new(WebDownloadService),
        media: Rc::new(WebMediaPlayer::new(tracks)),
        random: Rc::new(WebRandomSource),
        info: host_info(),
    }
}
