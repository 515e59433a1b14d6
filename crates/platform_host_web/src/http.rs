//! `fetch`-backed HTTP transport.

use platform_host::{HttpFuture, HttpRequest, HttpResponse, HttpTransport};

#[derive(Debug, Clone, Copy, Default)]
/// Browser transport over `window.fetch`.
///
/// Each request owns an `AbortController`; dropping the request future aborts the fetch, which is
/// how command cancellation and timeouts reach the network. `no-cors` requests settle with an
/// opaque [`HttpResponse`].
pub struct WebHttpTransport;

#[cfg(target_arch = "wasm32")]
mod imp {
    use platform_host::{FetchMode, HttpRequest, HttpResponse};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        AbortController, Headers, RequestCache, RequestInit, RequestMode, Response, ResponseType,
    };

    use crate::bridge::js_error_to_string;

    struct AbortOnDrop(AbortController);

    impl Drop for AbortOnDrop {
        fn drop(&mut self) {
            self.0.abort();
        }
    }

    fn request_init(
        request: &HttpRequest,
        controller: &AbortController,
    ) -> Result<RequestInit, String> {
        let init = RequestInit::new();
        init.set_method(&request.method);
        init.set_mode(match request.mode {
            FetchMode::Cors => RequestMode::Cors,
            FetchMode::NoCors => RequestMode::NoCors,
        });
        if request.no_store {
            init.set_cache(RequestCache::NoStore);
        }
        init.set_signal(Some(&controller.signal()));

        let headers = Headers::new().map_err(js_error_to_string)?;
        for (name, value) in &request.headers {
            headers.set(name, value).map_err(js_error_to_string)?;
        }
        init.set_headers(&headers);
        if let Some(body) = &request.body {
            init.set_body(&JsValue::from_str(body));
        }
        Ok(init)
    }

    fn response_headers(headers: &Headers) -> Result<Vec<(String, String)>, String> {
        let entries = js_sys::Array::from(headers.as_ref());
        serde_wasm_bindgen::from_value(entries.into()).map_err(|e| e.to_string())
    }

    pub async fn send(request: HttpRequest) -> Result<HttpResponse, String> {
        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let controller = AbortController::new().map_err(js_error_to_string)?;
        let _abort = AbortOnDrop(controller.clone());
        let init = request_init(&request, &controller)?;

        let pending = window.fetch_with_str_and_init(&request.url, &init);
        let response: Response = JsFuture::from(pending)
            .await
            .map_err(js_error_to_string)?
            .dyn_into()
            .map_err(js_error_to_string)?;
        if response.type_() == ResponseType::Opaque {
            return Ok(HttpResponse::opaque());
        }

        let headers = response_headers(&response.headers())?;
        let buffer = JsFuture::from(response.array_buffer().map_err(js_error_to_string)?)
            .await
            .map_err(js_error_to_string)?;
        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            headers,
            body: js_sys::Uint8Array::new(&buffer).to_vec(),
            opaque: false,
        })
    }
}

impl HttpTransport for WebHttpTransport {
    fn send(&self, request: HttpRequest) -> HttpFuture<Result<HttpResponse, String>> {
        #[cfg(target_arch = "wasm32")]
        {
            Box::pin(imp::send(request))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Box::pin(async move {
                Err(format!(
                    "fetch is only available in the browser ({} {})",
                    request.method, request.url
                ))
            })
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_fetch_fails_with_the_request_line() {
        let err = block_on(WebHttpTransport.send(HttpRequest::get("https://example.com")))
            .expect_err("native fetch should fail");
        assert!(err.contains("GET https://example.com"));
    }
}
