//! JavaScript glue for browser capabilities `web-sys` does not cover ergonomically.
//!
//! Covers the Cache API, `navigator.clipboard`, and Blob downloads. Native targets get a
//! fallback shim with the same signatures.

#[cfg(target_arch = "wasm32")]
mod imp {
    use js_sys::Promise;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    #[wasm_bindgen(inline_js = r#"
function fail(message) {
  throw new Error(message);
}

function cacheRequestUrl(cacheName, key) {
  return `https://terminal.local/__cache/${encodeURIComponent(cacheName)}/${encodeURIComponent(key)}`;
}

async function openCache(cacheName) {
  if (typeof caches === 'undefined') {
    fail('Cache API unavailable');
  }
  return await caches.open(cacheName);
}

export async function jsCachePutText(cacheName, key, value) {
  const cache = await openCache(cacheName);
  const res = new Response(value, {
    headers: { 'content-type': 'text/plain; charset=utf-8' },
  });
  await cache.put(new Request(cacheRequestUrl(cacheName, key)), res);
}

export async function jsCacheGetText(cacheName, key) {
  const cache = await openCache(cacheName);
  const res = await cache.match(new Request(cacheRequestUrl(cacheName, key)));
  if (!res) return null;
  return await res.text();
}

export async function jsCacheDelete(cacheName, key) {
  const cache = await openCache(cacheName);
  await cache.delete(new Request(cacheRequestUrl(cacheName, key)));
}

export async function jsClipboardRead() {
  if (!navigator.clipboard || !navigator.clipboard.readText) {
    fail('Clipboard API unavailable');
  }
  return await navigator.clipboard.readText();
}

export async function jsClipboardWrite(text) {
  if (!navigator.clipboard || !navigator.clipboard.writeText) {
    fail('Clipboard API unavailable');
  }
  await navigator.clipboard.writeText(text);
}

export function jsDownloadBytes(fileName, mimeType, bytes) {
  const blob = new Blob([bytes], { type: mimeType || 'application/octet-stream' });
  const href = URL.createObjectURL(blob);
  const anchor = document.createElement('a');
  anchor.href = href;
  anchor.download = fileName || 'download';
  anchor.rel = 'noopener';
  document.body.appendChild(anchor);
  anchor.click();
  anchor.remove();
  setTimeout(() => URL.revokeObjectURL(href), 1500);
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsCachePutText)]
        fn js_cache_put_text(cache_name: &str, key: &str, value: &str) -> Promise;
        #[wasm_bindgen(js_name = jsCacheGetText)]
        fn js_cache_get_text(cache_name: &str, key: &str) -> Promise;
        #[wasm_bindgen(js_name = jsCacheDelete)]
        fn js_cache_delete(cache_name: &str, key: &str) -> Promise;

        #[wasm_bindgen(js_name = jsClipboardRead)]
        fn js_clipboard_read() -> Promise;
        #[wasm_bindgen(js_name = jsClipboardWrite)]
        fn js_clipboard_write(text: &str) -> Promise;

        #[wasm_bindgen(catch, js_name = jsDownloadBytes)]
        fn js_download_bytes(file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), JsValue>;
    }

    async fn await_promise(promise: Promise) -> Result<JsValue, String> {
        JsFuture::from(promise).await.map_err(js_error_to_string)
    }

    pub fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    pub async fn cache_put_text(cache_name: &str, key: &str, value: &str) -> Result<(), String> {
        await_promise(js_cache_put_text(cache_name, key, value)).await?;
        Ok(())
    }

    pub async fn cache_get_text(cache_name: &str, key: &str) -> Result<Option<String>, String> {
        let value = await_promise(js_cache_get_text(cache_name, key)).await?;
        if value.is_null() || value.is_undefined() {
            Ok(None)
        } else {
            value
                .as_string()
                .map(Some)
                .ok_or_else(|| "Cache API returned non-string payload".to_string())
        }
    }

    pub async fn cache_delete(cache_name: &str, key: &str) -> Result<(), String> {
        await_promise(js_cache_delete(cache_name, key)).await?;
        Ok(())
    }

    pub async fn clipboard_read() -> Result<String, String> {
        let value = await_promise(js_clipboard_read()).await?;
        Ok(value.as_string().unwrap_or_default())
    }

    pub async fn clipboard_write(text: &str) -> Result<(), String> {
        await_promise(js_clipboard_write(text)).await?;
        Ok(())
    }

    pub fn download_bytes(file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), String> {
        js_download_bytes(file_name, mime_type, bytes).map_err(js_error_to_string)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    fn unsupported() -> String {
        "Browser APIs are only available when compiled for wasm32".to_string()
    }

    pub async fn cache_put_text(_cache_name: &str, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    pub async fn cache_get_text(_cache_name: &str, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    pub async fn cache_delete(_cache_name: &str, _key: &str) -> Result<(), String> {
        Ok(())
    }

    pub async fn clipboard_read() -> Result<String, String> {
        Err(unsupported())
    }

    pub async fn clipboard_write(_text: &str) -> Result<(), String> {
        Err(unsupported())
    }

    pub fn download_bytes(_file_name: &str, _mime_type: &str, _bytes: &[u8]) -> Result<(), String> {
        Err(unsupported())
    }
}

#[cfg(target_arch = "wasm32")]
pub use imp::js_error_to_string;
pub use imp::{
    cache_delete, cache_get_text, cache_put_text, clipboard_read, clipboard_write, download_bytes,
};
