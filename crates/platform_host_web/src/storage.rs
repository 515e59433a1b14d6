//! `localStorage`-backed preference store implementation.
//!
//! The browser API is synchronous; the async [`PrefsStore`] contract wraps it in ready futures.
//! History, theme, weather location, and the user's `kset` entries all share this store.

use platform_host::{PrefsStore, PrefsStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser preference store backed by `window.localStorage`.
pub struct WebPrefsStore;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

impl WebPrefsStore {
    /// Loads the raw text stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or blocked.
    pub fn load_raw(self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    /// Saves raw text for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable, blocked, or full.
    pub fn save_raw(self, key: &str, raw: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(key, raw)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw);
            Ok(())
        }
    }

    /// Removes `key` from localStorage.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the delete fails.
    pub fn delete_raw(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }

    /// Lists keys starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable.
    pub fn keys_with_prefix(self, prefix: &str) -> Result<Vec<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            let len = storage
                .length()
                .map_err(|e| format!("localStorage length failed: {e:?}"))?;
            let mut keys: Vec<String> = (0..len)
                .filter_map(|index| storage.key(index).ok().flatten())
                .filter(|key| key.starts_with(prefix))
                .collect();
            keys.sort();
            Ok(keys)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = prefix;
            Ok(Vec::new())
        }
    }
}

impl PrefsStore for WebPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { store.load_raw(key) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_raw(key, value) })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.delete_raw(key) })
    }

    fn list_pref_keys<'a>(
        &'a self,
        prefix: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Vec<String>, String>> {
        let store = *self;
        Box::pin(async move { store.keys_with_prefix(prefix) })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_fallback_behaves_like_an_empty_store() {
        let store = WebPrefsStore;
        block_on(store.save_pref("k", "v")).expect("save");
        assert_eq!(block_on(store.load_pref("k")).expect("load"), None);
        assert!(block_on(store.list_pref_keys("")).expect("list").is_empty());
        block_on(store.delete_pref("k")).expect("delete");
    }
}
