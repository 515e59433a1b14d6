//! Cache API-backed content cache implementation.

use platform_host::{ContentCache, ContentCacheFuture};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser content cache backed by the Cache API.
///
/// Used for the project listing cache; entries carry their own TTL envelope.
pub struct WebContentCache;

impl ContentCache for WebContentCache {
    fn put_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
        value: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        Box::pin(bridge::cache_put_text(cache_name, key, value))
    }

    fn get_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<Option<String>, String>> {
        Box::pin(bridge::cache_get_text(cache_name, key))
    }

    fn delete<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        Box::pin(bridge::cache_delete(cache_name, key))
    }
}
