//! Named text caches and the TTL envelope used for fetched listings.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Object-safe boxed future used by [`ContentCache`] async methods.
pub type ContentCacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Text cache partitioned by cache name.
pub trait ContentCache {
    /// Stores `value` under `cache_name`/`key`.
    fn put_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
        value: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>>;

    /// Reads the value under `cache_name`/`key`.
    fn get_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<Option<String>, String>>;

    /// Evicts `cache_name`/`key`.
    fn delete<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Cache that never hits.
pub struct NoopContentCache;

impl ContentCache for NoopContentCache {
    fn put_text<'a>(
        &'a self,
        _cache_name: &'a str,
        _key: &'a str,
        _value: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn get_text<'a>(
        &'a self,
        _cache_name: &'a str,
        _key: &'a str,
    ) -> ContentCacheFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn delete<'a>(
        &'a self,
        _cache_name: &'a str,
        _key: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory cache. Clones share entries.
pub struct MemoryContentCache {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

fn slot(cache_name: &str, key: &str) -> String {
    format!("{cache_name}/{key}")
}

impl ContentCache for MemoryContentCache {
    fn put_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
        value: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        self.entries
            .borrow_mut()
            .insert(slot(cache_name, key), value.to_string());
        Box::pin(async { Ok(()) })
    }

    fn get_text<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<Option<String>, String>> {
        let value = self.entries.borrow().get(&slot(cache_name, key)).cloned();
        Box::pin(async move { Ok(value) })
    }

    fn delete<'a>(
        &'a self,
        cache_name: &'a str,
        key: &'a str,
    ) -> ContentCacheFuture<'a, Result<(), String>> {
        self.entries.borrow_mut().remove(&slot(cache_name, key));
        Box::pin(async { Ok(()) })
    }
}

/// Cached payload stamped with its write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEntry<T> {
    /// Write time in unix milliseconds.
    pub ts: u64,
    /// Cached payload.
    pub data: T,
}

/// Outcome of a TTL-aware cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    /// Entry exists and is younger than the TTL.
    Fresh(T),
    /// Entry exists but has expired; still usable as a fallback.
    Stale(T),
    /// No entry, or the stored entry could not be decoded.
    Missing,
}

impl<T> CacheLookup<T> {
    /// Returns the payload regardless of freshness.
    pub fn into_any(self) -> Option<T> {
        match self {
            Self::Fresh(data) | Self::Stale(data) => Some(data),
            Self::Missing => None,
        }
    }
}

/// Stores `data` as JSON wrapped in a [`TimedEntry`] stamped with `now_ms`.
///
/// # Errors
///
/// Returns an error when serialization or cache storage fails.
pub async fn cache_put_timed_with<C: ContentCache + ?Sized, T: Serialize>(
    cache: &C,
    cache_name: &str,
    key: &str,
    now_ms: u64,
    data: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(&TimedEntry { ts: now_ms, data })
        .map_err(|err| err.to_string())?;
    cache.put_text(cache_name, key, &raw).await
}

/// Reads a [`TimedEntry`] and classifies it against `ttl_ms`.
///
/// Undecodable entries read as [`CacheLookup::Missing`].
///
/// # Errors
///
/// Returns an error only when the cache itself fails.
pub async fn cache_get_timed_with<C: ContentCache + ?Sized, T: DeserializeOwned>(
    cache: &C,
    cache_name: &str,
    key: &str,
    now_ms: u64,
    ttl_ms: u64,
) -> Result<CacheLookup<T>, String> {
    let Some(raw) = cache.get_text(cache_name, key).await? else {
        return Ok(CacheLookup::Missing);
    };
    let Ok(entry) = serde_json::from_str::<TimedEntry<T>>(&raw) else {
        return Ok(CacheLookup::Missing);
    };
    if now_ms.saturating_sub(entry.ts) < ttl_ms {
        Ok(CacheLookup::Fresh(entry.data))
    } else {
        Ok(CacheLookup::Stale(entry.data))
    }
}
