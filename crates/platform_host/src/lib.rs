//! Typed host-service contracts shared by the terminal crates and browser adapters.
//!
//! This crate is the API-first boundary for everything the terminal reaches outside itself:
//! preferences, content caching, timers, HTTP, clipboard, downloads, link opening, the
//! media-player collaborator, and randomness. Each contract is an object-safe trait with boxed
//! futures plus no-op and in-memory adapters; concrete browser adapters live in
//! `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod clipboard;
pub mod download;
pub mod external_url;
pub mod host;
pub mod http;
pub mod media;
pub mod prefs;
pub mod random;
pub mod time;
pub mod timer;

pub use cache::{
    cache_get_timed_with, cache_put_timed_with, CacheLookup, ContentCache, ContentCacheFuture,
    MemoryContentCache, NoopContentCache, TimedEntry,
};
pub use clipboard::{
    ClipboardFuture, ClipboardService, MemoryClipboardService, NoopClipboardService,
};
pub use download::{
    DownloadFile, DownloadFuture, DownloadService, MemoryDownloadService, NoopDownloadService,
};
pub use external_url::{
    is_safe_link, ExternalUrlFuture, ExternalUrlService, MemoryExternalUrlService,
    NoopExternalUrlService,
};
pub use host::{HostInfo, HostServices};
pub use http::{
    FetchMode, HttpFuture, HttpRequest, HttpResponse, HttpTransport, MemoryHttpTransport,
    NoopHttpTransport,
};
pub use media::{MediaFuture, MediaPlayer, MediaTrack, MemoryMediaPlayer, NoopMediaPlayer};
#[cfg(not(target_arch = "wasm32"))]
pub use random::OsRandomSource;
pub use random::{random_index, RandomSource, SequenceRandomSource};
pub use prefs::{MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture};
pub use time::unix_time_ms_now;
pub use timer::{ManualTimer, NoopTimer, TimerFuture, TimerService};
