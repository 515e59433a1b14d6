//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring for the terminal: `localStorage`
//! preferences, Cache API content caching, `window.open`, `setTimeout` timers, `fetch`,
//! `navigator.clipboard`, Blob downloads, an `HtmlAudioElement` playlist, `crypto.getRandomValues`,
//! and a console-backed `log` sink.
//!
//! Every adapter also compiles for native targets, where it degrades to the same behavior as the
//! matching no-op adapter so the workspace tests run headless.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Host-service bundle assembly for the browser composition root.
pub mod adapters;
mod bridge;
pub mod cache;
pub mod clipboard;
pub mod download;
pub mod external_url;
pub mod http;
pub mod logger;
pub mod media;
pub mod random;
pub mod storage;
pub mod timer;

pub use adapters::{build_host_services, host_info};
pub use cache::WebContentCache;
pub use clipboard::WebClipboardService;
pub use download::WebDownloadService;
pub use external_url::WebExternalUrlService;
pub use http::WebHttpTransport;
pub use logger::ConsoleLogger;
pub use media::WebMediaPlayer;
pub use random::WebRandomSource;
pub use storage::WebPrefsStore;
pub use timer::WebTimer;
