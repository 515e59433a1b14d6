//! Host service bundle handed from the composition root to the terminal.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{
    ClipboardService, ContentCache, DownloadService, ExternalUrlService, HttpTransport,
    MediaPlayer, NoopClipboardService, NoopContentCache, NoopDownloadService,
    NoopExternalUrlService, NoopHttpTransport, NoopMediaPlayer, NoopPrefsStore, NoopTimer,
    PrefsStore, RandomSource, SequenceRandomSource, TimerService,
};

/// Static facts about the host environment, printed by informational commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// User-agent string.
    pub user_agent: String,
    /// Preferred language tag.
    pub language: String,
    /// Platform label.
    pub platform: String,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            user_agent: "unknown".to_string(),
            language: "en".to_string(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// Runtime-selected host service bundle.
///
/// All environment-specific service selection happens before this bundle crosses into the
/// terminal crates, which only see the capability traits.
#[derive(Clone)]
pub struct HostServices {
    /// Lightweight typed preference store.
    pub prefs: Rc<dyn PrefsStore>,
    /// TTL-cached content store.
    pub cache: Rc<dyn ContentCache>,
    /// External URL opening service.
    pub external_urls: Rc<dyn ExternalUrlService>,
    /// Delays and clock.
    pub timer: Rc<dyn TimerService>,
    /// HTTP transport.
    pub http: Rc<dyn HttpTransport>,
    /// Clipboard access.
    pub clipboard: Rc<dyn ClipboardService>,
    /// File download handoff.
    pub downloads: Rc<dyn DownloadService>,
    /// Playlist player collaborator.
    pub media: Rc<dyn MediaPlayer>,
    /// Random bytes.
    pub random: Rc<dyn RandomSource>,
    /// Host environment facts.
    pub info: HostInfo,
}

impl HostServices {
    /// Builds a bundle where every service is a no-op adapter.
    pub fn noop() -> Self {
        Self {
            prefs: Rc::new(NoopPrefsStore),
            cache: Rc::new(NoopContentCache),
            external_urls: Rc::new(NoopExternalUrlService),
            timer: Rc::new(NoopTimer),
            http: Rc::new(NoopHttpTransport),
            clipboard: Rc::new(NoopClipboardService),
            downloads: Rc::new(NoopDownloadService),
            media: Rc::new(NoopMediaPlayer),
            random: Rc::new(SequenceRandomSource::default()),
            info: HostInfo::default(),
        }
    }
}
