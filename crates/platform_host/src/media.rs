//! Media-player collaborator contracts.
//!
//! The page owns one playlist player; the terminal only sees this narrow capability surface.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`MediaPlayer`].
pub type MediaFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    /// Display title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// Source URL.
    pub src: String,
}

impl MediaTrack {
    /// Creates a track.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            src: src.into(),
        }
    }
}

/// Playlist player collaborator.
pub trait MediaPlayer {
    /// Returns the ordered playlist.
    fn tracks(&self) -> Vec<MediaTrack>;

    /// Returns the index of the selected track.
    fn current_index(&self) -> usize;

    /// Starts playback, switching to `index` first when given.
    ///
    /// Out-of-range indices are rejected by the player.
    fn play<'a>(&'a self, index: Option<usize>) -> MediaFuture<'a, Result<(), String>>;

    /// Pauses playback.
    fn pause(&self);
}

#[derive(Debug, Clone, Copy, Default)]
/// Player with an empty playlist.
pub struct NoopMediaPlayer;

impl MediaPlayer for NoopMediaPlayer {
    fn tracks(&self) -> Vec<MediaTrack> {
        Vec::new()
    }

    fn current_index(&self) -> usize {
        0
    }

    fn play<'a>(&'a self, _index: Option<usize>) -> MediaFuture<'a, Result<(), String>> {
        Box::pin(async { Err("no tracks".to_string()) })
    }

    fn pause(&self) {}
}

#[derive(Debug, Default)]
struct MemoryPlayerState {
    tracks: Vec<MediaTrack>,
    index: usize,
    playing: bool,
}

#[derive(Debug, Clone, Default)]
/// In-memory player that tracks selection and play state.
pub struct MemoryMediaPlayer {
    state: Rc<RefCell<MemoryPlayerState>>,
}

impl MemoryMediaPlayer {
    /// Creates a player with the given playlist.
    pub fn with_tracks(tracks: Vec<MediaTrack>) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryPlayerState {
                tracks,
                ..MemoryPlayerState::default()
            })),
        }
    }

    /// Returns whether the player is currently playing.
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }
}

impl MediaPlayer for MemoryMediaPlayer {
    fn tracks(&self) -> Vec<MediaTrack> {
        self.state.borrow().tracks.clone()
    }

    fn current_index(&self) -> usize {
        self.state.borrow().index
    }

    fn play<'a>(&'a self, index: Option<usize>) -> MediaFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let mut state = self.state.borrow_mut();
            if let Some(index) = index {
                if index >= state.tracks.len() {
                    return Err(format!("no track at index {index}"));
                }
                state.index = index;
            }
            if state.tracks.is_empty() {
                return Err("no tracks".to_string());
            }
            state.playing = true;
            Ok(())
        })
    }

    fn pause(&self) {
        self.state.borrow_mut().playing = false;
    }
}
