//! `HtmlAudioElement` playlist player.

use std::{cell::RefCell, rc::Rc};

use platform_host::{MediaFuture, MediaPlayer, MediaTrack};

#[derive(Default)]
struct PlayerState {
    tracks: Vec<MediaTrack>,
    index: usize,
    #[cfg(target_arch = "wasm32")]
    loaded: Option<usize>,
    #[cfg(target_arch = "wasm32")]
    audio: Option<web_sys::HtmlAudioElement>,
}

#[derive(Clone, Default)]
/// Browser player that owns one detached `<audio>` element.
///
/// The element is created on first play. Browsers reject `play()` until the page has seen a user
/// gesture; that rejection surfaces as a play error.
pub struct WebMediaPlayer {
    state: Rc<RefCell<PlayerState>>,
}

impl WebMediaPlayer {
    /// Creates a player over `tracks`.
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PlayerState {
                tracks,
                ..PlayerState::default()
            })),
        }
    }
}

impl PlayerState {
    /// Applies `index` and returns the track that should be loaded.
    fn select(&mut self, index: Option<usize>) -> Result<MediaTrack, String> {
        if let Some(index) = index {
            if index >= self.tracks.len() {
                return Err(format!("no track at index {index}"));
            }
            self.index = index;
        }
        self.tracks
            .get(self.index)
            .cloned()
            .ok_or_else(|| "no tracks".to_string())
    }

    #[cfg(target_arch = "wasm32")]
    fn start(&mut self, track: &MediaTrack) -> Result<js_sys::Promise, String> {
        use crate::bridge::js_error_to_string;

        if self.audio.is_none() {
            let audio = web_sys::HtmlAudioElement::new().map_err(js_error_to_string)?;
            audio.set_preload("none");
            self.audio = Some(audio);
        }
        let Some(audio) = self.audio.as_ref() else {
            return Err("audio element unavailable".to_string());
        };
        if self.loaded != Some(self.index) {
            audio.set_src(&track.src);
            self.loaded = Some(self.index);
        }
        audio.play().map_err(js_error_to_string)
    }
}

impl MediaPlayer for WebMediaPlayer {
    fn tracks(&self) -> Vec<MediaTrack> {
        self.state.borrow().tracks.clone()
    }

    fn current_index(&self) -> usize {
        self.state.borrow().index
    }

    fn play<'a>(&'a self, index: Option<usize>) -> MediaFuture<'a, Result<(), String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let promise = {
                    let mut state = self.state.borrow_mut();
                    let track = state.select(index)?;
                    state.start(&track)?
                };
                wasm_bindgen_futures::JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(crate::bridge::js_error_to_string)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let track = self.state.borrow_mut().select(index)?;
                Err(format!(
                    "audio playback is only available in the browser ({})",
                    track.title
                ))
            }
        })
    }

    fn pause(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(audio) = self.state.borrow().audio.as_ref() {
            if let Err(err) = audio.pause() {
                log::warn!("audio pause failed: {err:?}");
            }
        }
    }
}
