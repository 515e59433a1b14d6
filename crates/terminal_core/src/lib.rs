//! Runtime-agnostic terminal engine.
//!
//! The engine splits submitted lines into chained segments, dispatches each through a
//! [`CommandRegistry`], tracks one [`CancellationToken`] per in-flight segment, and writes
//! results to a bounded [`OutputPane`]. It has no knowledge of a UI toolkit; the composition
//! boundary maps input events to [`TerminalEngine`] methods through [`KeyAction`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod cancel;
mod completion;
mod config;
mod engine;
mod history;
mod keymap;
mod pane;
mod registry;

pub use cancel::CancellationToken;
pub use completion::AutocompleteState;
pub use config::{TerminalConfig, DEFAULT_THEMES};
pub use engine::{EngineStateListener, TerminalEngine};
pub use history::{HistoryStore, DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_LIMIT};
pub use keymap::{KeyAction, KeyModifiers};
pub use pane::{
    GridViewport, OutputPane, PaneEntry, PaneListener, PaneViewport, ScrollMetrics, WheelOutcome,
    DEFAULT_STICK_THRESHOLD,
};
pub use registry::{handler, CommandContext, CommandHandler, CommandRegistry, RegisteredCommand};
