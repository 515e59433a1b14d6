//! Shared terminal contracts used by the parser, execution engine, command handlers, and the
//! terminal UI.
//!
//! This crate is intentionally runtime-agnostic. It defines command metadata, output lines,
//! execution identifiers, and the command error taxonomy without depending on Leptos, browser
//! APIs, or host services.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution identifier for one command segment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub u64);

/// Help metadata for a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Registry key. Stored as given; dispatch lowers the head token before lookup.
    pub name: String,
    /// One-line description shown by `help`.
    pub description: String,
    /// Usage string shown by `help <name>`.
    pub usage: String,
}

impl CommandDescriptor {
    /// Creates a descriptor from trusted caller input.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: usage.into(),
        }
    }
}

/// Style class attached to one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    /// Unstyled output, including echoed prompt lines.
    #[default]
    Plain,
    /// Secondary/informational text.
    Muted,
    /// Successful result.
    Good,
    /// Failure, diagnostic, or abort notice.
    Bad,
}

impl LineStyle {
    /// Returns the CSS class used by the terminal UI, if any.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Muted => Some("term-muted"),
            Self::Good => Some("term-good"),
            Self::Bad => Some("term-bad"),
        }
    }
}

/// One inline fragment of a rendered output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LinePart {
    /// Plain text.
    Text {
        /// Text payload.
        text: String,
    },
    /// A link that was validated as `http`, `https`, or `mailto`.
    Link {
        /// Validated target.
        href: String,
        /// Visible label.
        label: String,
    },
}

/// Content of one output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LineContent {
    /// Plain text line.
    Text {
        /// Text payload.
        text: String,
    },
    /// Line assembled from text and link fragments.
    Parts {
        /// Ordered fragments.
        parts: Vec<LinePart>,
    },
}

impl LineContent {
    /// Returns the text a reader would see, with links rendered as their labels.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Parts { parts } => parts
                .iter()
                .map(|part| match part {
                    LinePart::Text { text } => text.as_str(),
                    LinePart::Link { label, .. } => label.as_str(),
                })
                .collect(),
        }
    }
}

impl From<String> for LineContent {
    fn from(text: String) -> Self {
        Self::Text { text }
    }
}

impl From<&str> for LineContent {
    fn from(text: &str) -> Self {
        Self::Text {
            text: text.to_string(),
        }
    }
}

impl From<Vec<LinePart>> for LineContent {
    fn from(parts: Vec<LinePart>) -> Self {
        Self::Parts { parts }
    }
}

/// One line stored by the output pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// Rendered content.
    pub content: LineContent,
    /// Style class.
    pub style: LineStyle,
}

impl OutputLine {
    /// Creates an output line.
    pub fn new(content: impl Into<LineContent>, style: LineStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    /// Returns the visible text of the line.
    pub fn text(&self) -> String {
        self.content.plain_text()
    }
}

/// Engine state observed by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineState {
    /// No command segment is in flight.
    Idle,
    /// One command segment is in flight.
    Running {
        /// Active execution identifier.
        execution_id: ExecutionId,
    },
}

/// Coarse error classification, used for logging and by callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandErrorCode {
    /// The active execution context was cancelled.
    Aborted,
    /// User input violated command usage.
    Usage,
    /// A required host collaborator is missing or refused the request.
    Unavailable,
    /// Network or transport failure.
    Transport,
    /// Any other handler failure.
    Internal,
}

/// Error produced by command handlers and cancellable host operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A suspended operation was cancelled through its execution context.
    #[error("Aborted")]
    Aborted,
    /// User input violated command usage.
    #[error("{0}")]
    Usage(String),
    /// A host collaborator is unavailable.
    #[error("{0}")]
    Unavailable(String),
    /// Network or transport failure, including request timeouts.
    #[error("{0}")]
    Transport(String),
    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Returns the error classification.
    pub fn code(&self) -> CommandErrorCode {
        match self {
            Self::Aborted => CommandErrorCode::Aborted,
            Self::Usage(_) => CommandErrorCode::Usage,
            Self::Unavailable(_) => CommandErrorCode::Unavailable,
            Self::Transport(_) => CommandErrorCode::Transport,
            Self::Failed(_) => CommandErrorCode::Internal,
        }
    }

    /// Returns whether this error is the distinguished cancellation condition.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Convenience result type for command handlers.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Message printed when a cancelled segment settles.
pub const ABORTED_NOTICE: &str = "Aborted.";

/// Message printed when the user requests cancellation of a running segment.
pub const INTERRUPT_NOTICE: &str = "^C";

/// Message printed for an unknown command head token.
pub const NOT_FOUND_NOTICE: &str = "Command not found. Type 'help'.";
