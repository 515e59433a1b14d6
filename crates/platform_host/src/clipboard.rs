//! Clipboard host-service contracts.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`ClipboardService`].
pub type ClipboardFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for plain-text clipboard access.
pub trait ClipboardService {
    /// Reads clipboard text.
    fn read_text<'a>(&'a self) -> ClipboardFuture<'a, Result<String, String>>;

    /// Replaces clipboard text.
    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Clipboard adapter for hosts without clipboard access.
pub struct NoopClipboardService;

impl ClipboardService for NoopClipboardService {
    fn read_text<'a>(&'a self) -> ClipboardFuture<'a, Result<String, String>> {
        Box::pin(async { Err("clipboard unavailable".to_string()) })
    }

    fn write_text<'a>(&'a self, _text: &'a str) -> ClipboardFuture<'a, Result<(), String>> {
        Box::pin(async { Err("clipboard unavailable".to_string()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory clipboard.
pub struct MemoryClipboardService {
    text: Rc<RefCell<String>>,
}

impl ClipboardService for MemoryClipboardService {
    fn read_text<'a>(&'a self) -> ClipboardFuture<'a, Result<String, String>> {
        Box::pin(async move { Ok(self.text.borrow().clone()) })
    }

    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a, Result<(), String>> {
        Box::pin(async move {
            *self.text.borrow_mut() = text.to_string();
            Ok(())
        })
    }
}
