//! `navigator.clipboard` adapter.

use platform_host::{ClipboardFuture, ClipboardService};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser clipboard; reads may prompt for permission.
pub struct WebClipboardService;

impl ClipboardService for WebClipboardService {
    fn read_text<'a>(&'a self) -> ClipboardFuture<'a, Result<String, String>> {
        Box::pin(bridge::clipboard_read())
    }

    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a, Result<(), String>> {
        Box::pin(bridge::clipboard_write(text))
    }
}
