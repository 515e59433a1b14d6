//! File download (save-as) host-service contracts.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

/// Object-safe boxed future used by [`DownloadService`].
pub type DownloadFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One file handed to the host for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFile {
    /// Suggested file name.
    pub file_name: String,
    /// MIME type, empty when unknown.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Host service that offers bytes to the user as a downloaded file.
pub trait DownloadService {
    /// Saves `file` through the host's download mechanism.
    fn save<'a>(&'a self, file: DownloadFile) -> DownloadFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Download adapter for hosts that cannot save files.
pub struct NoopDownloadService;

impl DownloadService for NoopDownloadService {
    fn save<'a>(&'a self, _file: DownloadFile) -> DownloadFuture<'a, Result<(), String>> {
        Box::pin(async { Err("downloads unavailable".to_string()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Records saved files in memory.
pub struct MemoryDownloadService {
    saved: Rc<RefCell<Vec<DownloadFile>>>,
}

impl MemoryDownloadService {
    /// Returns the files saved so far.
    pub fn saved(&self) -> Vec<DownloadFile> {
        self.saved.borrow().clone()
    }
}

impl DownloadService for MemoryDownloadService {
    fn save<'a>(&'a self, file: DownloadFile) -> DownloadFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.saved.borrow_mut().push(file);
            Ok(())
        })
    }
}
