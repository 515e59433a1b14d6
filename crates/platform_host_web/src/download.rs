//! Blob download adapter.

use platform_host::{DownloadFile, DownloadFuture, DownloadService};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Saves files through a temporary object URL and a synthetic anchor click.
pub struct WebDownloadService;

impl DownloadService for WebDownloadService {
    fn save<'a>(&'a self, file: DownloadFile) -> DownloadFuture<'a, Result<(), String>> {
        Box::pin(async move {
            log::debug!(
                "saving download {} ({} bytes)",
                file.file_name,
                file.bytes.len()
            );
            bridge::download_bytes(&file.file_name, &file.mime_type, &file.bytes)
        })
    }
}
