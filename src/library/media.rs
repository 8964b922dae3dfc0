//! MIME hints and the byte source handed to the playback surface.

use std::fs::File;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tracing::debug;

/// MIME hint derived purely from the file extension; unknown extensions
/// fall back to `video/mp4`.
pub fn mime_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "video/mp4",
    }
}

/// An open video file, held for as long as it is the playback source.
///
/// `release` closes it; it runs at most once, and `Drop` covers any source
/// that was never released explicitly.
#[derive(Debug)]
pub struct ByteSource {
    path: PathBuf,
    mime: &'static str,
    size: u64,
    file: Option<File>,
    #[cfg(test)]
    releases: Option<Arc<AtomicUsize>>,
}

impl ByteSource {
    pub fn new(path: PathBuf, file: File, size: u64) -> Self {
        let mime = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(mime_for)
            .unwrap_or("video/mp4");
        Self {
            path,
            mime,
            size,
            file: Some(file),
            #[cfg(test)]
            releases: None,
        }
    }

    /// Count every actual release of this source in `counter`.
    #[cfg(test)]
    pub(crate) fn count_releases(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.releases = Some(counter);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Close the underlying file. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.file.take() {
            Some(file) => {
                drop(file);
                #[cfg(test)]
                if let Some(counter) = &self.releases {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                debug!(path = %self.path.display(), "released byte source");
                true
            }
            None => false,
        }
    }
}

impl Drop for ByteSource {
    fn drop(&mut self) {
        self.release();
    }
}
