/// Shared data structures for the application state
///
/// These structs flow between the pipeline, the storage layer
/// and the UI layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::quality::Quality;

/// The image the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Full path to the picked file
    pub path: PathBuf,
    /// File size in bytes, None when the lookup failed
    pub original_size: Option<u64>,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, original_size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            original_size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Label text for the original size, e.g. "2048 KB"
    pub fn size_label(&self) -> String {
        match self.original_size {
            Some(bytes) => format!("{} KB", size_kb(bytes as usize)),
            None => "Unknown".to_string(),
        }
    }
}

/// A finished recompression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedResult {
    /// Re-encoded JPEG bytes, shared with the preview widget
    pub bytes: Arc<Vec<u8>>,
    /// Quality the bytes were encoded with
    pub quality: Quality,
    /// Pipeline generation that produced this result
    pub generation: u64,
}

impl CompressedResult {
    pub fn new(bytes: Vec<u8>, quality: Quality, generation: u64) -> Self {
        Self {
            bytes: Arc::new(bytes),
            quality,
            generation,
        }
    }

    pub fn size_kb(&self) -> usize {
        size_kb(self.bytes.len())
    }
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Used to dismiss only the notice a timer was started for
    pub id: u64,
    pub text: String,
}

/// Size in whole kilobytes (integer division by 1024)
pub fn size_kb(bytes: usize) -> usize {
    bytes / 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_kb_truncates() {
        assert_eq!(size_kb(0), 0);
        assert_eq!(size_kb(1023), 0);
        assert_eq!(size_kb(1024), 1);
        assert_eq!(size_kb(2048 * 1024), 2048);
        assert_eq!(size_kb(2048 * 1024 + 1023), 2048);
    }

    #[test]
    fn test_original_size_label() {
        let source = SourceImage::new("/photos/a.jpg", Some(2048 * 1024));
        assert_eq!(source.size_label(), "2048 KB");

        let source = SourceImage::new("/photos/b.jpg", None);
        assert_eq!(source.size_label(), "Unknown");
    }

    #[test]
    fn test_result_size() {
        let result = CompressedResult::new(vec![0u8; 5000], Quality::new(40), 3);
        assert_eq!(result.bytes.len(), 5000);
        assert_eq!(result.size_kb(), 4);
    }
}
