//! Image loading backends.
//!
//! An [`ImageLoader`] turns a path into an image handle. It runs on the
//! [`ImageSet`](crate::resources::imageset::ImageSet)'s loader thread, so it
//! must be `Send` and its images must be shareable across threads.

use std::path::Path;

use log::debug;

use crate::error::ImageLoadError;

/// Loads one image from a path.
pub trait ImageLoader: Send + 'static {
    /// Handle produced by a successful load.
    type Image: Send + Sync + 'static;

    fn load(&self, path: &str) -> Result<Self::Image, ImageLoadError>;
}

/// Encoded image file contents.
///
/// Decoding is left to the drawing backend, which knows its own pixel
/// formats and GPU upload rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl ImageBytes {
    /// Lower-cased file extension including the dot (".png"), if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// Reads image files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl ImageLoader for FileLoader {
    type Image = ImageBytes;

    fn load(&self, path: &str) -> Result<ImageBytes, ImageLoadError> {
        let bytes = std::fs::read(path).map_err(|e| ImageLoadError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path);
        Ok(ImageBytes {
            path: path.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        let img = ImageBytes {
            path: "img/Girl.PNG".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(img.extension().as_deref(), Some(".png"));
    }

    #[test]
    fn test_extension_missing() {
        let img = ImageBytes {
            path: "img/girl".to_string(),
            bytes: Vec::new(),
        };
        assert_eq!(img.extension(), None);
    }

    #[test]
    fn test_file_loader_reads_bytes() {
        let path = std::env::temp_dir().join("ssaplayer_file_loader_test.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        let path = path.to_string_lossy().to_string();

        let img = FileLoader.load(&path).unwrap();
        assert_eq!(img.bytes, vec![1, 2, 3]);
        assert_eq!(img.path, path);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_loader_missing_file() {
        let err = FileLoader
            .load("/definitely/not/here/ssaplayer.png")
            .unwrap_err();
        assert!(matches!(err, ImageLoadError::Io { .. }));
        assert_eq!(err.path(), "/definitely/not/here/ssaplayer.png");
    }
}
