//! Image storage
//!
//! Uploads are decoded, re-encoded as JPEG and stored under the SHA-256 of
//! the re-encoded bytes, so identical uploads map to one file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::{AppError, AppResult, ErrorCode};

/// Maximum upload size (5 MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// JPEG quality for dish images
const JPEG_QUALITY: u8 = 85;

/// Accepted upload types
const SUPPORTED_MIME: &[&str] = &["image/png", "image/jpeg", "image/webp"];

#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub url: String,
    /// `true` when the same image was already stored
    pub deduplicated: bool,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate, re-encode and store one upload
    pub fn store(&self, data: &[u8], original_name: &str) -> AppResult<StoredImage> {
        if data.is_empty() {
            return Err(AppError::validation("Empty file provided"));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!("File too large, maximum is {}MB", MAX_FILE_SIZE / 1024 / 1024),
            ));
        }
        let mime = mime_guess::from_path(original_name).first_or_octet_stream();
        if !SUPPORTED_MIME.contains(&mime.essence_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileType,
                format!("Unsupported file type '{}', use PNG, JPEG or WebP", mime),
            ));
        }

        let jpeg = reencode_jpeg(data)?;
        let hash = hex::encode(Sha256::digest(&jpeg));
        let filename = format!("{}.jpg", hash);
        let path = self.dir.join(&filename);

        let deduplicated = path.exists();
        if !deduplicated {
            std::fs::create_dir_all(&self.dir)
                .map_err(|e| AppError::internal(format!("Failed to create image dir: {}", e)))?;
            std::fs::write(&path, &jpeg)
                .map_err(|e| AppError::internal(format!("Failed to save image: {}", e)))?;
        }

        tracing::info!(
            original_name = %original_name,
            size = jpeg.len(),
            filename = %filename,
            deduplicated,
            "Image stored"
        );

        Ok(StoredImage {
            url: format!("/images/{}", filename),
            filename,
            original_name: original_name.to_string(),
            size: jpeg.len(),
            deduplicated,
        })
    }

    /// Path of a stored image; rejects anything that is not a bare file name
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let valid = !filename.is_empty()
            && !filename.contains("..")
            && !filename.contains('/')
            && !filename.contains('\\');
        valid.then(|| self.dir.join(filename))
    }
}

fn reencode_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid image: {}", e)))?;

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("Failed to encode image: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_store_reencodes_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let first = store.store(&png_bytes(), "paneer.png").unwrap();
        assert!(first.filename.ends_with(".jpg"));
        assert_eq!(first.url, format!("/images/{}", first.filename));
        assert!(!first.deduplicated);
        assert!(dir.path().join(&first.filename).exists());

        let second = store.store(&png_bytes(), "copy.png").unwrap();
        assert_eq!(second.filename, first.filename);
        assert!(second.deduplicated);
    }

    #[test]
    fn test_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let err = store.store(b"hello", "menu.pdf").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileType);

        let err = store.store(b"not an image", "fake.png").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);

        let err = store.store(&vec![0u8; MAX_FILE_SIZE + 1], "big.jpg").unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);

        assert!(store.store(&[], "empty.png").is_err());
    }

    #[test]
    fn test_resolve_blocks_traversal() {
        let store = ImageStore::new("/tmp/images");
        assert!(store.resolve("abc.jpg").is_some());
        assert!(store.resolve("../secret").is_none());
        assert!(store.resolve("a/b.jpg").is_none());
        assert!(store.resolve("").is_none());
    }
}
