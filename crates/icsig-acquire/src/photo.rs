//! Reference photos.
//!
//! Photos are stored in the catalog as base64 text. For display they are
//! decoded and shrunk to fit a bounding box, keeping the aspect ratio.
//! A missing photo is a normal state, not an error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use icsig_core::CatalogEntry;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

use crate::error::AcquireResult;

/// Default bounding box edge, in pixels.
pub const DEFAULT_MAX_SIZE: u32 = 600;

/// Encode raw image bytes for storage.
#[must_use]
pub fn encode_photo(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read an image file and encode it for storage.
///
/// The file must decode as an image so that broken uploads are caught
/// before they reach the catalog.
pub fn encode_photo_file(path: &Path) -> AcquireResult<String> {
    let bytes = std::fs::read(path)?;
    let _decoded = image::load_from_memory(&bytes)?;
    Ok(encode_photo(&bytes))
}

/// Decode a stored photo back to raw image bytes.
pub fn decode_photo(encoded: &str) -> AcquireResult<Vec<u8>> {
    Ok(STANDARD.decode(encoded.trim())?)
}

/// Decode image bytes and shrink them to fit within the given box.
///
/// Images already inside the box are returned at their original size.
pub fn fit_photo(bytes: &[u8], max_width: u32, max_height: u32) -> AcquireResult<DynamicImage> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return Ok(img);
    }
    Ok(img.thumbnail(max_width, max_height))
}

/// Write an entry's photo, fitted to a `max_size` square, to `output`.
///
/// Returns the written dimensions, or `None` when the entry has no photo.
pub fn export_photo(
    entry: &CatalogEntry,
    output: &Path,
    max_size: u32,
) -> AcquireResult<Option<(u32, u32)>> {
    let Some(encoded) = entry.photo.as_deref() else {
        log::info!("No photo in database for: {}", entry.name);
        return Ok(None);
    };

    let bytes = decode_photo(encoded)?;
    let img = fit_photo(&bytes, max_size, max_size)?;
    img.save(output)?;
    log::info!("Photo for {} written to {}", entry.name, output.display());
    Ok(Some(img.dimensions()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use icsig_core::{ReadingVector, CHANNELS};
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn entry() -> CatalogEntry {
        CatalogEntry::manual("NE555", ReadingVector::new([0.0; CHANNELS]))
    }

    #[test]
    fn test_encode_decode() {
        let bytes = png_bytes(4, 4);
        let encoded = encode_photo(&bytes);
        assert_eq!(decode_photo(&encoded).unwrap(), bytes);
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(decode_photo("not base64!!").is_err());
    }

    #[test]
    fn test_fit_photo_shrinks_keeping_aspect() {
        let img = fit_photo(&png_bytes(1200, 600), 600, 600).unwrap();
        assert_eq!(img.dimensions(), (600, 300));
    }

    #[test]
    fn test_fit_photo_leaves_small_images() {
        let img = fit_photo(&png_bytes(120, 80), 600, 600).unwrap();
        assert_eq!(img.dimensions(), (120, 80));
    }

    #[test]
    fn test_fit_photo_rejects_non_image() {
        assert!(fit_photo(b"definitely not a png", 600, 600).is_err());
    }

    #[test]
    fn test_encode_photo_file_rejects_non_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "pinout notes").unwrap();

        assert!(encode_photo_file(&path).is_err());
    }

    #[test]
    fn test_export_photo() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("chip.png");
        std::fs::write(&source, png_bytes(900, 1800)).unwrap();

        let entry = entry().with_photo(encode_photo_file(&source).unwrap());
        let output = temp_dir.path().join("out.png");

        let dims = export_photo(&entry, &output, 300).unwrap();
        assert_eq!(dims, Some((150, 300)));
        assert!(output.exists());
    }

    #[test]
    fn test_export_without_photo() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.png");

        assert_eq!(export_photo(&entry(), &output, 300).unwrap(), None);
        assert!(!output.exists());
    }
}
