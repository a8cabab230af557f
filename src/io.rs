//! Image ingest (decode) and PNG export.

use image::RgbaImage;
use image::codecs::png::PngEncoder;
use rfd::FileDialog;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::ObscuraError;

/// Extensions accepted by the Open dialog and drag-and-drop.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// Mime type for a file extension, `None` for anything we can't ingest.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Decode pasted/dropped bytes into an RGBA buffer at the image's native
/// pixel dimensions. The mime type is checked before any decode work so a
/// non-image paste is rejected without touching the bytes.
pub fn ingest_bytes(bytes: &[u8], mime: &str) -> Result<RgbaImage, ObscuraError> {
    if !mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ObscuraError::UnsupportedFormat(mime.to_string()));
    }
    let img =
        image::load_from_memory(bytes).map_err(|e| ObscuraError::Decode(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Load an image from disk (Open dialog, drag-and-drop, CLI). The format
/// is inferred from the file contents / extension by the `image` crate.
pub fn load_image(path: &Path) -> Result<RgbaImage, ObscuraError> {
    let img = image::open(path).map_err(|e| ObscuraError::Decode(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Lossless PNG encoding of the live buffer, for the clipboard fallback
/// and tests. No quality or format options — redacted output is always PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ObscuraError> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new(&mut out);
    #[allow(deprecated)]
    encoder
        .encode(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| ObscuraError::Export(e.to_string()))?;
    Ok(out)
}

/// Write the buffer to `path` as PNG.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<(), ObscuraError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = PngEncoder::new(&mut writer);
    #[allow(deprecated)]
    encoder
        .encode(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| ObscuraError::Export(e.to_string()))?;
    Ok(())
}

/// Ask for a destination and save. Outer `None` means the user cancelled.
pub fn save_png_dialog(img: &RgbaImage) -> Option<Result<PathBuf, ObscuraError>> {
    let path = FileDialog::new()
        .set_file_name("redacted.png")
        .add_filter("PNG image", &["png"])
        .save_file()?;
    Some(save_png(img, &path).map(|_| path))
}

/// Ask for a file and load it. Outer `None` means the user cancelled.
pub fn open_image_dialog() -> Option<Result<(RgbaImage, PathBuf), ObscuraError>> {
    let path = FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()?;
    Some(load_image(&path).map(|img| (img, path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn non_image_mime_is_rejected_before_decoding() {
        let err = ingest_bytes(b"hello", "text/plain").unwrap_err();
        assert!(matches!(err, ObscuraError::UnsupportedFormat(_)));
    }

    #[test]
    fn malformed_image_data_is_a_decode_error() {
        let err = ingest_bytes(b"\x89PNG\r\nnot actually a png", "image/png").unwrap_err();
        assert!(matches!(err, ObscuraError::Decode(_)));
    }

    #[test]
    fn png_export_round_trips_losslessly() {
        let img = RgbaImage::from_fn(13, 7, |x, y| {
            Rgba([x as u8 * 10, y as u8 * 20, 33, 255])
        });
        let bytes = encode_png(&img).unwrap();
        let back = ingest_bytes(&bytes, "image/png").unwrap();
        assert_eq!(back.dimensions(), (13, 7));
        assert_eq!(back.as_raw(), img.as_raw());
    }

    #[test]
    fn extension_mapping_covers_supported_types_only() {
        assert_eq!(mime_for_extension("PNG"), Some("image/png"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("pdf"), None);
    }
}
