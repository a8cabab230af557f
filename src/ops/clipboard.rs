// ============================================================================
// CLIPBOARD — images in (paste), the redacted result out (copy)
// ============================================================================

use image::RgbaImage;
use std::borrow::Cow;

use crate::error::ObscuraError;

/// Write an RGBA image to the system clipboard.
/// arboard wants `ImageData { width, height, bytes }` in RGBA order.
pub fn copy_to_system_clipboard(img: &RgbaImage) -> Result<(), ObscuraError> {
    let mut clip =
        arboard::Clipboard::new().map_err(|e| ObscuraError::Export(e.to_string()))?;
    let data = arboard::ImageData {
        width: img.width() as usize,
        height: img.height() as usize,
        bytes: Cow::Borrowed(img.as_raw()),
    };
    clip.set_image(data)
        .map_err(|e| ObscuraError::Export(e.to_string()))
}

/// Try to read an image from the system clipboard. Two cases:
///   1. Raw image data (Print Screen, copied from another image editor).
///   2. Text content that happens to be a path to an image file.
pub fn image_from_system_clipboard() -> Option<RgbaImage> {
    let mut clip = arboard::Clipboard::new().ok()?;

    if let Ok(data) = clip.get_image()
        && let Some(img) = RgbaImage::from_raw(
            data.width as u32,
            data.height as u32,
            data.bytes.into_owned(),
        )
    {
        return Some(img);
    }

    if let Ok(text) = clip.get_text() {
        let path = std::path::Path::new(text.trim());
        if path.is_file()
            && let Ok(img) = image::open(path)
        {
            return Some(img.to_rgba8());
        }
    }

    None
}
