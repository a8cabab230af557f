//! Editing session state: the live pixel buffer, the immutable baseline
//! snapshot captured at load time, and display↔buffer coordinate mapping.

use eframe::egui;
use egui::{Color32, ColorImage, ImageData, Pos2, Rect, TextureHandle, TextureOptions};
use image::RgbaImage;
use std::sync::Arc;

use crate::error::ObscuraError;

// ---------------------------------------------------------------------------
//  Coordinate mapping
// ---------------------------------------------------------------------------

/// Scale factors mapping on-screen (display) points to buffer pixels.
///
/// Rebuilt from the canvas rect on every frame — the layout can change
/// between pointer events, so the transform is never cached.
#[derive(Clone, Copy, Debug)]
pub struct DisplayTransform {
    origin: Pos2,
    scale_x: f32,
    scale_y: f32,
}

impl DisplayTransform {
    pub fn new(canvas_rect: Rect, buffer_w: u32, buffer_h: u32) -> Self {
        let dw = canvas_rect.width();
        let dh = canvas_rect.height();
        if dw <= 0.0 || dh <= 0.0 || buffer_w == 0 || buffer_h == 0 {
            // Canvas not laid out yet — mapping collapses to the origin.
            return Self {
                origin: canvas_rect.min,
                scale_x: 0.0,
                scale_y: 0.0,
            };
        }
        Self {
            origin: canvas_rect.min,
            scale_x: buffer_w as f32 / dw,
            scale_y: buffer_h as f32 / dh,
        }
    }

    /// Map an on-screen position into buffer pixel coordinates.
    /// A degenerate (zero-size) canvas maps everything to `(0, 0)`.
    pub fn to_buffer(&self, display: Pos2) -> (f32, f32) {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return (0.0, 0.0);
        }
        (
            (display.x - self.origin.x) * self.scale_x,
            (display.y - self.origin.y) * self.scale_y,
        )
    }

    /// Inverse mapping, used to place screen-space overlays (brush ring,
    /// selection preview) over buffer features.
    pub fn to_display(&self, bx: f32, by: f32) -> Pos2 {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return self.origin;
        }
        Pos2::new(
            self.origin.x + bx / self.scale_x,
            self.origin.y + by / self.scale_y,
        )
    }

    /// Buffer-pixels-per-display-point factors, or `None` when degenerate.
    pub fn scale(&self) -> Option<(f32, f32)> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            None
        } else {
            Some((self.scale_x, self.scale_y))
        }
    }
}

/// Fit a `buffer_w × buffer_h` image into `avail`, centered, preserving
/// aspect ratio. Never scales up past 1:1.
pub fn fit_rect(avail: Rect, buffer_w: u32, buffer_h: u32) -> Rect {
    if buffer_w == 0 || buffer_h == 0 {
        return Rect::from_min_size(avail.min, egui::Vec2::ZERO);
    }
    let bw = buffer_w as f32;
    let bh = buffer_h as f32;
    let scale = (avail.width() / bw).min(avail.height() / bh).min(1.0);
    let size = egui::Vec2::new(bw * scale, bh * scale);
    Rect::from_center_size(avail.center(), size)
}

// ---------------------------------------------------------------------------
//  Canvas session
// ---------------------------------------------------------------------------

/// One editing session: the canonical mutable pixel buffer plus the
/// untouched baseline captured when the image was loaded.
///
/// Both buffers are replaced together on every ingest, and the baseline is
/// never written after capture — it exists solely so the brush can sample
/// unedited pixels (see `ops::brush`). Their dimensions are equal for the
/// whole lifetime of a loaded image.
pub struct CanvasSession {
    live: Option<RgbaImage>,
    baseline: Option<RgbaImage>,
    texture: Option<TextureHandle>,
    /// Set by any buffer mutation; cleared after the next texture upload.
    dirty: bool,
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSession {
    pub fn new() -> Self {
        Self {
            live: None,
            baseline: None,
            texture: None,
            dirty: false,
        }
    }

    /// Install a freshly ingested image, replacing any previous session
    /// state. This is the only point where the baseline is ever captured.
    pub fn load(&mut self, img: RgbaImage) {
        self.baseline = Some(img.clone());
        self.live = Some(img);
        self.texture = None;
        self.dirty = true;
    }

    pub fn has_image(&self) -> bool {
        self.live.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.live.as_ref().map(|img| img.dimensions())
    }

    pub fn live(&self) -> Option<&RgbaImage> {
        self.live.as_ref()
    }

    pub fn live_mut(&mut self) -> Option<&mut RgbaImage> {
        self.live.as_mut()
    }

    /// Split borrow for the brush: mutable live buffer plus shared baseline.
    pub fn buffers_mut(&mut self) -> Option<(&mut RgbaImage, &RgbaImage)> {
        match (self.live.as_mut(), self.baseline.as_ref()) {
            (Some(live), Some(baseline)) => Some((live, baseline)),
            _ => None,
        }
    }

    pub fn baseline(&self) -> Result<&RgbaImage, ObscuraError> {
        self.baseline.as_ref().ok_or(ObscuraError::NoImageLoaded)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Upload the live buffer to the GPU when it changed since the last
    /// call. Reuses the existing texture allocation via `tex.set` so an
    /// interactive stroke doesn't churn allocations.
    pub fn update_texture(&mut self, ctx: &egui::Context) {
        if !self.dirty {
            return;
        }
        let Some(img) = &self.live else { return };

        let pixels: Vec<Color32> = img
            .as_raw()
            .chunks_exact(4)
            .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
            .collect();
        let color_image = ColorImage {
            size: [img.width() as usize, img.height() as usize],
            pixels,
        };
        let image_data = ImageData::Color(Arc::new(color_image));
        match &mut self.texture {
            Some(tex) => tex.set(image_data, TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("canvas", image_data, TextureOptions::LINEAR));
            }
        }
        self.dirty = false;
    }
}
