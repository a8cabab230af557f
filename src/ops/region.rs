// ============================================================================
// REGION BLUR — fixed-strength Gaussian over a rectangular selection
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

use super::DirtyRect;

/// Blur strength for the region tool. Not user-adjustable.
pub const REGION_BLUR_SIGMA: f32 = 6.0;

/// A normalized rectangle in buffer coordinates.
///
/// Only built through [`Selection::from_corners`], so width and height are
/// non-negative for any drag direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Selection {
    /// Build from two opposite corners in any drag order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: (f32, f32)) -> bool {
        p.0 >= self.x
            && p.0 <= self.x + self.width
            && p.1 >= self.y
            && p.1 <= self.y + self.height
    }

    /// Integer pixel rect clipped to a `w × h` buffer, or `None` when the
    /// clipped area is empty.
    pub fn clamp_to(&self, w: u32, h: u32) -> Option<DirtyRect> {
        let x0 = self.x.clamp(0.0, w as f32).floor() as u32;
        let y0 = self.y.clamp(0.0, h as f32).floor() as u32;
        let x1 = (self.x + self.width).clamp(0.0, w as f32).ceil() as u32;
        let y1 = (self.y + self.height).clamp(0.0, h as f32).ceil() as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Blur the selected rectangle of the live buffer in place, at the fixed
/// strength. See [`region_blur_with`].
pub fn region_blur(live: &mut RgbaImage, selection: Selection) -> Option<DirtyRect> {
    region_blur_with(live, selection, REGION_BLUR_SIGMA)
}

/// Blur the selected rectangle of the live buffer in place.
///
/// The blur source is a crop of the *current* buffer expanded by the full
/// kernel radius on every side, so pixels near the rectangle edge average
/// over genuine neighboring image data instead of a hard crop boundary —
/// no seam artifacts. Only pixels inside the clamped rectangle are
/// composited back; the full read set is copied out before any write.
///
/// Because the source is the live buffer (not the load-time baseline),
/// repeated applications to overlapping rectangles compound. That is the
/// deliberate counterpart to the brush tool's baseline-referenced,
/// per-stroke-idempotent behavior.
///
/// Returns the touched rectangle, `None` for a degenerate selection or an
/// empty buffer (a no-op, not an error).
pub fn region_blur_with(
    live: &mut RgbaImage,
    selection: Selection,
    sigma: f32,
) -> Option<DirtyRect> {
    let (w, h) = live.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let rect = selection.clamp_to(w, h)?;

    // Pad by ceil(3σ) so the kernel support never reads outside the crop.
    let pad = (sigma * 3.0).ceil() as u32;
    let cx0 = rect.x.saturating_sub(pad);
    let cy0 = rect.y.saturating_sub(pad);
    let cx1 = (rect.x + rect.width + pad).min(w);
    let cy1 = (rect.y + rect.height + pad).min(h);
    let cw = cx1 - cx0;
    let ch = cy1 - cy0;

    let crop = imageops::crop_imm(live, cx0, cy0, cw, ch).to_image();
    let blurred = gaussian_blur(&crop, sigma);

    // Composite: replace only the pixels inside the clamped rectangle.
    let stride = w as usize * 4;
    let crop_stride = cw as usize * 4;
    let blur_raw = blurred.as_raw();
    let live_raw = live.as_mut();
    let row_bytes = rect.width as usize * 4;
    for y in rect.y..rect.y + rect.height {
        let dst = y as usize * stride + rect.x as usize * 4;
        let src = (y - cy0) as usize * crop_stride + (rect.x - cx0) as usize * 4;
        live_raw[dst..dst + row_bytes].copy_from_slice(&blur_raw[src..src + row_bytes]);
    }

    Some(rect)
}

// ---------------------------------------------------------------------------
//  Separable Gaussian blur (rayon-parallel rows)
// ---------------------------------------------------------------------------

/// 1-D Gaussian kernel truncated at ceil(3σ), normalized to sum 1.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let mut kernel = vec![0.0f32; radius * 2 + 1];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;
    for (i, v) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *v = (-x * x / s2).exp();
        sum += *v;
    }
    let inv = 1.0 / sum;
    for v in &mut kernel {
        *v *= inv;
    }
    kernel
}

/// Two-pass separable Gaussian on f32 channel data, edges clamped.
fn gaussian_blur(src: &RgbaImage, sigma: f32) -> RgbaImage {
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() as isize / 2;

    let mut rows: Vec<f32> = src.as_raw().iter().map(|&v| v as f32).collect();
    let mut cols = vec![0.0f32; rows.len()];

    // Horizontal pass, one row per rayon task.
    cols.par_chunks_mut(w * 4).enumerate().for_each(|(y, out)| {
        let input = &rows[y * w * 4..(y + 1) * w * 4];
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, &kv) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, w as isize - 1) as usize;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += input[sx * 4 + c] * kv;
                }
            }
            out[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    // Vertical pass reads across rows of the horizontal result, writing back
    // into the first buffer.
    rows.par_chunks_mut(w * 4).enumerate().for_each(|(y, out)| {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, &kv) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - radius).clamp(0, h as isize - 1) as usize;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += cols[(sy * w + x) * 4 + c] * kv;
                }
            }
            out[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    let raw: Vec<u8> = rows
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    RgbaImage::from_raw(w as u32, h as u32, raw).unwrap()
}
