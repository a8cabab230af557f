// ============================================================================
// BRUSH BLUR — localized circular box blur sampled from the baseline
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use super::DirtyRect;

/// Half-width of the box-average sample window. Fixed: the brush size
/// changes the footprint of a dab, never the blur strength.
pub const SAMPLE_WINDOW_RADIUS: i32 = 8;

/// Brush diameter bounds and toolbar stepper increment, in buffer pixels.
pub const MIN_BRUSH_DIAMETER: u32 = 5;
pub const MAX_BRUSH_DIAMETER: u32 = 100;
pub const BRUSH_DIAMETER_STEP: u32 = 5;

/// User-adjustable brush footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushGeometry {
    diameter: u32,
}

impl Default for BrushGeometry {
    fn default() -> Self {
        Self { diameter: 20 }
    }
}

impl BrushGeometry {
    pub fn new(diameter: u32) -> Self {
        Self {
            diameter: diameter.clamp(MIN_BRUSH_DIAMETER, MAX_BRUSH_DIAMETER),
        }
    }

    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    pub fn radius(&self) -> f32 {
        self.diameter as f32 / 2.0
    }

    pub fn grow(&mut self) {
        *self = Self::new(self.diameter + BRUSH_DIAMETER_STEP);
    }

    pub fn shrink(&mut self) {
        *self = Self::new(self.diameter.saturating_sub(BRUSH_DIAMETER_STEP));
    }
}

/// Apply one brush dab centered at buffer-space `(cx, cy)`.
///
/// Every pixel inside the circular footprint is replaced by the average of
/// a `(2·SAMPLE_WINDOW_RADIUS + 1)²` window of **baseline** samples around
/// it, clamped at the buffer edges (edge pixels average over fewer samples,
/// never wrapping). Pixels outside the disc are left untouched, giving the
/// soft round footprint.
///
/// Sampling the immutable baseline instead of the live buffer makes a
/// stroke converge to one result no matter how often it passes over the
/// same pixels; overlapping strokes re-blend toward the original image
/// rather than deepening the blur. That trade-off is intentional and must
/// stay — the region tool (`ops::region`) is the live-referenced,
/// compounding counterpart.
///
/// Returns the touched rectangle, or `None` when the footprint misses the
/// buffer entirely (a no-op, not an error).
pub fn brush_blur(
    live: &mut RgbaImage,
    baseline: &RgbaImage,
    cx: f32,
    cy: f32,
    geometry: BrushGeometry,
) -> Option<DirtyRect> {
    debug_assert_eq!(live.dimensions(), baseline.dimensions());

    let bw = live.width() as i32;
    let bh = live.height() as i32;
    let radius = geometry.radius();

    let x0 = ((cx - radius).floor() as i32).max(0);
    let y0 = ((cy - radius).floor() as i32).max(0);
    let x1 = ((cx + radius).ceil() as i32).min(bw);
    let y1 = ((cy + radius).ceil() as i32).min(bh);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let rw = (x1 - x0) as usize;
    let rh = (y1 - y0) as usize;

    let stride = bw as usize * 4;
    let src = baseline.as_raw();

    // Seed the patch with current live pixels so everything outside the
    // circular mask is written back unchanged.
    let mut patch = vec![0u8; rw * rh * 4];
    {
        let live_raw = live.as_raw();
        for row in 0..rh {
            let off = (y0 as usize + row) * stride + x0 as usize * 4;
            patch[row * rw * 4..(row + 1) * rw * 4]
                .copy_from_slice(&live_raw[off..off + rw * 4]);
        }
    }

    let r2 = radius * radius;
    patch.par_chunks_mut(rw * 4).enumerate().for_each(|(row, out)| {
        let py = y0 + row as i32;
        for col in 0..rw {
            let px = x0 + col as i32;
            let dx = px as f32 - cx;
            let dy = py as f32 - cy;
            if dx * dx + dy * dy > r2 {
                continue;
            }

            // Box average over the clamped sample window.
            let sx0 = (px - SAMPLE_WINDOW_RADIUS).max(0);
            let sx1 = (px + SAMPLE_WINDOW_RADIUS).min(bw - 1);
            let sy0 = (py - SAMPLE_WINDOW_RADIUS).max(0);
            let sy1 = (py + SAMPLE_WINDOW_RADIUS).min(bh - 1);

            let mut acc = [0u32; 4];
            let mut count = 0u32;
            for sy in sy0..=sy1 {
                let row_off = sy as usize * stride;
                for sx in sx0..=sx1 {
                    let i = row_off + sx as usize * 4;
                    acc[0] += src[i] as u32;
                    acc[1] += src[i + 1] as u32;
                    acc[2] += src[i + 2] as u32;
                    acc[3] += src[i + 3] as u32;
                    count += 1;
                }
            }

            let o = col * 4;
            for c in 0..4 {
                out[o + c] = (acc[c] / count) as u8;
            }
        }
    });

    // Write the finished patch back in one pass.
    let live_raw = live.as_mut();
    for row in 0..rh {
        let off = (y0 as usize + row) * stride + x0 as usize * 4;
        live_raw[off..off + rw * 4]
            .copy_from_slice(&patch[row * rw * 4..(row + 1) * rw * 4]);
    }

    Some(DirtyRect {
        x: x0 as u32,
        y: y0 as u32,
        width: rw as u32,
        height: rh as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Deterministic busy test image.
    fn noise(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([
                ((x * 31 + y * 17) % 256) as u8,
                ((x * 7 + y * 51) % 256) as u8,
                ((x * 13 + y * 3) % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn repeated_dab_at_same_point_is_idempotent() {
        let baseline = noise(64, 64);
        let geometry = BrushGeometry::new(30);

        let mut once = baseline.clone();
        brush_blur(&mut once, &baseline, 32.0, 32.0, geometry).unwrap();

        let mut twice = baseline.clone();
        brush_blur(&mut twice, &baseline, 32.0, 32.0, geometry).unwrap();
        brush_blur(&mut twice, &baseline, 32.0, 32.0, geometry).unwrap();

        assert_eq!(once.as_raw(), twice.as_raw());
    }

    #[test]
    fn uniform_image_is_a_fixed_point() {
        let baseline = RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255]));
        let mut live = baseline.clone();
        let rect = brush_blur(&mut live, &baseline, 50.0, 50.0, BrushGeometry::new(20)).unwrap();

        // Uniform red blurs to itself everywhere: inside the disc the box
        // average is still red, outside the disc nothing was written.
        assert_eq!(live.as_raw(), baseline.as_raw());
        assert_eq!(rect, DirtyRect { x: 40, y: 40, width: 20, height: 20 });
    }

    #[test]
    fn pixels_outside_the_disc_are_untouched() {
        let baseline = noise(64, 64);
        let mut live = baseline.clone();
        brush_blur(&mut live, &baseline, 32.0, 32.0, BrushGeometry::new(20)).unwrap();

        // Bounding-box corner is outside the circular mask.
        assert_eq!(live.get_pixel(23, 23), baseline.get_pixel(23, 23));
        // Far away from the footprint entirely.
        assert_eq!(live.get_pixel(5, 60), baseline.get_pixel(5, 60));
        // Dead center is inside the mask and does change on a busy image.
        assert_ne!(live.get_pixel(32, 32), baseline.get_pixel(32, 32));
    }

    #[test]
    fn footprint_off_buffer_is_a_noop() {
        let baseline = noise(32, 32);
        let mut live = baseline.clone();
        assert!(brush_blur(&mut live, &baseline, -100.0, -100.0, BrushGeometry::new(20)).is_none());
        assert_eq!(live.as_raw(), baseline.as_raw());
    }

    #[test]
    fn edge_dab_clamps_instead_of_wrapping() {
        let baseline = noise(40, 40);
        let mut live = baseline.clone();
        let rect = brush_blur(&mut live, &baseline, 0.0, 0.0, BrushGeometry::new(20)).unwrap();
        assert_eq!(rect, DirtyRect { x: 0, y: 0, width: 10, height: 10 });
        // The opposite edge never changes — no wraparound sampling or writes.
        assert_eq!(live.get_pixel(39, 39), baseline.get_pixel(39, 39));
    }

    #[test]
    fn geometry_clamps_to_bounds_in_steps() {
        let mut g = BrushGeometry::new(200);
        assert_eq!(g.diameter(), MAX_BRUSH_DIAMETER);
        g.grow();
        assert_eq!(g.diameter(), MAX_BRUSH_DIAMETER);

        let mut g = BrushGeometry::new(0);
        assert_eq!(g.diameter(), MIN_BRUSH_DIAMETER);
        g.shrink();
        assert_eq!(g.diameter(), MIN_BRUSH_DIAMETER);

        let mut g = BrushGeometry::new(20);
        g.grow();
        assert_eq!(g.diameter(), 25);
        g.shrink();
        g.shrink();
        assert_eq!(g.diameter(), 15);
    }
}
