// ============================================================================
// TOOL CONTROLLER — pointer dispatch for the brush and region interactions
// ============================================================================

use egui::Pos2;

use crate::canvas::{CanvasSession, DisplayTransform};
use crate::ops::brush::{BrushGeometry, brush_blur};
use crate::ops::region::{Selection, region_blur};

/// Which interaction model owns canvas pointer events. Mutually exclusive;
/// `None` leaves the canvas inert (view-only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    BlurBrush,
    BlurRegion,
    None,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::BlurBrush => "Blur brush",
            Tool::BlurRegion => "Blur region",
            Tool::None => "Inspect",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::BlurBrush, Tool::BlurRegion, Tool::None]
    }
}

/// One frame's worth of pointer state, captured from egui input.
///
/// `pos`, `down` and `released` are global (the pointer is tracked wherever
/// it goes once an interaction starts); `over_canvas` is only consulted at
/// press time to decide whether an interaction may begin at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerFrame {
    pub pos: Option<Pos2>,
    /// Primary button went down this frame.
    pub pressed: bool,
    /// Primary button is held.
    pub down: bool,
    /// Primary button went up this frame.
    pub released: bool,
    /// The pointer is over the canvas and not occluded by the toolbar.
    pub over_canvas: bool,
}

/// Drag-to-select state. `Selecting` holds the anchor recorded at press
/// time plus the latest tracked point; the preview rectangle is always the
/// normalized span of the two.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionPhase {
    Idle,
    Selecting {
        anchor: (f32, f32),
        current: (f32, f32),
    },
}

/// Brush stroke state: a dab lands on press and on every move while
/// painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokePhase {
    Idle,
    Painting,
}

/// Routes canvas pointer events to the state machine selected by the
/// active tool.
///
/// Tracking is global once an interaction starts: the pointer can leave
/// the canvas mid-drag and release anywhere, and the selection still
/// commits (egui reports pointer state per frame regardless of which
/// widget is hovered). Starting a second interaction mid-drag is
/// unreachable — press events are only honored from the Idle states.
pub struct ToolController {
    pub active_tool: Tool,
    pub brush: BrushGeometry,
    pub selection: SelectionPhase,
    pub stroke: StrokePhase,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolController {
    pub fn new() -> Self {
        Self {
            active_tool: Tool::default(),
            brush: BrushGeometry::default(),
            selection: SelectionPhase::Idle,
            stroke: StrokePhase::Idle,
        }
    }

    /// Switch modes, abandoning any half-finished interaction.
    pub fn change_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
        self.reset_interactions();
    }

    pub fn reset_interactions(&mut self) {
        self.selection = SelectionPhase::Idle;
        self.stroke = StrokePhase::Idle;
    }

    /// Live preview rectangle in buffer coordinates, when a drag is active.
    pub fn preview_selection(&self) -> Option<Selection> {
        match self.selection {
            SelectionPhase::Selecting { anchor, current } => {
                Some(Selection::from_corners(anchor, current))
            }
            SelectionPhase::Idle => None,
        }
    }

    /// Main dispatcher, called once per frame with the current pointer
    /// state. Returns whether the buffer was mutated.
    pub fn handle_pointer(
        &mut self,
        frame: PointerFrame,
        transform: DisplayTransform,
        session: &mut CanvasSession,
    ) -> bool {
        if !session.has_image() {
            // Nothing to edit — keep both machines idle, never error.
            self.reset_interactions();
            return false;
        }
        match self.active_tool {
            Tool::BlurBrush => self.handle_brush(frame, transform, session),
            Tool::BlurRegion => self.handle_region(frame, transform, session),
            Tool::None => false,
        }
    }

    fn handle_brush(
        &mut self,
        frame: PointerFrame,
        transform: DisplayTransform,
        session: &mut CanvasSession,
    ) -> bool {
        match self.stroke {
            StrokePhase::Idle => {
                if frame.pressed
                    && frame.over_canvas
                    && let Some(pos) = frame.pos
                {
                    self.stroke = StrokePhase::Painting;
                    return self.dab(pos, transform, session);
                }
                false
            }
            StrokePhase::Painting => {
                if frame.released {
                    self.stroke = StrokePhase::Idle;
                    false
                } else if frame.down
                    && let Some(pos) = frame.pos
                {
                    self.dab(pos, transform, session)
                } else {
                    false
                }
            }
        }
    }

    fn dab(
        &self,
        pos: Pos2,
        transform: DisplayTransform,
        session: &mut CanvasSession,
    ) -> bool {
        let (bx, by) = transform.to_buffer(pos);
        let changed = match session.buffers_mut() {
            Some((live, baseline)) => {
                brush_blur(live, baseline, bx, by, self.brush).is_some()
            }
            None => false,
        };
        if changed {
            session.mark_dirty();
        }
        changed
    }

    fn handle_region(
        &mut self,
        frame: PointerFrame,
        transform: DisplayTransform,
        session: &mut CanvasSession,
    ) -> bool {
        match self.selection {
            SelectionPhase::Idle => {
                if frame.pressed
                    && frame.over_canvas
                    && let Some(pos) = frame.pos
                {
                    let p = transform.to_buffer(pos);
                    self.selection = SelectionPhase::Selecting {
                        anchor: p,
                        current: p,
                    };
                }
                false
            }
            SelectionPhase::Selecting { anchor, current } => {
                let tracked = frame
                    .pos
                    .map(|p| transform.to_buffer(p))
                    .unwrap_or(current);
                if frame.released {
                    // Commit: apply once, clear the preview.
                    self.selection = SelectionPhase::Idle;
                    let rect = Selection::from_corners(anchor, tracked);
                    let applied = match session.live_mut() {
                        Some(live) => region_blur(live, rect).is_some(),
                        None => false,
                    };
                    if applied {
                        session.mark_dirty();
                    }
                    applied
                } else {
                    // Preview only — the buffer stays untouched until release.
                    self.selection = SelectionPhase::Selecting {
                        anchor,
                        current: tracked,
                    };
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Rect, Vec2};
    use image::{Rgba, RgbaImage};

    fn session_with_checkerboard(size: u32) -> CanvasSession {
        let mut session = CanvasSession::new();
        session.load(RgbaImage::from_fn(size, size, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }));
        session
    }

    /// 1:1 transform over a 100×100 canvas at the origin.
    fn identity_transform() -> DisplayTransform {
        DisplayTransform::new(
            Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 100.0)),
            100,
            100,
        )
    }

    fn press(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            pos: Some(Pos2::new(x, y)),
            pressed: true,
            down: true,
            released: false,
            over_canvas: true,
        }
    }

    fn drag(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            pos: Some(Pos2::new(x, y)),
            pressed: false,
            down: true,
            released: false,
            over_canvas: false, // only consulted at press time
        }
    }

    fn release(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            pos: Some(Pos2::new(x, y)),
            pressed: false,
            down: false,
            released: true,
            over_canvas: false,
        }
    }

    #[test]
    fn region_drag_commits_on_release() {
        let mut session = session_with_checkerboard(100);
        let before = session.live().unwrap().clone();
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurRegion);

        assert!(!tools.handle_pointer(press(20.0, 20.0), t, &mut session));
        assert!(!tools.handle_pointer(drag(60.0, 50.0), t, &mut session));
        assert_eq!(
            tools.preview_selection(),
            Some(Selection::from_corners((20.0, 20.0), (60.0, 50.0)))
        );
        // Preview never touches the buffer.
        assert_eq!(session.live().unwrap().as_raw(), before.as_raw());

        assert!(tools.handle_pointer(release(60.0, 50.0), t, &mut session));
        assert_eq!(tools.selection, SelectionPhase::Idle);
        assert!(tools.preview_selection().is_none());
        assert_ne!(session.live().unwrap().as_raw(), before.as_raw());
    }

    #[test]
    fn region_drag_tracks_and_commits_outside_the_canvas() {
        // The pointer leaves the canvas mid-drag and releases outside;
        // the selection still clamps and commits.
        let mut session = session_with_checkerboard(100);
        let before = session.live().unwrap().clone();
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurRegion);

        tools.handle_pointer(press(80.0, 80.0), t, &mut session);
        tools.handle_pointer(drag(140.0, 140.0), t, &mut session);
        assert!(tools.handle_pointer(release(140.0, 140.0), t, &mut session));
        assert_ne!(session.live().unwrap().as_raw(), before.as_raw());
    }

    #[test]
    fn press_outside_canvas_is_ignored() {
        let mut session = session_with_checkerboard(100);
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurRegion);

        let outside = PointerFrame {
            over_canvas: false,
            ..press(50.0, 50.0)
        };
        assert!(!tools.handle_pointer(outside, t, &mut session));
        assert_eq!(tools.selection, SelectionPhase::Idle);
    }

    #[test]
    fn press_while_selecting_cannot_restart_the_drag() {
        let mut session = session_with_checkerboard(100);
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurRegion);

        tools.handle_pointer(press(10.0, 10.0), t, &mut session);
        // A spurious second press is treated as a move; the anchor holds.
        tools.handle_pointer(press(90.0, 90.0), t, &mut session);
        assert_eq!(
            tools.preview_selection(),
            Some(Selection::from_corners((10.0, 10.0), (90.0, 90.0)))
        );
    }

    #[test]
    fn brush_stroke_dabs_on_press_and_each_move() {
        let mut session = session_with_checkerboard(100);
        let before = session.live().unwrap().clone();
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurBrush);

        assert!(tools.handle_pointer(press(30.0, 30.0), t, &mut session));
        assert_eq!(tools.stroke, StrokePhase::Painting);
        assert!(tools.handle_pointer(drag(35.0, 30.0), t, &mut session));
        assert!(!tools.handle_pointer(release(35.0, 30.0), t, &mut session));
        assert_eq!(tools.stroke, StrokePhase::Idle);

        // Moves after release no longer paint.
        assert!(!tools.handle_pointer(drag(70.0, 70.0), t, &mut session));
        assert_eq!(session.live().unwrap().get_pixel(70, 70), before.get_pixel(70, 70));
    }

    #[test]
    fn no_image_means_noop_for_every_tool() {
        let mut session = CanvasSession::new();
        let t = identity_transform();
        for &tool in &[Tool::BlurBrush, Tool::BlurRegion, Tool::None] {
            let mut tools = ToolController::new();
            tools.change_tool(tool);
            assert!(!tools.handle_pointer(press(50.0, 50.0), t, &mut session));
            assert!(!tools.handle_pointer(release(50.0, 50.0), t, &mut session));
            assert_eq!(tools.selection, SelectionPhase::Idle);
            assert_eq!(tools.stroke, StrokePhase::Idle);
        }
        assert!(!session.has_image());
    }

    #[test]
    fn switching_tools_abandons_the_active_drag() {
        let mut session = session_with_checkerboard(100);
        let before = session.live().unwrap().clone();
        let t = identity_transform();
        let mut tools = ToolController::new();
        tools.change_tool(Tool::BlurRegion);

        tools.handle_pointer(press(10.0, 10.0), t, &mut session);
        tools.change_tool(Tool::BlurBrush);
        assert_eq!(tools.selection, SelectionPhase::Idle);

        // The release that would have committed the rectangle does nothing.
        assert!(!tools.handle_pointer(release(90.0, 90.0), t, &mut session));
        assert_eq!(session.live().unwrap().as_raw(), before.as_raw());
    }
}
