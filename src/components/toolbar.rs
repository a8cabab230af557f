// ============================================================================
// FLOATING TOOLBAR — tool selector, brush stepper, export actions, dragging
// ============================================================================

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};

use super::tools::{Tool, ToolController};

/// Fixed footprint used for viewport clamping. The rendered panel is
/// allowed to differ by a few points; clamping against a constant keeps
/// the drag math independent of per-frame layout.
pub const TOOLBAR_SIZE: Vec2 = Vec2::new(248.0, 118.0);

/// Height of the grip strip at the top of the panel — the only surface
/// that starts a drag.
const GRIP_HEIGHT: f32 = 18.0;

/// Cross-component actions requested by toolbar buttons. Tool switching
/// and brush sizing mutate the `ToolController` directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolbarAction {
    #[default]
    None,
    OpenImage,
    CopyToClipboard,
    SavePng,
}

/// Drag state for the floating toolbar. Independent of the canvas
/// controllers and never touches the pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging {
        pointer_start: Pos2,
        panel_start: Pos2,
    },
}

pub struct Toolbar {
    pub pos: Pos2,
    pub drag: DragPhase,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbar {
    pub fn new() -> Self {
        Self {
            pos: Pos2::new(16.0, 16.0),
            drag: DragPhase::Idle,
        }
    }

    /// Clamp a candidate position so the whole panel stays inside the
    /// viewport. When the viewport is smaller than the panel, the panel
    /// pins to the viewport origin.
    pub fn clamp_to(viewport: Rect, pos: Pos2) -> Pos2 {
        let max_x = (viewport.max.x - TOOLBAR_SIZE.x).max(viewport.min.x);
        let max_y = (viewport.max.y - TOOLBAR_SIZE.y).max(viewport.min.y);
        Pos2::new(
            pos.x.clamp(viewport.min.x, max_x),
            pos.y.clamp(viewport.min.y, max_y),
        )
    }

    /// Pure drag transition, shared by the UI and the tests.
    ///
    /// `grip_pressed` is true only on the frame the primary button goes
    /// down on the grip strip itself — presses on buttons inside the panel
    /// are consumed by those widgets and never reach the grip.
    pub fn handle_drag(
        &mut self,
        grip_pressed: bool,
        pointer: Option<Pos2>,
        down: bool,
        viewport: Rect,
    ) {
        match self.drag {
            DragPhase::Idle => {
                if grip_pressed
                    && let Some(p) = pointer
                {
                    self.drag = DragPhase::Dragging {
                        pointer_start: p,
                        panel_start: self.pos,
                    };
                }
            }
            DragPhase::Dragging {
                pointer_start,
                panel_start,
            } => {
                if !down {
                    self.drag = DragPhase::Idle;
                } else if let Some(p) = pointer {
                    self.pos = Self::clamp_to(viewport, panel_start + (p - pointer_start));
                }
            }
        }
    }

    /// Draw the panel and run one frame of the drag machine. Returns the
    /// action requested by a button this frame, if any.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        tools: &mut ToolController,
        has_image: bool,
    ) -> ToolbarAction {
        // Re-clamp every frame so a window resize can't strand the panel
        // off-screen.
        self.pos = Self::clamp_to(ctx.screen_rect(), self.pos);

        let mut action = ToolbarAction::None;

        egui::Area::new(egui::Id::new("obscura_toolbar"))
            .order(egui::Order::Foreground)
            .fixed_pos(self.pos)
            .show(ctx, |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.set_width(TOOLBAR_SIZE.x - 24.0);

                    let grip = self.grip_strip(ui);
                    let pointer = ctx.input(|i| i.pointer.latest_pos());
                    let down = ctx.input(|i| i.pointer.primary_down());
                    self.handle_drag(grip.drag_started(), pointer, down, ctx.screen_rect());

                    ui.horizontal(|ui| {
                        for &tool in Tool::all() {
                            let selected = tools.active_tool == tool;
                            if ui.selectable_label(selected, tool.label()).clicked() && !selected
                            {
                                tools.change_tool(tool);
                            }
                        }
                    });

                    ui.horizontal(|ui| {
                        ui.label("Brush:");
                        let stepper_enabled = tools.active_tool == Tool::BlurBrush;
                        ui.add_enabled_ui(stepper_enabled, |ui| {
                            if ui.button("−").clicked() {
                                tools.brush.shrink();
                            }
                            ui.monospace(format!("{:>3}px", tools.brush.diameter()));
                            if ui.button("+").clicked() {
                                tools.brush.grow();
                            }
                        });
                    });

                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button("Open…").clicked() {
                            action = ToolbarAction::OpenImage;
                        }
                        ui.add_enabled_ui(has_image, |ui| {
                            if ui.button("Copy").clicked() {
                                action = ToolbarAction::CopyToClipboard;
                            }
                            if ui.button("Save PNG…").clicked() {
                                action = ToolbarAction::SavePng;
                            }
                        });
                    });
                });
            });

        action
    }

    /// The draggable strip across the top of the panel.
    fn grip_strip(&self, ui: &mut egui::Ui) -> egui::Response {
        let desired = Vec2::new(ui.available_width(), GRIP_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(desired, Sense::drag());

        let painter = ui.painter();
        let dot_color = if response.hovered() {
            Color32::from_gray(190)
        } else {
            Color32::from_gray(120)
        };
        // Three grip dots centered on the strip.
        for i in -1..=1 {
            painter.circle_filled(
                rect.center() + Vec2::new(i as f32 * 8.0, 0.0),
                1.5,
                dot_color,
            );
        }
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(1.0, Color32::from_gray(60)),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(w, h))
    }

    #[test]
    fn drag_moves_by_pointer_delta() {
        let mut bar = Toolbar::new();
        bar.pos = Pos2::new(100.0, 100.0);
        let vp = viewport(1280.0, 720.0);

        bar.handle_drag(true, Some(Pos2::new(110.0, 105.0)), true, vp);
        assert!(matches!(bar.drag, DragPhase::Dragging { .. }));

        bar.handle_drag(false, Some(Pos2::new(160.0, 130.0)), true, vp);
        assert_eq!(bar.pos, Pos2::new(150.0, 125.0));

        bar.handle_drag(false, Some(Pos2::new(160.0, 130.0)), false, vp);
        assert_eq!(bar.drag, DragPhase::Idle);

        // Moves while idle do nothing.
        bar.handle_drag(false, Some(Pos2::new(500.0, 500.0)), true, vp);
        assert_eq!(bar.pos, Pos2::new(150.0, 125.0));
    }

    #[test]
    fn drag_far_outside_clamps_to_viewport() {
        let mut bar = Toolbar::new();
        bar.pos = Pos2::new(50.0, 50.0);
        let vp = viewport(800.0, 600.0);

        bar.handle_drag(true, Some(Pos2::new(60.0, 60.0)), true, vp);
        bar.handle_drag(false, Some(Pos2::new(5000.0, 5000.0)), true, vp);
        assert_eq!(
            bar.pos,
            Pos2::new(800.0 - TOOLBAR_SIZE.x, 600.0 - TOOLBAR_SIZE.y)
        );

        bar.handle_drag(false, Some(Pos2::new(-5000.0, -5000.0)), true, vp);
        assert_eq!(bar.pos, Pos2::ZERO);
    }

    #[test]
    fn press_off_the_grip_never_starts_a_drag() {
        let mut bar = Toolbar::new();
        let start = bar.pos;
        let vp = viewport(800.0, 600.0);

        // A button press inside the panel reaches the machine with
        // grip_pressed = false, so the panel stays put.
        bar.handle_drag(false, Some(Pos2::new(30.0, 40.0)), true, vp);
        bar.handle_drag(false, Some(Pos2::new(300.0, 400.0)), true, vp);
        assert_eq!(bar.drag, DragPhase::Idle);
        assert_eq!(bar.pos, start);
    }

    #[test]
    fn tiny_viewport_pins_to_origin() {
        let pos = Toolbar::clamp_to(viewport(100.0, 60.0), Pos2::new(900.0, 900.0));
        assert_eq!(pos, Pos2::ZERO);
    }
}
