use eframe::egui;
use egui::{Color32, Pos2, Rect, RichText, Stroke};
use image::RgbaImage;
use std::time::{Duration, Instant};

use crate::canvas::{CanvasSession, DisplayTransform, fit_rect};
use crate::components::toolbar::{Toolbar, ToolbarAction};
use crate::components::tools::{PointerFrame, Tool, ToolController};
use crate::ops::clipboard;
use crate::{io, log_err, log_info};

/// Transient bottom-center notification.
struct Toast {
    text: String,
    expires: Instant,
}

const TOAST_LIFETIME: Duration = Duration::from_secs(3);

pub struct ObscuraApp {
    session: CanvasSession,
    tools: ToolController,
    toolbar: Toolbar,
    toasts: Vec<Toast>,
}

impl ObscuraApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, initial: Option<RgbaImage>) -> Self {
        let mut app = Self {
            session: CanvasSession::new(),
            tools: ToolController::new(),
            toolbar: Toolbar::new(),
            toasts: Vec::new(),
        };
        if let Some(img) = initial {
            app.install_image(img, "command line");
        }
        app
    }

    fn install_image(&mut self, img: RgbaImage, source: &str) {
        log_info!("Loaded {}x{} image from {}", img.width(), img.height(), source);
        self.session.load(img);
        self.tools.reset_interactions();
    }

    fn toast(&mut self, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            expires: Instant::now() + TOAST_LIFETIME,
        });
    }

    // -- Ingest --------------------------------------------------------

    /// Ctrl+V paste and files dropped onto the window. A rejected ingest
    /// leaves the session untouched and only raises a toast.
    fn handle_ingest_events(&mut self, ctx: &egui::Context) {
        let paste_pressed =
            ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::V));
        if paste_pressed {
            match clipboard::image_from_system_clipboard() {
                Some(img) => self.install_image(img, "clipboard"),
                None => self.toast("Clipboard has no image"),
            }
        }

        let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let Some(path) = file.path else { continue };
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            // Route through the byte-level ingest so the mime check applies
            // to drops exactly as it does to pastes.
            let result = io::mime_for_extension(&ext)
                .ok_or_else(|| crate::error::ObscuraError::UnsupportedFormat(ext.clone()))
                .and_then(|mime| {
                    let bytes = std::fs::read(&path)?;
                    io::ingest_bytes(&bytes, mime)
                });
            match result {
                Ok(img) => self.install_image(img, &path.display().to_string()),
                Err(e) => {
                    log_err!("Rejected drop {}: {}", path.display(), e);
                    self.toast(format!("Could not open image: {}", e));
                }
            }
        }
    }

    fn open_image(&mut self) {
        match io::open_image_dialog() {
            None => {} // dialog cancelled
            Some(Ok((img, path))) => self.install_image(img, &path.display().to_string()),
            Some(Err(e)) => {
                log_err!("Open failed: {}", e);
                self.toast(format!("Could not open image: {}", e));
            }
        }
    }

    // -- Export --------------------------------------------------------

    fn copy_result(&mut self) {
        let outcome = match self.session.live() {
            Some(img) => clipboard::copy_to_system_clipboard(img),
            None => return, // button is disabled without an image
        };
        match outcome {
            Ok(()) => self.toast("Copied to clipboard"),
            Err(e) => {
                log_err!("Clipboard write failed: {}", e);
                self.toast("Couldn't copy to clipboard");
            }
        }
    }

    fn save_result(&mut self) {
        let outcome = match self.session.live() {
            Some(img) => io::save_png_dialog(img),
            None => return,
        };
        match outcome {
            None => {} // dialog cancelled
            Some(Ok(path)) => {
                log_info!("Saved PNG to {}", path.display());
                self.toast(format!("Saved {}", path.display()));
            }
            Some(Err(e)) => {
                log_err!("Save failed: {}", e);
                self.toast("Couldn't save PNG");
            }
        }
    }

    // -- Canvas --------------------------------------------------------

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let avail = ui.available_rect_before_wrap();

        let Some((bw, bh)) = self.session.dimensions() else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Paste an image (Ctrl+V), drop a file, or use Open.")
                        .size(16.0)
                        .color(Color32::from_gray(140)),
                );
            });
            return;
        };

        let image_rect = fit_rect(avail, bw, bh);
        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

        // Rebuilt every frame from the laid-out rect — never cached.
        let transform = DisplayTransform::new(image_rect, bw, bh);

        let mut frame = ui.input(|i| PointerFrame {
            pos: i.pointer.latest_pos(),
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
            over_canvas: false,
        });
        // hovered() respects layering, so a press on the floating toolbar
        // never starts a canvas interaction.
        frame.over_canvas = response.hovered();

        if self.tools.handle_pointer(frame, transform, &mut self.session) {
            ui.ctx().request_repaint();
        }

        self.session.update_texture(ui.ctx());

        let painter = ui.painter_at(avail);
        if let Some(tex) = self.session.texture() {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            painter.rect_stroke(
                image_rect.expand(1.0),
                0.0,
                Stroke::new(1.0, Color32::from_gray(90)),
            );
            painter.image(tex.id(), image_rect, uv, Color32::WHITE);
        }

        // Brush cursor ring, sized to the buffer-space footprint.
        if self.tools.active_tool == Tool::BlurBrush
            && response.hovered()
            && let Some(pos) = frame.pos
            && let Some((scale_x, _)) = transform.scale()
        {
            painter.circle_stroke(
                pos,
                self.tools.brush.radius() / scale_x,
                Stroke::new(1.5, Color32::from_rgba_unmultiplied(255, 60, 60, 200)),
            );
        }

        // Live selection preview.
        if let Some(sel) = self.tools.preview_selection() {
            let preview = Rect::from_min_max(
                transform.to_display(sel.x, sel.y),
                transform.to_display(sel.x + sel.width, sel.y + sel.height),
            )
            .intersect(image_rect);
            painter.rect_filled(
                preview,
                0.0,
                Color32::from_rgba_unmultiplied(110, 160, 255, 36),
            );
            painter.rect_stroke(preview, 0.0, Stroke::new(1.0, Color32::LIGHT_BLUE));
            ui.ctx().request_repaint();
        }
    }

    // -- Toasts --------------------------------------------------------

    fn draw_toasts(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("obscura_toasts"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(&toast.text);
                    });
                }
            });
        // Let them expire without waiting for the next input event.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl eframe::App for ObscuraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_ingest_events(ctx);

        let action = self
            .toolbar
            .show(ctx, &mut self.tools, self.session.has_image());
        match action {
            ToolbarAction::None => {}
            ToolbarAction::OpenImage => self.open_image(),
            ToolbarAction::CopyToClipboard => self.copy_result(),
            ToolbarAction::SavePng => self.save_result(),
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas_ui(ui);
        });

        self.draw_toasts(ctx);
    }
}
