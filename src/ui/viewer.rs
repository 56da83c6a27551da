use crate::io::config::Config;
use crate::io::model_loader::SUPPORTED_EXTENSIONS;
use crate::pipeline::passes::{ScenePass, framebuffer_to_rgba};
use crate::pipeline::renderer::Renderer;
use crate::scene::animation::BallMode;
use crate::ui::fields::{FieldOutcome, NumericField, retain_numeric};
use crate::ui::input::{Command, pressed_commands};
use crate::ui::state::{Control, ViewerState};
use egui::{Color32, Context, RichText};
use log::debug;
use native_dialog::FileDialogBuilder;
use std::time::{Duration, Instant};

/// Ticks run per displayed frame at most, so a stalled window does not fast-forward.
const MAX_TICKS_PER_FRAME: u32 = 4;

/// Steps the animation at a fixed rate, independent of the repaint rate.
struct TickClock {
    interval: Duration,
    last: Instant,
    pending: Duration,
}

impl TickClock {
    fn new(rate: f32) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 30.0 };
        Self {
            interval: Duration::from_secs_f32(1.0 / rate),
            last: Instant::now(),
            pending: Duration::ZERO,
        }
    }

    fn due_ticks(&mut self) -> u32 {
        let now = Instant::now();
        self.pending += now - self.last;
        self.last = now;

        let mut ticks = 0;
        while self.pending >= self.interval && ticks < MAX_TICKS_PER_FRAME {
            self.pending -= self.interval;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.pending = Duration::ZERO;
        }
        ticks
    }
}

pub struct ViewerApp {
    state: ViewerState,
    renderer: Renderer,
    pass: ScenePass,
    clock: TickClock,
    frame_texture: Option<egui::TextureHandle>,
    overlay_lines: Vec<String>,
    overlay_color: Color32,

    show_error_dialog: bool,
    error_message: String,
}

impl ViewerApp {
    pub fn new(state: ViewerState, renderer: Renderer, config: &Config) -> Self {
        let [r, g, b] = config.overlay.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
        Self {
            state,
            renderer,
            pass: ScenePass::new(config),
            clock: TickClock::new(config.animation.tick_rate),
            frame_texture: None,
            overlay_lines: config.overlay.lines.clone(),
            overlay_color: Color32::from_rgb(r, g, b),
            show_error_dialog: false,
            error_message: String::new(),
        }
    }

    fn pick_model(&mut self) {
        let result = FileDialogBuilder::default()
            .set_title("Open ball model")
            .add_filter("3D model", SUPPORTED_EXTENSIONS)
            .open_single_file()
            .show();

        match result {
            Ok(Some(path)) => {
                self.state.open_model(&path);
            }
            Ok(None) => debug!("Model selection cancelled"),
            Err(e) => self.state.notify(format!("File dialog error: {}", e)),
        }
    }

    fn handle_keyboard(&mut self, ctx: &Context) {
        for command in pressed_commands(ctx) {
            match self.state.handle(command) {
                Control::Continue => {}
                Control::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                Control::PickModel => self.pick_model(),
            }
        }
    }

    fn show_error_dialog_ui(&mut self, ctx: &Context) {
        if !self.show_error_dialog {
            if let Some(message) = self.state.next_notification() {
                self.error_message = message;
                self.show_error_dialog = true;
            }
        }
        if self.show_error_dialog {
            egui::Window::new("Error")
                .fixed_size([400.0, 150.0])
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(10.0);
                        ui.label(
                            RichText::new(&self.error_message)
                                .color(Color32::from_rgb(230, 50, 50))
                                .size(16.0),
                        );
                        ui.add_space(20.0);
                        if ui.button(RichText::new("OK").size(16.0)).clicked() {
                            self.show_error_dialog = false;
                        }
                    });
                });
        }
    }

    fn draw_side_panel(&mut self, ui: &mut egui::Ui) {
        let locked = self.state.world.is_locked();

        ui.heading("Scene");
        ui.label(format!("Model: {}", self.state.world.scene_source()));
        if ui.button("Open model... (F4)").clicked() {
            self.pick_model();
        }
        ui.separator();

        for field in NumericField::ALL {
            ui.label(field.label());
            let hint = format!("{}", field.default_value());
            let response = ui.add_enabled(
                !locked,
                egui::TextEdit::singleline(self.state.field_text_mut(field)).hint_text(hint),
            );
            if response.changed() {
                retain_numeric(self.state.field_text_mut(field));
                if let FieldOutcome::Reset = self.state.commit_field(field) {
                    debug!("{} reset to {}", field.label(), field.default_value());
                }
            }
        }
        ui.separator();

        let ball = self.state.world.ball();
        let mode = match ball.mode() {
            BallMode::Idle => "idle",
            BallMode::Bouncing => "bouncing",
            BallMode::ScriptedGoal => "shooting",
        };
        ui.label(format!("Ball: {}", mode));
        ui.horizontal(|ui| {
            if ui.button("Shoot (V)").clicked() {
                self.state.handle(Command::StartGoal);
            }
            if ui.add_enabled(locked, egui::Button::new("Cancel (B)")).clicked() {
                self.state.world.cancel_goal();
            }
        });

        let view = self.state.world.view();
        ui.separator();
        ui.small(format!(
            "Tilt {:.0}°  Turn {:.0}°  Distance {:.0}",
            view.rotation_x, view.rotation_y, view.scene_distance
        ));
    }

    fn draw_viewport(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        let width = rect.width().round().max(1.0) as usize;
        let height = rect.height().round().max(1.0) as usize;

        if self.renderer.resize(width, height) {
            debug!("Viewport resized to {}x{}", width, height);
        }
        self.state.world.resize(width, height);

        self.pass.render(&self.state.world, &mut self.renderer);

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [self.renderer.width(), self.renderer.height()],
            &framebuffer_to_rgba(&self.renderer.framebuffer),
        );
        if let Some(texture) = self.frame_texture.as_mut() {
            texture.set(image, egui::TextureOptions::default());
        } else {
            self.frame_texture =
                Some(ctx.load_texture("frame", image, egui::TextureOptions::default()));
        }
        let Some(texture) = &self.frame_texture else {
            return;
        };

        let painter = ui.painter_at(rect);
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(texture.id(), rect, uv, Color32::WHITE);

        let font = egui::FontId::proportional(14.0);
        let mut pos = rect.right_top() + egui::vec2(-10.0, 10.0);
        for line in &self.overlay_lines {
            let text_rect = painter.text(
                pos,
                egui::Align2::RIGHT_TOP,
                line,
                font.clone(),
                self.overlay_color,
            );
            pos.y += text_rect.height() + 2.0;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_error_dialog_ui(ctx);
        self.handle_keyboard(ctx);

        for _ in 0..self.clock.due_ticks() {
            self.state.world.advance_frame();
        }

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| self.draw_side_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_viewport(ctx, ui));

        ctx.request_repaint();
    }
}
