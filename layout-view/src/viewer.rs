//! Interactive point-layout viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Solver`] from
//! `layout-core` and implements [`eframe::App`] to step the
//! optimization, render point positions, and expose the solver
//! configuration through an egui UI.

use eframe::App;
use glam::Vec2;
use layout_core::{
    config::SolveConfig,
    point::PointSet,
    solve::{RunState, Solver, StepEvent},
};
use rand::rng;

/// Number of loss samples kept for the history plot.
const LOSS_HISTORY_LEN: usize = 2048;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The optimization core: a [`Solver`] over a synthetic [`PointSet`].
/// - Pending configuration edits, applied on the next reset.
/// - UI state (pan/zoom camera, timing, loss history).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, take a batch
///    of solver steps via [`Viewer::step_batch`].
/// 3. Render the points, the selected-point highlight, and the loss
///    history.
pub struct Viewer {
    solver: Solver,

    /// Configuration staged in the UI; takes effect on reset.
    cfg: SolveConfig,
    /// Number of points in the regenerated synthetic cloud.
    num_points: usize,
    /// Half extent of the ground-truth cloud and the initial scatter.
    half_range: f32,

    rng: rand::rngs::ThreadRng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    /// Event from the most recent solver step (for highlighting).
    last_event: Option<StepEvent>,
    /// Recent total-loss values, oldest first.
    loss_history: Vec<f32>,

    /// Solver steps taken per paced tick while running.
    steps_per_tick: usize,
    /// Target time between paced ticks (seconds).
    step_interval: f64,
    last_step_time: f64,
}

impl Viewer {
    /// Creates a new viewer over a freshly generated synthetic cloud.
    ///
    /// The default setup mirrors the benchmark generator: a 2-D cloud
    /// of ground-truth points in a ±500 square, full pairwise target
    /// distances, scattered initial positions, and
    /// [`SolveConfig::default`] for the solver parameters.
    pub fn new() -> Self {
        let cfg = SolveConfig::default();
        let num_points = 12;
        let half_range = 500.0;

        let mut rng = rng();
        let solver = Self::make_solver(num_points, half_range, cfg, &mut rng);

        Self {
            solver,
            cfg,
            num_points,
            half_range,
            rng,
            running: false,
            zoom: 0.5,
            pan: egui::vec2(0.0, 0.0),
            last_event: None,
            loss_history: Vec::with_capacity(LOSS_HISTORY_LEN),
            steps_per_tick: 25,
            step_interval: 0.02,
            last_step_time: 0.0,
        }
    }

    /// Builds a solver over a random synthetic cloud.
    ///
    /// Generated clouds always satisfy the structural invariants, so
    /// solver construction cannot fail here.
    fn make_solver(
        num_points: usize,
        half_range: f32,
        cfg: SolveConfig,
        rng: &mut rand::rngs::ThreadRng,
    ) -> Solver {
        let points = PointSet::random_cloud(num_points.max(1), 2, half_range, rng);
        Solver::new(points, cfg).expect("freshly generated cloud is structurally valid")
    }

    /// Restarts the optimization on a new random cloud.
    ///
    /// This applies the staged configuration, clears the loss history
    /// and selection highlight, and stops auto-running. Camera
    /// settings are kept.
    fn reset(&mut self) {
        self.solver = Self::make_solver(self.num_points, self.half_range, self.cfg, &mut self.rng);
        self.last_event = None;
        self.loss_history.clear();
        self.running = false;
    }

    /// Advances the solver by one step, recording the event.
    fn step_once(&mut self) {
        if let Some(event) = self.solver.step_once() {
            if self.loss_history.len() == LOSS_HISTORY_LEN {
                self.loss_history.remove(0);
            }
            self.loss_history.push(event.total_loss);
            self.last_event = Some(event);
        } else {
            self.running = false;
        }
    }

    /// Takes up to `steps_per_tick` steps, stopping early on a
    /// terminal state.
    fn step_batch(&mut self) {
        for _ in 0..self.steps_per_tick {
            if self.solver.state() != RunState::Running {
                self.running = false;
                break;
            }
            self.step_once();
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and
    /// then centered inside the given `rect`. The y-axis is flipped so
    /// that positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to
    /// floating point rounding), using the same `zoom`, `pan`, and
    /// `rect` center.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// First two coordinates of a point's position as a world vector.
    fn point_world(point: &layout_core::point::Point) -> Vec2 {
        Vec2::new(point.position[0], point.position[1])
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let can_run = self.solver.state() == RunState::Running;

                if ui
                    .add_enabled(
                        can_run,
                        egui::Button::new(if self.running { "⏸ Pause" } else { "▶ Run" }),
                    )
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.steps_per_tick)
                        .prefix("steps/tick = ")
                        .range(1..=1000)
                        .speed(1.0),
                );

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.005),
                );

                if ui.add_enabled(can_run, egui::Button::new("Step")).clicked() {
                    self.step_once();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.05..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (run state, steps, losses,
    /// temperature).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("state = {:?}", self.solver.state()));
                ui.label(format!("steps = {}", self.solver.total_steps()));
                ui.separator();
                ui.label(format!("T = {:.2}", self.solver.temperature()));
                if let Some(event) = &self.last_event {
                    ui.label(format!("total loss = {:.3}", event.total_loss));
                    ui.label(format!(
                        "point {} loss = {:.3}",
                        event.points[event.selected].label, event.point_loss
                    ));
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for solver parameters.
    ///
    /// Edits are staged into `self.cfg` and take effect on reset, so a
    /// running solver is never reconfigured mid-flight.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Solver config");
                ui.label("(applied on Reset)");

                ui.separator();
                ui.label("Descent");
                Self::labeled_drag_f32(
                    ui,
                    "learning_rate:",
                    &mut self.cfg.learning_rate,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(ui, "momentum:", &mut self.cfg.momentum, 0.0..=1.0, 0.005);

                ui.separator();
                ui.label("Stopping");
                ui.horizontal(|ui| {
                    ui.label("max_steps:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.max_steps)
                            .range(0..=1_000_000)
                            .speed(100.0),
                    );
                });
                Self::labeled_drag_f32(
                    ui,
                    "minimum_loss:",
                    &mut self.cfg.minimum_loss,
                    0.0..=100.0,
                    0.01,
                );

                ui.separator();
                ui.label("Annealing");
                Self::labeled_drag_f32(
                    ui,
                    "initial_temperature:",
                    &mut self.cfg.initial_temperature,
                    1.0..=10_000.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "change_temperature:",
                    &mut self.cfg.change_temperature,
                    -10.0..=10.0,
                    0.001,
                );

                ui.separator();
                ui.label("Aggregate loss");
                ui.checkbox(&mut self.cfg.weighted, "weighted by known targets");

                ui.separator();
                ui.label("Synthetic cloud");
                Self::labeled_drag_usize(ui, "num_points:", &mut self.num_points, 1..=200, 1.0);
                Self::labeled_drag_f32(
                    ui,
                    "half_range:",
                    &mut self.half_range,
                    1.0..=5000.0,
                    10.0,
                );

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = SolveConfig::default();
                }
            });
    }

    /// Draws the loss history as a polyline in the given overlay rect.
    fn draw_loss_history(&self, painter: &egui::Painter, rect: egui::Rect) {
        if self.loss_history.len() < 2 {
            return;
        }

        painter.rect_filled(
            rect,
            egui::CornerRadius::same(2),
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 96),
        );

        let max_loss = self
            .loss_history
            .iter()
            .copied()
            .fold(f32::MIN, f32::max)
            .max(f32::MIN_POSITIVE);

        let n = self.loss_history.len();
        let points: Vec<egui::Pos2> = self
            .loss_history
            .iter()
            .enumerate()
            .map(|(i, &loss)| {
                let x = rect.left() + rect.width() * (i as f32) / ((n - 1) as f32);
                let y = rect.bottom() - rect.height() * (loss / max_loss).clamp(0.0, 1.0);
                egui::pos2(x, y)
            })
            .collect();

        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(1.0, egui::Color32::YELLOW),
        ));
    }

    /// Builds the central panel where points are drawn and the camera
    /// is controlled.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                let delta = response.drag_delta();
                self.pan += delta;
            }

            // Zoom around the mouse cursor.
            if ui.ctx().input(|i| i.raw_scroll_delta.y != 0.0) {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());

                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    let new_zoom = (self.zoom * factor).clamp(0.05, 10.0);
                    self.zoom = new_zoom;

                    let screen_after = self.world_to_screen(world_before, rect);

                    let delta = pointer_screen - screen_after;
                    self.pan += delta;
                }
            }

            let selected = self.last_event.as_ref().map(|event| event.selected);

            // Draw points (highlighting the last-updated one in red),
            // with their labels alongside.
            for (i, point) in self.solver.points().points.iter().enumerate() {
                let p = self.world_to_screen(Self::point_world(point), rect);

                let color = if selected == Some(i) {
                    egui::Color32::RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };

                painter.circle_filled(p, 4.0, color);
                painter.text(
                    p + egui::vec2(6.0, -6.0),
                    egui::Align2::LEFT_BOTTOM,
                    &point.label,
                    egui::FontId::proportional(12.0),
                    egui::Color32::GRAY,
                );
            }

            // Loss history overlay in the lower-left corner.
            let history_rect = egui::Rect::from_min_size(
                rect.left_bottom() + egui::vec2(10.0, -90.0),
                egui::vec2(220.0, 80.0),
            );
            self.draw_loss_history(&painter, history_rect);

            // Auto-run the solver if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    self.step_batch();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel.
    /// - Draws the central point view and handles interactions.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
