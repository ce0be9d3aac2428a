// app.rs - eframe front end: controls, board painting, gestures and the tick
//
// All automaton state lives in `Simulation`; this file only feeds it
// viewport/board snapshots and taps, and paints what it renders.

use std::time::Instant;

use eframe::egui;
use egui::{Color32, Rect, Stroke, TextureHandle, TextureOptions, pos2, vec2};
use life_core::{
    Board, EncodedFrame, PATTERNS, Placement, PointerTap, Rgb, Simulation, Viewport,
};
use tracing::warn;

use crate::encoder::ColorImageEncoder;
use crate::pan_zoom::PanZoom;

/// Placement of the texture currently on the GPU.
struct Shown {
    placement: Placement,
    width: usize,
    height: usize,
}

pub struct LifeApp {
    sim: Simulation,
    pan_zoom: PanZoom,
    encoder: ColorImageEncoder,
    texture: Option<TextureHandle>,
    shown: Option<Shown>,
    last_tick: Instant,
    pressed_at: Option<Instant>,
    centered: bool,
    selected_pattern: usize,
    world_size_input: usize,
    newborn_color: [u8; 3],
    aged_color: [u8; 3],
}

impl LifeApp {
    pub fn new(sim: Simulation) -> Self {
        let palette = sim.config().palette;
        let world_size_input = sim.config().world_size;
        Self {
            sim,
            pan_zoom: PanZoom::default(),
            encoder: ColorImageEncoder,
            texture: None,
            shown: None,
            last_tick: Instant::now(),
            pressed_at: None,
            centered: false,
            selected_pattern: 0,
            world_size_input,
            newborn_color: palette.newborn.0,
            aged_color: palette.aged.0,
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button_text = if self.sim.is_running() { "⏹ Stop" } else { "▶ Start" };
            if ui.button(button_text).clicked() {
                if self.sim.is_running() {
                    self.sim.stop();
                } else {
                    log_failure("start", self.sim.start());
                    self.last_tick = Instant::now();
                }
            }

            let mut paused = self.sim.is_paused();
            if ui.checkbox(&mut paused, "Pause").changed() {
                self.sim.set_paused(paused);
            }

            if ui.button("⏭ Step").clicked() {
                log_failure("step", self.sim.step().map(|_| ()));
            }

            if ui.button("⏹ Clear").clicked() {
                log_failure("clear", self.sim.clear());
            }

            if ui.button("🎲 Random").clicked() {
                log_failure("randomize", self.sim.randomize());
            }

            ui.separator();

            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(PATTERNS[self.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (i, pattern) in PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                    }
                });

            if ui.button("Apply Pattern").clicked() {
                log_failure("apply pattern", self.sim.apply_pattern(self.selected_pattern));
            }

            ui.separator();

            ui.label(format!("Generation: {}", self.sim.generation()));
        });

        ui.horizontal(|ui| {
            ui.label("Speed:");
            let mut fps = self.sim.config().frames_per_second;
            if ui.add(egui::Slider::new(&mut fps, 1..=60).suffix(" fps")).changed() {
                self.sim.set_frames_per_second(fps);
            }

            let mut steps = self.sim.config().steps_per_frame;
            if ui.add(egui::Slider::new(&mut steps, 1..=10).text("steps/frame")).changed() {
                self.sim.set_steps_per_frame(steps);
            }

            ui.separator();

            ui.label("World:");
            ui.add(egui::DragValue::new(&mut self.world_size_input).clamp_range(1..=5000));
            if ui.button("Resize").clicked() {
                log_failure("resize", self.sim.resize(self.world_size_input));
                self.pan_zoom.reset(self.sim.board());
            }

            ui.separator();

            ui.label("Newborn:");
            let newborn_changed = ui.color_edit_button_srgb(&mut self.newborn_color).changed();
            ui.label("Aged:");
            let aged_changed = ui.color_edit_button_srgb(&mut self.aged_color).changed();
            if newborn_changed || aged_changed {
                let mut palette = self.sim.config().palette;
                palette.newborn = Rgb(self.newborn_color);
                palette.aged = Rgb(self.aged_color);
                log_failure("palette", self.sim.set_palette(palette));
            }
        });
    }

    fn board_area(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let area = response.rect;

        log_failure(
            "viewport update",
            self.sim.set_viewport(Viewport::new(area.width() as f64, area.height() as f64)),
        );
        if !self.centered {
            log_failure("center view", self.sim.center_view());
            self.pan_zoom.reset(self.sim.board());
            self.centered = true;
        }

        let (pressed, released, pointer) =
            ui.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released(), i.pointer.interact_pos()));

        if pressed && response.hovered() {
            self.pressed_at = Some(Instant::now());
        }
        if released {
            if let (Some(pressed_at), Some(pos)) = (self.pressed_at.take(), pointer) {
                if area.contains(pos) && !self.pan_zoom.is_panning() {
                    let tap = PointerTap {
                        x: (pos.x - area.min.x) as f64,
                        y: (pos.y - area.min.y) as f64,
                        pressed_at,
                        released_at: Instant::now(),
                    };
                    self.sim.tap(&tap);
                }
            }
        }

        if response.dragged() {
            let delta = response.drag_delta();
            self.pan_zoom.drag(delta.x, delta.y);
        }
        if response.drag_released() {
            if let Some(board) = self.pan_zoom.end_drag() {
                log_failure("pan", self.sim.set_board(board));
            }
        }

        if let Some(pos) = response.hover_pos() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                let board = self.pan_zoom.scroll_zoom(pos.x - area.min.x, pos.y - area.min.y, scroll);
                log_failure("zoom", self.sim.set_board(board));
            }
        }

        self.advance(ui.ctx());

        painter.rect_filled(area, 0.0, Color32::from_gray(20));

        let live = self.pan_zoom.live();
        let side = live.extent(self.sim.config().world_size) as f32;
        let board_rect = Rect::from_min_size(area.min + vec2(live.x as f32, live.y as f32), vec2(side, side));
        painter.rect_filled(board_rect, 0.0, Color32::BLACK);

        if let (Some(texture), Some(shown)) = (&self.texture, &self.shown) {
            let placed = shown.placement.screen_rect(live, shown.width, shown.height);
            let image_rect = Rect::from_min_size(
                area.min + vec2(placed.x as f32, placed.y as f32),
                vec2(placed.width as f32, placed.height as f32),
            );
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id(), image_rect, uv, Color32::WHITE);
        }

        painter.rect_stroke(board_rect, 0.0, Stroke::new(1.0, Color32::from_gray(60)));
    }

    /// Runs a tick when one is due, otherwise re-renders if anything the
    /// picture depends on changed.
    fn advance(&mut self, ctx: &egui::Context) {
        if self.sim.is_running() {
            let elapsed = self.last_tick.elapsed();
            if self.sim.next_tick_delay(elapsed).is_zero() {
                self.last_tick = Instant::now();
                match self.sim.tick(&mut self.encoder) {
                    Ok(report) => self.show(ctx, report.frame),
                    Err(err) => warn!(%err, "Tick failed"),
                }
                return;
            }
        }
        if self.sim.is_dirty() {
            match self.sim.render(&mut self.encoder) {
                Ok(frame) => self.show(ctx, Some(frame)),
                Err(err) if err.is_benign() => self.shown = None,
                Err(err) => warn!(%err, "Render failed"),
            }
        }
    }

    fn show(&mut self, ctx: &egui::Context, frame: Option<EncodedFrame<egui::ColorImage>>) {
        let Some(frame) = frame else {
            self.shown = None;
            return;
        };
        self.shown = Some(Shown {
            placement: frame.placement,
            width: frame.width,
            height: frame.height,
        });
        match &mut self.texture {
            Some(texture) => texture.set(frame.output, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("life-frame", frame.output, TextureOptions::NEAREST));
            }
        }
    }

    fn statistics(&self, ui: &mut egui::Ui) {
        let size = self.sim.config().world_size;
        let cells = (size * size).max(1);
        let live_cells = self.sim.population();
        let Board { scale, .. } = self.pan_zoom.live();

        ui.horizontal(|ui| {
            ui.label(format!("Live cells: {}", live_cells));
            ui.label(format!("Population: {:.1}%", (live_cells as f32 / cells as f32) * 100.0));
            ui.label(format!("Zoom: {:.2} px/cell", scale));
            if let Some(shown) = &self.shown {
                ui.label(format!("Frame: {}x{} (1/{:.0})", shown.width, shown.height, shown.placement.scale()));
            }
        });
    }
}

impl eframe::App for LifeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.heading("Game of Life");
            self.controls(ui);
            ui.label("Drag to pan, scroll to zoom, click cells to toggle them.");
        });

        egui::TopBottomPanel::bottom("statistics").show(ctx, |ui| {
            self.statistics(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.board_area(ui);
        });

        if self.sim.is_running() {
            ctx.request_repaint_after(self.sim.next_tick_delay(self.last_tick.elapsed()));
        }
    }
}

fn log_failure(action: &str, result: life_core::Result<()>) {
    if let Err(err) = result {
        warn!(action, %err, "Simulation action failed");
    }
}
