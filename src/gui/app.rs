//! Interactive Animation Window
//! Plays the frame sequence in an egui window, looping with a pause after
//! the last year. Blocks until the window is closed.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::{Duration, Instant};

use egui::{Align2, Color32, FontId, Pos2, Shape, Stroke};

use crate::charts::{axis_limit, FrameSpec, SliceKind};
use crate::data::Band;

const WINDOW_TITLE: &str = "Income by Percentile";

/// Time each year stays on screen.
const FRAME_INTERVAL: Duration = Duration::from_millis(200);
/// Pause on the last year before the animation loops.
const REPEAT_DELAY: Duration = Duration::from_millis(2000);

fn slice_color(kind: SliceKind) -> Color32 {
    match kind {
        SliceKind::Band(Band::Top1) => Color32::from_rgb(0, 0, 255),
        SliceKind::Band(Band::P90To99) => Color32::from_rgb(0, 255, 0),
        SliceKind::Band(Band::P50To90) => Color32::from_rgb(255, 0, 255),
        SliceKind::Band(Band::Bottom50) => Color32::from_rgb(0, 255, 255),
        SliceKind::Remainder => Color32::WHITE,
    }
}

/// Animated pie chart window.
pub struct PieApp {
    frames: Vec<FrameSpec>,
    axis_limit: f64,
    current: usize,
    last_advance: Instant,
}

impl PieApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, frames: Vec<FrameSpec>) -> Self {
        let axis_limit = axis_limit(&frames);
        Self {
            frames,
            axis_limit,
            current: 0,
            last_advance: Instant::now(),
        }
    }

    fn advance(&mut self) {
        let wait = if self.current + 1 == self.frames.len() {
            REPEAT_DELAY
        } else {
            FRAME_INTERVAL
        };
        if self.last_advance.elapsed() >= wait {
            self.current = (self.current + 1) % self.frames.len();
            self.last_advance = Instant::now();
        }
    }

    /// Draw the current frame: pie slices as triangle fans (slices can
    /// sweep past 180 degrees, so one convex polygon per arc step),
    /// percentage and band labels, and the header line.
    fn draw_frame(&self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let painter = ui.painter();
        let frame = &self.frames[self.current];

        let center = rect.center() + egui::vec2(0.0, 12.0);
        let scale = (rect.width().min(rect.height()) as f64 / 2.0 - 40.0) / self.axis_limit;
        let radius = frame.radius * scale;

        let point_at = |r: f64, theta: f64| -> Pos2 {
            center + egui::vec2((r * theta.cos()) as f32, -(r * theta.sin()) as f32)
        };

        let mut start = FRAC_PI_2;
        for slice in &frame.slices {
            if slice.fraction <= 0.0 {
                continue;
            }
            let sweep = slice.fraction * TAU;
            let steps = ((sweep / TAU * 180.0).ceil() as usize).max(2);
            let arc: Vec<Pos2> = (0..=steps)
                .map(|i| point_at(radius, start + sweep * (i as f64 / steps as f64)))
                .collect();

            let fill = slice_color(slice.kind);
            for pair in arc.windows(2) {
                painter.add(Shape::convex_polygon(
                    vec![center, pair[0], pair[1]],
                    fill,
                    Stroke::NONE,
                ));
            }

            let mut outline = Vec::with_capacity(arc.len() + 1);
            outline.push(center);
            outline.extend(arc);
            painter.add(Shape::closed_line(outline, Stroke::new(1.0, Color32::BLACK)));

            let mid = start + sweep / 2.0;
            painter.text(
                point_at(radius * 0.6, mid),
                Align2::CENTER_CENTER,
                format!("{:.1}%", slice.fraction * 100.0),
                FontId::proportional(13.0),
                Color32::BLACK,
            );
            if let Some(label) = slice.label() {
                painter.text(
                    point_at(radius * 1.15, mid),
                    Align2::CENTER_CENTER,
                    label,
                    FontId::proportional(15.0),
                    Color32::BLACK,
                );
            }

            start += sweep;
        }

        let header = FontId::proportional(17.0);
        painter.text(
            rect.left_top() + egui::vec2(8.0, 8.0),
            Align2::LEFT_TOP,
            frame.year.to_string(),
            header.clone(),
            Color32::BLACK,
        );
        painter.text(
            rect.center_top() + egui::vec2(0.0, 8.0),
            Align2::CENTER_TOP,
            WINDOW_TITLE,
            header.clone(),
            Color32::BLACK,
        );
        painter.text(
            rect.right_top() + egui::vec2(-8.0, 8.0),
            Align2::RIGHT_TOP,
            "Data: WID",
            header,
            Color32::BLACK,
        );
    }
}

impl eframe::App for PieApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.advance();

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::WHITE))
            .show(ctx, |ui| {
                self.draw_frame(ui);
            });

        // keep the animation ticking while idle
        ctx.request_repaint_after(Duration::from_millis(33));
    }
}

/// Open the window and block until the user closes it.
pub fn run(frames: Vec<FrameSpec>) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(PieApp::new(cc, frames)))),
    )
}
