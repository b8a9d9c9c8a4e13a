//! Animator Module
//! Renders the frame sequence to an animated GIF with plotters. Every frame
//! is drawn from scratch; nothing carries over between years.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::charts::frame::{axis_limit, FrameSpec, SliceKind};
use crate::data::Band;

/// Matplotlib's default 6.4" x 4.8" figure at the original 80 dpi.
pub const FRAME_SIZE: (u32, u32) = (512, 384);
/// Delay between frames.
pub const FRAME_DELAY_MS: u32 = 200;

const TITLE: &str = "Income by Percentile";
const CREDIT: &str = "Data: WID";

#[derive(Error, Debug)]
pub enum AnimatorError {
    #[error("no frames to render")]
    Empty,
    #[error("failed to open gif output {file}: {message}")]
    Backend { file: String, message: String },
    #[error("failed to render frame for year {year}: {message}")]
    Draw { year: i32, message: String },
}

fn slice_color(kind: SliceKind) -> RGBColor {
    match kind {
        SliceKind::Band(Band::Top1) => BLUE,
        SliceKind::Band(Band::P90To99) => GREEN,
        SliceKind::Band(Band::P50To90) => MAGENTA,
        SliceKind::Band(Band::Bottom50) => CYAN,
        SliceKind::Remainder => WHITE,
    }
}

fn point_at(center: (i32, i32), radius: f64, theta: f64) -> (i32, i32) {
    // screen y grows downward; angles are counter-clockwise from 3 o'clock
    (
        center.0 + (radius * theta.cos()).round() as i32,
        center.1 - (radius * theta.sin()).round() as i32,
    )
}

/// Perimeter of one pie sector as a fan around the center, roughly one
/// point per 2 degrees of arc.
fn sector_points(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU * 180.0).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let theta = start + sweep * (i as f64 / steps as f64);
        points.push(point_at(center, radius, theta));
    }
    points
}

/// Renders a frame sequence into an animated GIF file.
pub struct Animator {
    frames: Vec<FrameSpec>,
    axis_limit: f64,
}

impl Animator {
    pub fn new(frames: Vec<FrameSpec>) -> Result<Self, AnimatorError> {
        if frames.is_empty() {
            return Err(AnimatorError::Empty);
        }
        let axis_limit = axis_limit(&frames);
        Ok(Self { frames, axis_limit })
    }

    /// Encode the full frame sequence to `path`. Slow for long series.
    pub fn save_gif(&self, path: &Path) -> Result<(), AnimatorError> {
        warn!("encoding the animated gif may take a while");

        let area = BitMapBackend::gif(path, FRAME_SIZE, FRAME_DELAY_MS)
            .map_err(|e| AnimatorError::Backend {
                file: path.display().to_string(),
                message: e.to_string(),
            })?
            .into_drawing_area();

        for frame in &self.frames {
            debug!(year = frame.year, "rendering frame");
            self.draw_frame(&area, frame)
                .and_then(|_| area.present())
                .map_err(|e| AnimatorError::Draw {
                    year: frame.year,
                    message: e.to_string(),
                })?;
        }

        info!(frames = self.frames.len(), file = %path.display(), "animation saved");
        Ok(())
    }

    /// Draw one complete chart: the pie, per-slice percentages and labels,
    /// and the year / title / credit header.
    fn draw_frame<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        frame: &FrameSpec,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        area.fill(&WHITE)?;

        let (w, h) = area.dim_in_pixel();
        let center = ((w / 2) as i32, (h / 2 + 12) as i32);
        // equal aspect: one world unit per axis maps to the same pixel count
        let scale = (w.min(h) as f64 / 2.0 - 30.0) / self.axis_limit;
        let radius = frame.radius * scale;

        let centered = Pos::new(HPos::Center, VPos::Center);
        let pct_style = ("sans-serif", 13).into_font().color(&BLACK).pos(centered);
        let label_style = ("sans-serif", 15).into_font().color(&BLACK).pos(centered);

        // slices start at 12 o'clock and run counter-clockwise
        let mut start = FRAC_PI_2;
        for slice in &frame.slices {
            if slice.fraction <= 0.0 {
                continue;
            }
            let sweep = slice.fraction * TAU;
            let points = sector_points(center, radius, start, sweep);

            area.draw(&Polygon::new(
                points.clone(),
                slice_color(slice.kind).filled(),
            ))?;
            let mut outline = points;
            outline.push(center);
            area.draw(&PathElement::new(outline, BLACK.stroke_width(1)))?;

            let mid = start + sweep / 2.0;
            area.draw(&Text::new(
                format!("{:.1}%", slice.fraction * 100.0),
                point_at(center, radius * 0.6, mid),
                pct_style.clone(),
            ))?;
            if let Some(label) = slice.label() {
                area.draw(&Text::new(
                    label.to_string(),
                    point_at(center, radius * 1.15, mid),
                    label_style.clone(),
                ))?;
            }

            start += sweep;
        }

        let header = ("sans-serif", 17).into_font().color(&BLACK);
        area.draw(&Text::new(frame.year.to_string(), (8, 8), header.clone()))?;
        area.draw(&Text::new(
            TITLE.to_string(),
            ((w / 2) as i32, 8),
            header.clone().pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;
        area.draw(&Text::new(
            CREDIT.to_string(),
            ((w - 8) as i32, 8),
            header.pos(Pos::new(HPos::Right, VPos::Top)),
        ))?;

        Ok(())
    }
}
