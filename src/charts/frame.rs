//! Frame Builder Module
//! Per-year slice selection and GDP radius scaling, independent of any
//! rendering backend.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::data::{Band, IncomeTable, YearRow};

/// The largest pie's radius after rescaling; chosen so it fits the window.
pub const MAX_RADIUS: f64 = 1.25;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("unsupported missing-data pattern for year {year}: {missing} of 4 shares missing")]
    UnsupportedPattern { year: i32, missing: usize },
    #[error("income table has no rows")]
    EmptyTable,
    #[error("failed to read income table: {0}")]
    Table(#[from] PolarsError),
}

/// What a slice stands for. The blank remainder covers bands with no
/// reported figure for that year; backends render it white and unlabeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    Band(Band),
    Remainder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub kind: SliceKind,
    pub fraction: f64,
}

impl Slice {
    fn band(band: Band, fraction: f64) -> Self {
        Slice {
            kind: SliceKind::Band(band),
            fraction,
        }
    }

    fn remainder(fraction: f64) -> Self {
        Slice {
            kind: SliceKind::Remainder,
            fraction,
        }
    }

    /// Chart label; the remainder slice is unlabeled.
    pub fn label(&self) -> Option<&'static str> {
        match self.kind {
            SliceKind::Band(band) => Some(band.label()),
            SliceKind::Remainder => None,
        }
    }
}

/// Everything one animation frame needs: the year caption, the pie radius
/// (already rescaled) and the slices in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub year: i32,
    pub radius: f64,
    pub slices: Vec<Slice>,
}

/// Per-year pie radius: sqrt(gdp), uniformly rescaled so the maximum is
/// exactly `MAX_RADIUS`.
pub fn radius_series(gdp: &[f64]) -> Vec<f64> {
    let mut radii: Vec<f64> = gdp.iter().map(|g| g.sqrt()).collect();
    let max = radii.iter().fold(0.0f64, |a, &b| a.max(b));
    if max > 0.0 {
        // divide first so the largest radius lands on MAX_RADIUS exactly
        for r in &mut radii {
            *r = *r / max * MAX_RADIUS;
        }
    }
    radii
}

/// Axis half-width shared by every frame, so the window never resizes.
pub fn axis_limit(frames: &[FrameSpec]) -> f64 {
    frames
        .iter()
        .fold(0.0f64, |a, f| a.max(f.radius))
        .ceil()
}

/// Build the slice set for one year.
///
/// The source only ever drops bands bottom-up, so the supported patterns
/// are: all four present, only `99+`/`90-99` present, or only `99+`
/// present. Anything else is reported rather than guessed at.
pub fn build_frame(row: &YearRow, radius: f64) -> Result<FrameSpec, FrameError> {
    let slices = match row.missing_count() {
        0 => {
            // correct residual floating-point rounding
            let total: f64 = row.shares.iter().flatten().sum();
            Band::ALL
                .iter()
                .map(|&band| Slice::band(band, row.share(band).unwrap_or(0.0) / total))
                .collect()
        }
        2 if row.share(Band::Top1).is_some() && row.share(Band::P90To99).is_some() => {
            let top1 = row.share(Band::Top1).unwrap_or(0.0);
            let p90 = row.share(Band::P90To99).unwrap_or(0.0);
            vec![
                Slice::band(Band::Top1, top1),
                Slice::band(Band::P90To99, p90),
                Slice::remainder(1.0 - (top1 + p90)),
            ]
        }
        3 if row.share(Band::Top1).is_some() => {
            let top1 = row.share(Band::Top1).unwrap_or(0.0);
            vec![
                Slice::band(Band::Top1, top1),
                Slice::remainder(1.0 - top1),
            ]
        }
        missing => {
            return Err(FrameError::UnsupportedPattern {
                year: row.year,
                missing,
            })
        }
    };

    Ok(FrameSpec {
        year: row.year,
        radius,
        slices,
    })
}

/// Build one frame per table row, in year order. The first unsupported
/// row aborts the whole animation.
pub fn build_frames(table: &IncomeTable) -> Result<Vec<FrameSpec>, FrameError> {
    let rows = table.rows()?;
    if rows.is_empty() {
        return Err(FrameError::EmptyTable);
    }

    let gdp: Vec<f64> = rows.iter().map(|r| r.gdp).collect();
    let radii = radius_series(&gdp);

    rows.iter()
        .zip(radii)
        .map(|(row, radius)| build_frame(row, radius))
        .collect()
}
