//! Income Table Module
//! Per-year percentile income shares plus GDP, backed by Polars.

use polars::prelude::*;

/// The four disjoint percentile bands, in chart display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Top 1% ("99+")
    Top1,
    /// 90th to 99th percentile ("90-99")
    P90To99,
    /// 50th to 90th percentile ("50-90")
    P50To90,
    /// Bottom 50% ("0-50")
    Bottom50,
}

impl Band {
    pub const COUNT: usize = 4;

    /// Display order, fixed regardless of input order.
    pub const ALL: [Band; Band::COUNT] =
        [Band::Top1, Band::P90To99, Band::P50To90, Band::Bottom50];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name / chart label for this band.
    pub fn label(self) -> &'static str {
        match self {
            Band::Top1 => "99+",
            Band::P90To99 => "90-99",
            Band::P50To90 => "50-90",
            Band::Bottom50 => "0-50",
        }
    }
}

/// One year of shares in display order. `None` means the source reported no
/// figure for that band (distinct from a zero share).
pub type ShareRow = [Option<f64>; Band::COUNT];

/// Typed extraction of one table row.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRow {
    pub year: i32,
    pub shares: ShareRow,
    pub gdp: f64,
}

impl YearRow {
    pub fn share(&self, band: Band) -> Option<f64> {
        self.shares[band.index()]
    }

    pub fn missing_count(&self) -> usize {
        self.shares.iter().filter(|s| s.is_none()).count()
    }
}

/// Row-indexed table of percentile income shares and national income,
/// one row per year, years ascending. Built once by the loader and
/// read-only afterwards.
#[derive(Debug)]
pub struct IncomeTable {
    df: DataFrame,
}

impl IncomeTable {
    /// Build the table from pre-sorted per-band series. Missing shares
    /// become Polars nulls.
    pub fn from_series(
        years: Vec<i32>,
        shares: [Vec<Option<f64>>; Band::COUNT],
        gdp: Vec<f64>,
    ) -> Result<Self, PolarsError> {
        let [top1, p90, p50, p0] = shares;
        let df = DataFrame::new(vec![
            Column::new("year".into(), years),
            Column::new(Band::Top1.label().into(), top1),
            Column::new(Band::P90To99.label().into(), p90),
            Column::new(Band::P50To90.label().into(), p50),
            Column::new(Band::Bottom50.label().into(), p0),
            Column::new("gdp".into(), gdp),
        ])?;
        Ok(Self { df })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Extract every row in year order.
    pub fn rows(&self) -> Result<Vec<YearRow>, PolarsError> {
        let years = self.df.column("year")?.i32()?;
        let gdp = self.df.column("gdp")?.f64()?;
        let mut bands = Vec::with_capacity(Band::COUNT);
        for band in Band::ALL {
            bands.push(self.df.column(band.label())?.f64()?);
        }

        let mut rows = Vec::with_capacity(self.df.height());
        for i in 0..self.df.height() {
            let year = years
                .get(i)
                .ok_or_else(|| PolarsError::ComputeError("year column has a null row".into()))?;
            let gdp = gdp
                .get(i)
                .ok_or_else(|| PolarsError::ComputeError("gdp column has a null row".into()))?;
            let mut shares: ShareRow = [None; Band::COUNT];
            for (slot, ca) in shares.iter_mut().zip(&bands) {
                *slot = ca.get(i);
            }
            rows.push(YearRow { year, shares, gdp });
        }
        Ok(rows)
    }

    /// Underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }
}
