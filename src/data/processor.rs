//! Data Processor Module
//! Hard-coded data-quality corrections for the WID export.

use std::collections::BTreeMap;

use crate::data::table::{Band, ShareRow};

/// The 2012 bottom-50 share is reported with a shifted decimal point.
const MIS_SCALED_YEAR: i32 = 2012;

/// Top-1% shares above this are assumed to be reported 10x too large.
/// Heuristic cutoff, not a principled bound.
const TOP1_OUTLIER_THRESHOLD: f64 = 0.8;

/// No independently reported 50-90 figure for these two years.
const IMPUTED_YEARS: [i32; 2] = [1963, 1965];

/// Applies the known data-quality fixes to the parsed share series.
pub struct DataProcessor;

impl DataProcessor {
    /// Apply all corrections, in order. Each step is a documented special
    /// case tied to quirks of the source export; the exact years and
    /// conditions matter.
    pub fn apply_corrections(shares: &mut BTreeMap<i32, ShareRow>) {
        Self::fix_2012_bottom50(shares);
        Self::fix_top1_outliers(shares);
        Self::subtract_band_overlap(shares);
        Self::impute_missing_p50to90(shares);
    }

    /// The 2012 `0-50` cell is off by a factor of ten.
    fn fix_2012_bottom50(shares: &mut BTreeMap<i32, ShareRow>) {
        if let Some(row) = shares.get_mut(&MIS_SCALED_YEAR) {
            if let Some(v) = row[Band::Bottom50.index()].as_mut() {
                *v *= 0.1;
            }
        }
    }

    /// Outlier `99+` rows are reported 10x too large.
    fn fix_top1_outliers(shares: &mut BTreeMap<i32, ShareRow>) {
        for row in shares.values_mut() {
            if let Some(v) = row[Band::Top1.index()].as_mut() {
                if *v > TOP1_OUTLIER_THRESHOLD {
                    *v *= 0.1;
                }
            }
        }
    }

    /// The source reports `90-99` cumulative-inclusive of the top 1%;
    /// convert to an exclusive band. Runs after the outlier fix so the
    /// corrected `99+` is subtracted.
    fn subtract_band_overlap(shares: &mut BTreeMap<i32, ShareRow>) {
        for row in shares.values_mut() {
            if let (Some(top1), Some(p90)) =
                (row[Band::Top1.index()], row[Band::P90To99.index()])
            {
                row[Band::P90To99.index()] = Some(p90 - top1);
            }
        }
    }

    /// 1963 and 1965 have no reported `50-90` share; fill it as one minus
    /// the sum of the known bands.
    fn impute_missing_p50to90(shares: &mut BTreeMap<i32, ShareRow>) {
        for year in IMPUTED_YEARS {
            if let Some(row) = shares.get_mut(&year) {
                let known: f64 = [Band::Top1, Band::P90To99, Band::Bottom50]
                    .iter()
                    .filter_map(|b| row[b.index()])
                    .sum();
                row[Band::P50To90.index()] = Some(1.0 - known);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn row(
        top1: Option<f64>,
        p90: Option<f64>,
        p50: Option<f64>,
        p0: Option<f64>,
    ) -> ShareRow {
        [top1, p90, p50, p0]
    }

    #[test]
    fn scales_2012_bottom50_only() {
        let mut shares = BTreeMap::new();
        shares.insert(2011, row(Some(0.2), Some(0.5), Some(0.3), Some(0.15)));
        shares.insert(2012, row(Some(0.2), Some(0.5), Some(0.3), Some(1.5)));
        DataProcessor::apply_corrections(&mut shares);

        assert!((shares[&2012][Band::Bottom50.index()].unwrap() - 0.15).abs() < EPS);
        assert!((shares[&2011][Band::Bottom50.index()].unwrap() - 0.15).abs() < EPS);
    }

    #[test]
    fn scales_top1_outliers_above_threshold() {
        let mut shares = BTreeMap::new();
        shares.insert(1930, row(Some(0.85), None, None, None));
        shares.insert(1931, row(Some(0.8), None, None, None));
        DataProcessor::apply_corrections(&mut shares);

        assert!((shares[&1930][Band::Top1.index()].unwrap() - 0.085).abs() < EPS);
        // at the threshold is left alone
        assert!((shares[&1931][Band::Top1.index()].unwrap() - 0.8).abs() < EPS);
    }

    #[test]
    fn converts_p90to99_to_exclusive_band() {
        let mut shares = BTreeMap::new();
        shares.insert(2000, row(Some(0.2), Some(0.35), Some(0.3), Some(0.15)));
        DataProcessor::apply_corrections(&mut shares);

        assert!((shares[&2000][Band::P90To99.index()].unwrap() - 0.15).abs() < EPS);
    }

    #[test]
    fn overlap_subtraction_uses_corrected_top1() {
        // raw 99+ of 0.9 is first rescaled to 0.09, then subtracted
        let mut shares = BTreeMap::new();
        shares.insert(1940, row(Some(0.9), Some(0.4), None, None));
        DataProcessor::apply_corrections(&mut shares);

        assert!((shares[&1940][Band::Top1.index()].unwrap() - 0.09).abs() < EPS);
        assert!((shares[&1940][Band::P90To99.index()].unwrap() - 0.31).abs() < EPS);
    }

    #[test]
    fn overlap_subtraction_skipped_when_a_band_is_missing() {
        let mut shares = BTreeMap::new();
        shares.insert(1920, row(Some(0.2), None, None, None));
        DataProcessor::apply_corrections(&mut shares);

        assert_eq!(shares[&1920][Band::P90To99.index()], None);
    }

    #[test]
    fn imputes_p50to90_for_1963_and_1965() {
        let mut shares = BTreeMap::new();
        // 90-99 is cumulative in the raw data: 0.35 - 0.1 = 0.25 exclusive
        shares.insert(1963, row(Some(0.1), Some(0.35), None, Some(0.2)));
        shares.insert(1964, row(Some(0.1), Some(0.35), None, Some(0.2)));
        shares.insert(1965, row(Some(0.1), Some(0.35), None, None));
        DataProcessor::apply_corrections(&mut shares);

        // 1 - (0.1 + 0.25 + 0.2)
        assert!((shares[&1963][Band::P50To90.index()].unwrap() - 0.45).abs() < EPS);
        // 1 - (0.1 + 0.25), bottom 50 unknown
        assert!((shares[&1965][Band::P50To90.index()].unwrap() - 0.65).abs() < EPS);
        // other years are never imputed
        assert_eq!(shares[&1964][Band::P50To90.index()], None);
    }
}
