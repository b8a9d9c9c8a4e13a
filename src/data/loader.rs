//! Income Data Loader Module
//! Parses the two WID export files and builds the income table.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::PolarsError;
use thiserror::Error;
use tracing::info;

use crate::data::processor::DataProcessor;
use crate::data::table::{Band, IncomeTable, ShareRow};

/// Default income-shares file: `percentile_code;year;share`, share may be empty.
pub const SHARES_FILE: &str = "income.shares.csv";
/// Default national-income file: `year,gdp`.
pub const GDP_FILE: &str = "income.csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read {file}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },
    #[error(
        "year mismatch between input files: no GDP entry for {missing_gdp:?}, \
         no income-share entry for {missing_shares:?}"
    )]
    YearMismatch {
        missing_gdp: Vec<i32>,
        missing_shares: Vec<i32>,
    },
    #[error("failed to build income table: {0}")]
    Table(#[from] PolarsError),
}

impl LoaderError {
    fn parse(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        LoaderError::Parse {
            file: path.display().to_string(),
            line,
            reason: reason.into(),
        }
    }
}

/// Load both input files into one `IncomeTable`, applying the data-quality
/// corrections and joining GDP to the share rows by year. Any year present
/// in only one of the two files is an error.
pub fn load_income_table(
    shares_path: &Path,
    gdp_path: &Path,
) -> Result<IncomeTable, LoaderError> {
    let mut shares = parse_shares(shares_path)?;
    let gdp = parse_gdp(gdp_path)?;

    DataProcessor::apply_corrections(&mut shares);

    let missing_gdp: Vec<i32> = shares
        .keys()
        .filter(|y| !gdp.contains_key(y))
        .copied()
        .collect();
    let missing_shares: Vec<i32> = gdp
        .keys()
        .filter(|y| !shares.contains_key(y))
        .copied()
        .collect();
    if !missing_gdp.is_empty() || !missing_shares.is_empty() {
        return Err(LoaderError::YearMismatch {
            missing_gdp,
            missing_shares,
        });
    }

    let mut years = Vec::with_capacity(shares.len());
    let mut columns: [Vec<Option<f64>>; Band::COUNT] = std::array::from_fn(|_| Vec::new());
    let mut gdp_col = Vec::with_capacity(shares.len());

    for (year, row) in &shares {
        years.push(*year);
        for (col, share) in columns.iter_mut().zip(row) {
            col.push(*share);
        }
        gdp_col.push(gdp[year]);
    }

    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        info!(years = years.len(), from = first, to = last, "loaded income table");
    }

    Ok(IncomeTable::from_series(years, columns, gdp_col)?)
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = (usize, std::io::Result<String>)>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Io {
        file: path.display().to_string(),
        source,
    })?;
    // line numbers are 1-based for error messages
    Ok(BufReader::new(file).lines().enumerate().map(|(i, l)| (i + 1, l)))
}

/// Parse the semicolon-delimited shares file into a per-year row map.
/// Unrecognized percentile codes are skipped; an empty share field is a
/// missing value, never zero.
fn parse_shares(path: &Path) -> Result<BTreeMap<i32, ShareRow>, LoaderError> {
    let mut rows: BTreeMap<i32, ShareRow> = BTreeMap::new();

    for (lineno, line) in open_lines(path)? {
        let line = line.map_err(|source| LoaderError::Io {
            file: path.display().to_string(),
            source,
        })?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(';').collect();
        let [code, year, share] = fields.as_slice() else {
            return Err(LoaderError::parse(
                path,
                lineno,
                format!("expected 3 ';'-separated fields, got {}", fields.len()),
            ));
        };

        let band = match *code {
            "p99p100" => Band::Top1,
            "p90p100" => Band::P90To99,
            "p50p90" => Band::P50To90,
            "p0p50" => Band::Bottom50,
            _ => continue,
        };

        let year: i32 = year.parse().map_err(|_| {
            LoaderError::parse(path, lineno, format!("invalid year {year:?}"))
        })?;

        let share = if share.is_empty() {
            None
        } else {
            let v: f64 = share.parse().map_err(|_| {
                LoaderError::parse(path, lineno, format!("invalid share {share:?}"))
            })?;
            if !v.is_finite() {
                return Err(LoaderError::parse(
                    path,
                    lineno,
                    format!("non-finite share {share:?}"),
                ));
            }
            Some(v)
        };

        rows.entry(year).or_insert([None; Band::COUNT])[band.index()] = share;
    }

    Ok(rows)
}

/// Parse the comma-delimited national-income file into a year -> GDP map.
fn parse_gdp(path: &Path) -> Result<BTreeMap<i32, f64>, LoaderError> {
    let mut gdp = BTreeMap::new();

    for (lineno, line) in open_lines(path)? {
        let line = line.map_err(|source| LoaderError::Io {
            file: path.display().to_string(),
            source,
        })?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let Some((year, value)) = line.split_once(',') else {
            return Err(LoaderError::parse(path, lineno, "expected `year,gdp`"));
        };
        let year: i32 = year.parse().map_err(|_| {
            LoaderError::parse(path, lineno, format!("invalid year {year:?}"))
        })?;
        let value: f64 = value.parse().map_err(|_| {
            LoaderError::parse(path, lineno, format!("invalid gdp {value:?}"))
        })?;
        if !(value.is_finite() && value > 0.0) {
            return Err(LoaderError::parse(
                path,
                lineno,
                format!("gdp must be a positive number, got {value}"),
            ));
        }

        if gdp.insert(year, value).is_some() {
            return Err(LoaderError::parse(
                path,
                lineno,
                format!("duplicate gdp entry for year {year}"),
            ));
        }
    }

    Ok(gdp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn empty_share_field_is_missing_not_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "shares.csv", "p99p100;1950;0.3\np0p50;1950;\n");

        let rows = parse_shares(&path).unwrap();
        assert_eq!(rows[&1950][Band::Top1.index()], Some(0.3));
        assert_eq!(rows[&1950][Band::Bottom50.index()], None);
    }

    #[test]
    fn unrecognized_codes_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "shares.csv",
            "percentile;year;value\np99p100;1950;0.3\np99.9p100;1950;0.1\n",
        );

        let rows = parse_shares(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[&1950][Band::Top1.index()], Some(0.3));
    }

    #[test]
    fn malformed_share_line_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "shares.csv", "p99p100;1950;zero\n");

        let err = parse_shares(&path).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 1, .. }));
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "shares.csv", "p99p100;1950\n");

        assert!(matches!(
            parse_shares(&path).unwrap_err(),
            LoaderError::Parse { .. }
        ));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = parse_gdp(Path::new("does-not-exist.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn duplicate_gdp_year_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gdp.csv", "1950,10.0\n1950,11.0\n");

        let err = parse_gdp(&path).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 2, .. }));
    }

    #[test]
    fn non_positive_gdp_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gdp.csv", "1950,-3.0\n");

        assert!(matches!(
            parse_gdp(&path).unwrap_err(),
            LoaderError::Parse { .. }
        ));
    }

    #[test]
    fn gdp_joined_by_year_not_position() {
        let dir = tempfile::tempdir().unwrap();
        let shares = write(
            dir.path(),
            "shares.csv",
            "p99p100;1951;0.2\np99p100;1950;0.3\n",
        );
        // reversed order relative to the shares file
        let gdp = write(dir.path(), "gdp.csv", "1951,20.0\n1950,10.0\n");

        let table = load_income_table(&shares, &gdp).unwrap();
        let rows = table.rows().unwrap();
        assert_eq!(rows[0].year, 1950);
        assert_eq!(rows[0].gdp, 10.0);
        assert_eq!(rows[1].year, 1951);
        assert_eq!(rows[1].gdp, 20.0);
    }

    #[test]
    fn year_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let shares = write(dir.path(), "shares.csv", "p99p100;1950;0.3\n");
        let gdp = write(dir.path(), "gdp.csv", "1951,20.0\n");

        let err = load_income_table(&shares, &gdp).unwrap_err();
        match err {
            LoaderError::YearMismatch {
                missing_gdp,
                missing_shares,
            } => {
                assert_eq!(missing_gdp, vec![1950]);
                assert_eq!(missing_shares, vec![1951]);
            }
            other => panic!("expected YearMismatch, got {other}"),
        }
    }
}
