//! Data module - input parsing, corrections, and the income table

mod loader;
mod processor;
mod table;

pub use loader::{load_income_table, LoaderError, GDP_FILE, SHARES_FILE};
pub use processor::DataProcessor;
pub use table::{Band, IncomeTable, ShareRow, YearRow};
