//! GUI module - interactive animation window

mod app;

pub use app::{run, PieApp};
