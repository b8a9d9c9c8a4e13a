//! Income Pie - WID Income Share Loader & Animated Pie Chart Viewer
//!
//! Loads percentile income-share and national-income series from two WID
//! export files and renders one pie chart per year, sized by GDP: either
//! as an interactive window or an animated GIF.

pub mod charts;
pub mod data;
pub mod gui;
