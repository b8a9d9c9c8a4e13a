//! Income Pie - WID Income Share Loader & Animated Pie Chart Viewer
//!
//! `income_pie [OUTPUT.gif]` - with an output path, renders the animation
//! to a GIF; without one, opens an interactive window.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use income_pie::charts::{build_frames, Animator};
use income_pie::data::{load_income_table, GDP_FILE, SHARES_FILE};
use income_pie::gui;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!("usage: income_pie [OUTPUT.gif]");
    }

    let table = load_income_table(Path::new(SHARES_FILE), Path::new(GDP_FILE))
        .context("loading income data")?;
    let frames = build_frames(&table).context("building animation frames")?;

    match output {
        Some(path) => Animator::new(frames)?
            .save_gif(&path)
            .with_context(|| format!("saving animation to {}", path.display()))?,
        None => gui::run(frames).map_err(|e| anyhow::anyhow!("display failed: {e}"))?,
    }

    Ok(())
}
