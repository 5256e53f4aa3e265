mod app;
mod canvas;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use img_viewer_core::ViewerConfig;

fn main() -> Result<()> {
    let mut path = None;
    let mut config = ViewerConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let file = args.next().context("--config needs a file")?;
            let data = std::fs::read(&file).with_context(|| format!("reading {file}"))?;
            config = ViewerConfig::from_json(&data).with_context(|| format!("parsing {file}"))?;
        } else {
            path = Some(PathBuf::from(arg));
        }
    }
    let Some(path) = path else {
        eprintln!("Usage: img-viewer [--config <config.json>] <image>");
        std::process::exit(1);
    };

    // The terminal is the canvas, so logs only go to a file when asked for.
    if let Ok(log_path) = std::env::var("IMG_VIEWER_LOG") {
        let file = File::create(&log_path).with_context(|| format!("creating {log_path}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    let data = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    app::run_tui(&path.display().to_string(), &data, config)
}
