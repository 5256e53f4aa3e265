#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use img_viewer_core::ViewerConfig;
    use img_viewer_ui::ViewerApp;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut image = None;
    let mut config = ViewerConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config needs a file")?;
            let data = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
            config = ViewerConfig::from_json(&data).with_context(|| format!("parsing {path}"))?;
        } else {
            image = Some(arg);
        }
    }

    let initial = match image {
        Some(path) => {
            let data = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
            Some((path, data))
        }
        None => None,
    };

    eframe::run_native(
        "img-viewer",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            let app = ViewerApp::new(cc, config);
            if let Some((source, bytes)) = initial {
                app.queue_image(source, bytes);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {}
