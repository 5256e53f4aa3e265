use std::sync::{Arc, Mutex};

use eframe::egui;
use img_viewer_core::{FullscreenChange, SourceCache, Viewer, ViewerConfig};
use img_viewer_protocol::Size;
use tracing::{info, warn};

use crate::input;
use crate::renderer::EguiBackend;
use crate::theme::ThemeMode;

/// Encoded image waiting to be shown, tagged with where it came from.
type PendingImage = Arc<Mutex<Option<(String, Vec<u8>)>>>;

/// eframe host around a [`Viewer`].
///
/// Keys: `F` toggles fullscreen, `T` toggles the theme, `O` opens a file
/// (native only). Files dropped on the window are shown as well.
pub struct ViewerApp {
    /// Created on the first frame, once the canvas size is known.
    viewer: Option<Viewer<EguiBackend>>,
    config: ViewerConfig,
    theme_mode: ThemeMode,
    cache: SourceCache,
    /// Source requested before the viewer existed or delivered by an async
    /// fetch.
    pending: PendingImage,
    error: Option<String>,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let pending: PendingImage = Arc::new(Mutex::new(None));

        // On WASM, `#src=<url>` in the page URL picks the initial image.
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(src) = web_sys::window()
                .and_then(|w| w.location().hash().ok())
                .and_then(|hash| hash.strip_prefix("#src=").map(str::to_owned))
            {
                Self::fetch_into(src, pending.clone(), cc.egui_ctx.clone());
            }
        }

        Self {
            viewer: None,
            config,
            theme_mode: ThemeMode::Light,
            cache: SourceCache::new(),
            pending,
            error: None,
        }
    }

    /// Queue bytes from `source` to be shown on the next frame.
    pub fn queue_image(&self, source: impl Into<String>, bytes: Vec<u8>) {
        let mut lock = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *lock = Some((source.into(), bytes));
    }

    fn show_source(&mut self, source: &str, bytes: Vec<u8>) {
        let bytes = self.cache.insert(source, bytes);
        self.show_bytes(source, &bytes);
    }

    fn show_bytes(&mut self, source: &str, bytes: &[u8]) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        match viewer.load_image(bytes) {
            Ok(()) => {
                info!(source, "showing image");
                self.error = None;
            }
            Err(e) => {
                warn!(source, error = %e, "could not show image");
                self.error = Some(format!("Failed to load {source}: {e}"));
            }
        }
    }

    /// Re-show a source already seen in this session.
    pub fn show_cached(&mut self, source: &str) -> bool {
        match self.cache.get(source) {
            Some(bytes) => {
                self.show_bytes(source, &bytes);
                true
            }
            None => false,
        }
    }

    fn ensure_viewer(&mut self, ctx: &egui::Context, canvas: Size) {
        if self.viewer.is_some() || !canvas.is_drawable() {
            return;
        }
        match Viewer::new(EguiBackend::new(ctx.clone()), canvas, self.config.clone()) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => self.error = Some(format!("Failed to create viewer: {e}")),
        }
    }

    /// Compare the canvas egui gave us with what the viewer knows and post
    /// the difference as host notifications.
    fn sync_canvas(&self, ctx: &egui::Context, canvas: Size) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        let notifier = viewer.notifier();
        let fullscreen = host_fullscreen(ctx);
        if fullscreen != viewer.is_fullscreen() {
            notifier.fullscreen(if fullscreen {
                FullscreenChange::Entered { screen: canvas }
            } else {
                FullscreenChange::Exited
            });
            if !fullscreen && canvas != viewer.windowed_size() {
                notifier.resize(canvas);
            }
        } else if canvas != viewer.viewport().canvas {
            if fullscreen {
                notifier.fullscreen(FullscreenChange::Entered { screen: canvas });
            } else {
                notifier.resize(canvas);
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (toggle_fullscreen, toggle_theme, open) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::F),
                i.key_pressed(egui::Key::T),
                i.key_pressed(egui::Key::O),
            )
        });
        if toggle_fullscreen {
            request_fullscreen(ctx, !host_fullscreen(ctx));
        }
        if toggle_theme {
            self.theme_mode = self.theme_mode.toggled();
            ctx.set_visuals(match self.theme_mode {
                ThemeMode::Light => egui::Visuals::light(),
                ThemeMode::Dark => egui::Visuals::dark(),
            });
        }
        if open {
            #[cfg(not(target_arch = "wasm32"))]
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                    .pick_file()
                {
                    let source = path.display().to_string();
                    if !self.show_cached(&source) {
                        match std::fs::read(&path) {
                            Ok(data) => self.show_source(&source, data),
                            Err(e) => self.error = Some(format!("Failed to read file: {e}")),
                        }
                    }
                }
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn fetch_into(src: String, pending: PendingImage, ctx: egui::Context) {
        wasm_bindgen_futures::spawn_local(async move {
            match Self::fetch_bytes(&src).await {
                Ok(bytes) => {
                    if let Ok(mut lock) = pending.lock() {
                        *lock = Some((src, bytes));
                    }
                    ctx.request_repaint();
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("img-viewer: fetch {src}: {e}").into());
                }
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let window = web_sys::window().ok_or("no window")?;
        let resp_value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("{e:?}"))?;
        let resp: web_sys::Response = resp_value.dyn_into().map_err(|_| "not a Response")?;
        if !resp.ok() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let buf = JsFuture::from(resp.array_buffer().map_err(|e| format!("{e:?}"))?)
            .await
            .map_err(|e| format!("{e:?}"))?;
        Ok(js_sys::Uint8Array::new(&buf).to_vec())
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        // Dropped files replace the current image.
        let dropped = ctx.input(|i| {
            i.raw.dropped_files.first().and_then(|file| {
                let bytes = file.bytes.as_ref()?;
                let source = file
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| file.name.clone());
                Some((source, bytes.to_vec()))
            })
        });
        if let Some((source, bytes)) = dropped {
            self.queue_image(source, bytes);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let canvas = Size::new(f64::from(available.width()), f64::from(available.height()));
                self.ensure_viewer(ctx, canvas);
                self.sync_canvas(ctx, canvas);

                let pending = {
                    let mut lock = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                    if self.viewer.is_some() { lock.take() } else { None }
                };
                if let Some((source, bytes)) = pending {
                    self.show_source(&source, bytes);
                }

                let response = ui.allocate_rect(available, egui::Sense::click_and_drag());
                let events = input::collect(ctx, available);

                let Some(viewer) = self.viewer.as_mut() else {
                    return;
                };
                if viewer.is_displaying() {
                    if response.dragged() {
                        ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
                    } else if response.hovered() {
                        ctx.set_cursor_icon(egui::CursorIcon::Grab);
                    }
                }
                if let Err(e) = viewer.tick(&events) {
                    warn!(error = %e, "frame skipped");
                    self.error = Some(e.to_string());
                }

                let painter = ui.painter_at(available);
                viewer
                    .renderer()
                    .paint(&painter, available.min, self.theme_mode);

                if let Some(err) = &self.error {
                    painter.text(
                        available.left_bottom() + egui::vec2(8.0, -8.0),
                        egui::Align2::LEFT_BOTTOM,
                        err,
                        egui::FontId::proportional(12.0),
                        egui::Color32::RED,
                    );
                }
            });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn host_fullscreen(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.viewport().fullscreen.unwrap_or(false))
}

#[cfg(target_arch = "wasm32")]
fn host_fullscreen(_ctx: &egui::Context) -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.fullscreen_element())
        .is_some()
}

#[cfg(not(target_arch = "wasm32"))]
fn request_fullscreen(ctx: &egui::Context, on: bool) {
    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(on));
}

#[cfg(target_arch = "wasm32")]
fn request_fullscreen(_ctx: &egui::Context, on: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if on {
        let canvas = document.get_element_by_id(crate::CANVAS_ID);
        if let Some(Err(e)) = canvas.map(|c| c.request_fullscreen()) {
            web_sys::console::error_1(&format!("img-viewer: fullscreen refused: {e:?}").into());
        }
    } else {
        document.exit_fullscreen();
    }
}
