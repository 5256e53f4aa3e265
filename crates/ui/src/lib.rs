mod app;
mod input;
mod renderer;
mod theme;

pub use app::ViewerApp;
pub use renderer::{EguiBackend, EguiRenderer};
pub use theme::ThemeMode;

/// DOM id of the canvas the web build draws into.
pub const CANVAS_ID: &str = "img_viewer_canvas";

// WASM entry point
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Redirect panics to console
    console_error_panic_hook::set_once();

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run().await {
            web_sys::console::error_1(&format!("Failed to start img-viewer: {e:?}").into());
        }
    });
    Ok(())
}

#[cfg(target_arch = "wasm32")]
async fn run() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("no canvas element with id 'img_viewer_canvas'"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| {
                Ok(Box::new(ViewerApp::new(
                    cc,
                    img_viewer_core::ViewerConfig::default(),
                )))
            }),
        )
        .await
}
