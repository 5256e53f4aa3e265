mod bridge;

pub use bridge::{Bridge, BridgeError, FrameRecorder, RecorderBackend};

use wasm_bindgen::prelude::*;

/// JS-facing viewer. One instance per canvas.
///
/// ```text
/// const viewer = new ViewerHandle(canvas.width, canvas.height);
/// viewer.load_source("cat.png", bytes);
/// viewer.push_events(JSON.stringify(events));
/// const frame = JSON.parse(viewer.tick());
/// ```
#[wasm_bindgen]
pub struct ViewerHandle {
    bridge: Bridge,
}

fn js_err(e: BridgeError) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen]
impl ViewerHandle {
    /// `config_json` is an optional JSON viewer configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Result<ViewerHandle, JsError> {
        let bridge = Bridge::new(width, height, config_json.as_deref()).map_err(js_err)?;
        Ok(Self { bridge })
    }

    /// Decode and show encoded image bytes.
    pub fn load_image(&mut self, data: &[u8]) -> Result<(), JsError> {
        self.bridge.load_image(data).map_err(js_err)
    }

    /// Show an image by source; pass `data` the first time a source is seen.
    pub fn load_source(&mut self, src: &str, data: Option<Vec<u8>>) -> Result<(), JsError> {
        self.bridge.load_source(src, data).map_err(js_err)
    }

    pub fn is_cached(&self, src: &str) -> bool {
        self.bridge.is_cached(src)
    }

    /// Queue a JSON array of input events for the next tick.
    pub fn push_events(&mut self, json: &str) -> Result<(), JsError> {
        self.bridge.push_events(json).map_err(js_err)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.bridge.resize(width, height);
    }

    pub fn fullscreen_changed(&mut self, is_fullscreen: bool, screen_width: f64, screen_height: f64) {
        self.bridge
            .fullscreen_changed(is_fullscreen, screen_width, screen_height);
    }

    /// Advance one frame; returns `{zoom_level, fullscreen, commands}` as JSON.
    pub fn tick(&mut self) -> Result<String, JsError> {
        self.bridge.tick().map_err(js_err)
    }

    /// RGBA pixels of an uploaded texture.
    pub fn texture_rgba(&self, id: u64) -> Option<Vec<u8>> {
        self.bridge.texture(id).map(|img| img.as_raw().to_vec())
    }

    /// `[width, height]` of an uploaded texture.
    pub fn texture_size(&self, id: u64) -> Option<Vec<u32>> {
        self.bridge
            .texture(id)
            .map(|img| vec![img.width(), img.height()])
    }
}
