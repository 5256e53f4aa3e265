use std::collections::HashMap;

use img_viewer_core::{
    Backend, ConfigError, DecodedImage, FullscreenChange, RenderError, Renderer, SourceCache,
    Viewer, ViewerConfig, ViewerError,
};
use img_viewer_protocol::{InputEvent, Rect, RenderCommand, Size, TextureId, ThemeToken};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("viewer: {0}")]
    Viewer(#[from] ViewerError),
    #[error("events: {0}")]
    Events(serde_json::Error),
    #[error("serialize: {0}")]
    Serialize(serde_json::Error),
    #[error("source {0} is not cached and no bytes were given")]
    UnknownSource(String),
}

/// Renderer that keeps textures and the last presented frame so JavaScript
/// can pull them out and draw them on a 2D canvas.
#[derive(Default)]
pub struct FrameRecorder {
    canvas: Size,
    textures: HashMap<TextureId, DecodedImage>,
    next_id: u64,
    staged: Vec<RenderCommand>,
    frame: Vec<RenderCommand>,
}

impl FrameRecorder {
    pub fn frame(&self) -> &[RenderCommand] {
        &self.frame
    }

    pub fn texture(&self, id: TextureId) -> Option<&DecodedImage> {
        self.textures.get(&id)
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }
}

impl Renderer for FrameRecorder {
    fn upload_texture(&mut self, image: &DecodedImage) -> Result<TextureId, RenderError> {
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.textures.insert(id, image.clone());
        Ok(id)
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn clear(&mut self, color: ThemeToken) {
        self.staged.clear();
        self.staged.push(RenderCommand::Clear { color });
    }

    fn draw_texture(&mut self, texture: TextureId, dest: Rect) {
        self.staged.push(RenderCommand::DrawTexture { texture, dest });
    }

    fn present(&mut self) {
        self.staged.push(RenderCommand::Present);
        self.frame = std::mem::take(&mut self.staged);
    }
}

pub struct RecorderBackend;

impl Backend for RecorderBackend {
    type Renderer = FrameRecorder;

    fn create_renderer(&mut self, canvas: Size) -> Result<FrameRecorder, RenderError> {
        Ok(FrameRecorder {
            canvas,
            ..Default::default()
        })
    }
}

/// Summary of the viewport returned alongside each frame.
#[derive(Debug, Serialize)]
pub struct FrameInfo<'a> {
    pub zoom_level: f64,
    pub fullscreen: bool,
    pub commands: &'a [RenderCommand],
}

/// Everything the JS handle does, in plain Rust.
pub struct Bridge {
    viewer: Viewer<RecorderBackend>,
    cache: SourceCache,
    queued: Vec<InputEvent>,
}

impl Bridge {
    pub fn new(width: f64, height: f64, config_json: Option<&str>) -> Result<Self, BridgeError> {
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(json.as_bytes())?,
            None => ViewerConfig::default(),
        };
        let viewer = Viewer::new(RecorderBackend, Size::new(width, height), config)?;
        Ok(Self {
            viewer,
            cache: SourceCache::new(),
            queued: Vec::new(),
        })
    }

    pub fn viewer(&self) -> &Viewer<RecorderBackend> {
        &self.viewer
    }

    pub fn load_image(&mut self, data: &[u8]) -> Result<(), BridgeError> {
        Ok(self.viewer.load_image(data)?)
    }

    /// Show `src`, using `data` when given (and caching it) or the cached
    /// bytes otherwise.
    pub fn load_source(&mut self, src: &str, data: Option<Vec<u8>>) -> Result<(), BridgeError> {
        let bytes = match data {
            Some(data) => self.cache.insert(src, data),
            None => self
                .cache
                .get(src)
                .ok_or_else(|| BridgeError::UnknownSource(src.to_owned()))?,
        };
        debug!(src, len = bytes.len(), "loading source");
        self.load_image(&bytes)
    }

    pub fn is_cached(&self, src: &str) -> bool {
        self.cache.contains(src)
    }

    /// Queue a JSON array of input events for the next tick.
    pub fn push_events(&mut self, json: &str) -> Result<(), BridgeError> {
        let events: Vec<InputEvent> = serde_json::from_str(json).map_err(BridgeError::Events)?;
        self.queued.extend(events);
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewer.notifier().resize(Size::new(width, height));
    }

    pub fn fullscreen_changed(&mut self, is_fullscreen: bool, screen_width: f64, screen_height: f64) {
        let change = if is_fullscreen {
            FullscreenChange::Entered {
                screen: Size::new(screen_width, screen_height),
            }
        } else {
            FullscreenChange::Exited
        };
        self.viewer.notifier().fullscreen(change);
    }

    /// Run one frame with the queued events and return it as JSON.
    pub fn tick(&mut self) -> Result<String, BridgeError> {
        let events = std::mem::take(&mut self.queued);
        self.viewer.tick(&events)?;
        let info = FrameInfo {
            zoom_level: self.viewer.viewport().zoom_level,
            fullscreen: self.viewer.is_fullscreen(),
            commands: self.viewer.renderer().frame(),
        };
        serde_json::to_string(&info).map_err(BridgeError::Serialize)
    }

    pub fn texture(&self, id: u64) -> Option<&DecodedImage> {
        self.viewer.renderer().texture(TextureId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_viewer_core::Interaction;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn tick_returns_frame_json() {
        let mut bridge = Bridge::new(800.0, 600.0, None).unwrap();
        bridge.load_image(&png(16, 3)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&bridge.tick().unwrap()).unwrap();
        assert_eq!(json["zoom_level"], 50.0);
        assert_eq!(json["fullscreen"], false);
        let commands = json["commands"].as_array().unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1]["DrawTexture"]["texture"], 1);
        assert_eq!(commands[1]["DrawTexture"]["dest"]["y"], 225.0);
        assert!(bridge.texture(1).is_some());
    }

    #[test]
    fn events_are_consumed_by_tick() {
        let mut bridge = Bridge::new(100.0, 100.0, Some(r#"{"max_zoom": 10.0}"#)).unwrap();
        bridge.load_image(&png(100, 100)).unwrap();
        bridge
            .push_events(r#"[{"type":"wheel","delta_y":1.0}]"#)
            .unwrap();
        bridge.tick().unwrap();
        assert!((bridge.viewer().viewport().zoom_level - 1.1).abs() < 1e-9);
        bridge.tick().unwrap();
        assert!((bridge.viewer().viewport().zoom_level - 1.1).abs() < 1e-9);
    }

    #[test]
    fn bad_event_json_is_rejected() {
        let mut bridge = Bridge::new(100.0, 100.0, None).unwrap();
        assert!(matches!(
            bridge.push_events("[{"),
            Err(BridgeError::Events(_))
        ));
    }

    #[test]
    fn sources_are_cached() {
        let mut bridge = Bridge::new(100.0, 100.0, None).unwrap();
        assert!(matches!(
            bridge.load_source("a.png", None),
            Err(BridgeError::UnknownSource(_))
        ));
        bridge.load_source("a.png", Some(png(10, 20))).unwrap();
        bridge.load_source("b.png", Some(png(20, 10))).unwrap();
        assert!(bridge.is_cached("a.png"));
        bridge.load_source("a.png", None).unwrap();
        assert_eq!(bridge.viewer().viewport().image, Size::new(10.0, 20.0));
    }

    #[test]
    fn fullscreen_applies_on_tick() {
        let mut bridge = Bridge::new(100.0, 100.0, None).unwrap();
        bridge.load_image(&png(50, 50)).unwrap();
        bridge.fullscreen_changed(true, 400.0, 300.0);
        bridge.tick().unwrap();
        assert_eq!(bridge.viewer().renderer().canvas(), Size::new(400.0, 300.0));
        assert_eq!(bridge.viewer().viewport().zoom_level, 6.0);
        bridge.fullscreen_changed(false, 0.0, 0.0);
        bridge.resize(200.0, 100.0);
        bridge.tick().unwrap();
        assert_eq!(bridge.viewer().viewport().canvas, Size::new(200.0, 100.0));
    }

    #[test]
    fn rejected_resize_still_consumes_events() {
        let mut bridge = Bridge::new(100.0, 100.0, None).unwrap();
        bridge.load_image(&png(50, 50)).unwrap();
        bridge
            .push_events(r#"[{"type": "pointer_down", "touch": null}]"#)
            .unwrap();
        bridge.tick().unwrap();
        assert!(bridge.viewer().gesture().flags.contains(Interaction::Panning));

        bridge.resize(0.0, 0.0);
        bridge.push_events(r#"[{"type": "pointer_up"}]"#).unwrap();
        assert!(matches!(bridge.tick(), Err(BridgeError::Viewer(_))));
        assert!(!bridge.viewer().gesture().flags.contains(Interaction::Panning));
        assert_eq!(bridge.viewer().viewport().canvas, Size::new(100.0, 100.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            Bridge::new(100.0, 100.0, Some(r#"{"zoom_increment": 1.0}"#)),
            Err(BridgeError::Config(_))
        ));
    }
}
