use img_viewer_protocol::{Rect, RenderCommand, Size, TextureId, ThemeToken};
use thiserror::Error;

use crate::decode::DecodedImage;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create renderer for a {width}x{height} canvas: {reason}")]
    Create {
        width: f64,
        height: f64,
        reason: String,
    },
    #[error("could not upload {width}x{height} texture: {reason}")]
    Upload {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// The host could not subscribe the viewer to fullscreen changes.
#[derive(Debug, Error)]
#[error("fullscreen change listener not registered: {0}")]
pub struct RegistrationError(pub String);

/// A drawing surface bound to one canvas size.
pub trait Renderer {
    fn upload_texture(&mut self, image: &DecodedImage) -> Result<TextureId, RenderError>;

    /// Free a texture that will not be drawn again.
    fn release_texture(&mut self, _texture: TextureId) {}

    fn clear(&mut self, color: ThemeToken);

    fn draw_texture(&mut self, texture: TextureId, dest: Rect);

    fn present(&mut self);

    /// Execute a frame's command list in order.
    fn submit(&mut self, commands: &[RenderCommand]) {
        for cmd in commands {
            match cmd {
                RenderCommand::Clear { color } => self.clear(*color),
                RenderCommand::DrawTexture { texture, dest } => self.draw_texture(*texture, *dest),
                RenderCommand::Present => self.present(),
            }
        }
    }
}

/// Creates renderers for the host's canvas.
///
/// A renderer is tied to the canvas size it was created for; every canvas
/// change (including fullscreen transitions) goes through
/// [`Backend::create_renderer`] again.
pub trait Backend {
    type Renderer: Renderer;

    fn create_renderer(&mut self, canvas: Size) -> Result<Self::Renderer, RenderError>;

    /// Subscribe to fullscreen changes for the current canvas. Hosts without
    /// a fullscreen concept keep the default.
    fn watch_fullscreen(&mut self) -> Result<(), RegistrationError> {
        Ok(())
    }
}
