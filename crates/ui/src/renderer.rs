use std::collections::HashMap;

use egui::{Color32, CornerRadius, Pos2, Rect, TextureHandle, TextureOptions};
use img_viewer_core::{Backend, DecodedImage, RenderError, Renderer};
use img_viewer_protocol::{RenderCommand, Size, TextureId, ThemeToken};
use tracing::debug;

use crate::theme::{self, ThemeMode};

/// Creates [`EguiRenderer`]s that upload into the egui texture manager.
pub struct EguiBackend {
    ctx: egui::Context,
}

impl EguiBackend {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl Backend for EguiBackend {
    type Renderer = EguiRenderer;

    fn create_renderer(&mut self, canvas: Size) -> Result<EguiRenderer, RenderError> {
        debug!(width = canvas.w, height = canvas.h, "egui renderer created");
        Ok(EguiRenderer {
            ctx: self.ctx.clone(),
            canvas,
            textures: HashMap::new(),
            next_id: 0,
            staged: Vec::new(),
            frame: Vec::new(),
        })
    }
}

/// Renderer that records each frame's commands and replays them into an egui
/// `Painter` during the UI pass.
pub struct EguiRenderer {
    ctx: egui::Context,
    canvas: Size,
    textures: HashMap<TextureId, TextureHandle>,
    next_id: u64,
    /// Commands of the frame being built.
    staged: Vec<RenderCommand>,
    /// Last presented frame.
    frame: Vec<RenderCommand>,
}

impl Renderer for EguiRenderer {
    fn upload_texture(&mut self, image: &DecodedImage) -> Result<TextureId, RenderError> {
        let max_side = self.ctx.input(|i| i.max_texture_side);
        let (width, height) = (image.width(), image.height());
        if width as usize > max_side || height as usize > max_side {
            return Err(RenderError::Upload {
                width,
                height,
                reason: format!("exceeds max texture side {max_side}"),
            });
        }
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [width as usize, height as usize],
            image.as_raw(),
        );
        self.next_id += 1;
        let id = TextureId(self.next_id);
        let handle = self.ctx.load_texture(
            format!("img-viewer-{}", self.next_id),
            color_image,
            TextureOptions::LINEAR,
        );
        self.textures.insert(id, handle);
        Ok(id)
    }

    fn release_texture(&mut self, texture: TextureId) {
        // Dropping the last handle frees the GPU texture.
        self.textures.remove(&texture);
    }

    fn clear(&mut self, color: ThemeToken) {
        self.staged.clear();
        self.staged.push(RenderCommand::Clear { color });
    }

    fn draw_texture(&mut self, texture: TextureId, dest: img_viewer_protocol::Rect) {
        self.staged.push(RenderCommand::DrawTexture { texture, dest });
    }

    fn present(&mut self) {
        self.staged.push(RenderCommand::Present);
        self.frame = std::mem::take(&mut self.staged);
    }
}

impl EguiRenderer {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Paint the last presented frame. `offset` is the top-left pixel
    /// position of the canvas area.
    pub fn paint(&self, painter: &egui::Painter, offset: Pos2, mode: ThemeMode) {
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        for cmd in &self.frame {
            match cmd {
                RenderCommand::Clear { color } => {
                    let area = Rect::from_min_size(
                        offset,
                        egui::vec2(self.canvas.w as f32, self.canvas.h as f32),
                    );
                    painter.rect_filled(area, CornerRadius::ZERO, theme::resolve(*color, mode));
                }
                RenderCommand::DrawTexture { texture, dest } => {
                    let Some(handle) = self.textures.get(texture) else {
                        continue;
                    };
                    let rect = Rect::from_min_size(
                        Pos2::new(offset.x + dest.x as f32, offset.y + dest.y as f32),
                        egui::vec2(dest.w as f32, dest.h as f32),
                    );
                    // Cull off-screen
                    if !painter.clip_rect().intersects(rect) {
                        continue;
                    }
                    painter.image(handle.id(), rect, uv, Color32::WHITE);
                }
                RenderCommand::Present => {}
            }
        }
    }
}
