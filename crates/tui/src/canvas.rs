//! Pixel canvas backed by terminal cells: each cell shows two vertically
//! stacked pixels using the upper half block glyph.

use std::collections::HashMap;

use img_viewer_core::{Backend, DecodedImage, RenderError, Renderer};
use img_viewer_protocol::{Rect, RenderCommand, Size, TextureId, ThemeToken};
use ratatui::buffer::Buffer;
use ratatui::style::Color;

const UPPER_HALF: char = '▀';

pub fn theme_to_rgb(token: ThemeToken) -> [u8; 3] {
    match token {
        ThemeToken::Background => [0xff, 0xff, 0xff],
    }
}

/// Canvas size for a terminal area of `cols × rows` cells.
pub fn canvas_for(cols: u16, rows: u16) -> Size {
    Size::new(f64::from(cols), f64::from(rows) * 2.0)
}

pub struct TerminalBackend;

impl Backend for TerminalBackend {
    type Renderer = CellRenderer;

    fn create_renderer(&mut self, canvas: Size) -> Result<CellRenderer, RenderError> {
        if canvas.w > f64::from(u16::MAX) || canvas.h > f64::from(u16::MAX) * 2.0 {
            return Err(RenderError::Create {
                width: canvas.w,
                height: canvas.h,
                reason: "larger than any terminal".into(),
            });
        }
        Ok(CellRenderer {
            canvas,
            textures: HashMap::new(),
            next_id: 0,
            staged: Vec::new(),
            frame: Vec::new(),
        })
    }
}

pub struct CellRenderer {
    canvas: Size,
    textures: HashMap<TextureId, DecodedImage>,
    next_id: u64,
    staged: Vec<RenderCommand>,
    frame: Vec<RenderCommand>,
}

impl Renderer for CellRenderer {
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

impl CellRenderer {
    /// Color of canvas pixel `(px, py)` in the last presented frame.
    pub fn pixel(&self, px: u32, py: u32) -> [u8; 3] {
        let mut rgb = [0, 0, 0];
        for cmd in &self.frame {
            match cmd {
                RenderCommand::Clear { color } => rgb = theme_to_rgb(*color),
                RenderCommand::DrawTexture { texture, dest } => {
                    if let Some(src) = self
                        .textures
                        .get(texture)
                        .and_then(|img| sample(img, *dest, px, py))
                    {
                        rgb = blend(rgb, src);
                    }
                }
                RenderCommand::Present => {}
            }
        }
        rgb
    }

    /// Draw the last presented frame into `buf`, starting at row `top`.
    pub fn paint(&self, buf: &mut Buffer, top: u16) {
        let cols = self.canvas.w as u16;
        let rows = (self.canvas.h / 2.0) as u16;
        for row in 0..rows {
            for col in 0..cols {
                let [r, g, b] = self.pixel(u32::from(col), u32::from(row) * 2);
                let [r2, g2, b2] = self.pixel(u32::from(col), u32::from(row) * 2 + 1);
                if let Some(cell) = buf.cell_mut((col, top + row)) {
                    cell.set_char(UPPER_HALF)
                        .set_fg(Color::Rgb(r, g, b))
                        .set_bg(Color::Rgb(r2, g2, b2));
                }
            }
        }
    }
}

/// Nearest-neighbour sample of `image` stretched over `dest`, at the center
/// of canvas pixel `(px, py)`. `None` outside `dest`.
pub fn sample(image: &DecodedImage, dest: Rect, px: u32, py: u32) -> Option<[u8; 4]> {
    let x = f64::from(px) + 0.5;
    let y = f64::from(py) + 0.5;
    if dest.w <= 0.0 || dest.h <= 0.0 || !dest.contains(img_viewer_protocol::Point::new(x, y)) {
        return None;
    }
    let u = ((x - dest.x) / dest.w * f64::from(image.width())) as u32;
    let v = ((y - dest.y) / dest.h * f64::from(image.height())) as u32;
    let u = u.min(image.width() - 1);
    let v = v.min(image.height() - 1);
    Some(image.pixels().get_pixel(u, v).0)
}

fn blend(under: [u8; 3], over: [u8; 4]) -> [u8; 3] {
    let a = u16::from(over[3]);
    let mix = |u: u8, o: u8| ((u16::from(o) * a + u16::from(u) * (255 - a)) / 255) as u8;
    [
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
    ]
}
