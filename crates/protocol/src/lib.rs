pub mod commands;
pub mod input;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextureId};
pub use input::InputEvent;
pub use theme::ThemeToken;
pub use types::{Point, Rect, Size};
