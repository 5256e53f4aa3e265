use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::Rect;

/// Handle to an image that a renderer has uploaded to its own storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// A single, stateless render instruction.
///
/// The viewer emits a `Vec<RenderCommand>` per frame. Renderers consume the
/// list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the whole canvas.
    Clear { color: ThemeToken },

    /// Blit a previously uploaded texture, stretched to `dest`.
    DrawTexture { texture: TextureId, dest: Rect },

    /// The frame is complete.
    Present,
}
