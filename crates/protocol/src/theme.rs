use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the host's active theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    /// Canvas area not covered by the image.
    #[default]
    Background,
}
