//! Viewport controller for a single-image pan/zoom viewer.
//!
//! ```text
//!   host input ──▶ InputEvent[] ──▶ GestureState ──▶ ViewportState ──▶ RenderCommand[] ──▶ Renderer
//!   (egui, tui,      (protocol)       (per-frame        (zoom, pan,       (Clear, Draw,       (egui, tui,
//!    browser)                           flags)            clamp, fit)        Present)            canvas)
//! ```
//!
//! Image decoding, window/renderer creation and event polling stay with the
//! host; they reach the core through the [`render::Backend`] and
//! [`decode::Decoder`] traits.

pub mod cache;
pub mod config;
pub mod decode;
pub mod driver;
pub mod gesture;
pub mod render;
pub mod viewport;

pub use cache::SourceCache;
pub use config::{ConfigError, ViewerConfig};
pub use decode::{DecodeError, DecodedImage, Decoder, ImageDecoder};
pub use driver::{FullscreenChange, HostEvent, HostNotifier, Viewer, ViewerError};
pub use gesture::{GestureState, Interaction, Interactions};
pub use render::{Backend, RegistrationError, RenderError, Renderer};
pub use viewport::{ViewportState, clamp_to_canvas_edge};
