use futures_channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use img_viewer_protocol::{InputEvent, RenderCommand, Size, TextureId};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::decode::{DecodeError, DecodedImage, Decoder, ImageDecoder};
use crate::gesture::GestureState;
use crate::render::{Backend, RenderError, Renderer};
use crate::viewport::ViewportState;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
    #[error("canvas size {width}x{height} is not drawable")]
    InvalidCanvas { width: f64, height: f64 },
}

/// Fullscreen transition reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FullscreenChange {
    /// The canvas now covers a screen of this size.
    Entered { screen: Size },
    /// Back to the windowed canvas size.
    Exited,
}

/// Canvas notifications that may arrive between any two ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Resize(Size),
    Fullscreen(FullscreenChange),
}

/// Cloneable handle for posting [`HostEvent`]s to a [`Viewer`] from host
/// callbacks. Posted events are applied at the start of the next tick.
#[derive(Debug, Clone)]
pub struct HostNotifier {
    tx: UnboundedSender<HostEvent>,
}

impl HostNotifier {
    pub fn resize(&self, canvas: Size) {
        self.post(HostEvent::Resize(canvas));
    }

    pub fn fullscreen(&self, change: FullscreenChange) {
        self.post(HostEvent::Fullscreen(change));
    }

    pub fn post(&self, event: HostEvent) {
        if self.tx.unbounded_send(event).is_err() {
            debug!(?event, "viewer gone, dropping host event");
        }
    }
}

enum DriverState {
    Idle,
    Displaying { image: DecodedImage, texture: TextureId },
}

/// Frame driver: owns the viewport, the gesture state and the renderer, and
/// advances them once per host frame.
pub struct Viewer<B: Backend, D: Decoder = ImageDecoder> {
    backend: B,
    decoder: D,
    renderer: B::Renderer,
    config: ViewerConfig,
    state: DriverState,
    viewport: ViewportState,
    gesture: GestureState,
    /// Canvas size to return to when leaving fullscreen.
    windowed: Size,
    fullscreen: bool,
    notifier: HostNotifier,
    inbox: UnboundedReceiver<HostEvent>,
}

impl<B: Backend> Viewer<B> {
    pub fn new(backend: B, canvas: Size, config: ViewerConfig) -> Result<Self, ViewerError> {
        Self::with_decoder(backend, ImageDecoder, canvas, config)
    }
}

impl<B: Backend, D: Decoder> Viewer<B, D> {
    /// Create the renderer for `canvas` and start in the idle state.
    pub fn with_decoder(
        mut backend: B,
        decoder: D,
        canvas: Size,
        config: ViewerConfig,
    ) -> Result<Self, ViewerError> {
        check_canvas(canvas)?;
        let renderer = backend.create_renderer(canvas)?;
        watch_fullscreen(&mut backend);
        let (tx, inbox) = unbounded();
        info!(width = canvas.w, height = canvas.h, "viewer ready");
        Ok(Self {
            backend,
            decoder,
            renderer,
            config,
            state: DriverState::Idle,
            viewport: ViewportState::new(canvas),
            gesture: GestureState::default(),
            windowed: canvas,
            fullscreen: false,
            notifier: HostNotifier { tx },
            inbox,
        })
    }

    pub fn notifier(&self) -> HostNotifier {
        self.notifier.clone()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn renderer(&self) -> &B::Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut B::Renderer {
        &mut self.renderer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_displaying(&self) -> bool {
        matches!(self.state, DriverState::Displaying { .. })
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Size the canvas returns to when fullscreen ends.
    pub fn windowed_size(&self) -> Size {
        self.windowed
    }

    /// Decode `bytes` and show the result, replacing the current image.
    ///
    /// On failure nothing changes: the previous image, texture and viewport
    /// stay as they were.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), ViewerError> {
        let image = self.decoder.decode(bytes).inspect_err(|e| {
            warn!(error = %e, len = bytes.len(), "image decode failed");
        })?;
        let texture = self.renderer.upload_texture(&image)?;
        if let DriverState::Displaying { texture: old, .. } = self.state {
            self.renderer.release_texture(old);
        }
        let size = image.size();
        self.state = DriverState::Displaying { image, texture };
        self.viewport.set_image(size);
        info!(
            width = size.w,
            height = size.h,
            zoom = self.viewport.zoom_level,
            "image loaded"
        );
        Ok(())
    }

    /// The windowed canvas changed size.
    pub fn resize(&mut self, canvas: Size) -> Result<(), ViewerError> {
        check_canvas(canvas)?;
        if !self.fullscreen {
            self.recreate_canvas(canvas)?;
        }
        self.windowed = canvas;
        Ok(())
    }

    pub fn fullscreen_changed(&mut self, change: FullscreenChange) -> Result<(), ViewerError> {
        match change {
            FullscreenChange::Entered { screen } => {
                self.recreate_canvas(screen)?;
                self.fullscreen = true;
            }
            FullscreenChange::Exited => {
                self.recreate_canvas(self.windowed)?;
                self.fullscreen = false;
            }
        }
        info!(fullscreen = self.fullscreen, "fullscreen changed");
        Ok(())
    }

    pub fn handle_host_event(&mut self, event: HostEvent) -> Result<(), ViewerError> {
        match event {
            HostEvent::Resize(canvas) => self.resize(canvas),
            HostEvent::Fullscreen(change) => self.fullscreen_changed(change),
        }
    }

    /// Advance one frame: apply pending host events, fold `events` into the
    /// gesture state, zoom, pan, and draw.
    ///
    /// A failed canvas change leaves the viewer on its previous canvas. The
    /// frame still consumes `events` and draws; the first such error is
    /// returned afterwards.
    pub fn tick(&mut self, events: &[InputEvent]) -> Result<(), ViewerError> {
        let mut failed = None;
        while let Ok(Some(event)) = self.inbox.try_next() {
            if let Err(e) = self.handle_host_event(event) {
                warn!(error = %e, "host event rejected");
                failed.get_or_insert(e);
            }
        }

        self.gesture
            .aggregate(events, self.viewport.canvas, self.config.pinch_threshold);
        if self.is_displaying() {
            self.viewport.step(&self.gesture, &self.config);
        }

        let commands = self.frame_commands();
        self.renderer.submit(&commands);
        failed.map_or(Ok(()), Err)
    }

    /// Render commands for the current state.
    pub fn frame_commands(&self) -> Vec<RenderCommand> {
        let mut commands = Vec::with_capacity(3);
        commands.push(RenderCommand::Clear {
            color: self.config.background,
        });
        if let DriverState::Displaying { texture, .. } = self.state {
            commands.push(RenderCommand::DrawTexture {
                texture,
                dest: self.viewport.dest,
            });
        }
        commands.push(RenderCommand::Present);
        commands
    }

    /// Rebuild everything tied to the canvas size: renderer, texture,
    /// fullscreen listener and fit. The old renderer stays in place until the
    /// new one holds the current image.
    fn recreate_canvas(&mut self, canvas: Size) -> Result<(), ViewerError> {
        check_canvas(canvas)?;
        let mut renderer = self.backend.create_renderer(canvas)?;
        if let DriverState::Displaying { image, texture } = &mut self.state {
            let uploaded = renderer.upload_texture(image)?;
            self.renderer.release_texture(*texture);
            *texture = uploaded;
        }
        self.renderer = renderer;
        watch_fullscreen(&mut self.backend);
        self.viewport.set_canvas(canvas);
        debug!(width = canvas.w, height = canvas.h, "canvas recreated");
        Ok(())
    }
}

fn check_canvas(canvas: Size) -> Result<(), ViewerError> {
    if canvas.is_drawable() {
        Ok(())
    } else {
        Err(ViewerError::InvalidCanvas {
            width: canvas.w,
            height: canvas.h,
        })
    }
}

fn watch_fullscreen<B: Backend>(backend: &mut B) {
    if let Err(e) = backend.watch_fullscreen() {
        warn!(error = %e, "continuing without fullscreen change handling");
    }
}
