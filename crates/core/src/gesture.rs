use img_viewer_protocol::{InputEvent, Point, Size};

/// One kind of user interaction the viewport reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interaction {
    ZoomIn,
    ZoomOut,
    Panning,
}

/// Set of interactions active in the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interactions {
    zoom_in: bool,
    zoom_out: bool,
    panning: bool,
}

impl Interactions {
    fn slot(&mut self, interaction: Interaction) -> &mut bool {
        match interaction {
            Interaction::ZoomIn => &mut self.zoom_in,
            Interaction::ZoomOut => &mut self.zoom_out,
            Interaction::Panning => &mut self.panning,
        }
    }

    pub fn insert(&mut self, interaction: Interaction) {
        *self.slot(interaction) = true;
    }

    pub fn remove(&mut self, interaction: Interaction) {
        *self.slot(interaction) = false;
    }

    pub fn contains(&self, interaction: Interaction) -> bool {
        match interaction {
            Interaction::ZoomIn => self.zoom_in,
            Interaction::ZoomOut => self.zoom_out,
            Interaction::Panning => self.panning,
        }
    }

    /// Whether either zoom direction was requested.
    pub fn is_zooming(&self) -> bool {
        self.zoom_in || self.zoom_out
    }

    pub fn is_empty(&self) -> bool {
        !(self.zoom_in || self.zoom_out || self.panning)
    }
}

/// Per-frame gesture summary derived from the raw event queue.
///
/// Only `Panning` and the pointer position survive from one frame to the
/// next; zoom requests are re-derived every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub flags: Interactions,
    /// Pointer position at the end of the previous frame.
    pub pointer_last: Point,
    /// Latest pointer position seen this frame.
    pub pointer_current: Point,
}

impl GestureState {
    /// Reset per-frame state and fold one frame's events into it.
    ///
    /// `canvas` scales normalized touch coordinates to canvas pixels;
    /// pinch distance changes with a magnitude at or below
    /// `pinch_threshold` are ignored.
    pub fn aggregate<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a InputEvent>,
        canvas: Size,
        pinch_threshold: f64,
    ) {
        self.begin_frame();
        for event in events {
            self.apply(event, canvas, pinch_threshold);
        }
    }

    pub fn begin_frame(&mut self) {
        self.flags.remove(Interaction::ZoomIn);
        self.flags.remove(Interaction::ZoomOut);
        self.pointer_last = self.pointer_current;
    }

    pub fn apply(&mut self, event: &InputEvent, canvas: Size, pinch_threshold: f64) {
        match *event {
            InputEvent::PointerMove { x, y } => {
                self.pointer_current = Point::new(x, y);
            }
            InputEvent::PinchMove { x, y } => {
                self.pointer_current = Point::new(x, y).denormalize(canvas);
            }
            InputEvent::Wheel { delta_y } => {
                if delta_y > 0.0 {
                    self.flags.insert(Interaction::ZoomIn);
                }
                if delta_y < 0.0 {
                    self.flags.insert(Interaction::ZoomOut);
                }
            }
            InputEvent::PinchGesture { delta_distance } => {
                if delta_distance.abs() > pinch_threshold {
                    if delta_distance > 0.0 {
                        self.flags.insert(Interaction::ZoomIn);
                    } else if delta_distance < 0.0 {
                        self.flags.insert(Interaction::ZoomOut);
                    }
                }
            }
            InputEvent::PointerDown { touch } => {
                self.flags.insert(Interaction::Panning);
                // First pan frame after a touch begin has zero delta.
                if let Some(at) = touch {
                    let at = at.denormalize(canvas);
                    self.pointer_last = at;
                    self.pointer_current = at;
                }
            }
            InputEvent::PointerUp => {
                self.flags.remove(Interaction::Panning);
            }
            InputEvent::Other => {}
        }
    }

    /// Pointer movement since the previous frame.
    pub fn delta(&self) -> Point {
        Point::new(
            self.pointer_current.x - self.pointer_last.x,
            self.pointer_current.y - self.pointer_last.y,
        )
    }
}
