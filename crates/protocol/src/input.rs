use serde::{Deserialize, Serialize};

use crate::types::Point;

/// One raw input event, with mouse and touch devices folded into a single
/// vocabulary.
///
/// Hosts translate whatever their windowing layer reports into a sequence of
/// these and hand one frame's worth to the viewer per tick. Over the WASM
/// boundary they travel as internally tagged JSON:
///
/// ```text
/// {"type":"pointer_move","x":12.0,"y":40.0}
/// {"type":"pointer_down","touch":{"x":0.5,"y":0.5}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Mouse moved; coordinates are canvas pixels.
    PointerMove { x: f64, y: f64 },
    /// Touch point moved; coordinates are normalized to `0..1` of the canvas.
    PinchMove { x: f64, y: f64 },
    /// Scroll wheel. Positive `delta_y` zooms in.
    Wheel { delta_y: f64 },
    /// Multi-finger pinch. Positive `delta_distance` means fingers spread.
    PinchGesture { delta_distance: f64 },
    /// Button press or touch begin. Touch begins carry the normalized
    /// position of the finger.
    PointerDown {
        #[serde(default)]
        touch: Option<Point>,
    },
    /// Button release or touch end.
    PointerUp,
    /// Anything the host forwarded that the viewer has no use for.
    #[serde(other)]
    Other,
}

impl InputEvent {
    pub fn touch_begin(x: f64, y: f64) -> Self {
        Self::PointerDown {
            touch: Some(Point::new(x, y)),
        }
    }

    pub fn mouse_down() -> Self {
        Self::PointerDown { touch: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[
                {"type":"pointer_move","x":1.0,"y":2.0},
                {"type":"wheel","delta_y":-3.0},
                {"type":"pointer_down","touch":{"x":0.5,"y":0.25}},
                {"type":"pointer_down"},
                {"type":"pointer_up"}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::PointerMove { x: 1.0, y: 2.0 },
                InputEvent::Wheel { delta_y: -3.0 },
                InputEvent::touch_begin(0.5, 0.25),
                InputEvent::mouse_down(),
                InputEvent::PointerUp,
            ]
        );
    }

    #[test]
    fn unknown_kind_becomes_other() {
        let ev: InputEvent = serde_json::from_str(r#"{"type":"key_down"}"#).unwrap();
        assert_eq!(ev, InputEvent::Other);
    }
}
