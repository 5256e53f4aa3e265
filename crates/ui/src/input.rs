use egui::{Event, Pos2, Rect, TouchPhase};
use img_viewer_protocol::InputEvent;

/// Translate this frame's egui events into the viewer's input vocabulary.
///
/// Pointer positions are made relative to `canvas`; touch positions are
/// normalized to `0..1` of it.
pub fn collect(ctx: &egui::Context, canvas: Rect) -> Vec<InputEvent> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| translate(event, canvas))
            .collect()
    })
}

pub fn translate(event: &Event, canvas: Rect) -> Option<InputEvent> {
    match event {
        Event::PointerMoved(pos) => Some(InputEvent::PointerMove {
            x: f64::from(pos.x - canvas.min.x),
            y: f64::from(pos.y - canvas.min.y),
        }),
        Event::PointerButton { pressed: true, .. } => Some(InputEvent::mouse_down()),
        Event::PointerButton { pressed: false, .. } => Some(InputEvent::PointerUp),
        Event::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
            delta_y: f64::from(delta.y),
        }),
        // Trackpad pinch and ctrl+wheel arrive as a multiplicative factor.
        Event::Zoom(factor) => Some(InputEvent::PinchGesture {
            delta_distance: f64::from(*factor - 1.0),
        }),
        Event::Touch { phase, pos, .. } => {
            let (x, y) = normalized(*pos, canvas);
            match phase {
                TouchPhase::Start => Some(InputEvent::touch_begin(x, y)),
                TouchPhase::Move => Some(InputEvent::PinchMove { x, y }),
                TouchPhase::End | TouchPhase::Cancel => Some(InputEvent::PointerUp),
            }
        }
        _ => None,
    }
}

fn normalized(pos: Pos2, canvas: Rect) -> (f64, f64) {
    let w = canvas.width().max(1.0);
    let h = canvas.height().max(1.0);
    (
        f64::from((pos.x - canvas.min.x) / w),
        f64::from((pos.y - canvas.min.y) / h),
    )
}
