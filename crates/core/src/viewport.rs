use img_viewer_protocol::{Rect, Size};
use tracing::debug;

use crate::config::ViewerConfig;
use crate::gesture::{GestureState, Interaction};

/// Where the image sits on the canvas and how far it is zoomed.
///
/// `dest` always has the image's native size scaled by `zoom_level`. Along
/// an axis where `dest` is smaller than the canvas the image is centered;
/// along an axis where it is at least as large, the image edges never move
/// inside the canvas edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom_level: f64,
    /// Destination rectangle in canvas pixels.
    pub dest: Rect,
    pub canvas: Size,
    /// Native pixel size of the loaded image; zero while nothing is loaded.
    pub image: Size,
}

impl ViewportState {
    pub fn new(canvas: Size) -> Self {
        Self {
            zoom_level: 1.0,
            dest: Rect::default(),
            canvas,
            image: Size::default(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_drawable()
    }

    /// Switch to a new image and fit it to the canvas.
    pub fn set_image(&mut self, image: Size) {
        self.image = image;
        self.fit_to_canvas();
    }

    /// Switch to a new canvas size and refit the current image, if any.
    pub fn set_canvas(&mut self, canvas: Size) {
        self.canvas = canvas;
        self.fit_to_canvas();
    }

    /// Pick the zoom that shows the whole image and center it.
    ///
    /// The limiting axis decides: an image wider (relative to the canvas)
    /// than it is tall fills the canvas width and is letterboxed vertically.
    pub fn fit_to_canvas(&mut self) {
        if !self.has_image() {
            return;
        }
        let scale_x = self.canvas.w / self.image.w;
        let scale_y = self.canvas.h / self.image.h;
        self.zoom_level = scale_x.min(scale_y);
        self.resize_dest();
        self.dest.x = centered(self.canvas.w, self.dest.w);
        self.dest.y = centered(self.canvas.h, self.dest.h);
        debug!(
            zoom = self.zoom_level,
            width = self.dest.w,
            height = self.dest.h,
            "fit image to canvas"
        );
    }

    /// Run one frame of zooming followed by panning.
    pub fn step(&mut self, gesture: &GestureState, config: &ViewerConfig) {
        self.apply_zoom(gesture, config);
        self.apply_pan(gesture);
    }

    /// Zoom by one step per requested direction, anchored on the pointer.
    ///
    /// A step that would reach or pass the configured bound is dropped rather
    /// than clamped, so the zoom level only ever takes values on the
    /// `fit × increment^n` ladder. Returns whether any zoom was requested.
    pub fn apply_zoom(&mut self, gesture: &GestureState, config: &ViewerConfig) -> bool {
        let flags = gesture.flags;
        if !flags.is_zooming() {
            return false;
        }
        let old_zoom = self.zoom_level;

        if flags.contains(Interaction::ZoomIn) {
            let candidate = self.zoom_level * config.zoom_increment;
            if candidate < config.max_zoom {
                self.zoom_level = candidate;
            }
            self.resize_dest();
        }
        if flags.contains(Interaction::ZoomOut) {
            let candidate = self.zoom_level / config.zoom_increment;
            if candidate > config.min_zoom {
                self.zoom_level = candidate;
            }
            self.zoom_level = self.zoom_level.max(0.0);
            self.resize_dest();
        }

        let growth = self.zoom_level / old_zoom - 1.0;
        let pointer = gesture.pointer_current;
        self.dest.x = anchor_axis(
            self.dest.x,
            pointer.x,
            growth,
            self.canvas.w,
            self.dest.w,
        );
        self.dest.y = anchor_axis(
            self.dest.y,
            pointer.y,
            growth,
            self.canvas.h,
            self.dest.h,
        );
        true
    }

    /// Follow the pointer while panning. Axes where the image fits inside
    /// the canvas do not move.
    pub fn apply_pan(&mut self, gesture: &GestureState) {
        if !gesture.flags.contains(Interaction::Panning) {
            return;
        }
        let delta = gesture.delta();
        self.dest.x = clamp_to_canvas_edge(
            self.dest.x,
            self.dest.x + delta.x,
            self.canvas.w,
            self.dest.w,
        );
        self.dest.y = clamp_to_canvas_edge(
            self.dest.y,
            self.dest.y + delta.y,
            self.canvas.h,
            self.dest.h,
        );
    }

    fn resize_dest(&mut self) {
        let size = self.image.scaled(self.zoom_level);
        self.dest.w = size.w;
        self.dest.h = size.h;
    }
}

/// Constrain a move of an image edge along one axis.
///
/// `pos` is the current leading-edge position, `new_pos` the requested one.
/// When the content is smaller than the canvas the axis belongs to
/// centering and `pos` is returned unchanged. Otherwise the leading edge may
/// not pass `0` and the trailing edge may not pass `canvas_dim`.
pub fn clamp_to_canvas_edge(pos: f64, new_pos: f64, canvas_dim: f64, content_dim: f64) -> f64 {
    if content_dim < canvas_dim {
        return pos;
    }
    let min_pos = canvas_dim - content_dim;
    if new_pos > 0.0 {
        0.0
    } else if new_pos < min_pos {
        min_pos
    } else {
        new_pos
    }
}

fn centered(canvas_dim: f64, content_dim: f64) -> f64 {
    (canvas_dim - content_dim) / 2.0
}

/// Re-place one axis after a zoom step so the content point under `pointer`
/// stays put.
fn anchor_axis(pos: f64, pointer: f64, growth: f64, canvas_dim: f64, content_dim: f64) -> f64 {
    if content_dim < canvas_dim {
        centered(canvas_dim, content_dim)
    } else {
        let new_pos = pos - (pointer - pos) * growth;
        clamp_to_canvas_edge(pos, new_pos, canvas_dim, content_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_viewer_protocol::{InputEvent, Point};

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn viewport(canvas: (f64, f64), image: (f64, f64)) -> ViewportState {
        let mut vp = ViewportState::new(Size::new(canvas.0, canvas.1));
        vp.set_image(Size::new(image.0, image.1));
        vp
    }

    fn gesture(events: &[InputEvent], canvas: Size) -> GestureState {
        let mut g = GestureState::default();
        g.aggregate(events, canvas, 0.002);
        g
    }

    fn zoom_in() -> GestureState {
        gesture(&[InputEvent::Wheel { delta_y: 1.0 }], Size::default())
    }

    fn zoom_out() -> GestureState {
        gesture(&[InputEvent::Wheel { delta_y: -1.0 }], Size::default())
    }

    #[test]
    fn clamp_leaves_small_content_alone() {
        assert_eq!(clamp_to_canvas_edge(50.0, -300.0, 800.0, 400.0), 50.0);
    }

    #[test]
    fn clamp_rules_for_large_content() {
        // canvas 800, content 1000: valid positions are [-200, 0]
        assert_eq!(clamp_to_canvas_edge(-10.0, 25.0, 800.0, 1000.0), 0.0);
        assert_eq!(clamp_to_canvas_edge(-10.0, -250.0, 800.0, 1000.0), -200.0);
        assert_eq!(clamp_to_canvas_edge(-10.0, -120.0, 800.0, 1000.0), -120.0);
        // equal sizes pin the content at zero
        assert_eq!(clamp_to_canvas_edge(0.0, 40.0, 800.0, 800.0), 0.0);
        assert_eq!(clamp_to_canvas_edge(0.0, -40.0, 800.0, 800.0), 0.0);
    }

    #[test]
    fn fit_picks_limiting_axis() {
        let vp = viewport((800.0, 600.0), (1600.0, 300.0));
        assert_eq!(vp.zoom_level, 0.5);
        assert_eq!(vp.dest, Rect::new(0.0, 225.0, 800.0, 150.0));
    }

    #[test]
    fn fit_upscales_small_images() {
        let vp = viewport((800.0, 600.0), (100.0, 100.0));
        assert_eq!(vp.zoom_level, 6.0);
        assert_eq!(vp.dest, Rect::new(100.0, 0.0, 600.0, 600.0));
    }

    #[test]
    fn fit_without_image_is_noop() {
        let mut vp = ViewportState::new(Size::new(800.0, 600.0));
        vp.fit_to_canvas();
        assert_eq!(vp.zoom_level, 1.0);
        assert_eq!(vp.dest, Rect::default());
    }

    #[test]
    fn zoom_in_past_max_is_rejected_not_clamped() {
        let mut vp = viewport((1000.0, 1000.0), (100.0, 100.0));
        vp.zoom_level = 1.3;
        vp.apply_zoom(&zoom_in(), &ViewerConfig::default());
        assert_eq!(vp.zoom_level, 1.3);
        assert!(approx(vp.dest.w, 130.0));
        assert!(approx(vp.dest.h, 130.0));
    }

    #[test]
    fn zoom_out_past_min_is_rejected() {
        let mut vp = viewport((1000.0, 1000.0), (100.0, 100.0));
        vp.zoom_level = 0.21;
        vp.apply_zoom(&zoom_out(), &ViewerConfig::default());
        assert_eq!(vp.zoom_level, 0.21);
    }

    #[test]
    fn repeated_steps_stay_within_bounds() {
        let config = ViewerConfig::default();
        let mut vp = viewport((500.0, 500.0), (1000.0, 1000.0));
        assert_eq!(vp.zoom_level, 0.5);
        for _ in 0..40 {
            vp.apply_zoom(&zoom_in(), &config);
            assert!(vp.zoom_level >= config.min_zoom && vp.zoom_level <= config.max_zoom);
        }
        assert!(vp.zoom_level * config.zoom_increment >= config.max_zoom);
        for _ in 0..80 {
            vp.apply_zoom(&zoom_out(), &config);
            assert!(vp.zoom_level >= config.min_zoom && vp.zoom_level <= config.max_zoom);
        }
        assert!(vp.zoom_level / config.zoom_increment <= config.min_zoom);
    }

    #[test]
    fn both_flags_apply_in_then_out() {
        let config = ViewerConfig::default();
        let mut vp = viewport((500.0, 500.0), (1000.0, 1000.0));
        let g = gesture(
            &[
                InputEvent::Wheel { delta_y: -1.0 },
                InputEvent::Wheel { delta_y: 1.0 },
            ],
            vp.canvas,
        );
        vp.apply_zoom(&g, &config);
        assert!(approx(vp.zoom_level, 0.5));
    }

    #[test]
    fn smaller_axis_stays_centered_after_zoom() {
        let config = ViewerConfig::default();
        let mut vp = viewport((800.0, 600.0), (1600.0, 300.0));
        for _ in 0..3 {
            vp.apply_zoom(&zoom_out(), &config);
            assert!(vp.dest.w < vp.canvas.w);
            assert!(approx(vp.dest.x, (vp.canvas.w - vp.dest.w) / 2.0));
            assert!(approx(vp.dest.y, (vp.canvas.h - vp.dest.h) / 2.0));
        }
    }

    #[test]
    fn zoom_keeps_pixel_under_pointer() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        let mut g = gesture(
            &[
                InputEvent::PointerMove { x: 400.0, y: 200.0 },
                InputEvent::Wheel { delta_y: 1.0 },
            ],
            vp.canvas,
        );
        let before = image_coord(&vp, g.pointer_current);
        vp.apply_zoom(&g, &config);
        let after = image_coord(&vp, g.pointer_current);
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));

        g.aggregate(&[InputEvent::Wheel { delta_y: 1.0 }], vp.canvas, 0.002);
        let before = image_coord(&vp, g.pointer_current);
        vp.apply_zoom(&g, &config);
        let after = image_coord(&vp, g.pointer_current);
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    fn image_coord(vp: &ViewportState, p: Point) -> Point {
        Point::new(
            (p.x - vp.dest.x) / vp.zoom_level,
            (p.y - vp.dest.y) / vp.zoom_level,
        )
    }

    #[test]
    fn zoom_from_exact_fill() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        assert_eq!(vp.zoom_level, 0.5);
        assert_eq!(vp.dest, Rect::new(0.0, 0.0, 1000.0, 500.0));

        let g = gesture(
            &[
                InputEvent::PointerMove { x: 500.0, y: 250.0 },
                InputEvent::Wheel { delta_y: 1.0 },
            ],
            vp.canvas,
        );
        vp.apply_zoom(&g, &config);
        assert!(approx(vp.zoom_level, 0.55));
        assert!(approx(vp.dest.w, 1100.0));
        assert!(approx(vp.dest.h, 550.0));
        assert!(approx(vp.dest.x, -50.0));
        assert!(approx(vp.dest.y, -25.0));
    }

    #[test]
    fn zoom_anchored_at_origin_stays_at_origin() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        vp.apply_zoom(&zoom_in(), &config);
        assert!(approx(vp.dest.x, 0.0));
        assert!(approx(vp.dest.y, 0.0));
    }

    #[test]
    fn pan_never_exposes_a_gap() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        vp.apply_zoom(&zoom_in(), &config);
        vp.apply_zoom(&zoom_in(), &config);

        let moves = [(300.0, 300.0), (-2000.0, -900.0), (40.0, 10.0), (5000.0, 5000.0)];
        let mut g = gesture(&[InputEvent::mouse_down()], vp.canvas);
        for (x, y) in moves {
            g.aggregate(&[InputEvent::PointerMove { x, y }], vp.canvas, 0.002);
            vp.apply_pan(&g);
            assert!(vp.dest.x <= EPS);
            assert!(vp.dest.x >= vp.canvas.w - vp.dest.w - EPS);
            assert!(vp.dest.y <= EPS);
            assert!(vp.dest.y >= vp.canvas.h - vp.dest.h - EPS);
        }
    }

    #[test]
    fn pan_follows_pointer_within_bounds() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        vp.apply_zoom(&zoom_in(), &config);
        let mut g = gesture(
            &[
                InputEvent::PointerMove { x: 100.0, y: 100.0 },
                InputEvent::mouse_down(),
            ],
            vp.canvas,
        );
        g.aggregate(&[InputEvent::PointerMove { x: 70.0, y: 80.0 }], vp.canvas, 0.002);
        vp.apply_pan(&g);
        assert!(approx(vp.dest.x, -30.0));
        assert!(approx(vp.dest.y, -20.0));
    }

    #[test]
    fn pan_is_dropped_on_axis_that_fits() {
        let mut vp = viewport((800.0, 600.0), (1600.0, 300.0));
        let before = vp.dest;
        let mut g = gesture(&[InputEvent::mouse_down()], vp.canvas);
        g.aggregate(&[InputEvent::PointerMove { x: 0.0, y: 90.0 }], vp.canvas, 0.002);
        vp.apply_pan(&g);
        assert_eq!(vp.dest.y, before.y);
    }

    #[test]
    fn no_pan_without_panning_flag() {
        let config = ViewerConfig::default();
        let mut vp = viewport((1000.0, 500.0), (2000.0, 1000.0));
        vp.apply_zoom(&zoom_in(), &config);
        let before = vp.dest;
        let g = gesture(&[InputEvent::PointerMove { x: -80.0, y: -80.0 }], vp.canvas);
        vp.step(&g, &config);
        assert_eq!(vp.dest, before);
    }
}
