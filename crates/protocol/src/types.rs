use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale a point given in normalized `0..1` coordinates up to a surface
    /// of the given size.
    pub fn denormalize(self, size: Size) -> Self {
        Self {
            x: self.x * size.w,
            y: self.y * size.h,
        }
    }
}

/// Width and height in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            w: self.w * factor,
            h: self.h * factor,
        }
    }

    /// A size is usable as a drawing surface only when both sides are
    /// positive and finite.
    pub fn is_drawable(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormalize_scales_by_surface() {
        let p = Point::new(0.5, 0.25).denormalize(Size::new(800.0, 600.0));
        assert_eq!(p, Point::new(400.0, 150.0));
    }

    #[test]
    fn drawable_sizes() {
        assert!(Size::new(1.0, 1.0).is_drawable());
        assert!(!Size::new(0.0, 10.0).is_drawable());
        assert!(!Size::new(10.0, f64::NAN).is_drawable());
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert_eq!(r.size(), Size::new(20.0, 20.0));
    }
}
