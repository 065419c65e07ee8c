//! Coordinate transformation between viewport and document space
//!
//! Document coordinates are unscaled page units with a top-left origin. The
//! viewport shows the page at a zoom `scale`, so one document unit spans
//! `scale` viewport pixels. Rotation is applied to each field region about
//! its own center, matching how the page renderer rotates overlay elements.

use serde::{Deserialize, Serialize};
use shared_types::{FormField, Point};

/// Quarter-turn rotation of the displayed page, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalise any multiple of 90 degrees, negative values included
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// The next quarter turn clockwise, wrapping 270 back to 0
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// The rotation that undoes this one
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    // Exact (cos, sin) so quarter turns don't accumulate float error
    fn cos_sin(self) -> (f64, f64) {
        match self {
            Rotation::Deg0 => (1.0, 0.0),
            Rotation::Deg90 => (0.0, 1.0),
            Rotation::Deg180 => (-1.0, 0.0),
            Rotation::Deg270 => (0.0, -1.0),
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90 degrees, got {}", degrees))
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// An axis-aligned rectangle in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}

/// Convert a viewport point to unscaled document coordinates
pub fn viewport_to_document(point: Point, scale: f64) -> Point {
    Point::new(point.x / scale, point.y / scale)
}

/// Convert a document point to viewport pixels at `scale`
pub fn document_to_viewport(point: Point, scale: f64) -> Point {
    Point::new(point.x * scale, point.y * scale)
}

/// Where `field` is drawn at `scale`, before rotation
pub fn field_rect(field: &FormField, scale: f64) -> ScreenRect {
    ScreenRect {
        x: field.x * scale,
        y: field.y * scale,
        width: field.width * scale,
        height: field.height * scale,
    }
}

/// Rotate `point` clockwise about `origin` (y axis pointing down)
pub fn rotate_about(point: Point, origin: Point, rotation: Rotation) -> Point {
    let (cos, sin) = rotation.cos_sin();
    let dx = point.x - origin.x;
    let dy = point.y - origin.y;
    Point::new(
        origin.x + dx * cos - dy * sin,
        origin.y + dx * sin + dy * cos,
    )
}

/// Hit test against `rect` drawn rotated about its center
pub fn contains_rotated(rect: &ScreenRect, rotation: Rotation, point: Point) -> bool {
    let local = rotate_about(point, rect.center(), rotation.inverse());
    rect.contains(local)
}

/// Axis-aligned bounds of `rect` after rotation about its center
pub fn rotated_bounds(rect: &ScreenRect, rotation: Rotation) -> ScreenRect {
    match rotation {
        Rotation::Deg0 | Rotation::Deg180 => *rect,
        Rotation::Deg90 | Rotation::Deg270 => {
            let center = rect.center();
            ScreenRect {
                x: center.x - rect.height / 2.0,
                y: center.y - rect.width / 2.0,
                width: rect.height,
                height: rect.width,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::field::create_field;
    use shared_types::FieldType;

    #[test]
    fn test_viewport_to_document_unscales() {
        let p = viewport_to_document(Point::new(300.0, 150.0), 1.5);
        assert!((p.x - 200.0).abs() < 1e-9);
        assert!((p.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_at_double_zoom() {
        let p = viewport_to_document(Point::new(220.0, 110.0), 2.0);
        assert_eq!(p, Point::new(110.0, 55.0));
        assert_eq!(document_to_viewport(p, 2.0), Point::new(220.0, 110.0));
    }

    #[test]
    fn test_field_rect_scales_everything() {
        let field = create_field(FieldType::Signature, Point::new(100.0, 40.0), 1, 1);
        let rect = field_rect(&field, 2.0);
        assert_eq!(
            rect,
            ScreenRect {
                x: 200.0,
                y: 80.0,
                width: 400.0,
                height: 120.0
            }
        );
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_rotation_cycles_every_four_turns() {
        let mut r = Rotation::Deg0;
        let mut seen = vec![];
        for _ in 0..4 {
            r = r.next();
            seen.push(r.degrees());
        }
        assert_eq!(seen, vec![90, 180, 270, 0]);
    }

    #[test]
    fn test_rotation_serde_as_degrees() {
        assert_eq!(serde_json::to_string(&Rotation::Deg180).unwrap(), "180");
        let r: Rotation = serde_json::from_str("270").unwrap();
        assert_eq!(r, Rotation::Deg270);
        assert!(serde_json::from_str::<Rotation>("30").is_err());
    }

    #[test]
    fn test_rotate_quarter_turn_clockwise() {
        // With y pointing down, a point to the right of the origin moves below it
        let p = rotate_about(Point::new(10.0, 0.0), Point::new(0.0, 0.0), Rotation::Deg90);
        assert_eq!(p, Point::new(0.0, 10.0));
    }

    #[test]
    fn test_rotated_hit_test() {
        // 200x60 region centered at (200, 130)
        let rect = ScreenRect {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 60.0,
        };
        let wide = Point::new(280.0, 130.0);
        let tall = Point::new(200.0, 200.0);

        assert!(contains_rotated(&rect, Rotation::Deg0, wide));
        assert!(!contains_rotated(&rect, Rotation::Deg0, tall));
        // Rotated a quarter turn, the region stands upright
        assert!(!contains_rotated(&rect, Rotation::Deg90, wide));
        assert!(contains_rotated(&rect, Rotation::Deg90, tall));
    }
}
