//! Axis-aligned bounding boxes.

/// Rectangle in world coordinates. Expected to satisfy `left <= right` and
/// `top <= bottom`; [`Aabb::intersects`] does not check it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Aabb {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Box of a `width` x `height` actor whose top-left corner is `(x, y)`.
    pub fn from_position(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Separating-axis test. Boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let ax = other.left - self.right;
        let ay = other.top - self.bottom;
        let bx = self.left - other.right;
        let by = self.top - other.bottom;

        !(ax >= 0.0 || ay >= 0.0 || bx >= 0.0 || by >= 0.0)
    }
}
