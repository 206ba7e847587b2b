#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }
}

/// Axis-aligned box described by its center and full extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vector2D,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn centered(center: Vector2D, width: f64, height: f64) -> Self {
        Rect { center, width, height }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.height / 2.0
    }
}

/// Boxes that merely share an edge do not overlap.
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

pub fn clamp_coordinate(value: f64, max: f64) -> f64 {
    value.max(0.0).min(max)
}
