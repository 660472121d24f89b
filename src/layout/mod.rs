//! Spatial layout for the treemap: division trees, rectangle partitioning,
//! the path-keyed layout cache, and the viewport traversal that produces the
//! flat render list.

pub mod cache;
pub mod division;
pub mod engine;

pub use engine::{AreaEntry, TreeMap};

/// Prefer a horizontal split while `width * WIDTH_SPLIT_BIAS > height`.
/// Slightly above 1.0 so tiles come out a touch taller than square, reserving
/// vertical room for a label strip. Empirical value; tune, don't re-derive.
pub const WIDTH_SPLIT_BIAS: f64 = 1.02;

/// Minimum margined width and height (layout units) before a tile with
/// children is expanded another level.
pub const EXPAND_MIN_SIZE: f64 = 40.0;

/// Once this many entries have accumulated in a frame, tiles smaller than
/// `CULL_MIN_SIZE` in both dimensions are dropped (progressive detail cull).
pub const CULL_ENTRY_LIMIT: usize = 100;

/// See `CULL_ENTRY_LIMIT`.
pub const CULL_MIN_SIZE: f64 = 4.0;

/// Hard cap on traversal depth, bounding work on pathological hierarchies.
pub const MAX_LEVELS: u16 = 100;

/// Aspect-ratio drift beyond which the whole layout cache is discarded.
/// Hysteresis, not a correctness requirement.
pub const ASPECT_HYSTERESIS: f64 = 0.1;

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned rectangle, edge coordinates rather than origin + size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Rect { left, top, right, bottom }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether the two rectangles overlap (shared edges count as touching).
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Strict interior test; points on the border do not hit.
    pub fn contains_point(&self, p: Point) -> bool {
        self.left < p.x && p.x < self.right && self.top < p.y && p.y < self.bottom
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}

/// Per-level inset applied when descending into a tile's children, reserving
/// border and label space. Added component-wise, so `right`/`bottom` are
/// typically negative (a renderer might use `(8, 8 + font_size, -8, -8)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Margin { left, top, right, bottom }
    }

    pub fn apply(&self, r: &Rect) -> Rect {
        Rect {
            left: r.left + self.left,
            top: r.top + self.top,
            right: r.right + self.right,
            bottom: r.bottom + self.bottom,
        }
    }
}
