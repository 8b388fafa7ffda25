//! Integer pixel geometry shared by every layout component.
//!
//! All coordinates live in "layout space": one unit is one pixel of the
//! combined desktop, X grows to the right and Y grows downward.  Widths and
//! heights are kept as `i32` so that edge arithmetic (`x + width`, `x - width`)
//! never needs a cast.

use serde::{Deserialize, Serialize};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns the size with width and height exchanged.
    pub const fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// An axis-aligned rectangle in layout space.
///
/// `x` and `y` are the top-left corner; `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from a corner and a size.
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// X coordinate of the vertical midline (integer halving, like the edges).
    pub const fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Y coordinate of the horizontal midline.
    pub const fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub const fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Unions every rectangle yielded by `rects`; `None` when the iterator is empty.
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(a) => Some(a.union(r)),
                None => Some(*r),
            })
    }

    /// Returns `true` if `point` lies strictly inside the rectangle.
    ///
    /// Points on any edge are outside; this is the hit-testing rule.
    pub const fn contains_strict(&self, point: Point) -> bool {
        point.x > self.x && point.y > self.y && point.x < self.right() && point.y < self.bottom()
    }

    /// Returns `true` if `point` lies inside the rectangle or on its border.
    pub const fn contains_inclusive(&self, point: Point) -> bool {
        point.x >= self.x && point.y >= self.y && point.x <= self.right() && point.y <= self.bottom()
    }

    /// Returns `true` if `other` lies entirely within `self`.
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Moves the rectangle in place.
    pub fn offset(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Returns a copy moved by `(dx, dy)`.
    pub const fn translated(self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows width/height up to `min` on each axis, keeping the origin.
    pub fn floor_size(&mut self, min: Size) {
        self.width = self.width.max(min.width);
        self.height = self.height.max(min.height);
    }

    /// Clamps width and height to at least one pixel.
    pub fn clamp_min_extent(&mut self) {
        self.floor_size(Size::new(1, 1));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
