//! Relative positioning: how one display (or screen) is placed against another.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size};

/// The side of a reference rectangle an entity is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Left edge on the reference's right edge, tops aligned.
    RightOf,
    /// Right edge on the reference's left edge, tops aligned.
    LeftOf,
    /// Bottom edge on the reference's top edge, left edges aligned.
    Above,
    /// Top edge on the reference's bottom edge, left edges aligned.
    Below,
    /// Same top-left corner as the reference (a clone).
    Inside,
}

impl Relation {
    /// Computes the top-left corner of a rectangle of size `own` attached to
    /// `reference` by this relation.
    pub const fn place(self, own: Size, reference: &Rect) -> Point {
        match self {
            Relation::RightOf => Point::new(reference.right(), reference.y),
            Relation::LeftOf => Point::new(reference.x - own.width, reference.y),
            Relation::Above => Point::new(reference.x, reference.y - own.height),
            Relation::Below => Point::new(reference.x, reference.bottom()),
            Relation::Inside => Point::new(reference.x, reference.y),
        }
    }

    /// `true` if the relation pins the X coordinate.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Relation::RightOf | Relation::LeftOf | Relation::Inside)
    }

    /// `true` if the relation pins the Y coordinate.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Relation::Above | Relation::Below | Relation::Inside)
    }

    /// Classifies `point` against `reference`.
    ///
    /// Points inside the rectangle (edges included) are [`Relation::Inside`].
    /// Elsewhere the plane is split by the rectangle's two diagonals, extended
    /// to infinity, into four wedges: top, right, bottom and left.
    pub fn classify(reference: &Rect, point: Point) -> Relation {
        if reference.contains_inclusive(point) {
            return Relation::Inside;
        }

        let x = f64::from(point.x);
        let y = f64::from(point.y);
        let width = f64::from(reference.width.max(1));
        let height = f64::from(reference.height.max(1));

        // Diagonal from top-left to bottom-right, and its mirror from
        // bottom-left to top-right.
        let m1 = height / width;
        let b1 = f64::from(reference.y) - m1 * f64::from(reference.x);
        let m2 = -m1;
        let b2 = f64::from(reference.y) + height - m2 * f64::from(reference.x);

        // Positive means the point is above the line (Y grows downward).
        let above_main = m1 * x + b1 - y > 0.0;
        let above_anti = m2 * x + b2 - y > 0.0;

        match (above_main, above_anti) {
            (true, true) => Relation::Above,
            (true, false) => Relation::RightOf,
            (false, true) => Relation::LeftOf,
            (false, false) => Relation::Below,
        }
    }
}

/// Where an entity sits: at its own stored coordinates, or attached to
/// another entity of the same kind.
///
/// `Id` is [`DisplayId`](super::layout::DisplayId) for modes and
/// [`ScreenId`](super::layout::ScreenId) for screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement<Id> {
    Absolute,
    Relative { relation: Relation, to: Id },
}

impl<Id: Copy> Placement<Id> {
    pub const fn is_absolute(&self) -> bool {
        matches!(self, Placement::Absolute)
    }

    /// The entity this placement depends on, if any.
    pub fn reference(&self) -> Option<Id> {
        match self {
            Placement::Absolute => None,
            Placement::Relative { to, .. } => Some(*to),
        }
    }

    pub fn relation(&self) -> Option<Relation> {
        match self {
            Placement::Absolute => None,
            Placement::Relative { relation, .. } => Some(*relation),
        }
    }

    /// Replaces the relation while keeping the reference.  Absolute stays absolute.
    pub fn with_relation(self, relation: Relation) -> Self {
        match self {
            Placement::Absolute => Placement::Absolute,
            Placement::Relative { to, .. } => Placement::Relative { relation, to },
        }
    }
}

impl<Id> Default for Placement<Id> {
    fn default() -> Self {
        Placement::Absolute
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
