//! Snap engine: pulls a tentative rectangle onto nearby edges and midlines.
//!
//! A [`Snapper`] keeps one "best distance so far" per axis.  Every candidate
//! offered during a drag step competes against it, so only the single closest
//! alignment per axis survives.  Distances of up to `strength` pixels count.

use crate::domain::geometry::{Rect, Size};
use crate::domain::layout::{
    DisplayId, Layout, ScreenId, MAX_LAYOUT_HEIGHT, MAX_LAYOUT_WIDTH,
};
use crate::domain::placement::{Placement, Relation};

use super::modify::Target;

/// Snap distance used when the caller has no preference.
pub const DEFAULT_SNAP_STRENGTH: i32 = 100;

/// The axes on which snapping is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axes {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Axes {
    pub const BOTH: Axes = Axes {
        horizontal: true,
        vertical: true,
    };
    pub const NONE: Axes = Axes {
        horizontal: false,
        vertical: false,
    };

    /// Axes pinned by `relation`.
    pub const fn pinned_by(relation: Relation) -> Axes {
        Axes {
            horizontal: relation.is_horizontal(),
            vertical: relation.is_vertical(),
        }
    }

    /// `self` with every axis of `other` switched off.
    pub const fn without(self, other: Axes) -> Axes {
        Axes {
            horizontal: self.horizontal && !other.horizontal,
            vertical: self.vertical && !other.vertical,
        }
    }

    pub const fn is_none(self) -> bool {
        !self.horizontal && !self.vertical
    }
}

/// Running per-axis best match for one drag step.
#[derive(Debug, Clone)]
pub struct Snapper {
    strength: i32,
    best_horizontal: i32,
    best_vertical: i32,
}

impl Snapper {
    pub fn new(strength: i32) -> Self {
        Self {
            strength,
            best_horizontal: strength + 1,
            best_vertical: strength + 1,
        }
    }

    /// `true` once some candidate matched on the horizontal axis.
    pub fn snapped_horizontally(&self) -> bool {
        self.best_horizontal <= self.strength
    }

    pub fn snapped_vertically(&self) -> bool {
        self.best_vertical <= self.strength
    }

    fn try_horizontal(&mut self, dist: i32) -> bool {
        let dist = dist.abs();
        if dist < self.best_horizontal {
            self.best_horizontal = dist;
            true
        } else {
            false
        }
    }

    fn try_vertical(&mut self, dist: i32) -> bool {
        let dist = dist.abs();
        if dist < self.best_vertical {
            self.best_vertical = dist;
            true
        } else {
            false
        }
    }

    /// Snaps the position of `src` against every edge and the midline of `cand`.
    ///
    /// Results are written to `dst.x` / `dst.y`.  Midlines only count when the
    /// two rectangles overlap on the other axis, give or take the strength.
    pub fn dim_to_dim(&mut self, dst: &mut Rect, src: &Rect, cand: &Rect, axes: Axes) {
        let s = self.strength;

        if axes.horizontal {
            if self.try_horizontal(src.x - cand.x) {
                dst.x = cand.x;
            }
            if self.try_horizontal(src.x - cand.right()) {
                dst.x = cand.right();
            }
            if self.try_horizontal(src.right() - cand.x) {
                dst.x = cand.x - src.width;
            }
            if self.try_horizontal(src.right() - cand.right()) {
                dst.x = cand.right() - src.width;
            }
            let overlaps = src.y <= cand.bottom() + s && src.bottom() >= cand.y - s;
            if overlaps && self.try_horizontal(src.center_x() - cand.center_x()) {
                dst.x = cand.center_x() - src.width / 2;
            }
        }

        if axes.vertical {
            if self.try_vertical(src.y - cand.y) {
                dst.y = cand.y;
            }
            if self.try_vertical(src.y - cand.bottom()) {
                dst.y = cand.bottom();
            }
            if self.try_vertical(src.bottom() - cand.y) {
                dst.y = cand.y - src.height;
            }
            if self.try_vertical(src.bottom() - cand.bottom()) {
                dst.y = cand.bottom() - src.height;
            }
            let overlaps = src.x <= cand.right() + s && src.right() >= cand.x - s;
            if overlaps && self.try_vertical(src.center_y() - cand.center_y()) {
                dst.y = cand.center_y() - src.height / 2;
            }
        }
    }

    /// Snaps the trailing (right/bottom) edge of `src` against `cand`'s edges
    /// by resizing; writes `dst.width` / `dst.height`.
    pub fn side_to_dim(&mut self, dst: &mut Rect, src: &Rect, cand: &Rect, axes: Axes) {
        if axes.horizontal {
            if self.try_horizontal(src.right() - cand.x) {
                dst.width = cand.x - src.x;
            }
            if self.try_horizontal(src.right() - cand.right()) {
                dst.width = cand.right() - src.x;
            }
        }
        if axes.vertical {
            if self.try_vertical(src.bottom() - cand.y) {
                dst.height = cand.y - src.y;
            }
            if self.try_vertical(src.bottom() - cand.bottom()) {
                dst.height = cand.bottom() - src.y;
            }
        }
    }

    /// Moves `src` so its far edges land on a ceiling at `(right, bottom)`.
    pub fn far_edge_to(&mut self, dst: &mut Rect, src: &Rect, right: i32, bottom: i32) {
        if self.try_horizontal(src.right() - right) {
            dst.x = right - src.width;
        }
        if self.try_vertical(src.bottom() - bottom) {
            dst.y = bottom - src.height;
        }
    }

    /// Resizes `src` so its far edges land on a ceiling at `(right, bottom)`.
    pub fn side_to(&mut self, dst: &mut Rect, src: &Rect, right: i32, bottom: i32) {
        if self.try_horizontal(src.right() - right) {
            dst.width = right - src.x;
        }
        if self.try_vertical(src.bottom() - bottom) {
            dst.height = bottom - src.y;
        }
    }

    /// Fits `src`'s size to the nearest multiple of `unit`, smaller or larger.
    pub fn size_to_multiple(&mut self, dst: &mut Rect, src: &Rect, unit: Size) {
        if unit.width > 0 {
            let rem = src.width % unit.width;
            if src.width - rem > 0 && self.try_horizontal(rem) {
                dst.width = src.width - rem;
            }
            if self.try_horizontal(unit.width - rem) {
                dst.width = src.width + (unit.width - rem);
            }
        }
        if unit.height > 0 {
            let rem = src.height % unit.height;
            if src.height - rem > 0 && self.try_vertical(rem) {
                dst.height = src.height - rem;
            }
            if self.try_vertical(unit.height - rem) {
                dst.height = src.height + (unit.height - rem);
            }
        }
    }
}

// ── Axis suppression ──────────────────────────────────────────────────────────

fn link_axes<Id: Copy + PartialEq>(placement: Placement<Id>, other: Id) -> Axes {
    match placement {
        Placement::Relative { relation, to } if to == other => Axes::pinned_by(relation),
        _ => Axes::NONE,
    }
}

/// Axes on which display `a` may snap against display `b` in metamode `metamode`.
fn display_axes(layout: &Layout, a: DisplayId, b: DisplayId, metamode: usize) -> Axes {
    let placement_of = |d: DisplayId| {
        layout
            .display(d)
            .and_then(|d| d.mode(metamode))
            .map_or(Placement::Absolute, |m| m.placement)
    };
    Axes::BOTH
        .without(link_axes(placement_of(a), b))
        .without(link_axes(placement_of(b), a))
}

/// Axes on which screen `a` may snap against screen `b`.
fn screen_axes(layout: &Layout, a: ScreenId, b: ScreenId) -> Axes {
    let placement_of =
        |s: ScreenId| layout.screen(s).map_or(Placement::Absolute, |s| s.placement);
    Axes::BOTH
        .without(link_axes(placement_of(a), b))
        .without(link_axes(placement_of(b), a))
}

// ── Candidate sets ────────────────────────────────────────────────────────────

/// Candidates shared by moves and pans: sibling displays, other screens and
/// prime displays, each with the axes it may snap on.
fn candidates(layout: &Layout, target: &Target) -> Vec<(Rect, Axes)> {
    let mut out = Vec::new();

    if let (Some(display), Some(screen)) = (target.display, layout.screen(target.screen)) {
        let metamode = screen.cur_metamode;
        for &other in screen.displays.iter().filter(|&&d| d != display) {
            let Some(mode) = layout.display(other).and_then(|d| d.mode(metamode)) else {
                continue;
            };
            let axes = display_axes(layout, display, other, metamode);
            out.push((mode.pan, axes));
            out.push((mode.viewport_in_rect(), axes));
        }
    }

    for (sid, screen) in layout.screens().filter(|(s, _)| *s != target.screen) {
        out.push((screen.dim, screen_axes(layout, target.screen, sid)));
    }

    for (_, prime) in layout.prime_displays() {
        out.push((prime.rect, Axes::BOTH));
    }
    out
}

/// Ceilings on the far edges: the screen's maximum size when the target is a
/// display, then the layout's maximum extent.
fn ceilings(layout: &Layout, target: &Target) -> Vec<(i32, i32)> {
    let mut out = Vec::with_capacity(2);
    if target.display.is_some() {
        if let Some(s) = layout.screen(target.screen) {
            out.push((s.dim.x + s.max_width, s.dim.y + s.max_height));
        }
    }
    let dim = layout.dim();
    out.push((dim.x + MAX_LAYOUT_WIDTH, dim.y + MAX_LAYOUT_HEIGHT));
    out
}

/// Snaps a moving target.  `src` is the tentative rectangle; the snapped
/// position is written to `dst`.
pub fn snap_move(layout: &Layout, target: &Target, src: &Rect, dst: &mut Rect, strength: i32) {
    let mut snapper = Snapper::new(strength);
    for (cand, axes) in candidates(layout, target) {
        if !axes.is_none() {
            snapper.dim_to_dim(dst, src, &cand, axes);
        }
    }
    for (right, bottom) in ceilings(layout, target) {
        snapper.far_edge_to(dst, src, right, bottom);
    }
}

/// Snaps a resizing target.  `src` is the tentative rectangle; the snapped
/// size is written to `dst`.
///
/// A display's panning domain first fits to multiples of its ViewPortIn.
pub fn snap_pan(layout: &Layout, target: &Target, src: &Rect, dst: &mut Rect, strength: i32) {
    let mut snapper = Snapper::new(strength);
    if let Some(viewport_in) = target
        .display
        .and_then(|d| layout.display(d))
        .and_then(|d| d.current_mode())
        .map(|m| m.viewport_in)
    {
        snapper.size_to_multiple(dst, src, viewport_in);
    }
    for (cand, axes) in candidates(layout, target) {
        if !axes.is_none() {
            snapper.side_to_dim(dst, src, &cand, axes);
        }
    }
    for (right, bottom) in ceilings(layout, target) {
        snapper.side_to(dst, src, right, bottom);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
