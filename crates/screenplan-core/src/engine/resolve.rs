//! Position resolver: relative placement to absolute rectangles, and the
//! bottom-up bounding-box pass.
//!
//! Resolution is two-staged.  Displays are first resolved inside their
//! screen, which fixes each screen's size; screens are then resolved against
//! each other, carrying their displays along.  Running the stages in the
//! other order would place screens using stale sizes.
//!
//! The relative graph is not checked for cycles up front.  Each top-level
//! resolve keeps a visited list; when it meets an entity twice, that entity
//! is treated as absolute at its stored position and a warning is logged.

use tracing::{debug, warn};

use crate::domain::geometry::{Point, Rect, Size};
use crate::domain::layout::{DisplayId, Layout, MetaMode, ScreenId};
use crate::domain::placement::Placement;

// ── Single-entity resolution ──────────────────────────────────────────────────

/// Absolute panning domain of `display` in metamode `metamode`.
///
/// Absolute modes return their stored `pan`.  Relative modes resolve their
/// reference in the same metamode and attach to it.
pub fn resolve_display(layout: &Layout, display: DisplayId, metamode: usize) -> Option<Rect> {
    let mut visited = Vec::new();
    resolve_display_inner(layout, display, metamode, &mut visited)
}

fn resolve_display_inner(
    layout: &Layout,
    id: DisplayId,
    metamode: usize,
    visited: &mut Vec<DisplayId>,
) -> Option<Rect> {
    let mode = layout.display(id)?.mode(metamode)?;
    let mut rect = mode.pan;

    if let Placement::Relative { relation, to } = mode.placement {
        if visited.contains(&id) {
            warn!(display = %id, metamode, "cycle in display placement, using stored position");
            return Some(rect);
        }
        visited.push(id);
        match resolve_display_inner(layout, to, metamode, visited) {
            Some(reference) => {
                let origin = relation.place(rect.size(), &reference);
                rect.x = origin.x;
                rect.y = origin.y;
            }
            None => warn!(display = %id, reference = %to, "relative display reference missing"),
        }
    }
    Some(rect)
}

/// Absolute bounding box of `screen` from screen-to-screen placement.
pub fn resolve_screen(layout: &Layout, screen: ScreenId) -> Option<Rect> {
    let mut visited = Vec::new();
    resolve_screen_inner(layout, screen, &mut visited)
}

fn resolve_screen_inner(
    layout: &Layout,
    screen: ScreenId,
    visited: &mut Vec<ScreenId>,
) -> Option<Rect> {
    let s = layout.screen(screen)?;
    let mut rect = s.dim;

    if let Placement::Relative { relation, to } = s.placement {
        if visited.contains(&screen) {
            warn!(%screen, "cycle in screen placement, using stored position");
            return Some(rect);
        }
        visited.push(screen);
        match resolve_screen_inner(layout, to, visited) {
            Some(reference) => {
                let origin = relation.place(rect.size(), &reference);
                rect.x = origin.x;
                rect.y = origin.y;
            }
            None => warn!(%screen, reference = %to, "relative screen reference missing"),
        }
    }
    Some(rect)
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// Resolves the displays of `screen` and writes the results into each mode's
/// `pan`.  Only the current metamode is touched unless `all_metamodes`.
///
/// The affected metamode boxes and the screen box are recomputed afterwards.
pub fn resolve_displays_in_screen(layout: &mut Layout, screen: ScreenId, all_metamodes: bool) {
    let Some(s) = layout.screen(screen) else {
        return;
    };
    let metamodes = if all_metamodes {
        0..s.metamodes.len()
    } else {
        s.cur_metamode..s.cur_metamode + 1
    };
    let displays = s.displays.clone();

    for m in metamodes {
        let resolved: Vec<(DisplayId, Rect)> = displays
            .iter()
            .filter_map(|&d| resolve_display(layout, d, m).map(|r| (d, r)))
            .collect();
        for (d, mut rect) in resolved {
            rect.clamp_min_extent();
            if let Some(mode) = layout.displays[d.0].modes.get_mut(m) {
                mode.pan = rect;
            }
        }
    }
    calc_screen(layout, screen);
}

/// Moves `screen` to its resolved position, carrying its displays along.
pub fn resolve_screen_in_layout(layout: &mut Layout, screen: ScreenId) {
    let Some(previous) = layout.screen(screen).map(|s| s.dim) else {
        return;
    };
    let Some(resolved) = resolve_screen(layout, screen) else {
        return;
    };
    offset_screen(layout, screen, resolved.x - previous.x, resolved.y - previous.y);
}

/// Resolves every screen's displays, then every screen against each other.
pub fn resolve_layout(layout: &mut Layout) {
    let screens: Vec<ScreenId> = layout.screen_ids().collect();
    for &s in &screens {
        resolve_displays_in_screen(layout, s, true);
    }
    for &s in &screens {
        resolve_screen_in_layout(layout, s);
    }
}

// ── Bounding boxes ────────────────────────────────────────────────────────────

/// Recomputes `dim` and `edim` of metamode `metamode` of `screen`.
///
/// A metamode with no displays collapses to an empty box at the screen's corner.
pub fn calc_metamode(layout: &mut Layout, screen: ScreenId, metamode: usize) {
    let Some(s) = layout.screen(screen) else {
        return;
    };
    let mut dim: Option<Rect> = None;
    let mut edim: Option<Rect> = None;
    for &d in &s.displays {
        let Some(mode) = layout.displays.get(d.0).and_then(|d| d.mode(metamode)) else {
            continue;
        };
        dim = Some(dim.map_or(mode.pan, |r| r.union(&mode.pan)));
        if !mode.is_off() {
            edim = Some(edim.map_or(mode.pan, |r| r.union(&mode.pan)));
        }
    }
    let dim = dim.unwrap_or_else(|| Rect::from_parts(s.dim.origin(), Size::default()));

    if let Some(mm) = layout.screens[screen.0].metamodes.get_mut(metamode) {
        *mm = MetaMode { dim, edim };
    }
}

/// Recomputes every metamode of `screen`, then the screen's own box.
///
/// A no-scanout screen keeps its virtual size; a screen with no displays
/// keeps its corner and collapses to zero size.
pub fn calc_screen(layout: &mut Layout, screen: ScreenId) {
    let Some(count) = layout.screen(screen).map(|s| s.metamodes.len()) else {
        return;
    };
    for m in 0..count {
        calc_metamode(layout, screen, m);
    }

    let s = &mut layout.screens[screen.0];
    if s.no_scanout {
        return;
    }
    if s.displays.is_empty() {
        s.dim = Rect::from_parts(s.dim.origin(), Size::default());
        return;
    }
    if let Some(dim) = Rect::union_all(s.metamodes.iter().map(|mm| &mm.dim)) {
        s.dim = dim;
    }
}

/// Recomputes the layout box from every screen and prime display, then lays
/// out disabled displays in a row to the right of it.
///
/// The disabled row is for presentation only; it grows the layout box so
/// that renderers can fit everything on one canvas.
pub fn calc_layout(layout: &mut Layout) {
    let screens: Vec<ScreenId> = layout.screen_ids().collect();
    for &s in &screens {
        calc_screen(layout, s);
    }

    let mut dim = layout.placed_extent();

    let disabled: Vec<DisplayId> = layout.disabled_displays().collect();
    let mut x = dim.right();
    let y = dim.y;
    for d in disabled {
        if let Some(mode) = layout.displays[d.0].current_mode_mut() {
            mode.pan.x = x;
            mode.pan.y = y;
            x += mode.pan.width;
            dim = dim.union(&mode.pan);
        }
    }
    layout.dim = dim;
}

// ── Alignment ─────────────────────────────────────────────────────────────────

/// Shifts every metamode of `screen` so its corner matches the screen box's
/// corner.  Returns `true` if anything moved.
///
/// Layouts with prime displays keep absolute placement and are never realigned.
pub fn realign_screen(layout: &mut Layout, screen: ScreenId) -> bool {
    if layout.has_prime_displays() {
        return false;
    }
    calc_screen(layout, screen);
    let Some(s) = layout.screen(screen) else {
        return false;
    };
    if s.no_scanout || s.displays.is_empty() {
        return false;
    }
    let corner = s.dim.origin();
    let shifts: Vec<(usize, i32, i32)> = s
        .metamodes
        .iter()
        .enumerate()
        .map(|(m, mm)| (m, corner.x - mm.dim.x, corner.y - mm.dim.y))
        .filter(|&(_, dx, dy)| dx != 0 || dy != 0)
        .collect();
    if shifts.is_empty() {
        return false;
    }

    let displays = s.displays.clone();
    for (m, dx, dy) in shifts {
        debug!(%screen, metamode = m, dx, dy, "realigning metamode");
        for &d in &displays {
            if let Some(mode) = layout.displays[d.0].modes.get_mut(m) {
                mode.pan.offset(dx, dy);
            }
        }
    }
    calc_screen(layout, screen);
    true
}

/// Re-resolves the displays of `screen` and moves the screen back to the
/// corner it had before.
pub fn reposition_screen(layout: &mut Layout, screen: ScreenId, all_metamodes: bool) {
    let Some(corner) = layout.screen(screen).map(|s| s.dim.origin()) else {
        return;
    };
    resolve_displays_in_screen(layout, screen, all_metamodes);
    if let Some(now) = layout.screen(screen).map(|s| s.dim.origin()) {
        offset_screen(layout, screen, corner.x - now.x, corner.y - now.y);
    }
}

/// Moves `screen`, its metamode boxes and every mode of every display by `(dx, dy)`.
pub fn offset_screen(layout: &mut Layout, screen: ScreenId, dx: i32, dy: i32) {
    if dx == 0 && dy == 0 {
        return;
    }
    let Some(s) = layout.screens.get_mut(screen.0) else {
        return;
    };
    s.dim.offset(dx, dy);
    for mm in &mut s.metamodes {
        mm.dim.offset(dx, dy);
        if let Some(edim) = mm.edim.as_mut() {
            edim.offset(dx, dy);
        }
    }
    for &d in &s.displays {
        if let Some(display) = layout.displays.get_mut(d.0) {
            for mode in &mut display.modes {
                mode.pan.offset(dx, dy);
            }
        }
    }
}

/// Shifts the whole layout so its box starts at (0, 0).  Returns `true` if
/// anything moved.  Skipped for layouts with prime displays.
pub fn normalize_origin(layout: &mut Layout) -> bool {
    if layout.has_prime_displays() {
        return false;
    }
    let corner = layout.dim.origin();
    if corner == Point::default() {
        return false;
    }
    let (dx, dy) = (-corner.x, -corner.y);
    let screens: Vec<ScreenId> = layout.screen_ids().collect();
    for s in screens {
        offset_screen(layout, s, dx, dy);
    }
    let disabled: Vec<DisplayId> = layout.disabled_displays().collect();
    for d in disabled {
        for mode in &mut layout.displays[d.0].modes {
            mode.pan.offset(dx, dy);
        }
    }
    layout.dim.offset(dx, dy);
    debug!(dx, dy, "normalized layout origin");
    true
}

/// Full pass run after every edit.
///
/// Returns the offset applied by origin normalization, `(0, 0)` when none.
pub fn refresh_layout(layout: &mut Layout) -> (i32, i32) {
    resolve_layout(layout);

    if !layout.has_prime_displays() {
        let screens: Vec<ScreenId> = layout.screen_ids().collect();
        let mut realigned = false;
        for &s in &screens {
            realigned |= realign_screen(layout, s);
        }
        if realigned {
            for &s in &screens {
                resolve_screen_in_layout(layout, s);
            }
        }
    }

    calc_layout(layout);
    let corner = layout.dim.origin();
    if normalize_origin(layout) {
        (-corner.x, -corner.y)
    } else {
        (0, 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
