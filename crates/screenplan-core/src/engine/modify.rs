//! Modification engine: turns drag deltas and typed-in coordinates into
//! updated positions and sizes.
//!
//! Every operation resolves a [`Target`] first.  Prime displays, disabled
//! displays and displays without a current mode have no target, and the
//! operation is a silent no-op reporting `false`.  Every operation that does
//! run finishes with [`refresh_layout`] and reports whether the target's
//! placement or final rectangle changed.

use tracing::debug;

use crate::domain::entity::EntityRef;
use crate::domain::geometry::{Point, Rect, Size};
use crate::domain::layout::{
    DisplayId, DisplayPlacement, Layout, ScreenId, ScreenPlacement, MAX_LAYOUT_HEIGHT,
    MAX_LAYOUT_WIDTH, MIN_SCREEN_HEIGHT, MIN_SCREEN_WIDTH,
};
use crate::domain::placement::{Placement, Relation};

use super::resolve::{calc_metamode, offset_screen, refresh_layout, reposition_screen};
use super::snap::{snap_move, snap_pan, DEFAULT_SNAP_STRENGTH};

/// Per-session editing preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    /// Maximum snap distance in pixels; `0` disables snapping.
    pub snap_strength: i32,
    /// When set, placement edits touch only the current metamode.
    pub advanced_mode: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            snap_strength: DEFAULT_SNAP_STRENGTH,
            advanced_mode: false,
        }
    }
}

/// Scratch state carried across the steps of one drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragState {
    /// Unsnapped, unclamped rectangle the deltas accumulate into.
    pub modify: Rect,
    /// Absolute pointer position, used to classify relative placement.
    pub pointer: Point,
}

impl DragState {
    /// A drag anchored on `rect` with the pointer at its center.
    pub fn anchored(rect: Rect) -> Self {
        Self {
            modify: rect,
            pointer: rect.center(),
        }
    }

    /// A drag anchored on what an edit of `entity` changes: a display's
    /// panning domain or a screen's own box, without its prime displays.
    pub fn for_entity(layout: &Layout, entity: EntityRef) -> Self {
        let rect = Target::of(layout, entity)
            .and_then(|t| t.rect(layout))
            .or_else(|| entity.rect(layout))
            .unwrap_or_default();
        Self::anchored(rect)
    }
}

/// The entity an edit applies to.  `display` is `None` for screen edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub display: Option<DisplayId>,
    pub screen: ScreenId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Display(DisplayPlacement),
    Screen(ScreenPlacement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TargetState {
    anchor: Anchor,
    rect: Rect,
}

impl Target {
    /// The editable target behind `entity`, if there is one.
    pub fn of(layout: &Layout, entity: EntityRef) -> Option<Target> {
        match entity {
            EntityRef::Display(id) => {
                let display = layout.display(id)?;
                let screen = display.screen?;
                layout.screen(screen)?;
                display.current_mode()?;
                Some(Target {
                    display: Some(id),
                    screen,
                })
            }
            EntityRef::Screen(id) => {
                layout.screen(id)?;
                Some(Target {
                    display: None,
                    screen: id,
                })
            }
            EntityRef::Prime(_) => None,
        }
    }

    fn state(&self, layout: &Layout) -> Option<TargetState> {
        match self.display {
            Some(d) => {
                let mode = layout.display(d)?.current_mode()?;
                Some(TargetState {
                    anchor: Anchor::Display(mode.placement),
                    rect: mode.pan,
                })
            }
            None => {
                let screen = layout.screen(self.screen)?;
                Some(TargetState {
                    anchor: Anchor::Screen(screen.placement),
                    rect: screen.dim,
                })
            }
        }
    }

    fn rect(&self, layout: &Layout) -> Option<Rect> {
        self.state(layout).map(|s| s.rect)
    }

    /// Runs the refresh pass and reports whether the target differs from
    /// `before`.  A shift of the whole layout by origin normalization does
    /// not count as a change of the target.
    fn refresh_and_compare(
        &self,
        layout: &mut Layout,
        before: TargetState,
        drag: Option<&mut DragState>,
    ) -> bool {
        let (sx, sy) = refresh_layout(layout);
        if let Some(drag) = drag {
            drag.modify.offset(sx, sy);
            drag.pointer.x += sx;
            drag.pointer.y += sy;
        }
        match self.state(layout) {
            Some(after) => {
                after.anchor != before.anchor || after.rect.translated(-sx, -sy) != before.rect
            }
            None => true,
        }
    }
}

// ── Clamping ──────────────────────────────────────────────────────────────────

/// Caps `value` at `max`, pulling `modify` back by the overshoot.
fn clamp_max(value: &mut i32, max: i32, modify: &mut i32) {
    if *value > max {
        *modify -= *value - max;
        *value = max;
    }
}

/// Raises `value` to `min`, pushing `modify` forward by the undershoot.
fn clamp_min(value: &mut i32, min: i32, modify: &mut i32) {
    if *value < min {
        *modify += min - *value;
        *value = min;
    }
}

// ── Move ──────────────────────────────────────────────────────────────────────

/// Moves `entity` by `(dx, dy)`.
///
/// Relatively placed targets change their relation according to where the
/// pointer ends up; absolutely placed ones move, snapping when `snap` is set
/// and the strength is positive, and are clamped to every size ceiling.
pub fn move_entity(
    layout: &mut Layout,
    entity: EntityRef,
    drag: &mut DragState,
    options: &EditOptions,
    dx: i32,
    dy: i32,
    snap: bool,
) -> bool {
    if dx == 0 && dy == 0 {
        return false;
    }
    let Some(target) = Target::of(layout, entity) else {
        return false;
    };
    let Some(before) = target.state(layout) else {
        return false;
    };

    drag.pointer.x += dx;
    drag.pointer.y += dy;

    match before.anchor {
        Anchor::Display(Placement::Relative { to, .. }) => {
            move_relative_display(layout, &target, to, drag.pointer, options);
        }
        Anchor::Screen(Placement::Relative { to, .. }) => {
            move_relative_screen(layout, &target, to, drag.pointer);
        }
        Anchor::Display(Placement::Absolute) | Anchor::Screen(Placement::Absolute) => {
            move_absolute(layout, &target, before.rect, drag, options, dx, dy, snap);
        }
    }

    let modified = target.refresh_and_compare(layout, before, Some(drag));
    debug!(%entity, dx, dy, modified, "moved");
    modified
}

fn move_relative_display(
    layout: &mut Layout,
    target: &Target,
    to: DisplayId,
    pointer: Point,
    options: &EditOptions,
) {
    let Some(display) = target.display else {
        return;
    };
    let Some(reference) = layout
        .display(to)
        .and_then(|d| d.current_mode())
        .map(|m| m.pan)
    else {
        return;
    };
    let relation = Relation::classify(&reference, pointer);
    set_display_relation(layout, display, Placement::Relative { relation, to }, options);
    reposition_screen(layout, target.screen, !options.advanced_mode);
}

fn move_relative_screen(layout: &mut Layout, target: &Target, to: ScreenId, pointer: Point) {
    let Some(reference) = layout.screen(to).map(|s| s.dim) else {
        return;
    };
    let relation = Relation::classify(&reference, pointer);
    if let Some(s) = layout.screen_mut(target.screen) {
        s.placement = Placement::Relative { relation, to };
    }
}

/// Stores `placement` on the current mode, or on every mode in basic mode.
fn set_display_relation(
    layout: &mut Layout,
    display: DisplayId,
    placement: DisplayPlacement,
    options: &EditOptions,
) {
    let Some(d) = layout.display_mut(display) else {
        return;
    };
    if options.advanced_mode {
        if let Some(mode) = d.current_mode_mut() {
            mode.placement = placement;
        }
    } else {
        for mode in &mut d.modes {
            mode.placement = placement;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn move_absolute(
    layout: &mut Layout,
    target: &Target,
    orig: Rect,
    drag: &mut DragState,
    options: &EditOptions,
    dx: i32,
    dy: i32,
    snap: bool,
) {
    drag.modify.offset(dx, dy);
    let tentative = Rect::from_parts(drag.modify.origin(), orig.size());
    let mut dst = tentative;

    if snap && options.snap_strength > 0 {
        snap_move(layout, target, &tentative, &mut dst, options.snap_strength);
    }

    // Layout extent.
    let dim = layout.placed_extent();
    clamp_max(&mut dst.x, dim.x + MAX_LAYOUT_WIDTH - orig.width, &mut drag.modify.x);
    clamp_max(&mut dst.y, dim.y + MAX_LAYOUT_HEIGHT - orig.height, &mut drag.modify.y);
    clamp_min(&mut dst.x, dim.right() - MAX_LAYOUT_WIDTH, &mut drag.modify.x);
    clamp_min(&mut dst.y, dim.bottom() - MAX_LAYOUT_HEIGHT, &mut drag.modify.y);

    // Screen ceiling.
    if target.display.is_some() {
        if let Some(s) = layout.screen(target.screen) {
            let sdim = s.dim;
            clamp_max(&mut dst.x, sdim.x + s.max_width - orig.width, &mut drag.modify.x);
            clamp_max(&mut dst.y, sdim.y + s.max_height - orig.height, &mut drag.modify.y);
            clamp_min(&mut dst.x, sdim.right() - s.max_width, &mut drag.modify.x);
            clamp_min(&mut dst.y, sdim.bottom() - s.max_height, &mut drag.modify.y);
        }
    }

    if layout.has_prime_displays() {
        clamp_min(&mut dst.x, 0, &mut drag.modify.x);
        clamp_min(&mut dst.y, 0, &mut drag.modify.y);
    }

    let (mx, my) = (dst.x - orig.x, dst.y - orig.y);
    if mx == 0 && my == 0 {
        return;
    }

    match target.display {
        Some(display) => move_display_pan(layout, display, target.screen, dst.origin()),
        None => offset_screen(layout, target.screen, mx, my),
    }
}

/// Puts the current mode of `display` at `origin`.
///
/// When the screen is absolute, the absolute modes of the other metamodes
/// follow the shift of the current metamode's box so realignment keeps them
/// in place relative to the rest of the screen.
fn move_display_pan(layout: &mut Layout, display: DisplayId, screen: ScreenId, origin: Point) {
    let Some(s) = layout.screen(screen) else {
        return;
    };
    let cur = s.cur_metamode;
    let screen_absolute = s.placement.is_absolute();
    let old_dim = s.metamodes.get(cur).map(|mm| mm.dim);

    if let Some(mode) = layout.display_mut(display).and_then(|d| d.current_mode_mut()) {
        mode.pan.x = origin.x;
        mode.pan.y = origin.y;
    }
    if !screen_absolute {
        return;
    }

    calc_metamode(layout, screen, cur);
    let Some(s) = layout.screen(screen) else {
        return;
    };
    let (Some(old), Some(new)) = (old_dim, s.metamodes.get(cur).map(|mm| mm.dim)) else {
        return;
    };
    let (sx, sy) = (new.x - old.x, new.y - old.y);
    if sx == 0 && sy == 0 {
        return;
    }
    let displays = s.displays.clone();
    for d in displays {
        let Some(d) = layout.display_mut(d) else {
            continue;
        };
        for (m, mode) in d.modes.iter_mut().enumerate() {
            if m != cur && mode.placement.is_absolute() {
                mode.pan.offset(sx, sy);
            }
        }
    }
}

// ── Pan ───────────────────────────────────────────────────────────────────────

/// Resizes the panning domain of a display, or the virtual size of a
/// no-scanout screen, by `(dx, dy)`.
///
/// Screens that drive displays cannot be resized this way.
pub fn pan_entity(
    layout: &mut Layout,
    entity: EntityRef,
    drag: &mut DragState,
    options: &EditOptions,
    dx: i32,
    dy: i32,
    snap: bool,
) -> bool {
    if dx == 0 && dy == 0 {
        return false;
    }
    let Some(target) = Target::of(layout, entity) else {
        return false;
    };
    let min = match target.display {
        Some(d) => match layout.display(d).and_then(|d| d.current_mode()) {
            Some(mode) => mode.viewport_in,
            None => return false,
        },
        None => match layout.screen(target.screen) {
            Some(s) if s.no_scanout => Size::new(MIN_SCREEN_WIDTH, MIN_SCREEN_HEIGHT),
            _ => return false,
        },
    };
    let Some(before) = target.state(layout) else {
        return false;
    };
    let orig = before.rect;

    drag.pointer.x += dx;
    drag.pointer.y += dy;
    drag.modify.width += dx;
    drag.modify.height += dy;

    let mut tentative = Rect::from_parts(orig.origin(), drag.modify.size());
    tentative.floor_size(min);
    let mut dst = tentative;

    if snap && options.snap_strength > 0 {
        snap_pan(layout, &target, &tentative, &mut dst, options.snap_strength);
    }

    let dim = layout.placed_extent();
    let max_width = dim.x + MAX_LAYOUT_WIDTH - dst.x;
    clamp_max(&mut dst.width, max_width, &mut drag.modify.width);
    clamp_max(&mut dst.height, dim.y + MAX_LAYOUT_HEIGHT - dst.y, &mut drag.modify.height);

    if target.display.is_some() {
        if let Some(s) = layout.screen(target.screen) {
            let (limit_w, limit_h) = (s.dim.x + s.max_width - dst.x, s.dim.y + s.max_height - dst.y);
            clamp_max(&mut dst.width, limit_w, &mut drag.modify.width);
            clamp_max(&mut dst.height, limit_h, &mut drag.modify.height);
        }
    }
    dst.floor_size(min);

    match target.display {
        Some(d) => {
            if let Some(mode) = layout.display_mut(d).and_then(|d| d.current_mode_mut()) {
                mode.pan.width = dst.width;
                mode.pan.height = dst.height;
            }
        }
        None => {
            if let Some(s) = layout.screen_mut(target.screen) {
                // Multiple of 8, rounded down when rounding up would overflow.
                let rounded = (dst.width + 7) & !7;
                s.dim.width = if rounded > max_width {
                    dst.width & !7
                } else {
                    rounded
                };
                s.dim.height = dst.height;
            }
        }
    }

    let modified = target.refresh_and_compare(layout, before, Some(drag));
    debug!(%entity, dx, dy, modified, "panned");
    modified
}

// ── Setters ───────────────────────────────────────────────────────────────────

/// Places `display` absolutely at `(x, y)` or relative to a sibling.
///
/// A relative placement must reference another display of the same screen.
pub fn set_display_position(
    layout: &mut Layout,
    display: DisplayId,
    placement: DisplayPlacement,
    x: i32,
    y: i32,
    options: &EditOptions,
) -> bool {
    let entity = EntityRef::Display(display);
    let Some(target) = Target::of(layout, entity) else {
        return false;
    };
    let Some(before) = target.state(layout) else {
        return false;
    };

    match placement {
        Placement::Absolute => {
            set_display_relation(layout, display, Placement::Absolute, options);
            let (dx, dy) = (x - before.rect.x, y - before.rect.y);
            if dx == 0 && dy == 0 {
                return target.refresh_and_compare(layout, before, None);
            }
            let detached = !matches!(before.anchor, Anchor::Display(Placement::Absolute));
            let mut drag = DragState::anchored(before.rect);
            let moved = move_entity(layout, entity, &mut drag, options, dx, dy, false);
            detached || moved
        }
        Placement::Relative { to, .. } => {
            let same_screen = layout
                .display(to)
                .is_some_and(|o| o.screen == Some(target.screen));
            if to == display || !same_screen {
                return false;
            }
            set_display_relation(layout, display, placement, options);
            reposition_screen(layout, target.screen, !options.advanced_mode);
            target.refresh_and_compare(layout, before, None)
        }
    }
}

/// Places `screen` absolutely at `(x, y)` or relative to another screen.
pub fn set_screen_position(
    layout: &mut Layout,
    screen: ScreenId,
    placement: ScreenPlacement,
    x: i32,
    y: i32,
    options: &EditOptions,
) -> bool {
    let entity = EntityRef::Screen(screen);
    let Some(target) = Target::of(layout, entity) else {
        return false;
    };
    let Some(before) = target.state(layout) else {
        return false;
    };

    if let Placement::Relative { to, .. } = placement {
        if to == screen || layout.screen(to).is_none() {
            return false;
        }
    }
    if let Some(s) = layout.screen_mut(screen) {
        s.placement = placement;
    }

    let (dx, dy) = (x - before.rect.x, y - before.rect.y);
    if placement.is_absolute() && (dx != 0 || dy != 0) {
        let detached = before.anchor != Anchor::Screen(Placement::Absolute);
        let mut drag = DragState::anchored(before.rect);
        let moved = move_entity(layout, entity, &mut drag, options, dx, dy, false);
        detached || moved
    } else {
        target.refresh_and_compare(layout, before, None)
    }
}

/// Sets the panning domain size of `display`.  Floored to its ViewPortIn.
pub fn set_display_panning(
    layout: &mut Layout,
    display: DisplayId,
    width: i32,
    height: i32,
    options: &EditOptions,
) -> bool {
    resize_to(layout, EntityRef::Display(display), Size::new(width, height), options)
}

/// Sets the virtual size of a no-scanout `screen`.
pub fn set_screen_virtual_size(
    layout: &mut Layout,
    screen: ScreenId,
    width: i32,
    height: i32,
    options: &EditOptions,
) -> bool {
    resize_to(layout, EntityRef::Screen(screen), Size::new(width, height), options)
}

fn resize_to(layout: &mut Layout, entity: EntityRef, size: Size, options: &EditOptions) -> bool {
    let Some(rect) = Target::of(layout, entity).and_then(|t| t.rect(layout)) else {
        return false;
    };
    let mut drag = DragState::anchored(rect);
    pan_entity(
        layout,
        entity,
        &mut drag,
        options,
        size.width - rect.width,
        size.height - rect.height,
        false,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
