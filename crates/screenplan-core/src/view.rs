//! `LayoutView` – the editing session the outer layers talk to.
//!
//! A view owns one [`Layout`], its Z-order and selection, the scratch state
//! of the current drag, and the observers that want to hear about changes.
//! Every public operation leaves the layout fully resolved.

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entity::EntityRef;
use crate::domain::geometry::Point;
use crate::domain::layout::{DisplayId, DisplayPlacement, Layout, PrimeId, ScreenId, ScreenPlacement};
use crate::engine::modify::{self, DragState, EditOptions};
use crate::engine::resolve::refresh_layout;
use crate::engine::zorder::ZOrder;

/// Receives change notifications from a [`LayoutView`].
#[cfg_attr(test, mockall::automock)]
pub trait LayoutObserver {
    /// The layout changed; geometry is already resolved.
    fn on_modified(&mut self, layout: &Layout);

    /// The selection changed.
    fn on_selected(&mut self, selection: Option<EntityRef>);
}

/// One editing session over a layout.
pub struct LayoutView {
    session_id: Uuid,
    layout: Layout,
    zorder: ZOrder,
    drag: DragState,
    options: EditOptions,
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl LayoutView {
    /// Resolves `layout`, builds the Z-order and selects the default entity.
    pub fn new(layout: Layout, options: EditOptions) -> Self {
        let mut view = Self {
            session_id: Uuid::new_v4(),
            layout,
            zorder: ZOrder::new(),
            drag: DragState::default(),
            options,
            observers: Vec::new(),
        };
        view.rebuild();
        info!(
            session = %view.session_id,
            entities = view.zorder.entries().len(),
            "layout session started"
        );
        view
    }

    fn rebuild(&mut self) {
        refresh_layout(&mut self.layout);
        self.zorder.clear_selection();
        self.zorder.rebuild(&self.layout);
        self.zorder.select_default(&self.layout);
        self.reseed(None);
    }

    /// Recomputes the drag state from the live selection.  The pointer goes
    /// to `pointer`, or to the center of the selected entity.
    fn reseed(&mut self, pointer: Option<Point>) {
        self.drag = self
            .zorder
            .selected()
            .map(|e| DragState::for_entity(&self.layout, e))
            .unwrap_or_default();
        if let Some(p) = pointer {
            self.drag.pointer = p;
        }
    }

    fn notify_modified(&mut self) {
        for observer in &mut self.observers {
            observer.on_modified(&self.layout);
        }
    }

    fn notify_selected(&mut self) {
        let selection = self.zorder.selected();
        for observer in &mut self.observers {
            observer.on_selected(selection);
        }
    }

    // ── Session ───────────────────────────────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Mutable access for structural edits.  Call [`recalculate`](Self::recalculate) afterwards.
    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Replaces the whole layout.  Nothing of the old one is kept.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.rebuild();
        debug!(session = %self.session_id, "layout replaced");
        self.notify_modified();
        self.notify_selected();
    }

    /// Re-resolves the layout after a structural change and rebuilds the Z-order.
    ///
    /// The selection survives when its entity still exists.
    pub fn recalculate(&mut self) {
        let previous = self.zorder.selected();
        refresh_layout(&mut self.layout);
        self.zorder.rebuild(&self.layout);
        let kept = previous.is_some_and(|e| self.zorder.select(&self.layout, e));
        if !kept {
            self.zorder.select_default(&self.layout);
        }
        self.reseed(None);
        debug!(session = %self.session_id, kept, "layout recalculated");
        self.notify_modified();
        if self.zorder.selected() != previous {
            self.notify_selected();
        }
    }

    pub fn options(&self) -> EditOptions {
        self.options
    }

    pub fn set_options(&mut self, options: EditOptions) {
        self.options = options;
    }

    pub fn add_observer(&mut self, observer: Box<dyn LayoutObserver>) {
        self.observers.push(observer);
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<EntityRef> {
        self.zorder.selected()
    }

    /// Entities front to back.
    pub fn z_order(&self) -> &[EntityRef] {
        self.zorder.entries()
    }

    pub fn back_to_front(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.zorder.back_to_front()
    }

    pub fn hit_test(&self, point: Point) -> Option<EntityRef> {
        self.zorder.hit_test(&self.layout, point)
    }

    /// Selects what is under `point`; the point becomes the drag pointer.
    pub fn click(&mut self, point: Point) -> Option<EntityRef> {
        let previous = self.zorder.selected();
        let selection = self.zorder.click(&self.layout, point);
        self.reseed(Some(point));
        debug!(session = %self.session_id, x = point.x, y = point.y, ?selection, "click");
        if selection != previous {
            self.notify_selected();
        }
        selection
    }

    fn select_with(&mut self, select: impl FnOnce(&mut ZOrder, &Layout) -> bool) -> bool {
        let previous = self.zorder.selected();
        if !select(&mut self.zorder, &self.layout) {
            return false;
        }
        self.reseed(None);
        if self.zorder.selected() != previous {
            self.notify_selected();
        }
        true
    }

    pub fn select_display(&mut self, display: DisplayId) -> bool {
        self.select_with(|z, l| z.select_display(l, display))
    }

    pub fn select_screen(&mut self, screen: ScreenId) -> bool {
        self.select_with(|z, l| z.select_screen(l, screen))
    }

    pub fn select_prime_display(&mut self, prime: PrimeId) -> bool {
        self.select_with(|z, l| z.select_prime_display(l, prime))
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    /// Drags the selection by `(dx, dy)`.  Returns `true` if it changed.
    pub fn move_selected(&mut self, dx: i32, dy: i32, snap: bool) -> bool {
        let Some(selection) = self.zorder.selected() else {
            return false;
        };
        let modified = modify::move_entity(
            &mut self.layout,
            selection,
            &mut self.drag,
            &self.options,
            dx,
            dy,
            snap,
        );
        if modified {
            self.notify_modified();
        }
        modified
    }

    /// Resizes the selection by `(dx, dy)`.  Returns `true` if it changed.
    pub fn pan_selected(&mut self, dx: i32, dy: i32, snap: bool) -> bool {
        let Some(selection) = self.zorder.selected() else {
            return false;
        };
        let modified = modify::pan_entity(
            &mut self.layout,
            selection,
            &mut self.drag,
            &self.options,
            dx,
            dy,
            snap,
        );
        if modified {
            self.notify_modified();
        }
        modified
    }

    /// Ends the current drag; the next one starts from the live geometry.
    pub fn end_drag(&mut self) {
        let pointer = self.drag.pointer;
        self.reseed(Some(pointer));
    }

    fn after_setter(&mut self, modified: bool) -> bool {
        self.reseed(None);
        if modified {
            self.notify_modified();
        }
        modified
    }

    pub fn set_display_position(
        &mut self,
        display: DisplayId,
        placement: DisplayPlacement,
        x: i32,
        y: i32,
    ) -> bool {
        let modified =
            modify::set_display_position(&mut self.layout, display, placement, x, y, &self.options);
        self.after_setter(modified)
    }

    pub fn set_screen_position(
        &mut self,
        screen: ScreenId,
        placement: ScreenPlacement,
        x: i32,
        y: i32,
    ) -> bool {
        let modified =
            modify::set_screen_position(&mut self.layout, screen, placement, x, y, &self.options);
        self.after_setter(modified)
    }

    pub fn set_display_panning(&mut self, display: DisplayId, width: i32, height: i32) -> bool {
        let modified =
            modify::set_display_panning(&mut self.layout, display, width, height, &self.options);
        self.after_setter(modified)
    }

    pub fn set_screen_virtual_size(&mut self, screen: ScreenId, width: i32, height: i32) -> bool {
        let modified =
            modify::set_screen_virtual_size(&mut self.layout, screen, width, height, &self.options);
        self.after_setter(modified)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
