//! Selection and front-to-back ordering of layout entities.
//!
//! Index 0 is the front.  Entities are grouped by screen: a screen's
//! displays come first, then the prime displays associated with it, then the
//! screen itself, so that a screen is always behind its own content.
//! Selecting anything raises its whole group.

use tracing::{debug, warn};

use crate::domain::entity::EntityRef;
use crate::domain::geometry::Point;
use crate::domain::layout::{DisplayId, Layout, PrimeId, ScreenId};

/// Front-to-back entity order plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct ZOrder {
    order: Vec<EntityRef>,
    selected: Option<EntityRef>,
    /// Point of the last click and the entities that were under it.
    click_cycle: Option<(Point, Vec<EntityRef>)>,
}

impl ZOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerates the order from `layout`.
    ///
    /// The selection survives if the entity is still present.  If storage for
    /// the order cannot be reserved, the order is left empty and nothing is
    /// selectable.
    pub fn rebuild(&mut self, layout: &Layout) {
        self.order = Vec::new();
        self.click_cycle = None;
        if let Err(e) = self.order.try_reserve_exact(layout.entity_count()) {
            warn!(error = %e, "cannot allocate z-order, nothing will be selectable");
            self.selected = None;
            return;
        }

        for (sid, screen) in layout.screens() {
            self.order
                .extend(screen.displays.iter().map(|&d| EntityRef::Display(d)));
            self.order.extend(
                layout
                    .prime_displays()
                    .filter(|(_, p)| p.screen == Some(sid))
                    .map(|(id, _)| EntityRef::Prime(id)),
            );
            self.order.push(EntityRef::Screen(sid));
        }
        self.order
            .extend(layout.disabled_displays().map(EntityRef::Display));
        self.order.extend(
            layout
                .prime_displays()
                .filter(|(_, p)| p.screen.is_none())
                .map(|(id, _)| EntityRef::Prime(id)),
        );

        if let Some(sel) = self.selected {
            if !self.order.contains(&sel) {
                self.selected = None;
            }
        }
        debug!(entities = self.order.len(), "z-order rebuilt");
    }

    /// Entities front to back.
    pub fn entries(&self) -> &[EntityRef] {
        &self.order
    }

    /// Entities back to front, the order a renderer paints them in.
    pub fn back_to_front(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.order.iter().rev().copied()
    }

    pub fn selected(&self) -> Option<EntityRef> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn position(&self, entity: EntityRef) -> Option<usize> {
        self.order.iter().position(|&e| e == entity)
    }

    /// Moves every entity of `screen`'s group to the front, keeping their
    /// relative order.
    fn raise_group(&mut self, layout: &Layout, screen: ScreenId) {
        let (mut front, back): (Vec<EntityRef>, Vec<EntityRef>) = self
            .order
            .iter()
            .copied()
            .partition(|e| e.group(layout) == Some(screen));
        front.extend(back);
        self.order = front;
    }

    fn raise(&mut self, entity: EntityRef) {
        if let Some(i) = self.position(entity) {
            let e = self.order.remove(i);
            self.order.insert(0, e);
        }
    }

    /// Selects `entity`, dispatching on its kind.
    pub fn select(&mut self, layout: &Layout, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Display(d) => self.select_display(layout, d),
            EntityRef::Screen(s) => self.select_screen(layout, s),
            EntityRef::Prime(p) => self.select_prime_display(layout, p),
        }
    }

    /// Raises the screen's group and selects the screen.
    pub fn select_screen(&mut self, layout: &Layout, screen: ScreenId) -> bool {
        let entity = EntityRef::Screen(screen);
        if self.position(entity).is_none() {
            return false;
        }
        self.raise_group(layout, screen);
        self.selected = Some(entity);
        true
    }

    /// Raises the display's screen group, then the display to the very front.
    pub fn select_display(&mut self, layout: &Layout, display: DisplayId) -> bool {
        let entity = EntityRef::Display(display);
        if self.position(entity).is_none() {
            return false;
        }
        if let Some(screen) = entity.group(layout) {
            self.raise_group(layout, screen);
        }
        self.raise(entity);
        self.selected = Some(entity);
        true
    }

    /// Raises the prime display's screen group, if any, then the prime display.
    pub fn select_prime_display(&mut self, layout: &Layout, prime: PrimeId) -> bool {
        let entity = EntityRef::Prime(prime);
        if self.position(entity).is_none() {
            return false;
        }
        if let Some(screen) = entity.group(layout) {
            self.raise_group(layout, screen);
        }
        self.raise(entity);
        self.selected = Some(entity);
        true
    }

    /// Every entity whose rectangle strictly contains `point`, front first.
    pub fn hits(&self, layout: &Layout, point: Point) -> Vec<EntityRef> {
        self.order
            .iter()
            .copied()
            .filter(|e| e.rect(layout).is_some_and(|r| r.contains_strict(point)))
            .collect()
    }

    /// The front-most entity under `point`.
    pub fn hit_test(&self, layout: &Layout, point: Point) -> Option<EntityRef> {
        self.order
            .iter()
            .copied()
            .find(|e| e.rect(layout).is_some_and(|r| r.contains_strict(point)))
    }

    /// Selects the entity under `point`.
    ///
    /// Clicking the same point again steps through everything that was under
    /// it at the first click.  Clicking empty space keeps the selection.
    pub fn click(&mut self, layout: &Layout, point: Point) -> Option<EntityRef> {
        let next = match (&self.click_cycle, self.selected) {
            (Some((at, cycle)), Some(sel)) if *at == point => cycle
                .iter()
                .position(|&e| e == sel)
                .map(|i| cycle[(i + 1) % cycle.len()]),
            _ => None,
        };
        let next = match next {
            Some(e) => Some(e),
            None => {
                let hits = self.hits(layout, point);
                let first = hits.first().copied();
                self.click_cycle = (!hits.is_empty()).then_some((point, hits));
                first
            }
        };

        if let Some(entity) = next {
            self.select(layout, entity);
        }
        self.selected
    }

    /// Selects the entity whose corner is closest to the origin.
    ///
    /// Candidates are enabled displays with a current mode, then no-scanout
    /// screens, then prime displays; the first of equally close candidates
    /// wins.
    pub fn select_default(&mut self, layout: &Layout) -> Option<EntityRef> {
        let displays = layout
            .displays()
            .filter(|(_, d)| d.is_enabled() && d.current_mode().is_some())
            .map(|(id, _)| EntityRef::Display(id));
        let screens = layout
            .screens()
            .filter(|(_, s)| s.no_scanout)
            .map(|(id, _)| EntityRef::Screen(id));
        let primes = layout.prime_displays().map(|(id, _)| EntityRef::Prime(id));

        let mut best: Option<(i64, EntityRef)> = None;
        for entity in displays.chain(screens).chain(primes) {
            let Some(rect) = entity.rect(layout) else {
                continue;
            };
            let (x, y) = (i64::from(rect.x), i64::from(rect.y));
            let dist = x * x + y * y;
            if best.map_or(true, |(b, _)| dist < b) {
                best = Some((dist, entity));
            }
        }

        match best {
            Some((_, entity)) if self.select(layout, entity) => Some(entity),
            _ => {
                self.selected = None;
                None
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Rect;
    use crate::domain::layout::{Gpu, Mode, PrimeDisplay, Screen};
    use crate::engine::resolve::refresh_layout;

    struct Fixture {
        layout: Layout,
        s0: ScreenId,
        s1: ScreenId,
        d0: DisplayId,
        d1: DisplayId,
        off: DisplayId,
        prime: PrimeId,
    }

    fn fixture() -> Fixture {
        let mut layout = Layout::new();
        let gpu = layout.add_gpu(Gpu::new("GPU-0"));
        let s0 = layout.add_screen(Screen::new("Screen-0", 1));
        let s1 = layout.add_screen(Screen::new("Screen-1", 1));
        let d0 = layout.add_display(gpu, Some(s0), "DP-0", vec![Mode::new(1920, 1080)]);
        let d1 = layout.add_display(gpu, Some(s1), "DP-1", vec![Mode::new(1280, 1024).at(1920, 0)]);
        let off = layout.add_display(gpu, None, "VGA-0", vec![Mode::new(800, 600)]);
        let prime = layout.add_prime_display(PrimeDisplay {
            name: "PRIME-0".into(),
            rect: Rect::new(0, 1080, 1920, 1080),
            screen: Some(s0),
        });
        refresh_layout(&mut layout);
        Fixture {
            layout,
            s0,
            s1,
            d0,
            d1,
            off,
            prime,
        }
    }

    #[test]
    fn test_rebuild_groups_entities_by_screen() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        assert_eq!(
            z.entries(),
            &[
                EntityRef::Display(f.d0),
                EntityRef::Prime(f.prime),
                EntityRef::Screen(f.s0),
                EntityRef::Display(f.d1),
                EntityRef::Screen(f.s1),
                EntityRef::Display(f.off),
            ]
        );
    }

    #[test]
    fn test_select_display_raises_group_then_display() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);

        assert!(z.select_display(&f.layout, f.d1));

        assert_eq!(z.selected(), Some(EntityRef::Display(f.d1)));
        assert_eq!(&z.entries()[..2], &[EntityRef::Display(f.d1), EntityRef::Screen(f.s1)]);
    }

    #[test]
    fn test_select_prime_raises_its_screen_group() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        z.select_screen(&f.layout, f.s1);

        z.select_prime_display(&f.layout, f.prime);

        assert_eq!(
            &z.entries()[..3],
            &[
                EntityRef::Prime(f.prime),
                EntityRef::Display(f.d0),
                EntityRef::Screen(f.s0),
            ]
        );
    }

    #[test]
    fn test_hit_test_is_strict_and_front_first() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        assert_eq!(z.hit_test(&f.layout, Point::new(100, 100)), Some(EntityRef::Display(f.d0)));
        // Exactly on the shared edge of DP-0 and DP-1.
        assert_eq!(z.hit_test(&f.layout, Point::new(1920, 500)), None);
    }

    #[test]
    fn test_click_cycles_through_stacked_entities() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        let p = Point::new(100, 100);

        assert_eq!(z.click(&f.layout, p), Some(EntityRef::Display(f.d0)));
        assert_eq!(z.click(&f.layout, p), Some(EntityRef::Screen(f.s0)));
        assert_eq!(z.click(&f.layout, p), Some(EntityRef::Display(f.d0)));
    }

    #[test]
    fn test_click_on_empty_space_keeps_selection() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        z.select_screen(&f.layout, f.s1);
        assert_eq!(z.click(&f.layout, Point::new(-50, -50)), Some(EntityRef::Screen(f.s1)));
    }

    #[test]
    fn test_select_default_prefers_entity_nearest_origin() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        assert_eq!(z.select_default(&f.layout), Some(EntityRef::Display(f.d0)));
    }

    #[test]
    fn test_select_default_ignores_disabled_displays_and_scanout_screens() {
        let mut layout = Layout::new();
        let gpu = layout.add_gpu(Gpu::new("GPU-0"));
        layout.add_screen(Screen::new("empty", 1));
        layout.add_display(gpu, None, "VGA-0", vec![Mode::new(800, 600)]);
        let mut z = ZOrder::new();
        z.rebuild(&layout);
        assert_eq!(z.select_default(&layout), None);
    }

    #[test]
    fn test_select_default_finds_no_scanout_screen() {
        let mut layout = Layout::new();
        let s = layout.add_screen(Screen::no_scanout("virtual", 640, 480));
        refresh_layout(&mut layout);
        let mut z = ZOrder::new();
        z.rebuild(&layout);
        assert_eq!(z.select_default(&layout), Some(EntityRef::Screen(s)));
    }

    #[test]
    fn test_rebuild_drops_stale_selection() {
        let f = fixture();
        let mut z = ZOrder::new();
        z.rebuild(&f.layout);
        z.select_display(&f.layout, f.d1);
        z.rebuild(&Layout::new());
        assert_eq!(z.selected(), None);
        assert!(z.entries().is_empty());
    }
}
