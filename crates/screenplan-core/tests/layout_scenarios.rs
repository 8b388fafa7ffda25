//! End-to-end editing scenarios through the public `LayoutView` API.
//!
//! Each test builds a small layout, drives the view the way an interactive
//! editor would, and checks the resolved geometry.

use screenplan_core::engine::resolve::{realign_screen, resolve_display, resolve_layout};
use screenplan_core::{
    EditOptions, EntityRef, Gpu, Layout, LayoutView, Mode, Placement, Point, PrimeDisplay, Rect,
    Relation, Screen, ScreenId, Size,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// S0 absolute with one 1920x1080 display; S1 RightOf S0 with one 1920x1080 display.
fn two_screens(s1_relative: bool) -> (Layout, ScreenId, ScreenId) {
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let s0 = layout.add_screen(Screen::new("Screen-0", 1));
    let mut screen1 = Screen::new("Screen-1", 1);
    if s1_relative {
        screen1.placement = Placement::Relative {
            relation: Relation::RightOf,
            to: s0,
        };
    }
    let s1 = layout.add_screen(screen1);
    layout.add_display(gpu, Some(s0), "DP-0", vec![Mode::new(1920, 1080)]);
    let start = if s1_relative { 0 } else { 1920 };
    layout.add_display(gpu, Some(s1), "DP-1", vec![Mode::new(1920, 1080).at(start, 0)]);
    (layout, s0, s1)
}

fn snap10() -> EditOptions {
    EditOptions {
        snap_strength: 10,
        advanced_mode: false,
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

#[test]
fn test_relative_screen_resolves_right_of_its_reference() {
    let (layout, _, s1) = two_screens(true);
    let view = LayoutView::new(layout, EditOptions::default());
    assert_eq!(view.layout().screen(s1).unwrap().dim, Rect::new(1920, 0, 1920, 1080));
    assert_eq!(view.layout().dim(), Rect::new(0, 0, 3840, 1080));
}

#[test]
fn test_moving_relative_screen_slightly_keeps_it_attached() {
    // Arrange
    let (layout, _, s1) = two_screens(true);
    let mut view = LayoutView::new(layout, snap10());
    assert!(view.select_screen(s1));

    // Act
    let modified = view.move_selected(-5, 0, true);

    // Assert
    assert!(!modified);
    assert_eq!(view.layout().screen(s1).unwrap().dim.x, 1920);
}

#[test]
fn test_moving_absolute_screen_within_strength_snaps_to_edge() {
    // Arrange
    let (layout, _, s1) = two_screens(false);
    let mut view = LayoutView::new(layout, snap10());
    assert!(view.select_screen(s1));

    // Act
    let modified = view.move_selected(-5, 0, true);

    // Assert
    assert!(!modified);
    assert_eq!(view.layout().screen(s1).unwrap().dim.x, 1920);
}

#[test]
fn test_moving_absolute_screen_beyond_strength_moves_it() {
    let (layout, _, s1) = two_screens(false);
    let mut view = LayoutView::new(layout, snap10());
    view.select_screen(s1);

    for _ in 0..5 {
        view.move_selected(-5, 0, true);
    }

    // 25 pixels of accumulated drag escapes the 10 pixel snap.
    assert_eq!(view.layout().screen(s1).unwrap().dim.x, 1895);
}

#[test]
fn test_chain_of_relative_displays() {
    // Arrange: A RightOf B RightOf C, C absolute.
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let screen = layout.add_screen(Screen::new("Screen-0", 1));
    let c = layout.add_display(gpu, Some(screen), "C", vec![Mode::new(1024, 768).at(50, 70)]);
    let b = layout.add_display(
        gpu,
        Some(screen),
        "B",
        vec![Mode::new(1600, 900).relative(Relation::RightOf, c)],
    );
    let a = layout.add_display(
        gpu,
        Some(screen),
        "A",
        vec![Mode::new(800, 600).relative(Relation::RightOf, b)],
    );

    // Act
    let rect_a = resolve_display(&layout, a, 0).unwrap();

    // Assert
    assert_eq!(rect_a.x, 50 + 1024 + 1600);
    assert_eq!(rect_a.y, 70);
}

#[test]
fn test_realign_after_resolve_is_idempotent() {
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let screen = layout.add_screen(Screen::new("Screen-0", 3));
    layout.add_display(
        gpu,
        Some(screen),
        "DP-0",
        vec![
            Mode::new(1920, 1080).at(10, 10),
            Mode::new(1280, 1024).at(-40, 0),
            Mode::new(800, 600).at(0, 90),
        ],
    );
    resolve_layout(&mut layout);

    realign_screen(&mut layout, screen);

    assert!(!realign_screen(&mut layout, screen));
}

// ── Editing ───────────────────────────────────────────────────────────────────

#[test]
fn test_zero_move_never_modifies() {
    let (layout, _, s1) = two_screens(false);
    let mut view = LayoutView::new(layout, EditOptions::default());
    view.select_screen(s1);
    assert!(!view.move_selected(0, 0, false));
    assert!(!view.move_selected(0, 0, true));
}

#[test]
fn test_pan_never_goes_below_viewport_in() {
    let (layout, _, _) = two_screens(false);
    let mut view = LayoutView::new(layout, EditOptions::default());
    let selected = view.selection();
    assert!(matches!(selected, Some(EntityRef::Display(_))));

    for _ in 0..10 {
        view.pan_selected(-250, -250, true);
    }

    let Some(EntityRef::Display(d)) = selected else {
        unreachable!()
    };
    let mode = view.layout().display(d).unwrap().current_mode().unwrap();
    assert!(mode.pan.width >= mode.viewport_in.width);
    assert!(mode.pan.height >= mode.viewport_in.height);
}

#[test]
fn test_drag_left_of_origin_normalizes_layout() {
    let (layout, s0, s1) = two_screens(false);
    let mut view = LayoutView::new(layout, EditOptions::default());
    view.select_screen(s0);

    assert!(view.move_selected(-500, 0, false));

    // S0 now sits at the origin, S1 was pushed right to keep its distance.
    assert_eq!(view.layout().screen(s0).unwrap().dim.origin(), Point::default());
    assert_eq!(view.layout().screen(s1).unwrap().dim.x, 2420);
    assert_eq!(view.layout().dim().origin(), Point::default());
}

#[test]
fn test_display_dragged_below_its_reference_becomes_below() {
    // Arrange
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let screen = layout.add_screen(Screen::new("Screen-0", 2));
    let base = layout.add_display(
        gpu,
        Some(screen),
        "DP-0",
        vec![Mode::new(1920, 1080), Mode::new(1920, 1080)],
    );
    let side = layout.add_display(
        gpu,
        Some(screen),
        "DP-1",
        vec![
            Mode::new(1280, 1024).relative(Relation::RightOf, base),
            Mode::new(1280, 1024).relative(Relation::RightOf, base),
        ],
    );
    let mut view = LayoutView::new(layout, EditOptions::default());
    view.click(Point::new(2500, 500));
    assert_eq!(view.selection(), Some(EntityRef::Display(side)));

    // Act: drag the pointer to below the base display's center.
    let modified = view.move_selected(-1540, 1200, true);

    // Assert: basic mode rewrites every metamode.
    assert!(modified);
    let display = view.layout().display(side).unwrap();
    assert!(display
        .modes
        .iter()
        .all(|m| m.placement.relation() == Some(Relation::Below)));
    assert_eq!(display.modes[0].pan.origin(), Point::new(0, 1080));
}

#[test]
fn test_advanced_mode_rewrites_only_current_metamode() {
    let mut layout = Layout::new();
    let gpu = layout.add_gpu(Gpu::new("GPU-0"));
    let screen = layout.add_screen(Screen::new("Screen-0", 2));
    let base = layout.add_display(
        gpu,
        Some(screen),
        "DP-0",
        vec![Mode::new(1920, 1080), Mode::new(1920, 1080)],
    );
    let side = layout.add_display(
        gpu,
        Some(screen),
        "DP-1",
        vec![
            Mode::new(1280, 1024).relative(Relation::RightOf, base),
            Mode::new(1280, 1024).relative(Relation::RightOf, base),
        ],
    );
    let options = EditOptions {
        advanced_mode: true,
        ..EditOptions::default()
    };
    let mut view = LayoutView::new(layout, options);
    view.select_display(side);

    let placement = Placement::Relative {
        relation: Relation::LeftOf,
        to: base,
    };
    assert!(view.set_display_position(side, placement, 0, 0));

    let display = view.layout().display(side).unwrap();
    assert_eq!(display.modes[0].placement.relation(), Some(Relation::LeftOf));
    assert_eq!(display.modes[1].placement.relation(), Some(Relation::RightOf));
}

#[test]
fn test_no_scanout_screen_resizes_in_multiples_of_eight() {
    let mut layout = Layout::new();
    let screen = layout.add_screen(Screen::no_scanout("virtual", 1024, 768));
    let mut view = LayoutView::new(layout, EditOptions::default());
    assert_eq!(view.selection(), Some(EntityRef::Screen(screen)));

    assert!(view.pan_selected(3, 2, false));

    assert_eq!(view.layout().screen(screen).unwrap().dim.size(), Size::new(1032, 770));
}

// ── Selection ─────────────────────────────────────────────────────────────────

#[test]
fn test_prime_display_is_selectable_but_never_moves() {
    let mut layout = Layout::new();
    let prime = layout.add_prime_display(PrimeDisplay {
        name: "PRIME-0".into(),
        rect: Rect::new(100, 100, 1280, 720),
        screen: None,
    });
    let mut view = LayoutView::new(layout, EditOptions::default());
    assert_eq!(view.selection(), Some(EntityRef::Prime(prime)));

    assert!(!view.move_selected(50, 50, true));
    assert_eq!(view.layout().prime_display(prime).unwrap().rect.origin(), Point::new(100, 100));
}

#[test]
fn test_screen_reachable_by_clicking_twice() {
    let (layout, s0, _) = two_screens(false);
    let mut view = LayoutView::new(layout, EditOptions::default());
    let p = Point::new(500, 500);

    assert!(matches!(view.click(p), Some(EntityRef::Display(_))));
    assert_eq!(view.click(p), Some(EntityRef::Screen(s0)));
}

#[test]
fn test_back_to_front_ends_with_front_entity() {
    let (layout, _, s1) = two_screens(false);
    let mut view = LayoutView::new(layout, EditOptions::default());
    view.select_screen(s1);
    assert_eq!(view.back_to_front().last(), view.z_order().first().copied());
}
