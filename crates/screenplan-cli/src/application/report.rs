//! Plain-text rendering of a resolved layout.

use screenplan_core::{DisplayId, EntityRef, Layout, Placement, Rect, ScreenId};

use super::position::relation_name;

fn rect(r: &Rect) -> String {
    format!("{},{} {}x{}", r.x, r.y, r.width, r.height)
}

fn placement<Id: Copy>(p: &Placement<Id>, name_of: impl Fn(Id) -> Option<String>) -> String {
    match p {
        Placement::Absolute => "absolute".to_string(),
        Placement::Relative { relation, to } => format!(
            "{} {}",
            relation_name(*relation),
            name_of(*to).unwrap_or_else(|| "?".to_string())
        ),
    }
}

/// One line per entity, screens first with their displays indented below.
///
/// ```text
/// layout 0,0 3840x1080
/// screen Screen-0 absolute 0,0 1920x1080 metamode 1/1
///   display DP-0 absolute 0,0 1920x1080
/// ```
pub fn describe_layout(layout: &Layout) -> Vec<String> {
    let display_name = |id: DisplayId| layout.display(id).map(|d| d.name.clone());
    let screen_name = |id: ScreenId| layout.screen(id).map(|s| s.name.clone());
    let mut lines = vec![format!("layout {}", rect(&layout.dim()))];

    for (_, screen) in layout.screens() {
        let kind = if screen.no_scanout { " no-scanout" } else { "" };
        lines.push(format!(
            "screen {}{} {} {} metamode {}/{}",
            screen.name,
            kind,
            placement(&screen.placement, screen_name),
            rect(&screen.dim),
            screen.cur_metamode + 1,
            screen.metamodes.len(),
        ));
        for &id in &screen.displays {
            let Some(display) = layout.display(id) else {
                continue;
            };
            match display.current_mode() {
                Some(mode) => lines.push(format!(
                    "  display {} {} {}{}",
                    display.name,
                    placement(&mode.placement, display_name),
                    rect(&mode.pan),
                    if mode.is_off() { " off" } else { "" },
                )),
                None => lines.push(format!("  display {} (no mode)", display.name)),
            }
        }
    }

    for id in layout.disabled_displays() {
        if let Some(display) = layout.display(id) {
            let at = display
                .current_mode()
                .map(|m| rect(&m.pan))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("disabled {} {}", display.name, at));
        }
    }

    for (_, prime) in layout.prime_displays() {
        let owner = prime
            .screen
            .and_then(screen_name)
            .map(|s| format!(" on {s}"))
            .unwrap_or_default();
        lines.push(format!("prime {} {}{}", prime.name, rect(&prime.rect), owner));
    }

    lines
}

/// `selected <kind> <name>`, or `selected none`.
pub fn describe_selection(layout: &Layout, selection: Option<EntityRef>) -> String {
    let Some(entity) = selection else {
        return "selected none".to_string();
    };
    let kind = match entity {
        EntityRef::Display(_) => "display",
        EntityRef::Screen(_) => "screen",
        EntityRef::Prime(_) => "prime",
    };
    match entity.name(layout) {
        Some(name) => format!("selected {kind} {name}"),
        None => format!("selected {entity}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use screenplan_core::engine::resolve::refresh_layout;
    use screenplan_core::{Gpu, Mode, PrimeDisplay, Relation, Screen};

    #[test]
    fn test_describe_layout_lists_every_entity() {
        // Arrange
        let mut layout = Layout::new();
        let gpu = layout.add_gpu(Gpu::new("GPU-0"));
        let screen = layout.add_screen(Screen::new("Screen-0", 1));
        let dp0 = layout.add_display(gpu, Some(screen), "DP-0", vec![Mode::new(1920, 1080)]);
        layout.add_display(
            gpu,
            Some(screen),
            "DP-1",
            vec![Mode::new(1280, 1024).relative(Relation::RightOf, dp0)],
        );
        layout.add_display(gpu, None, "HDMI-0", vec![Mode::new(1024, 768)]);
        layout.add_prime_display(PrimeDisplay {
            name: "PRIME-0".into(),
            rect: Rect::new(0, 1080, 800, 600),
            screen: Some(screen),
        });
        refresh_layout(&mut layout);

        // Act
        let lines = describe_layout(&layout);

        // Assert
        assert_eq!(lines[1], "screen Screen-0 absolute 0,0 3200x1080 metamode 1/1");
        assert_eq!(lines[2], "  display DP-0 absolute 0,0 1920x1080");
        assert_eq!(lines[3], "  display DP-1 right_of DP-0 1920,0 1280x1024");
        assert!(lines[4].starts_with("disabled HDMI-0 3200,0 "));
        assert_eq!(lines[5], "prime PRIME-0 0,1080 800x600 on Screen-0");
    }

    #[test]
    fn test_off_mode_is_flagged() {
        let mut layout = Layout::new();
        let gpu = layout.add_gpu(Gpu::new("GPU-0"));
        let screen = layout.add_screen(Screen::new("Screen-0", 1));
        layout.add_display(gpu, Some(screen), "DP-0", vec![Mode::off(640, 480)]);

        let lines = describe_layout(&layout);

        assert!(lines[2].ends_with(" off"));
    }

    #[test]
    fn test_describe_selection() {
        let mut layout = Layout::new();
        let screen = layout.add_screen(Screen::no_scanout("virtual", 1024, 768));

        assert_eq!(describe_selection(&layout, None), "selected none");
        assert_eq!(
            describe_selection(&layout, Some(EntityRef::Screen(screen))),
            "selected screen virtual"
        );
    }
}
