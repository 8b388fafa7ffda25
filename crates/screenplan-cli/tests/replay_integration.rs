//! Snapshot + script round trips through the public CLI library.

use screenplan_cli::application::replay::{run_script, ReplayError};
use screenplan_cli::application::report::describe_layout;
use screenplan_cli::infrastructure::script::parse_script;
use screenplan_cli::infrastructure::snapshot::{load_snapshot, parse_snapshot};
use screenplan_core::{EditOptions, LayoutView};

const TWO_SCREENS: &str = r#"{
    "gpus": [{
        "name": "GPU-0",
        "displays": [
            { "name": "DP-0", "screen": "Screen-0", "modes": [{ "width": 1920, "height": 1080 }] },
            { "name": "DP-1", "screen": "Screen-1", "modes": [{ "width": 1920, "height": 1080 }] }
        ]
    }],
    "screens": [
        { "name": "Screen-0" },
        { "name": "Screen-1", "position": { "type": "right_of", "of": "Screen-0" } }
    ]
}"#;

fn view(snap_strength: i32) -> LayoutView {
    let layout = parse_snapshot(TWO_SCREENS).expect("valid snapshot");
    LayoutView::new(
        layout,
        EditOptions {
            snap_strength,
            advanced_mode: false,
        },
    )
}

#[test]
fn test_resolve_reports_relative_screen_position() {
    let view = view(100);

    let lines = describe_layout(view.layout());

    assert_eq!(lines[0], "layout 0,0 3840x1080");
    assert!(lines
        .iter()
        .any(|l| l.starts_with("screen Screen-1 right_of Screen-0 1920,0 1920x1080")));
}

#[test]
fn test_small_drag_of_attached_screen_is_not_a_modification() {
    // Arrange
    let mut view = view(10);
    let ops = parse_script(
        r#"[
            { "op": "select_screen", "name": "Screen-1" },
            { "op": "move", "dx": -5, "dy": 0 },
            { "op": "end_drag" }
        ]"#,
    )
    .expect("valid script");

    // Act
    let outcomes = run_script(&mut view, &ops, true).expect("replay");

    // Assert
    assert!(outcomes.iter().all(|o| !o.modified));
    let s1 = view.layout().find_screen("Screen-1").unwrap();
    assert_eq!(view.layout().screen(s1).unwrap().dim.x, 1920);
}

#[test]
fn test_detaching_screen_then_moving_it() {
    // Arrange
    let mut view = view(10);
    let ops = parse_script(
        r#"[
            { "op": "set_screen_position", "name": "Screen-1", "x": 2000, "y": 0 },
            { "op": "select_screen", "name": "Screen-1" },
            { "op": "move", "dx": 0, "dy": 300, "snap": false }
        ]"#,
    )
    .expect("valid script");

    // Act
    let outcomes = run_script(&mut view, &ops, true).expect("replay");

    // Assert
    assert!(outcomes[0].modified);
    assert!(!outcomes[1].modified);
    assert!(outcomes[2].modified);
    assert_eq!(outcomes[2].selection.as_deref(), Some("Screen-1"));
    let s1 = view.layout().find_screen("Screen-1").unwrap();
    let dim = view.layout().screen(s1).unwrap().dim;
    assert_eq!((dim.x, dim.y), (2000, 300));
}

#[test]
fn test_failed_step_reports_its_index() {
    let mut view = view(10);
    let ops = parse_script(r#"[{ "op": "select_screen", "name": "Screen-9" }]"#).expect("valid");

    let err = run_script(&mut view, &ops, true).unwrap_err();

    assert!(matches!(err, ReplayError::Step { index: 0, op: "select_screen", .. }));
}

#[test]
fn test_load_snapshot_from_file() {
    // Arrange
    let dir = std::env::temp_dir().join(format!("screenplan-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create dir");
    let path = dir.join("layout.json");
    std::fs::write(&path, TWO_SCREENS).expect("write snapshot");

    // Act
    let layout = load_snapshot(&path).expect("load");

    // Assert
    assert!(layout.find_display("DP-1").is_some());
    let _ = std::fs::remove_dir_all(&dir);
}
