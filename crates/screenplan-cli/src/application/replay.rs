//! Scripted editing.
//!
//! A script is a JSON array of [`Operation`]s, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "select_display", "name": "DP-1" },
//!   { "op": "move", "dx": -40, "dy": 0 },
//!   { "op": "end_drag" }
//! ]
//! ```
//!
//! [`run_script`] feeds them to a [`LayoutView`] in order and records one
//! [`StepOutcome`] per operation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use screenplan_core::{DisplayId, LayoutView, Point, ScreenId};

use super::position::{NameError, PositionSpec};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("screen {screen} has no metamode {index}")]
    NoSuchMetamode { screen: String, index: usize },

    #[error("display {display} cannot be enabled on screen {screen}")]
    CannotEnable { display: String, screen: String },

    #[error("step {index} ({op}) failed")]
    Step {
        index: usize,
        op: &'static str,
        #[source]
        source: Box<ReplayError>,
    },
}

// ── Operations ────────────────────────────────────────────────────────────────

/// One user interaction or structural edit.
///
/// `snap` on `move` and `pan` overrides the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Click {
        x: i32,
        y: i32,
    },
    SelectDisplay {
        name: String,
    },
    SelectScreen {
        name: String,
    },
    Move {
        dx: i32,
        dy: i32,
        #[serde(default)]
        snap: Option<bool>,
    },
    Pan {
        dx: i32,
        dy: i32,
        #[serde(default)]
        snap: Option<bool>,
    },
    SetDisplayPosition {
        name: String,
        #[serde(default)]
        position: PositionSpec,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
    },
    SetScreenPosition {
        name: String,
        #[serde(default)]
        position: PositionSpec,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
    },
    SetDisplayPanning {
        name: String,
        width: i32,
        height: i32,
    },
    SetScreenVirtualSize {
        name: String,
        width: i32,
        height: i32,
    },
    EndDrag,
    AddMetamode {
        screen: String,
    },
    DeleteMetamode {
        screen: String,
        index: usize,
    },
    SetCurrentMetamode {
        screen: String,
        index: usize,
    },
    EnableDisplay {
        name: String,
        screen: String,
    },
    DisableDisplay {
        name: String,
    },
}

impl Operation {
    /// The `op` tag, used in log output and step reports.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Click { .. } => "click",
            Operation::SelectDisplay { .. } => "select_display",
            Operation::SelectScreen { .. } => "select_screen",
            Operation::Move { .. } => "move",
            Operation::Pan { .. } => "pan",
            Operation::SetDisplayPosition { .. } => "set_display_position",
            Operation::SetScreenPosition { .. } => "set_screen_position",
            Operation::SetDisplayPanning { .. } => "set_display_panning",
            Operation::SetScreenVirtualSize { .. } => "set_screen_virtual_size",
            Operation::EndDrag => "end_drag",
            Operation::AddMetamode { .. } => "add_metamode",
            Operation::DeleteMetamode { .. } => "delete_metamode",
            Operation::SetCurrentMetamode { .. } => "set_current_metamode",
            Operation::EnableDisplay { .. } => "enable_display",
            Operation::DisableDisplay { .. } => "disable_display",
        }
    }
}

/// What one operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub modified: bool,
    /// Name of the selected entity after the step.
    pub selection: Option<String>,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} {:<24} {:<10} selected={}",
            self.index,
            self.op,
            if self.modified { "modified" } else { "unchanged" },
            self.selection.as_deref().unwrap_or("-"),
        )
    }
}

// ── Replay ────────────────────────────────────────────────────────────────────

fn display_id(view: &LayoutView, name: &str) -> Result<DisplayId, NameError> {
    view.layout()
        .find_display(name)
        .ok_or_else(|| NameError::Display(name.to_string()))
}

fn screen_id(view: &LayoutView, name: &str) -> Result<ScreenId, NameError> {
    view.layout()
        .find_screen(name)
        .ok_or_else(|| NameError::Screen(name.to_string()))
}

/// Applies one operation and returns its `modified` flag.
///
/// Selection operations never modify.  Structural edits re-resolve the
/// layout and always report a modification when they take effect.
///
/// # Errors
///
/// Returns [`ReplayError`] when a name does not resolve or a structural
/// edit is refused.
pub fn apply(view: &mut LayoutView, op: &Operation, default_snap: bool) -> Result<bool, ReplayError> {
    let modified = match op {
        Operation::Click { x, y } => {
            view.click(Point::new(*x, *y));
            false
        }
        Operation::SelectDisplay { name } => {
            let id = display_id(view, name)?;
            view.select_display(id);
            false
        }
        Operation::SelectScreen { name } => {
            let id = screen_id(view, name)?;
            view.select_screen(id);
            false
        }
        Operation::Move { dx, dy, snap } => {
            view.move_selected(*dx, *dy, snap.unwrap_or(default_snap))
        }
        Operation::Pan { dx, dy, snap } => view.pan_selected(*dx, *dy, snap.unwrap_or(default_snap)),
        Operation::SetDisplayPosition {
            name,
            position,
            x,
            y,
        } => {
            let id = display_id(view, name)?;
            let placement = position.display_placement(view.layout())?;
            view.set_display_position(id, placement, *x, *y)
        }
        Operation::SetScreenPosition {
            name,
            position,
            x,
            y,
        } => {
            let id = screen_id(view, name)?;
            let placement = position.screen_placement(view.layout())?;
            view.set_screen_position(id, placement, *x, *y)
        }
        Operation::SetDisplayPanning {
            name,
            width,
            height,
        } => {
            let id = display_id(view, name)?;
            view.set_display_panning(id, *width, *height)
        }
        Operation::SetScreenVirtualSize {
            name,
            width,
            height,
        } => {
            let id = screen_id(view, name)?;
            view.set_screen_virtual_size(id, *width, *height)
        }
        Operation::EndDrag => {
            view.end_drag();
            false
        }
        Operation::AddMetamode { screen } => {
            let id = screen_id(view, screen)?;
            let added = view.layout_mut().add_metamode(id).is_some();
            structural(view, added)
        }
        Operation::DeleteMetamode { screen, index } => {
            let id = screen_id(view, screen)?;
            if !view.layout_mut().delete_metamode(id, *index) {
                return Err(ReplayError::NoSuchMetamode {
                    screen: screen.clone(),
                    index: *index,
                });
            }
            structural(view, true)
        }
        Operation::SetCurrentMetamode { screen, index } => {
            let id = screen_id(view, screen)?;
            let current = view.layout().screen(id).map(|s| s.cur_metamode);
            if !view.layout_mut().set_current_metamode(id, *index) {
                return Err(ReplayError::NoSuchMetamode {
                    screen: screen.clone(),
                    index: *index,
                });
            }
            structural(view, current != Some(*index))
        }
        Operation::EnableDisplay { name, screen } => {
            let display = display_id(view, name)?;
            let target = screen_id(view, screen)?;
            if !view.layout_mut().enable_display(display, target) {
                return Err(ReplayError::CannotEnable {
                    display: name.clone(),
                    screen: screen.clone(),
                });
            }
            structural(view, true)
        }
        Operation::DisableDisplay { name } => {
            let id = display_id(view, name)?;
            let disabled = view.layout_mut().disable_display(id);
            structural(view, disabled)
        }
    };
    Ok(modified)
}

fn structural(view: &mut LayoutView, changed: bool) -> bool {
    if changed {
        view.recalculate();
    }
    changed
}

/// Applies `ops` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns [`ReplayError::Step`] naming the failing operation.
pub fn run_script(
    view: &mut LayoutView,
    ops: &[Operation],
    default_snap: bool,
) -> Result<Vec<StepOutcome>, ReplayError> {
    let mut outcomes = Vec::with_capacity(ops.len());
    for (index, op) in ops.iter().enumerate() {
        let modified = apply(view, op, default_snap).map_err(|e| ReplayError::Step {
            index,
            op: op.label(),
            source: Box::new(e),
        })?;
        let selection = view
            .selection()
            .and_then(|e| e.name(view.layout()))
            .map(str::to_string);
        debug!(index, op = op.label(), modified, "replayed operation");
        outcomes.push(StepOutcome {
            index,
            op: op.label(),
            modified,
            selection,
        });
    }
    Ok(outcomes)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
