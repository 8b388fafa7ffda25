//! JSON layout snapshots.
//!
//! A snapshot describes GPUs with their displays, screens and prime
//! displays, referring to each other by name:
//!
//! ```json
//! {
//!   "gpus": [{
//!     "name": "GPU-0",
//!     "displays": [
//!       { "name": "DP-0", "screen": "Screen-0", "modes": [{ "width": 1920, "height": 1080 }] },
//!       { "name": "DP-1", "screen": "Screen-0",
//!         "modes": [{ "width": 1280, "height": 1024,
//!                     "position": { "type": "right_of", "of": "DP-0" } }] }
//!     ]
//!   }],
//!   "screens": [{ "name": "Screen-0" }]
//! }
//! ```
//!
//! Loading happens in two passes: every entity is created first, then the
//! relative placements are converted from names to ids.  The result is
//! checked with [`Layout::validate`] before it is handed out.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use screenplan_core::{
    DisplayId, Gpu, Layout, LayoutError, Mode, PrimeDisplay, Rect, Reflection, Rotation, Screen,
    ScreenId,
};

use crate::application::position::{NameError, PositionSpec};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error reading snapshot {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("{kind} name {name:?} is used twice")]
    DuplicateName { kind: &'static str, name: String },

    #[error("invalid layout: {0}")]
    Invalid(#[from] LayoutError),
}

// ── File schema ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub gpus: Vec<GpuSnapshot>,
    #[serde(default)]
    pub screens: Vec<ScreenSnapshot>,
    #[serde(default)]
    pub prime_displays: Vec<PrimeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<i32>,
    #[serde(default)]
    pub displays: Vec<DisplaySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub name: String,
    /// Owning screen; absent for a disabled display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    /// One entry per metamode of the screen, or exactly one when disabled.
    pub modes: Vec<ModeSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSnapshot {
    pub width: i32,
    pub height: i32,
}

/// One display mode.  `width` and `height` are the modeline resolution;
/// a sideways rotation swaps them in layout space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSnapshot {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub position: PositionSpec,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Panning domain, defaults to the viewport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<SizeSnapshot>,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub reflection: Reflection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_hz: Option<f64>,
    /// Keeps its space in the layout but drives no signal.
    #[serde(default)]
    pub off: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub name: String,
    /// Number of metamodes; derived from the displays' mode lists when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metamodes: Option<usize>,
    #[serde(default)]
    pub current_metamode: usize,
    #[serde(default)]
    pub position: PositionSpec,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Present only for a screen without outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_size: Option<SizeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeSnapshot {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn check_unique<'a>(
    kind: &'static str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SnapshotError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn build_mode(spec: &ModeSnapshot) -> Mode {
    let mut mode = if spec.off {
        Mode::off(spec.width, spec.height)
    } else {
        Mode::new(spec.width, spec.height)
    };
    if let (Some(modeline), Some(hz)) = (mode.modeline.as_mut(), spec.refresh_hz) {
        modeline.refresh_hz = hz;
    }
    mode.set_rotation(spec.rotation);
    mode.reflection = spec.reflection;
    let mut mode = mode.at(spec.x, spec.y);
    if let Some(pan) = spec.pan {
        let viewport = mode.viewport_in;
        mode = mode.panned(
            pan.width.max(viewport.width),
            pan.height.max(viewport.height),
        );
    }
    mode
}

impl LayoutSnapshot {
    fn displays(&self) -> impl Iterator<Item = &DisplaySnapshot> {
        self.gpus.iter().flat_map(|g| g.displays.iter())
    }

    fn metamode_count(&self, screen: &ScreenSnapshot) -> usize {
        screen.metamodes.unwrap_or_else(|| {
            self.displays()
                .filter(|d| d.screen.as_deref() == Some(screen.name.as_str()))
                .map(|d| d.modes.len())
                .max()
                .unwrap_or(1)
        })
    }

    /// Builds the layout graph.
    ///
    /// The returned layout is not resolved yet; hand it to a
    /// [`LayoutView`](screenplan_core::LayoutView) or run the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateName`] or [`SnapshotError::Name`]
    /// for bad references, and [`SnapshotError::Invalid`] when the graph
    /// breaks a structural invariant.
    pub fn into_layout(&self) -> Result<Layout, SnapshotError> {
        check_unique("screen", self.screens.iter().map(|s| s.name.as_str()))?;
        check_unique("display", self.displays().map(|d| d.name.as_str()))?;
        check_unique("gpu", self.gpus.iter().map(|g| g.name.as_str()))?;

        let mut layout = Layout::new();

        // Pass 1: entities, everything absolute.
        let mut screens: Vec<(ScreenId, &ScreenSnapshot)> = Vec::with_capacity(self.screens.len());
        for spec in &self.screens {
            let mut screen = match spec.virtual_size {
                Some(size) => Screen::no_scanout(&spec.name, size.width, size.height),
                None => Screen::new(&spec.name, self.metamode_count(spec)),
            };
            screen.cur_metamode = spec.current_metamode;
            screen.dim.x = spec.x;
            screen.dim.y = spec.y;
            if let Some(w) = spec.max_width {
                screen.max_width = w;
            }
            if let Some(h) = spec.max_height {
                screen.max_height = h;
            }
            screens.push((layout.add_screen(screen), spec));
        }

        let mut displays: Vec<(DisplayId, &DisplaySnapshot)> = Vec::new();
        for gspec in &self.gpus {
            let mut gpu = Gpu::new(&gspec.name);
            if let Some(w) = gspec.max_width {
                gpu.max_width = w;
            }
            if let Some(h) = gspec.max_height {
                gpu.max_height = h;
            }
            let gpu = layout.add_gpu(gpu);
            for dspec in &gspec.displays {
                let screen = match &dspec.screen {
                    Some(name) => Some(
                        layout
                            .find_screen(name)
                            .ok_or_else(|| NameError::Screen(name.clone()))?,
                    ),
                    None => None,
                };
                let modes = dspec.modes.iter().map(build_mode).collect();
                let id = layout.add_display(gpu, screen, &dspec.name, modes);
                displays.push((id, dspec));
            }
        }

        for prime in &self.prime_displays {
            let screen = match &prime.screen {
                Some(name) => Some(
                    layout
                        .find_screen(name)
                        .ok_or_else(|| NameError::Screen(name.clone()))?,
                ),
                None => None,
            };
            layout.add_prime_display(PrimeDisplay {
                name: prime.name.clone(),
                rect: Rect::new(prime.x, prime.y, prime.width, prime.height),
                screen,
            });
        }

        // Pass 2: names to ids.
        for (id, spec) in screens {
            let placement = spec.position.screen_placement(&layout)?;
            if let Some(screen) = layout.screen_mut(id) {
                screen.placement = placement;
            }
        }
        for (id, spec) in displays {
            let placements = spec
                .modes
                .iter()
                .map(|m| m.position.display_placement(&layout))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(display) = layout.display_mut(id) {
                for (mode, placement) in display.modes.iter_mut().zip(placements) {
                    mode.placement = placement;
                }
            }
        }

        layout.validate()?;
        debug!(
            gpus = self.gpus.len(),
            screens = self.screens.len(),
            entities = layout.entity_count(),
            "snapshot converted"
        );
        Ok(layout)
    }
}

/// Parses a snapshot document and builds its layout.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] for malformed JSON, otherwise see
/// [`LayoutSnapshot::into_layout`].
pub fn parse_snapshot(json: &str) -> Result<Layout, SnapshotError> {
    let snapshot: LayoutSnapshot = serde_json::from_str(json)?;
    snapshot.into_layout()
}

/// Reads and parses the snapshot at `path`.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read, otherwise see
/// [`parse_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<Layout, SnapshotError> {
    let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_snapshot(&json)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
