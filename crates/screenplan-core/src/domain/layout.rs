//! The layout entity graph: GPUs, displays, screens, modes and metamodes.
//!
//! A [`Layout`] owns every entity in flat arenas and hands out typed indices
//! ([`GpuId`], [`DisplayId`], [`ScreenId`], [`PrimeId`]).  Relationships are
//! stored as ids, so the graph has no shared ownership and can be mutated in
//! place by the resolver and the modification engine.
//!
//! Rectangles are absolute layout coordinates.  A display's `pan` is where it
//! sits on the desktop, not an offset from its screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{Rect, Size};
use super::placement::{Placement, Relation};

/// Largest layout extent the display server can represent, per axis.
pub const MAX_LAYOUT_WIDTH: i32 = 0x7FFF;
pub const MAX_LAYOUT_HEIGHT: i32 = 0x7FFF;

/// Smallest virtual size a screen may be resized to.
pub const MIN_SCREEN_WIDTH: i32 = 304;
pub const MIN_SCREEN_HEIGHT: i32 = 200;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "-{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Index of a [`Gpu`] in its [`Layout`].
    GpuId,
    "gpu"
);
entity_id!(
    /// Index of a [`Display`] in its [`Layout`].
    DisplayId,
    "display"
);
entity_id!(
    /// Index of a [`Screen`] in its [`Layout`].
    ScreenId,
    "screen"
);
entity_id!(
    /// Index of a [`PrimeDisplay`] in its [`Layout`].
    PrimeId,
    "prime"
);

pub type DisplayPlacement = Placement<DisplayId>;
pub type ScreenPlacement = Placement<ScreenId>;

/// Errors reported by [`Layout::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A display id does not exist in the layout.
    #[error("unknown display: {0}")]
    UnknownDisplay(DisplayId),

    /// A screen id does not exist in the layout.
    #[error("unknown screen: {0}")]
    UnknownScreen(ScreenId),

    /// A GPU id does not exist in the layout.
    #[error("unknown gpu: {0}")]
    UnknownGpu(GpuId),

    /// A display's mode list does not match its screen's metamode count.
    #[error("display {display} has {found} modes but its screen has {expected} metamodes")]
    ModeCountMismatch {
        display: String,
        expected: usize,
        found: usize,
    },

    /// A mode is positioned relative to a display outside its own screen, or to itself.
    #[error("display {display} is positioned relative to a display outside its screen")]
    ForeignRelative { display: String },

    /// A current-index field is out of range.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A position or size lies outside the layout coordinate range.
    #[error("{entity} has geometry outside the layout range")]
    GeometryOutOfRange { entity: String },
}

/// Origin within `±MAX_LAYOUT_*`, size in `0..=MAX_LAYOUT_*` (`1..` when `sized`).
fn rect_in_range(r: &Rect, sized: bool) -> bool {
    let min = i32::from(sized);
    (-MAX_LAYOUT_WIDTH..=MAX_LAYOUT_WIDTH).contains(&r.x)
        && (-MAX_LAYOUT_HEIGHT..=MAX_LAYOUT_HEIGHT).contains(&r.y)
        && (min..=MAX_LAYOUT_WIDTH).contains(&r.width)
        && (min..=MAX_LAYOUT_HEIGHT).contains(&r.height)
}

fn size_in_range(size: Size) -> bool {
    (1..=MAX_LAYOUT_WIDTH).contains(&size.width) && (1..=MAX_LAYOUT_HEIGHT).contains(&size.height)
}

/// Output rotation of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Normal,
    Left,
    Inverted,
    Right,
}

impl Rotation {
    /// `true` for the two rotations that turn landscape into portrait.
    pub const fn is_sideways(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }
}

/// Output reflection of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reflection {
    #[default]
    None,
    X,
    Y,
    XY,
}

/// Timing summary of the video mode a display drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modeline {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub refresh_hz: f64,
}

impl Modeline {
    pub fn new(width: i32, height: i32, refresh_hz: f64) -> Self {
        Self {
            name: format!("{width}x{height}"),
            width,
            height,
            refresh_hz,
        }
    }
}

/// One display's configuration within one metamode.
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub placement: DisplayPlacement,
    /// Panning domain in absolute layout coordinates.
    pub pan: Rect,
    pub viewport_in: Size,
    pub viewport_out: Rect,
    pub rotation: Rotation,
    pub reflection: Reflection,
    /// `None` means the display is off in this metamode.
    pub modeline: Option<Modeline>,
}

impl Mode {
    /// A mode driving a `width`×`height` modeline at 60 Hz, placed at the origin.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_modeline(Some(Modeline::new(width, height, 60.0)), Size::new(width, height))
    }

    /// A mode that keeps `size` of layout space but drives no signal.
    pub fn off(width: i32, height: i32) -> Self {
        Self::with_modeline(None, Size::new(width, height))
    }

    fn with_modeline(modeline: Option<Modeline>, size: Size) -> Self {
        Self {
            placement: Placement::Absolute,
            pan: Rect::new(0, 0, size.width, size.height),
            viewport_in: size,
            viewport_out: Rect::new(0, 0, size.width, size.height),
            rotation: Rotation::Normal,
            reflection: Reflection::None,
            modeline,
        }
    }

    /// Moves the panning domain to `(x, y)`.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.pan.x = x;
        self.pan.y = y;
        self
    }

    /// Sets the panning domain size.
    pub fn panned(mut self, width: i32, height: i32) -> Self {
        self.pan.width = width;
        self.pan.height = height;
        self
    }

    pub fn placed(mut self, placement: DisplayPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn relative(self, relation: Relation, to: DisplayId) -> Self {
        self.placed(Placement::Relative { relation, to })
    }

    pub fn is_off(&self) -> bool {
        self.modeline.is_none()
    }

    /// The ViewPortIn rectangle anchored at the panning domain's corner.
    pub fn viewport_in_rect(&self) -> Rect {
        Rect::from_parts(self.pan.origin(), self.viewport_in)
    }

    /// Changes the rotation, swapping ViewPortIn and Pan dimensions when the
    /// display turns between landscape and portrait.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        if self.rotation.is_sideways() != rotation.is_sideways() {
            self.viewport_in = self.viewport_in.swapped();
            let size = self.pan.size().swapped();
            self.pan.width = size.width;
            self.pan.height = size.height;
        }
        self.rotation = rotation;
    }
}

/// Derived bounding boxes of one metamode.  Never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaMode {
    /// Union of every mode's panning domain, including modes that are off.
    pub dim: Rect,
    /// Union of the panning domains of modes that are on; `None` when all are off.
    pub edim: Option<Rect>,
}

/// A graphics card and the limits it imposes on its displays.
#[derive(Debug, Clone, PartialEq)]
pub struct Gpu {
    pub name: String,
    pub max_width: i32,
    pub max_height: i32,
    pub max_displays: usize,
    pub displays: Vec<DisplayId>,
}

impl Gpu {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_width: MAX_LAYOUT_WIDTH,
            max_height: MAX_LAYOUT_HEIGHT,
            max_displays: 4,
            displays: Vec::new(),
        }
    }
}

/// A physical output (monitor connector) on a GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub name: String,
    pub gpu: GpuId,
    /// `None` when the display is disabled.
    pub screen: Option<ScreenId>,
    /// One mode per metamode of the owning screen.
    pub modes: Vec<Mode>,
    pub cur_mode: usize,
}

impl Display {
    pub fn is_enabled(&self) -> bool {
        self.screen.is_some()
    }

    pub fn current_mode(&self) -> Option<&Mode> {
        self.modes.get(self.cur_mode)
    }

    pub fn current_mode_mut(&mut self) -> Option<&mut Mode> {
        self.modes.get_mut(self.cur_mode)
    }

    pub fn mode(&self, metamode: usize) -> Option<&Mode> {
        self.modes.get(metamode)
    }
}

/// A renderable surface grouping zero or more displays.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub name: String,
    pub displays: Vec<DisplayId>,
    pub metamodes: Vec<MetaMode>,
    pub cur_metamode: usize,
    /// Absolute bounding box; derived unless the screen is no-scanout.
    pub dim: Rect,
    pub placement: ScreenPlacement,
    pub max_width: i32,
    pub max_height: i32,
    /// A screen without outputs whose size is the user-set virtual size in `dim`.
    pub no_scanout: bool,
}

impl Screen {
    /// A screen with `metamodes` (at least one) empty configurations.
    pub fn new(name: impl Into<String>, metamodes: usize) -> Self {
        Self {
            name: name.into(),
            displays: Vec::new(),
            metamodes: vec![MetaMode::default(); metamodes.max(1)],
            cur_metamode: 0,
            dim: Rect::default(),
            placement: Placement::Absolute,
            max_width: MAX_LAYOUT_WIDTH,
            max_height: MAX_LAYOUT_HEIGHT,
            no_scanout: false,
        }
    }

    /// A screen with no outputs and a fixed virtual size.
    pub fn no_scanout(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            dim: Rect::new(0, 0, width.max(MIN_SCREEN_WIDTH), height.max(MIN_SCREEN_HEIGHT)),
            no_scanout: true,
            ..Self::new(name, 1)
        }
    }

    pub fn current_metamode(&self) -> Option<&MetaMode> {
        self.metamodes.get(self.cur_metamode)
    }
}

/// A display managed outside this layout, shown for reference only.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimeDisplay {
    pub name: String,
    pub rect: Rect,
    /// Screen this display is grouped with for rendering and selection.
    pub screen: Option<ScreenId>,
}

/// The complete multi-display configuration graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub(crate) gpus: Vec<Gpu>,
    pub(crate) displays: Vec<Display>,
    pub(crate) screens: Vec<Screen>,
    pub(crate) primes: Vec<PrimeDisplay>,
    /// Derived bounding box of everything, including the disabled-display row.
    pub(crate) dim: Rect,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────────────────

    pub fn add_gpu(&mut self, gpu: Gpu) -> GpuId {
        self.gpus.push(gpu);
        GpuId(self.gpus.len() - 1)
    }

    pub fn add_screen(&mut self, screen: Screen) -> ScreenId {
        self.screens.push(screen);
        ScreenId(self.screens.len() - 1)
    }

    /// Adds a display driven by `gpu`, optionally enabled on `screen`.
    ///
    /// The current mode follows the screen's current metamode; a disabled
    /// display uses its first mode.
    pub fn add_display(
        &mut self,
        gpu: GpuId,
        screen: Option<ScreenId>,
        name: impl Into<String>,
        modes: Vec<Mode>,
    ) -> DisplayId {
        let id = DisplayId(self.displays.len());
        let cur_mode = screen
            .and_then(|s| self.screens.get(s.0))
            .map_or(0, |s| s.cur_metamode);
        if let Some(g) = self.gpus.get_mut(gpu.0) {
            g.displays.push(id);
        }
        if let Some(s) = screen.and_then(|s| self.screens.get_mut(s.0)) {
            s.displays.push(id);
        }
        self.displays.push(Display {
            name: name.into(),
            gpu,
            screen,
            modes,
            cur_mode,
        });
        id
    }

    pub fn add_prime_display(&mut self, prime: PrimeDisplay) -> PrimeId {
        self.primes.push(prime);
        PrimeId(self.primes.len() - 1)
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Derived bounding box of the whole layout.
    pub fn dim(&self) -> Rect {
        self.dim
    }

    /// Bounding box of the screens and prime displays, leaving out the
    /// disabled-display row that [`dim`](Self::dim) also covers.
    pub fn placed_extent(&self) -> Rect {
        Rect::union_all(
            self.screens
                .iter()
                .map(|s| &s.dim)
                .chain(self.primes.iter().map(|p| &p.rect)),
        )
        .unwrap_or_default()
    }

    pub fn gpu(&self, id: GpuId) -> Option<&Gpu> {
        self.gpus.get(id.0)
    }

    pub fn display(&self, id: DisplayId) -> Option<&Display> {
        self.displays.get(id.0)
    }

    pub fn display_mut(&mut self, id: DisplayId) -> Option<&mut Display> {
        self.displays.get_mut(id.0)
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(id.0)
    }

    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.get_mut(id.0)
    }

    pub fn prime_display(&self, id: PrimeId) -> Option<&PrimeDisplay> {
        self.primes.get(id.0)
    }

    pub fn gpus(&self) -> impl Iterator<Item = (GpuId, &Gpu)> {
        self.gpus.iter().enumerate().map(|(i, g)| (GpuId(i), g))
    }

    pub fn displays(&self) -> impl Iterator<Item = (DisplayId, &Display)> {
        self.displays.iter().enumerate().map(|(i, d)| (DisplayId(i), d))
    }

    pub fn screens(&self) -> impl Iterator<Item = (ScreenId, &Screen)> {
        self.screens.iter().enumerate().map(|(i, s)| (ScreenId(i), s))
    }

    pub fn prime_displays(&self) -> impl Iterator<Item = (PrimeId, &PrimeDisplay)> {
        self.primes.iter().enumerate().map(|(i, p)| (PrimeId(i), p))
    }

    pub fn screen_ids(&self) -> impl Iterator<Item = ScreenId> {
        (0..self.screens.len()).map(ScreenId)
    }

    pub fn has_prime_displays(&self) -> bool {
        !self.primes.is_empty()
    }

    /// Total number of entities that take part in selection.
    pub fn entity_count(&self) -> usize {
        self.displays.len() + self.screens.len() + self.primes.len()
    }

    pub fn find_display(&self, name: &str) -> Option<DisplayId> {
        self.displays.iter().position(|d| d.name == name).map(DisplayId)
    }

    pub fn find_screen(&self, name: &str) -> Option<ScreenId> {
        self.screens.iter().position(|s| s.name == name).map(ScreenId)
    }

    /// Disabled displays in GPU order, the order of the overflow row.
    pub fn disabled_displays(&self) -> impl Iterator<Item = DisplayId> + '_ {
        self.gpus
            .iter()
            .flat_map(|g| g.displays.iter().copied())
            .filter(|d| self.displays.get(d.0).is_some_and(|d| d.screen.is_none()))
    }

    // ── Structural setters ────────────────────────────────────────────────────

    /// Appends a metamode to `screen`, cloning every display's current mode.
    ///
    /// Returns the new metamode index.
    pub fn add_metamode(&mut self, screen: ScreenId) -> Option<usize> {
        let s = self.screens.get_mut(screen.0)?;
        s.metamodes.push(MetaMode::default());
        let index = s.metamodes.len() - 1;
        for &d in &s.displays {
            if let Some(display) = self.displays.get_mut(d.0) {
                let template = display
                    .current_mode()
                    .or_else(|| display.modes.last())
                    .cloned()
                    .unwrap_or_else(|| Mode::off(640, 480));
                display.modes.push(template);
            }
        }
        Some(index)
    }

    /// Removes metamode `index` from `screen` along with each display's mode.
    ///
    /// The last remaining metamode cannot be deleted.
    pub fn delete_metamode(&mut self, screen: ScreenId, index: usize) -> bool {
        let Some(s) = self.screens.get_mut(screen.0) else {
            return false;
        };
        if s.metamodes.len() <= 1 || index >= s.metamodes.len() {
            return false;
        }
        s.metamodes.remove(index);
        if s.cur_metamode > index || s.cur_metamode >= s.metamodes.len() {
            s.cur_metamode = s.cur_metamode.saturating_sub(1);
        }
        let cur = s.cur_metamode;
        for &d in &s.displays {
            if let Some(display) = self.displays.get_mut(d.0) {
                if index < display.modes.len() {
                    display.modes.remove(index);
                }
                display.cur_mode = cur;
            }
        }
        true
    }

    /// Makes metamode `index` current on `screen` and all its displays.
    pub fn set_current_metamode(&mut self, screen: ScreenId, index: usize) -> bool {
        let Some(s) = self.screens.get_mut(screen.0) else {
            return false;
        };
        if index >= s.metamodes.len() {
            return false;
        }
        s.cur_metamode = index;
        for &d in &s.displays {
            if let Some(display) = self.displays.get_mut(d.0) {
                display.cur_mode = index;
            }
        }
        true
    }

    /// Attaches a disabled display to `screen`.
    ///
    /// The display gets one mode per metamode, cloned from its current mode,
    /// and is placed right of the screen's last display (or at the screen's
    /// corner when it is the first).
    pub fn enable_display(&mut self, display: DisplayId, screen: ScreenId) -> bool {
        let Some(s) = self.screens.get(screen.0) else {
            return false;
        };
        let Some(d) = self.displays.get(display.0) else {
            return false;
        };
        if d.screen.is_some() || s.no_scanout {
            return false;
        }
        let template = d
            .current_mode()
            .cloned()
            .unwrap_or_else(|| Mode::new(640, 480));
        let placement = match s.displays.last() {
            Some(&last) => Placement::Relative {
                relation: Relation::RightOf,
                to: last,
            },
            None => Placement::Absolute,
        };
        let origin = s.dim.origin();
        let metamodes = s.metamodes.len();
        let cur = s.cur_metamode;

        let mut mode = template.placed(placement);
        if placement.is_absolute() {
            mode = mode.at(origin.x, origin.y);
        }

        let d = &mut self.displays[display.0];
        d.modes = vec![mode; metamodes];
        d.cur_mode = cur;
        d.screen = Some(screen);
        self.screens[screen.0].displays.push(display);
        true
    }

    /// Detaches `display` from its screen.
    ///
    /// The display keeps only its current mode, made absolute.  Modes of the
    /// screen's other displays that were attached to it become absolute at
    /// their last resolved position.
    pub fn disable_display(&mut self, display: DisplayId) -> bool {
        let Some(screen) = self.displays.get(display.0).and_then(|d| d.screen) else {
            return false;
        };
        let Some(s) = self.screens.get_mut(screen.0) else {
            return false;
        };
        s.displays.retain(|&d| d != display);
        for &other in &s.displays {
            if let Some(o) = self.displays.get_mut(other.0) {
                for mode in &mut o.modes {
                    if mode.placement.reference() == Some(display) {
                        mode.placement = Placement::Absolute;
                    }
                }
            }
        }

        let d = &mut self.displays[display.0];
        let mut kept = d
            .current_mode()
            .cloned()
            .unwrap_or_else(|| Mode::off(640, 480));
        kept.placement = Placement::Absolute;
        d.modes = vec![kept];
        d.cur_mode = 0;
        d.screen = None;
        true
    }

    // ── Validation ────────────────────────────────────────────────────────────

    /// Checks the structural invariants the engine relies on.
    ///
    /// Cycles in the relative-positioning graph are not checked; the resolver
    /// breaks them at run time.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (gid, gpu) in self.gpus() {
            for &d in &gpu.displays {
                let display = self.display(d).ok_or(LayoutError::UnknownDisplay(d))?;
                if display.gpu != gid {
                    return Err(LayoutError::UnknownGpu(display.gpu));
                }
            }
        }

        for (sid, screen) in self.screens() {
            // Only a no-scanout screen owns its size; other sizes are derived.
            let own = if screen.no_scanout {
                screen.dim
            } else {
                Rect::from_parts(screen.dim.origin(), Size::new(0, 0))
            };
            let ceiling = Rect::new(0, 0, screen.max_width, screen.max_height);
            if !rect_in_range(&own, screen.no_scanout) || !rect_in_range(&ceiling, true) {
                return Err(LayoutError::GeometryOutOfRange {
                    entity: screen.name.clone(),
                });
            }
            if screen.cur_metamode >= screen.metamodes.len() {
                return Err(LayoutError::IndexOutOfRange {
                    what: "metamode",
                    index: screen.cur_metamode,
                    len: screen.metamodes.len(),
                });
            }
            if let Some(to) = screen.placement.reference() {
                if to == sid || self.screen(to).is_none() {
                    return Err(LayoutError::UnknownScreen(to));
                }
            }
            for &d in &screen.displays {
                let display = self.display(d).ok_or(LayoutError::UnknownDisplay(d))?;
                if display.screen != Some(sid) {
                    return Err(LayoutError::UnknownScreen(sid));
                }
            }
        }

        for (did, display) in self.displays() {
            self.gpu(display.gpu)
                .ok_or(LayoutError::UnknownGpu(display.gpu))?;
            if !display
                .modes
                .iter()
                .all(|m| rect_in_range(&m.pan, true) && size_in_range(m.viewport_in))
            {
                return Err(LayoutError::GeometryOutOfRange {
                    entity: display.name.clone(),
                });
            }
            match display.screen {
                Some(sid) => {
                    let screen = self.screen(sid).ok_or(LayoutError::UnknownScreen(sid))?;
                    if display.modes.len() != screen.metamodes.len() {
                        return Err(LayoutError::ModeCountMismatch {
                            display: display.name.clone(),
                            expected: screen.metamodes.len(),
                            found: display.modes.len(),
                        });
                    }
                    for mode in &display.modes {
                        if let Some(to) = mode.placement.reference() {
                            let same_screen =
                                self.display(to).is_some_and(|o| o.screen == Some(sid));
                            if to == did || !same_screen {
                                return Err(LayoutError::ForeignRelative {
                                    display: display.name.clone(),
                                });
                            }
                        }
                    }
                }
                None if display.modes.is_empty() => {
                    return Err(LayoutError::ModeCountMismatch {
                        display: display.name.clone(),
                        expected: 1,
                        found: 0,
                    });
                }
                None => {}
            }
            if display.cur_mode >= display.modes.len() {
                return Err(LayoutError::IndexOutOfRange {
                    what: "mode",
                    index: display.cur_mode,
                    len: display.modes.len(),
                });
            }
        }

        for (_, prime) in self.prime_displays() {
            if !rect_in_range(&prime.rect, true) {
                return Err(LayoutError::GeometryOutOfRange {
                    entity: prime.name.clone(),
                });
            }
            if let Some(sid) = prime.screen {
                self.screen(sid).ok_or(LayoutError::UnknownScreen(sid))?;
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
