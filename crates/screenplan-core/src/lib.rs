//! # screenplan-core
//!
//! Layout model and editing engine for multi-monitor display configurations.
//!
//! The crate answers two questions about a set of GPUs, displays and
//! screens: *where does everything end up* given a mix of absolute and
//! relative placement, and *what happens when the user drags something*.
//! It performs no I/O; loading and saving layouts is the caller's job.
//!
//! # Architecture overview
//!
//! - **`domain`** – The entity graph.  A [`Layout`] owns GPUs, displays,
//!   screens and prime displays in arenas addressed by typed ids.  Each
//!   display has one [`Mode`] per metamode of its screen; a mode is either
//!   absolute or attached to a sibling display ("right of DP-0").
//!
//! - **`engine`** – The algorithms.  The resolver turns the relative graph
//!   into absolute rectangles and recomputes bounding boxes bottom-up.  The
//!   snap engine pulls a dragged rectangle onto nearby edges.  The
//!   modification engine applies drag deltas under size ceilings.  The
//!   Z-order manager handles hit testing and selection.
//!
//! - **`view`** – [`LayoutView`], the session object.  It owns a layout, its
//!   selection and drag state, and notifies [`LayoutObserver`]s.
//!
//! ```
//! use screenplan_core::{EditOptions, Gpu, Layout, LayoutView, Mode, Relation, Screen};
//!
//! let mut layout = Layout::new();
//! let gpu = layout.add_gpu(Gpu::new("GPU-0"));
//! let screen = layout.add_screen(Screen::new("Screen-0", 1));
//! let left = layout.add_display(gpu, Some(screen), "DP-0", vec![Mode::new(1920, 1080)]);
//! let right = layout.add_display(
//!     gpu,
//!     Some(screen),
//!     "DP-1",
//!     vec![Mode::new(1280, 1024).relative(Relation::RightOf, left)],
//! );
//!
//! let view = LayoutView::new(layout, EditOptions::default());
//! let pan = view.layout().display(right).unwrap().current_mode().unwrap().pan;
//! assert_eq!((pan.x, pan.y), (1920, 0));
//! ```

pub mod domain;
pub mod engine;
pub mod view;

// Re-export the most-used types at the crate root so callers can write
// `screenplan_core::Layout` instead of `screenplan_core::domain::layout::Layout`.
pub use domain::entity::EntityRef;
pub use domain::geometry::{Point, Rect, Size};
pub use domain::layout::{
    Display, DisplayId, DisplayPlacement, Gpu, GpuId, Layout, LayoutError, MetaMode, Mode,
    Modeline, PrimeDisplay, PrimeId, Reflection, Rotation, Screen, ScreenId, ScreenPlacement,
    MAX_LAYOUT_HEIGHT, MAX_LAYOUT_WIDTH, MIN_SCREEN_HEIGHT, MIN_SCREEN_WIDTH,
};
pub use domain::placement::{Placement, Relation};
pub use engine::modify::{DragState, EditOptions};
pub use engine::snap::DEFAULT_SNAP_STRENGTH;
pub use engine::zorder::ZOrder;
pub use view::{LayoutObserver, LayoutView};
