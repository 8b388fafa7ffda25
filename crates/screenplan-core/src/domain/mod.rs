//! Domain entities for screenplan.
//!
//! Pure data with no engine logic: geometry primitives, the placement
//! relation between two entities, and the layout graph that owns every GPU,
//! display, screen and prime display.
//!
//! The engine modules in [`crate::engine`] read and mutate these types; the
//! types themselves never call into the engine.

/// Integer rectangles, points and sizes in layout space.
pub mod geometry;

/// Absolute and relative placement of one entity against another.
pub mod placement;

/// The entity graph.  See [`layout::Layout`] for the main type.
pub mod layout;

/// [`entity::EntityRef`], a tagged reference to any selectable entity.
pub mod entity;
