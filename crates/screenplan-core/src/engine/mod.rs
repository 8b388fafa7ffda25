//! Layout algorithms operating on [`crate::domain`] types.
//!
//! Dependencies run one way: [`resolve`] and [`snap`] only read the model,
//! [`modify`] calls both, and [`zorder`] is independent of the other three.

/// Relative placement to absolute rectangles; bounding boxes; the refresh pass.
pub mod resolve;

/// Edge and midline snapping during drags.
pub mod snap;

/// Drag-to-move, drag-to-resize and typed-in position setters.
pub mod modify;

/// Front-to-back ordering, hit testing and selection.
pub mod zorder;
