//! Application layer use cases for the command-line driver.
//!
//! Use cases in this layer orchestrate a [`screenplan_core::LayoutView`] to
//! fulfil one user goal.  They contain no file system access; the
//! `infrastructure` layer reads snapshots, scripts and settings and hands
//! them over as plain values.
//!
//! # Sub-modules
//!
//! - **`position`** – Name-based placement ("below DP-0") as it appears in
//!   snapshot and script files, and its conversion to typed ids.
//!
//! - **`replay`** – Applies a list of scripted edit operations to a view and
//!   records whether each one modified the layout.
//!
//! - **`report`** – Renders the resolved geometry as text lines.

pub mod position;
pub mod replay;
pub mod report;
