//! Infrastructure layer for the command-line driver.
//!
//! Contains the file-system adapters: editor settings, layout snapshots and
//! edit scripts.  Each adapter turns a file into plain values the
//! `application` layer consumes.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `screenplan_core`, but MUST NOT be imported by the `application` layer.

pub mod script;
pub mod snapshot;
pub mod storage;
