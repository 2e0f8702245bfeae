//! Wave function collapse solver for border-compatible tile mosaic synthesis
//!
//! The system compiles adjacency rules from per-tile border declarations,
//! maintains per-cell possibility sets with arc-consistency support counts,
//! and searches for a complete arrangement with chronological backtracking.
//! Observers follow the search through an injected event sink.

#![forbid(unsafe_code)]

/// Core solver implementation including rule compilation, propagation, selection and search
pub mod algorithm;
/// Input/output operations, event stream and error handling
pub mod io;
/// Grid state and tile descriptor management
pub mod spatial;

pub use io::error::{Result, SynthesisError};
