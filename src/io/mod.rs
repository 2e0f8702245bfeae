//! Input/output ring around the solver core
//!
//! Error types, runtime configuration, the observer event stream, the
//! image slicing and compositing collaborators, and the CLI driver.

/// Command-line interface and single-image pipeline
pub mod cli;
/// Solver constants and runtime configuration defaults
pub mod configuration;
/// Error types for synthesis operations
pub mod error;
/// Structured event stream for synthesis observers
pub mod events;
/// Image slicing, border extraction and arrangement compositing
pub mod image;
/// Progress display driven by synthesis events
pub mod progress;
