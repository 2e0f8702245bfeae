//! Solver constants and runtime configuration defaults

/// Default maximum number of attempts per synthesis
pub const DEFAULT_MAX_ATTEMPTS: usize = 15;

/// Iteration budget per cell; an attempt gets `area * this` iterations
pub const ITERATION_BUDGET_PER_CELL: usize = 30;

/// Default number of low-entropy cells the selector may choose among
pub const DEFAULT_CANDIDATE_POOL: usize = 3;

/// Contradictions in a row before the selector pool widens
pub const DEFAULT_MAX_CONSECUTIVE_CONTRADICTIONS: usize = 5;

/// Extra candidate cells added each time the pool widens
pub const POOL_WIDENING_STEP: usize = 2;

/// Iterations between progress events
pub const PROGRESS_EVENT_INTERVAL: usize = 200;

// Cadence is a policy knob, not part of the event contract
/// Iterations between mid-attempt partial result events
pub const PARTIAL_RESULT_INTERVAL: usize = 1000;

/// Seed value meaning "draw a seed from the operating system"
pub const UNSEEDED: u64 = 0;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension in cells
pub const MAX_GRID_DIMENSION: usize = 10_000;

/// Default tile edge length in pixels for the CLI slicer
pub const DEFAULT_TILE_SIZE: u32 = 16;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
