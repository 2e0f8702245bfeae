//! Backtracking search driver
//!
//! Runs the decision loop as an explicit iteration with explicit stacks:
//! each successful decision pushes an undo frame; a contradiction restores
//! the failed propagation, deactivates the failed candidate, and walks
//! frames back as far as the deactivations keep contradicting. Attempts
//! restart on a fresh grid until the attempt limit runs out.

use crate::{
    algorithm::propagation::{
        enforce_initial_consistency, propagate_add, propagate_remove, UndoBatch,
    },
    algorithm::rules::AdjacencyRules,
    algorithm::selection::{choose_candidate, select_decision_cell, CellChoice, RandomSelector},
    algorithm::validation::{compatibility_score, validate_arrangement},
    io::configuration::{
        DEFAULT_CANDIDATE_POOL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONSECUTIVE_CONTRADICTIONS,
        ITERATION_BUDGET_PER_CELL, MAX_GRID_DIMENSION, PARTIAL_RESULT_INTERVAL,
        POOL_WIDENING_STEP, PROGRESS_EVENT_INTERVAL, UNSEEDED,
    },
    io::error::{invalid_parameter, Result, SynthesisError},
    io::events::{EventSink, SinkDirective, SynthesisEvent},
    spatial::grid::{Arrangement, CellGrid},
    spatial::tiles::TileSet,
};
use rand::Rng;

/// Runtime knobs for one synthesis
#[derive(Clone, Copy, Debug)]
pub struct SynthesisConfig {
    /// Attempt limit for the whole synthesis
    pub max_attempts: usize,
    /// Iteration limit per attempt; `None` scales with grid area
    pub max_iterations: Option<usize>,
    /// How many low-entropy cells the selector may choose among
    pub candidate_pool_size: usize,
    /// Contradictions in a row before the selector pool widens
    pub max_consecutive_contradictions: usize,
    /// Random seed; [`UNSEEDED`] draws one from the operating system
    pub seed: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_iterations: None,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL,
            max_consecutive_contradictions: DEFAULT_MAX_CONSECUTIVE_CONTRADICTIONS,
            seed: UNSEEDED,
        }
    }
}

impl SynthesisConfig {
    /// Validate the knobs against the grid they will drive
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is below its minimum or the iteration
    /// limit cannot cover one decision per cell.
    pub fn validate(&self, area: usize) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &self.max_attempts,
                &"must be at least 1",
            ));
        }
        if self.candidate_pool_size == 0 {
            return Err(invalid_parameter(
                "candidate_pool_size",
                &self.candidate_pool_size,
                &"must be at least 1",
            ));
        }
        if self.max_consecutive_contradictions == 0 {
            return Err(invalid_parameter(
                "max_consecutive_contradictions",
                &self.max_consecutive_contradictions,
                &"must be at least 1",
            ));
        }
        if let Some(limit) = self.max_iterations {
            if limit < area {
                return Err(invalid_parameter(
                    "max_iterations",
                    &limit,
                    &format!("must be at least the grid area ({area})"),
                ));
            }
        }
        Ok(())
    }
}

/// Undo frame for one committed decision
#[derive(Debug)]
struct DecisionFrame {
    row: usize,
    col: usize,
    tile: usize,
    batch: UndoBatch,
}

/// How one attempt ended
enum AttemptOutcome {
    /// Every cell collapsed
    Solved(Arrangement),
    /// Iteration limit reached
    Exhausted,
    /// Backtracking ran out of frames; the attempt cannot proceed
    Infeasible,
}

/// Wave function collapse search over a fixed grid
///
/// Owns the grid, the undo stack and the seeded selector for one
/// synthesis. The compiled rule table is immutable and could be shared;
/// everything else is exclusive to this executor.
pub struct CollapseExecutor {
    tiles: TileSet,
    rules: AdjacencyRules,
    rows: usize,
    cols: usize,
    config: SynthesisConfig,
    effective_seed: u64,
    selector: RandomSelector,
    grid: CellGrid,
    frames: Vec<DecisionFrame>,
    iteration: usize,
    pool_size: usize,
    consecutive_contradictions: usize,
    last_decision: Option<(usize, usize)>,
    last_changes: Option<usize>,
}

impl CollapseExecutor {
    /// Build an executor for a target canvas
    ///
    /// Grid dimensions derive from the target pixel dimensions, which must
    /// be exact multiples of the tile geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The target dimensions are zero or not divisible by the tile size
    /// - The derived grid exceeds the allocation safety limit
    /// - A configuration knob fails validation
    pub fn new(
        tiles: TileSet,
        target_width: u32,
        target_height: u32,
        config: SynthesisConfig,
    ) -> Result<Self> {
        let (rows, cols) = tiles.grid_dimensions(target_width, target_height)?;
        if rows > MAX_GRID_DIMENSION || cols > MAX_GRID_DIMENSION {
            return Err(invalid_parameter(
                "target dimensions",
                &format!("{rows}x{cols} cells"),
                &format!("grid dimension limit is {MAX_GRID_DIMENSION}"),
            ));
        }
        config.validate(rows * cols)?;

        let effective_seed = if config.seed == UNSEEDED {
            rand::rng().random()
        } else {
            config.seed
        };

        let rules = AdjacencyRules::compile(&tiles);
        let tile_count = tiles.len();

        Ok(Self {
            tiles,
            rules,
            rows,
            cols,
            config,
            effective_seed,
            selector: RandomSelector::new(effective_seed),
            grid: CellGrid::new(rows, cols, tile_count),
            frames: Vec::new(),
            iteration: 0,
            pool_size: config.candidate_pool_size,
            consecutive_contradictions: 0,
            last_decision: None,
            last_changes: None,
        })
    }

    /// Grid height in cells
    pub const fn grid_rows(&self) -> usize {
        self.rows
    }

    /// Grid width in cells
    pub const fn grid_cols(&self) -> usize {
        self.cols
    }

    /// The tile set driving this synthesis
    pub const fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    /// The compiled adjacency table
    pub const fn rules(&self) -> &AdjacencyRules {
        &self.rules
    }

    /// Run the synthesis to a terminal outcome
    ///
    /// Emits the full event stream to `sink` and returns the complete
    /// arrangement on success. A success arrangement that fails post-hoc
    /// validation is a solver bug; it is reported on stderr and still
    /// returned so the host can inspect it.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Unsolvable`] after all attempts fail and
    /// [`SynthesisError::Cancelled`] when the sink stops the synthesis.
    #[allow(clippy::print_stderr)]
    pub fn run(&mut self, sink: &mut dyn EventSink) -> Result<Arrangement> {
        for attempt in 1..=self.config.max_attempts {
            self.emit(
                sink,
                SynthesisEvent::AttemptStart {
                    attempt,
                    max_attempts: self.config.max_attempts,
                },
            )?;

            match self.run_attempt(attempt, sink)? {
                AttemptOutcome::Solved(arrangement) => {
                    let score = compatibility_score(&arrangement, &self.rules);
                    let violations = validate_arrangement(&arrangement, &self.rules);
                    if !violations.is_empty() {
                        eprintln!(
                            "Warning: completed arrangement has {} adjacency violations",
                            violations.len()
                        );
                    }
                    // Terminal event: the stream ends here regardless of
                    // what the sink replies.
                    sink.on_event(&SynthesisEvent::Completed {
                        arrangement: arrangement.to_id_rows(&self.tiles),
                        compatibility_score: score,
                    });
                    return Ok(arrangement);
                }
                AttemptOutcome::Exhausted | AttemptOutcome::Infeasible => {}
            }
        }

        let error = SynthesisError::Unsolvable {
            attempts: self.config.max_attempts,
            iterations: self.iteration,
        };
        sink.on_event(&SynthesisEvent::Failed {
            reason: error.to_string(),
        });
        Err(error)
    }

    /// Run one attempt on a fresh grid
    fn run_attempt(
        &mut self,
        attempt: usize,
        sink: &mut dyn EventSink,
    ) -> Result<AttemptOutcome> {
        self.grid = CellGrid::new(self.rows, self.cols, self.tiles.len());
        self.frames.clear();
        self.iteration = 0;
        self.pool_size = self.config.candidate_pool_size;
        self.consecutive_contradictions = 0;
        self.last_decision = None;
        self.last_changes = None;

        // Tiles the borders can never support must go before any decision.
        let sweep = enforce_initial_consistency(&mut self.grid, &self.rules);
        if sweep.contradiction {
            self.emit_partial(attempt, sink)?;
            return Ok(AttemptOutcome::Infeasible);
        }

        let area = self.rows * self.cols;
        let max_iterations = self
            .config
            .max_iterations
            .unwrap_or(area * ITERATION_BUDGET_PER_CELL);

        loop {
            if self.iteration >= max_iterations {
                self.emit_partial(attempt, sink)?;
                return Ok(AttemptOutcome::Exhausted);
            }
            self.iteration += 1;

            if self.iteration % PROGRESS_EVENT_INTERVAL == 0 {
                self.emit_progress(attempt, sink)?;
            }
            if self.iteration % PARTIAL_RESULT_INTERVAL == 0 {
                self.emit_partial(attempt, sink)?;
            }

            let choice = select_decision_cell(
                &self.grid,
                self.pool_size,
                self.effective_seed,
                self.iteration,
                &mut self.selector,
            );

            match choice {
                CellChoice::Complete => {
                    return Ok(AttemptOutcome::Solved(Arrangement::from_grid(&self.grid)));
                }
                CellChoice::Contradiction(_, _) => {
                    // Latent contradiction left by earlier propagation.
                    self.register_contradiction();
                    if !self.backtrack_one_level() {
                        self.emit_partial(attempt, sink)?;
                        return Ok(AttemptOutcome::Infeasible);
                    }
                }
                CellChoice::Decided(row, col) => {
                    if !self.decide(row, col) {
                        self.emit_partial(attempt, sink)?;
                        return Ok(AttemptOutcome::Infeasible);
                    }
                }
            }
        }
    }

    /// Make one decision at a cell, handling any resulting contradiction
    ///
    /// Returns false when backtracking ran out of frames.
    fn decide(&mut self, row: usize, col: usize) -> bool {
        let Some(candidate) = self
            .grid
            .possibilities(row, col)
            .and_then(|set| choose_candidate(set, &mut self.selector))
        else {
            self.register_contradiction();
            return self.backtrack_one_level();
        };

        let removal_set: Vec<usize> = self
            .grid
            .possibilities(row, col)
            .map(|set| set.iter().filter(|&tile| tile != candidate).collect())
            .unwrap_or_default();

        let outcome = propagate_remove(&mut self.grid, &self.rules, row, col, &removal_set);
        self.last_decision = Some((row, col));
        self.last_changes = Some(outcome.batch.len());

        if outcome.contradiction {
            propagate_add(&mut self.grid, &self.rules, &outcome.batch);
            self.register_contradiction();
            self.deactivate_candidate(row, col, candidate)
        } else {
            self.frames.push(DecisionFrame {
                row,
                col,
                tile: candidate,
                batch: outcome.batch,
            });
            self.consecutive_contradictions = 0;
            true
        }
    }

    /// Permanently drop a failed candidate, backtracking while that fails
    ///
    /// The deactivation removal is recorded in the enclosing frame so a
    /// deeper backtrack restores it; at the root it is simply permanent
    /// for the remainder of the attempt. When deactivation itself
    /// contradicts, the most recent frame is restored and its own tile
    /// becomes the next candidate to deactivate. Returns false once the
    /// stack is exhausted.
    fn deactivate_candidate(&mut self, row: usize, col: usize, tile: usize) -> bool {
        let mut target = (row, col, tile);

        loop {
            let outcome = propagate_remove(
                &mut self.grid,
                &self.rules,
                target.0,
                target.1,
                &[target.2],
            );
            if !outcome.contradiction {
                if let Some(frame) = self.frames.last_mut() {
                    frame.batch.merge(outcome.batch);
                }
                return true;
            }

            propagate_add(&mut self.grid, &self.rules, &outcome.batch);
            match self.frames.pop() {
                Some(frame) => {
                    propagate_add(&mut self.grid, &self.rules, &frame.batch);
                    target = (frame.row, frame.col, frame.tile);
                }
                None => return false,
            }
        }
    }

    /// Undo the most recent decision and deactivate its candidate
    fn backtrack_one_level(&mut self) -> bool {
        match self.frames.pop() {
            Some(frame) => {
                propagate_add(&mut self.grid, &self.rules, &frame.batch);
                self.deactivate_candidate(frame.row, frame.col, frame.tile)
            }
            None => false,
        }
    }

    /// Track contradiction pressure, widening the selector pool when the
    /// configured run length is exceeded
    fn register_contradiction(&mut self) {
        self.consecutive_contradictions += 1;
        if self.consecutive_contradictions > self.config.max_consecutive_contradictions {
            self.pool_size += POOL_WIDENING_STEP;
            self.consecutive_contradictions = 0;
        }
    }

    /// Emit a non-terminal event, honoring the sink's directive
    fn emit(&self, sink: &mut dyn EventSink, event: SynthesisEvent) -> Result<()> {
        match sink.on_event(&event) {
            SinkDirective::Continue => Ok(()),
            SinkDirective::Stop => Err(SynthesisError::Cancelled),
        }
    }

    /// Emit a progress snapshot
    fn emit_progress(&self, attempt: usize, sink: &mut dyn EventSink) -> Result<()> {
        self.emit(
            sink,
            SynthesisEvent::Progress {
                attempt,
                iteration: self.iteration,
                collapsed_cells: self.grid.collapsed_count(),
                total_cells: self.grid.total_cells(),
                decision_cell: self.last_decision,
                propagation_changes: self.last_changes,
            },
        )
    }

    /// Emit a partial arrangement snapshot
    fn emit_partial(&self, attempt: usize, sink: &mut dyn EventSink) -> Result<()> {
        let arrangement = Arrangement::from_grid(&self.grid);
        let score = compatibility_score(&arrangement, &self.rules);
        self.emit(
            sink,
            SynthesisEvent::PartialResult {
                attempt,
                arrangement: arrangement.to_id_rows(&self.tiles),
                compatibility_score: score,
            },
        )
    }
}
