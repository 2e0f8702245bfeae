//! Structured event stream for synthesis observers
//!
//! The solver pushes events through an injected sink; the sink's reply is
//! the cooperative cancellation point. Events for one synthesis are
//! totally ordered, attempt numbers never decrease, iterations never
//! decrease within an attempt, and exactly one terminal event is emitted —
//! after a success nothing follows.

/// Arrangement payload rows: tile ids, empty string while uncollapsed
pub type IdRows = Vec<Vec<String>>;

/// One observer event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// A fresh attempt is starting on a reset grid
    AttemptStart {
        /// 1-based attempt number
        attempt: usize,
        /// Attempt limit for the whole synthesis
        max_attempts: usize,
    },

    /// Periodic progress within an attempt
    Progress {
        /// 1-based attempt number
        attempt: usize,
        /// Iterations spent in this attempt so far
        iteration: usize,
        /// Cells currently collapsed
        collapsed_cells: usize,
        /// Total cells in the grid
        total_cells: usize,
        /// Cell of the most recent decision, if any
        decision_cell: Option<(usize, usize)>,
        /// Possibilities removed by the most recent propagation
        propagation_changes: Option<usize>,
    },

    /// Snapshot of an incomplete arrangement
    ///
    /// Emitted at a coarse cadence mid-attempt and at the end of every
    /// failed or abandoned attempt.
    PartialResult {
        /// 1-based attempt number
        attempt: usize,
        /// Arrangement rows with empty-string sentinels
        arrangement: IdRows,
        /// Satisfied ordered adjacencies in the snapshot
        compatibility_score: usize,
    },

    /// Terminal success; no further events follow
    Completed {
        /// Complete arrangement rows
        arrangement: IdRows,
        /// Satisfied ordered adjacencies
        compatibility_score: usize,
    },

    /// Terminal failure after every attempt was exhausted
    Failed {
        /// Human-readable reason
        reason: String,
    },
}

/// Observer reply controlling the synthesis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkDirective {
    /// Keep going
    Continue,
    /// Abandon the synthesis at this event boundary, emitting nothing more
    Stop,
}

/// Injected observer for the synthesis event stream
///
/// Sinks may drop events they do not care about but never see them out of
/// order. Returning [`SinkDirective::Stop`] cancels the synthesis
/// cooperatively at the current event boundary.
pub trait EventSink {
    /// Receive one event and steer the synthesis
    fn on_event(&mut self, event: &SynthesisEvent) -> SinkDirective;
}

/// Sink that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &SynthesisEvent) -> SinkDirective {
        SinkDirective::Continue
    }
}

/// Sink that records every event in order
///
/// Used by hosts that want to replay the stream and by the contract tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Vec<SynthesisEvent>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events received so far, in emission order
    pub fn events(&self) -> &[SynthesisEvent] {
        &self.events
    }

    /// Consume the sink and return the recorded stream
    pub fn into_events(self) -> Vec<SynthesisEvent> {
        self.events
    }
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: &SynthesisEvent) -> SinkDirective {
        self.events.push(event.clone());
        SinkDirective::Continue
    }
}

/// Sink that cancels after a fixed number of events
///
/// Exercises the cooperative cancellation path in tests and hosts that
/// bound how long a synthesis may run.
#[derive(Clone, Copy, Debug)]
pub struct CancellingSink {
    remaining: usize,
}

impl CancellingSink {
    /// Cancel once `allow` events have been observed
    pub const fn after(allow: usize) -> Self {
        Self { remaining: allow }
    }
}

impl EventSink for CancellingSink {
    fn on_event(&mut self, _event: &SynthesisEvent) -> SinkDirective {
        if self.remaining == 0 {
            SinkDirective::Stop
        } else {
            self.remaining -= 1;
            SinkDirective::Continue
        }
    }
}
