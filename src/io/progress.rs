//! Terminal progress display driven by synthesis events

use crate::io::events::{EventSink, SinkDirective, SynthesisEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static COLLAPSE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} cells")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Event sink rendering a collapse progress bar
///
/// One bar tracks collapsed cells against the grid total; the message
/// shows the attempt counter. The bar resets on every attempt start and
/// finishes on either terminal event. Never cancels the synthesis.
pub struct ProgressSink {
    bar: ProgressBar,
    total_cells: u64,
}

impl ProgressSink {
    /// Create a progress sink for a grid of the given size
    pub fn new(total_cells: usize) -> Self {
        let bar = ProgressBar::new(total_cells as u64);
        bar.set_style(COLLAPSE_STYLE.clone());
        Self {
            bar,
            total_cells: total_cells as u64,
        }
    }

    /// Clear the display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EventSink for ProgressSink {
    fn on_event(&mut self, event: &SynthesisEvent) -> SinkDirective {
        match event {
            SynthesisEvent::AttemptStart {
                attempt,
                max_attempts,
            } => {
                self.bar.set_length(self.total_cells);
                self.bar.set_position(0);
                self.bar.set_message(format!("attempt {attempt}/{max_attempts}"));
            }
            SynthesisEvent::Progress {
                collapsed_cells, ..
            } => {
                self.bar.set_position(*collapsed_cells as u64);
            }
            SynthesisEvent::PartialResult { .. } => {}
            SynthesisEvent::Completed { .. } => {
                self.bar.set_position(self.total_cells);
                self.bar.finish_with_message("complete");
            }
            SynthesisEvent::Failed { reason } => {
                self.bar.abandon_with_message(reason.clone());
            }
        }
        SinkDirective::Continue
    }
}
