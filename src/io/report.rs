//! Console progress lines.

use std::io::{self, Write};
use std::time::Instant;

use super::format_elapsed;
use crate::compute::ProgressEvent;

/// Prints one line per progress event, with wall-clock time since creation.
pub struct ConsoleReporter<W: Write> {
    out: W,
    start: Instant,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            start: Instant::now(),
        }
    }

    /// Format and write the line for `event`.
    pub fn report(&mut self, event: &ProgressEvent<'_>) -> io::Result<()> {
        writeln!(
            self.out,
            "{}  Time: {}",
            progress_line(event),
            format_elapsed(self.start.elapsed())
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `Iterations: {i}  Changes: {c}  Similarity: {score:.2}%`
pub fn progress_line(event: &ProgressEvent<'_>) -> String {
    format!(
        "Iterations: {}  Changes: {}  Similarity: {:.2}%",
        event.iteration, event.accepted_changes, event.score
    )
}
