/*!
 * Progress reporting and cooperative cancellation
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{CopyError, Result};

/// Resolution of the console bar; fractions are mapped onto this length
const BAR_LENGTH: u64 = 1000;

/// Sink the build pipeline reports into and polls for cancellation
pub trait ProgressSink {
    /// Report overall progress in `0.0..=1.0` with a status line
    fn report(&self, fraction: f64, status: &str);

    /// Whether the host asked the build to stop
    fn is_cancelled(&self) -> bool;

    /// `Err(CopyError::Cancelled)` once cancellation was requested
    fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CopyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for &P {
    fn report(&self, fraction: f64, status: &str) {
        (**self).report(fraction, status)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Shared cancellation flag, cloned between the host and the worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A bare token reports nowhere
impl ProgressSink for CancelToken {
    fn report(&self, _fraction: f64, _status: &str) {}

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress bar on stderr
#[derive(Debug, Clone)]
pub struct ConsoleProgress {
    bar: ProgressBar,
    cancel: CancelToken,
}

impl ConsoleProgress {
    /// Create a visible, ticking progress bar
    pub fn new(cancel: CancelToken) -> Self {
        let bar = ProgressBar::new(BAR_LENGTH);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {percent:>3}% {wide_msg:.dim.white}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix("Copying for LLM");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, cancel }
    }

    /// Create a bar that draws nothing
    pub fn hidden(cancel: CancelToken) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            cancel,
        }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, fraction: f64, status: &str) {
        let fraction = fraction.clamp(0.0, 1.0);
        self.bar.set_position((fraction * BAR_LENGTH as f64).round() as u64);
        self.bar.set_message(status.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
