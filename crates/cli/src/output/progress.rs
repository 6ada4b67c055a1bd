//! Progress indication for running phases
//!
//! A phase runs many small transfers whose individual lines are already
//! logged, so only an indeterminate spinner is shown while it runs. Log lines
//! are written through [`LogWriter`], which hides the spinner for the
//! duration of each write so the two never share a terminal line.

use std::io::{self, Write};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;

use super::OutputConfig;

/// Spinner wrapper
///
/// In quiet or JSON mode, or with progress disabled, nothing is drawn.
#[derive(Debug)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Start a spinner with the given message
    pub fn start(config: &OutputConfig, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress {
            None
        } else {
            let bar = config.progress.add(ProgressBar::new_spinner());
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
            {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            Some(bar)
        };

        Self { bar }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if the spinner is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

/// stderr writer for the tracing subscriber
///
/// Shares its [`MultiProgress`] with every spinner started from the same
/// [`OutputConfig`].
#[derive(Debug, Clone, Default)]
pub struct LogWriter {
    progress: MultiProgress,
}

impl LogWriter {
    /// Draw target spinners must be added to
    pub fn progress(&self) -> &MultiProgress {
        &self.progress
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.progress.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
