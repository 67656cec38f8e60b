//! Terminal UI: frame progress, spinners and styled status lines on stderr.

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use presid::FrameObserver;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const PROGRESS_TEMPLATE: &str = "{msg} [{bar:30.cyan/dim}] {pos}/{len}";

/// Spinner for short indeterminate phases such as an init call.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: impl Into<Cow<'static, str>>, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(spinner) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(spinner.tick_strings(&SPINNER_FRAMES));
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Clear the spinner; a visible one leaves a success line behind.
    pub fn finish_with_success(&self, message: &str) {
        let visible = !self.bar.is_hidden();
        self.bar.finish_and_clear();
        if visible {
            success(message);
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Frame progress bar; plugs into the execution controller as its observer.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(total: u32, message: &str, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(u64::from(total))
        } else {
            ProgressBar::hidden()
        };
        if let Ok(template) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(template.progress_chars("━╸━"));
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl FrameObserver for Progress {
    fn on_frame(&mut self, frame: u32) {
        self.bar.set_position(u64::from(frame));
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

// ============================================================================
// Styled output helpers
// ============================================================================

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a path output (like "-> /path/to/file").
pub fn path_output(path: &Path) {
    eprintln!("  {} {}", style("→").dim(), style(path.display()).dim());
}
