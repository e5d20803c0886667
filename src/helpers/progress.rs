//! Terminal progress for downloads and extraction
//!
//! A [`Progress`] starts life as a spinner and switches to a byte counter
//! once the total size is known. It clears itself when dropped, so an
//! early return never leaves a half-drawn bar behind.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK_EVERY: Duration = Duration::from_millis(80);

const SPINNER_TEMPLATE: &str = "     {spinner:.cyan} {msg}";
const BYTES_TEMPLATE: &str = "     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})";

pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Start a spinner labelled `message`.
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            bar.set_style(style.tick_chars(TICKS));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(TICK_EVERY);
        Self { bar }
    }

    /// Switch to a byte counter out of `total`.
    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        if let Ok(style) = ProgressStyle::default_bar().template(BYTES_TEMPLATE) {
            self.bar.set_style(style.progress_chars("━╸━"));
        }
    }

    pub fn set_position(&self, done: u64) {
        self.bar.set_position(done);
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
