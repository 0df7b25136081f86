//! Progress display: click counter, transfer bars and byte formatting.

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::Mutex;

use crate::download::{ProgressFactory, TransferProgress};

/// Counts page navigations and clicks made in the browser.
///
/// Display only; nothing depends on the value for correctness.
#[derive(Default)]
pub struct ClickCounter {
    count: Mutex<u64>,
    spinner: Option<ProgressBar>,
}

impl ClickCounter {
    /// A counter without display, for tests and quiet runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter that shows its value on a spinner line of `multi`.
    pub fn with_spinner(multi: &MultiProgress) -> Self {
        let spinner = multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self {
            count: Mutex::new(0),
            spinner: Some(spinner),
        }
    }

    /// Record one click and return the new total.
    pub async fn increment(&self) -> u64 {
        let mut count = self.count.lock().await;
        *count += 1;
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("Clicked through the portal {} times", *count));
        }
        *count
    }

    pub async fn count(&self) -> u64 {
        *self.count.lock().await
    }

    /// Remove the spinner line.
    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

/// Byte-transfer progress rendered with indicatif, one bar per file.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Add a bar for `name` to `multi`.
    pub fn new(multi: &MultiProgress, name: &str) -> Self {
        let bar = multi.add(ProgressBar::new(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:30!} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(name.to_string());
        Self { bar }
    }
}

impl TransferProgress for BarProgress {
    fn begin(&self, total: u64, already: u64) {
        self.bar.set_length(total);
        self.bar.set_position(already);
    }

    fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Hands out one [`BarProgress`] per file, all drawn on the same terminal area.
#[derive(Clone, Default)]
pub struct BarFactory {
    multi: MultiProgress,
}

impl BarFactory {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl ProgressFactory for BarFactory {
    fn track(&self, name: &str) -> Box<dyn TransferProgress> {
        Box::new(BarProgress::new(&self.multi, name))
    }
}

/// Human readable byte count with binary steps: `1.50 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}
