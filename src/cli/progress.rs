//! Console status output with a batch progress bar.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::extraction::{StatusLevel, StatusSink};

/// Renders status lines to the terminal above a files-processed bar.
pub struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Self { bar }
    }

    /// Remove the bar once the batch is over.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn println(&self, line: String) {
        // A hidden bar (no terminal) swallows println output.
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Format one status line for the terminal.
fn render(level: StatusLevel, text: &str) -> String {
    match level {
        StatusLevel::Info => format!("{} {}", style("→").cyan(), text),
        StatusLevel::Warn => format!("{} {}", style("⚠").yellow(), style(text).yellow()),
        StatusLevel::Error => format!("{} {}", style("✗").red(), style(text).red()),
        StatusLevel::Success => format!("{} {}", style("✓").green(), text),
        StatusLevel::Detail => format!("    {}", style(format!("- {}", text)).dim()),
    }
}

impl StatusSink for ConsoleSink {
    fn emit(&self, level: StatusLevel, text: &str) {
        self.println(render(level, text));
    }

    fn file_started(&self, index: usize, total: usize, name: &str) {
        self.bar.set_length(total as u64);
        self.bar.set_position(index as u64);
        self.bar.set_message(name.to_string());
        self.info(&format!("Processing {} ({}/{})", name, index + 1, total));
    }

    fn file_finished(&self, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
    }
}
