// Terminal progress bar for download percentages

use colored::Colorize;
use std::io::{self, Write};

const BAR_LENGTH: usize = 30;

/// Render `[=====     ]` for a percentage in 0..=100
pub fn render_bar(percentage: f64) -> (String, String) {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_LENGTH as f64).round() as usize;
    let filled = filled.min(BAR_LENGTH);
    ("=".repeat(filled), " ".repeat(BAR_LENGTH - filled))
}

/// Redraw the progress line in place
pub fn show_progress_bar(percentage: f64, prefix: &str) {
    let (filled, empty) = render_bar(percentage);

    print!(
        "\r{} [{}{}] {:>5.1}% ",
        prefix.white(),
        filled.green(),
        empty,
        percentage.clamp(0.0, 100.0)
    );

    io::stdout().flush().ok();
}

/// Clear the current line (useful for progress bars)
pub fn clear_line() {
    print!("\r{}\r", " ".repeat(80));
    io::stdout().flush().ok();
}
