//! Progress bars for the two engine progress channels.

use indicatif::{ProgressBar, ProgressStyle};

/// Bar for digest verification, driven by a percentage.
pub fn verify_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Verifying [{bar:40.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

/// Bar for downloads, driven by the absolute completed count.
pub fn download_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

/// Convert a validation percentage into a bar position.
pub fn percent_position(percent: f32) -> u64 {
    let clamped = percent.clamp(0.0, 100.0);
    // Clamped to 0..=100, so the cast is exact after rounding.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let position = clamped.round() as u64;
    position
}
