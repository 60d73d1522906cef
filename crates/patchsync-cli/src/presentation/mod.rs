//! Terminal output helpers.

pub mod progress;
pub mod report;

pub use progress::{download_bar, verify_bar};
pub use report::{render_report, render_summary};
