//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars and the click counter
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_notice,
    print_success, print_warning,
};
pub use progress::{format_bytes, BarFactory, BarProgress, ClickCounter};
pub use stats::{print_collection_stats, print_run_stats};
