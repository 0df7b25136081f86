//! Console output utilities.

use std::path::Path;

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     eth-videoz                                        ║
║     Lecture recordings from video.ethz.ch             ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print the notice shown for the first runs after the list file was created.
pub fn print_notice(remaining: u32) {
    println!(
        "{} If this tool saves you time, consider starring the project. \
         ({} more time(s))",
        style("*").yellow().bold(),
        remaining
    );
}

/// Print configuration summary.
pub fn print_config_summary(collections: usize, quality: &str, subtitles: &str, save_dir: &Path) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Series:    {}", collections);
    println!("  Quality:   {}", quality);
    println!("  Subtitles: {}", subtitles);
    println!("  Directory: {}", save_dir.display());
    println!();
}
