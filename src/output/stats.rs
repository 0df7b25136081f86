//! Statistics reporting.

use console::style;

use crate::download::{CollectionReport, RunReport};
use crate::output::progress::format_bytes;

/// Print statistics for a single collection.
pub fn print_collection_stats(report: &CollectionReport) {
    println!();
    println!("{}", style(format!("Statistics for {}:", report.title)).bold());
    println!("  Recordings:  {} fetched", report.items_fetched);
    if report.items_failed > 0 {
        println!("               {} failed", style(report.items_failed).red());
    }
    println!(
        "  Files:       {} downloaded, {} already complete",
        report.files_transferred, report.files_complete
    );
    if report.files_failed > 0 {
        println!("               {} failed", style(report.files_failed).red());
    }
    println!(
        "  Transferred: {} of {}",
        format_bytes(report.bytes),
        format_bytes(report.total_size)
    );
}

/// Print statistics across the whole run.
pub fn print_run_stats(report: &RunReport) {
    for collection in &report.collections {
        print_collection_stats(collection);
    }

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Run Statistics:").bold());
    println!(
        "  Series:      {} open, {} protected, {} institution, {} unknown",
        report.open, report.protected, report.eth_required, report.unknown
    );
    match report.institution_login {
        Some(true) => println!("  Login:       {}", style("institution login succeeded").green()),
        Some(false) => println!("  Login:       {}", style("institution login failed").red()),
        None => {}
    }
    println!(
        "  Files:       {} downloaded ({})",
        style(report.files_transferred()).green(),
        format_bytes(report.bytes())
    );
    if report.files_failed() > 0 {
        println!("  Failed:      {}", style(report.files_failed()).red());
    }
    for skipped in &report.skipped {
        println!(
            "  Skipped:     {} ({})",
            style(&skipped.name).yellow(),
            skipped.reason
        );
    }
    println!("{}", style("═".repeat(50)).dim());
}
