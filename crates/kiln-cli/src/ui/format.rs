//! Formatting utilities for sizes, durations and the build summary.

use std::time::Duration;

use console::Term;
use kiln_bundler::OutputFile;
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format a file size in the most appropriate unit (B, KB, MB, GB).
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds or `m s`.
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the written files with their sizes, then the total, to stderr.
pub fn print_build_summary(files: &[OutputFile], duration: Duration) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let name_width = files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    let total: u64 = files.iter().map(|f| f.size as u64).sum();

    if colors_enabled() {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for file in files {
        let size = format_size(file.size as u64);
        if colors_enabled() {
            eprintln!(
                "  {} {:<name_width$} {}",
                "▸".blue(),
                file.path.bright_white(),
                size.dimmed()
            );
        } else {
            eprintln!("  ▸ {:<name_width$} {}", file.path, size);
        }
    }

    eprintln!("{}", "─".repeat(width));
    let files_label = if files.len() == 1 { "file" } else { "files" };
    if colors_enabled() {
        eprintln!(
            "  {} {} {}, {} in {}",
            "Total:".bold(),
            files.len(),
            files_label,
            format_size(total).green(),
            format_duration(duration).green()
        );
    } else {
        eprintln!(
            "  Total: {} {}, {} in {}",
            files.len(),
            files_label,
            format_size(total),
            format_duration(duration)
        );
    }
}
