//! Durations and the end-of-build summary.

use std::path::Path;
use std::time::Duration;

use console::Term;
use kiln_emit::BuildReport;
use owo_colors::Style;

use super::paint;

/// Human-readable duration: `50ms`, `1.50s`, `1m 30s`.
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

/// Print what a build wrote, relative to `cwd` where possible.
pub fn print_build_summary(report: &BuildReport, cwd: &Path, elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let show = |path: &Path| path.strip_prefix(cwd).unwrap_or(path).display().to_string();

    eprintln!("\n{}", paint("Server Build", Style::new().bold().underline()));
    eprintln!("{}", "─".repeat(width));

    let rows = [
        ("entry", show(&report.server_entry)),
        ("nodes", report.nodes.len().to_string()),
        (
            "inlined",
            format!("{} stylesheet(s)", report.inline_table.len()),
        ),
        ("matchers", show(&report.matchers)),
        (
            "methods",
            format!("{} handler(s) in {}", report.methods.len(), show(&report.methods_file)),
        ),
    ];
    for (label, value) in rows {
        eprintln!(
            "  {} {}{}",
            paint("▸", Style::new().blue()),
            paint(format!("{label:<9}"), Style::new().bright_white().bold()),
            paint(value, Style::new().dimmed())
        );
    }
    if !report.dangling.is_empty() {
        eprintln!(
            "  {} {} dangling import(s) in the artifact graph",
            paint("⚠", Style::new().yellow()),
            report.dangling.len()
        );
    }

    eprintln!("{}", "─".repeat(width));
    eprintln!(
        "  {} {}",
        paint("Done in", Style::new().bold()),
        paint(format_duration(elapsed), Style::new().green())
    );
}
