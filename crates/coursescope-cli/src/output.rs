use std::io::Write;

use coursescope_core::{CourseCode, ParsedAudit, StatusLabel, SummaryOutcome};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn heading(label: &str, count: usize, status: Option<StatusLabel>, color: ColorMode) -> String {
    let text = format!("{label} ({count})");
    if !color.enabled() {
        return text;
    }
    match status {
        Some(StatusLabel::Completed) => text.green().bold().to_string(),
        Some(StatusLabel::InProgress) => text.yellow().bold().to_string(),
        Some(StatusLabel::Planned) => text.cyan().bold().to_string(),
        Some(StatusLabel::Needed) => text.red().bold().to_string(),
        None => text.bold().to_string(),
    }
}

fn status_title(status: StatusLabel) -> &'static str {
    match status {
        StatusLabel::Completed => "Completed",
        StatusLabel::InProgress => "In progress",
        StatusLabel::Planned => "Planned",
        StatusLabel::Needed => "Needed",
    }
}

fn write_list<S: AsRef<str>>(w: &mut dyn Write, items: &[S], color: ColorMode) -> std::io::Result<()> {
    if items.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "(none)".dimmed())?;
        } else {
            writeln!(w, "  (none)")?;
        }
        return Ok(());
    }
    let line: Vec<&str> = items.iter().map(|s| s.as_ref()).collect();
    writeln!(w, "  {}", line.join(", "))
}

/// Print the detected course sets of one audit.
pub fn print_parsed(
    w: &mut dyn Write,
    file_name: &str,
    parsed: &ParsedAudit,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Parsed {}: {} courses found", file_name, parsed.total())?;
    writeln!(w)?;
    for status in [
        StatusLabel::Completed,
        StatusLabel::InProgress,
        StatusLabel::Planned,
        StatusLabel::Needed,
    ] {
        let codes: Vec<&str> = parsed.set(status).iter().map(CourseCode::as_str).collect();
        // Planned/needed are only filled when tracking is switched on.
        if codes.is_empty() && matches!(status, StatusLabel::Planned | StatusLabel::Needed) {
            continue;
        }
        writeln!(w, "{}", heading(status_title(status), codes.len(), Some(status), color))?;
        write_list(w, &codes, color)?;
    }
    Ok(())
}

/// Print the remaining-requirements summary, if one was requested.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &SummaryOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    match summary {
        SummaryOutcome::NotRequested => Ok(()),
        SummaryOutcome::Failed { error } => {
            writeln!(w)?;
            if color.enabled() {
                writeln!(w, "{}", error.red())
            } else {
                writeln!(w, "{error}")
            }
        }
        SummaryOutcome::Computed(s) => {
            writeln!(w)?;
            writeln!(
                w,
                "{}",
                heading("Remaining required", s.remaining_required.len(), None, color)
            )?;
            write_list(w, &s.remaining_required, color)?;
            writeln!(
                w,
                "{}",
                heading("Remaining electives", s.remaining_electives.len(), None, color)
            )?;
            write_list(w, &s.remaining_electives, color)
        }
    }
}
