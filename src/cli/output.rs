// Output formatting utilities

use chrono::{Local, TimeZone};
use std::collections::HashMap;
use std::io::IsTerminal;

use crate::board::candidates_in_stage;
use crate::models::{Candidate, StageDefinition, REFERENCE_STAGES};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

// ANSI foreground colors (standard 16-color palette)
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_MAGENTA: &str = "\x1b[35m";
const ANSI_FG_CYAN: &str = "\x1b[36m";
const ANSI_FG_BRIGHT_BLUE: &str = "\x1b[94m";
const ANSI_FG_BRIGHT_MAGENTA: &str = "\x1b[95m";
const ANSI_FG_BRIGHT_CYAN: &str = "\x1b[96m";

/// Map a color name string to its ANSI foreground constant
fn color_name_to_fg(name: &str) -> Option<&'static str> {
    match name {
        "red" => Some(ANSI_FG_RED),
        "green" => Some(ANSI_FG_GREEN),
        "yellow" => Some(ANSI_FG_YELLOW),
        "blue" => Some(ANSI_FG_BLUE),
        "magenta" => Some(ANSI_FG_MAGENTA),
        "cyan" => Some(ANSI_FG_CYAN),
        "bright_blue" => Some(ANSI_FG_BRIGHT_BLUE),
        "bright_magenta" => Some(ANSI_FG_BRIGHT_MAGENTA),
        "bright_cyan" => Some(ANSI_FG_BRIGHT_CYAN),
        _ => None,
    }
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate for reliable detection, with fallback to
/// COLUMNS environment variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn colorize_if_tty(text: &str, color: &str, is_tty: bool) -> String {
    match (is_tty, color_name_to_fg(color)) {
        (true, Some(code)) => format!("{}{}{}", code, text, ANSI_RESET),
        _ => text.to_string(),
    }
}

fn format_date(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d").to_string(),
        _ => "-".to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Render the stage configuration as a table
pub fn format_stage_list(stages: &[StageDefinition], is_tty: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty(
        &format!("{:<4} {:<20} {:<22} {:<16} {}", "#", "Key", "Label", "Color", "Fixed"),
        is_tty,
    ));
    out.push('\n');
    for (i, stage) in stages.iter().enumerate() {
        let fixed = if stage.is_fixed() { "yes" } else { "" };
        let label = colorize_if_tty(&truncate(&stage.label, 22), &stage.color, is_tty);
        out.push_str(&format!(
            "{:<4} {:<20} {:<22} {:<16} {}\n",
            i,
            truncate(&stage.key, 20),
            label,
            stage.color,
            fixed
        ));
    }
    out
}

/// Render a flat candidate table
pub fn format_candidate_list(
    candidates: &[&Candidate],
    stages: &[StageDefinition],
    is_tty: bool,
) -> String {
    let width = get_terminal_width();
    let name_width = (width.saturating_sub(50)).clamp(12, 32);

    let mut out = String::new();
    out.push_str(&bold_if_tty(
        &format!(
            "{:<5} {:<name_width$} {:<18} {:>5}  {:<10}",
            "ID", "Name", "Stage", "Score", "Applied"
        ),
        is_tty,
    ));
    out.push('\n');

    for c in candidates {
        let stage_label = stages
            .iter()
            .find(|s| s.key == c.stage)
            .map(|s| s.label.as_str())
            .unwrap_or(c.stage.as_str());
        out.push_str(&format!(
            "{:<5} {:<name_width$} {:<18} {:>5}  {:<10}\n",
            c.id.unwrap_or(0),
            truncate(&c.name, name_width),
            truncate(stage_label, 18),
            c.score,
            format_date(c.applied_ts)
        ));
    }
    out
}

/// Render a detailed single-candidate summary
pub fn format_candidate_summary(candidate: &Candidate, stages: &[StageDefinition]) -> String {
    let stage_label = stages
        .iter()
        .find(|s| s.key == candidate.stage)
        .map(|s| s.label.as_str())
        .unwrap_or(candidate.stage.as_str());

    let mut out = String::new();
    out.push_str(&format!("Candidate {}\n", candidate.id.unwrap_or(0)));
    out.push_str(&format!("  Name:     {}\n", candidate.name));
    out.push_str(&format!(
        "  Email:    {}\n",
        candidate.email.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("  Stage:    {} ({})\n", stage_label, candidate.stage));
    out.push_str(&format!("  Score:    {}\n", candidate.score));
    out.push_str(&format!("  Applied:  {}\n", format_date(candidate.applied_ts)));
    if let Some(notes) = &candidate.notes {
        out.push_str(&format!("  Notes:    {}\n", notes));
    }
    out
}

/// Render the kanban board: one section per configured stage, in pipeline
/// order. Candidates whose stage key is not in the configuration render in
/// no column.
pub fn format_board(
    stages: &[StageDefinition],
    candidates: &[Candidate],
    is_tty: bool,
) -> String {
    let width = get_terminal_width();
    let name_width = (width.saturating_sub(16)).clamp(16, 48);

    let mut out = String::new();
    for stage in stages {
        let column = candidates_in_stage(&stage.key, candidates);
        let header = format!("{} ({})", stage.label, column.len());
        out.push_str(&bold_if_tty(
            &colorize_if_tty(&header, &stage.color, is_tty),
            is_tty,
        ));
        out.push('\n');
        if column.is_empty() {
            out.push_str("  -\n");
        } else {
            for c in column {
                out.push_str(&format!(
                    "  [{}] {} ({})\n",
                    c.id.unwrap_or(0),
                    truncate(&c.name, name_width),
                    c.score
                ));
            }
        }
        out.push('\n');
    }
    out
}

/// Render the status dashboard over the static reference stage buckets.
///
/// Deliberately built on REFERENCE_STAGES, not the editable registry: this is
/// the legacy dashboard view with its own fixed naming. Candidates in stages
/// outside the reference set are summed into an "Other" row.
pub fn format_status(counts: &HashMap<String, i64>, is_tty: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty("Pipeline status", is_tty));
    out.push('\n');

    let mut total = 0;
    let mut bucketed = 0;
    for (key, label) in REFERENCE_STAGES {
        let count = counts.get(*key).copied().unwrap_or(0);
        bucketed += count;
        out.push_str(&format!("  {:<14} {:>4}\n", label, count));
    }
    for count in counts.values() {
        total += count;
    }
    let other = total - bucketed;
    if other > 0 {
        out.push_str(&format!("  {:<14} {:>4}\n", "Other", other));
    }
    out.push_str(&format!("  {:<14} {:>4}\n", "Total", total));
    out
}
