//! Text rendering for dashboard data.
//!
//! Tables mirror the columns of the dashboard page. The Actions column of the
//! forms table only appears for the privileged user, and its cells name the
//! command that performs the action.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::model::{Admin, FormSubmission, ReportRange, Teacher};

/// Longest cell rendered in table output, in characters.
const MAX_CELL_WIDTH: usize = 40;

const FORM_HEADERS: [&str; 6] = [
    "Teacher Name",
    "Hostel Name",
    "Date & Time",
    "Comments",
    "Maintenance",
    "Complaints",
];

/// Render the forms list.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn forms(forms: &[FormSubmission], privileged: bool, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(forms);
    }

    let mut headers: Vec<&str> = FORM_HEADERS.to_vec();
    if privileged {
        headers.push("Actions");
    }

    let rows: Vec<Vec<String>> = forms
        .iter()
        .map(|form| {
            let mut row = vec![
                form.teacher_name.clone(),
                form.hostel_name.clone(),
                form.created_at.clone(),
                form.general_comments.clone().unwrap_or_default(),
                form.maintenance_required
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                form.complaints.clone().unwrap_or_default(),
            ];
            if privileged {
                row.push(format!("forms delete {}", form.id));
            }
            row
        })
        .collect();

    Ok(layout(&headers, &rows, format))
}

/// Render the teachers list.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn teachers(teachers: &[Teacher], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(teachers);
    }
    let rows: Vec<Vec<String>> = teachers
        .iter()
        .map(|t| vec![t.name.clone(), format!("teachers delete {}", t.id)])
        .collect();
    Ok(layout(&["Name", "Action"], &rows, format))
}

/// Render the admins list.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn admins(admins: &[Admin], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(admins);
    }
    let rows: Vec<Vec<String>> = admins
        .iter()
        .map(|a| vec![a.name.clone(), format!("admins delete {}", a.id)])
        .collect();
    Ok(layout(&["Name", "Action"], &rows, format))
}

/// Everything the dashboard page shows, in page order.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    /// Submitted forms.
    pub forms: &'a [FormSubmission],
    /// Teacher accounts.
    pub teachers: &'a [Teacher],
    /// Whether form actions are offered.
    pub privileged: bool,
    /// Selected report range.
    pub range: ReportRange,
    /// Export URL for the selected range.
    pub report_url: String,
}

/// Render the whole dashboard.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn dashboard(view: &DashboardView<'_>, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(view);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Admin Dashboard\n");
    let _ = writeln!(out, "Submitted Forms");
    out.push_str(&forms(view.forms, view.privileged, format)?);
    let _ = writeln!(out, "\nTeachers List");
    out.push_str(&teachers(view.teachers, format)?);
    let _ = writeln!(out, "\nDownload Reports");
    let _ = writeln!(out, "  {} report: {}", view.range, view.report_url);
    Ok(out)
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

fn layout(headers: &[&str], rows: &[Vec<String>], format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => plain(rows),
        _ => table(headers, rows),
    }
}

/// One tab-separated line per row, no header.
fn plain(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| single_line(c)).collect();
        let _ = writeln!(out, "{}", cells.join("\t"));
    }
    out
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(&single_line(c))).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &cells {
        write_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    if rows.is_empty() {
        out.push_str("(none)\n");
    }
    out
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}
