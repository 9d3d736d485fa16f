/// Shared cell helpers for the survey cleaning pipeline
use chrono::Datelike;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::RawCell;

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

/// Canonical header label for the cell at column `col` of a header row
///
/// Headers in the field workbook carry stray spaces and line breaks
/// ("Nom  observateur", "heure\ndébut"), so runs of whitespace collapse to one
/// space. Blank header cells are labelled `Unnamed: <col>`, which is how the
/// count sub-columns under a merged "totaux" header are addressed.
///
/// # Examples
///
/// ```
/// use birds_biodiversity::models::RawCell;
/// use birds_biodiversity::utils::normalize_header;
///
/// assert_eq!(normalize_header(&RawCell::text(" Nom   transect "), 2), "Nom transect");
/// assert_eq!(normalize_header(&RawCell::Empty, 22), "Unnamed: 22");
/// ```
pub fn normalize_header(cell: &RawCell, col: usize) -> String {
    match cell_to_text(cell) {
        Some(label) => whitespace_run().replace_all(&label, " ").into_owned(),
        None => format!("Unnamed: {col}"),
    }
}

/// Coerce any cell to trimmed text; blank cells give `None`
pub fn cell_to_text(cell: &RawCell) -> Option<String> {
    let text = match cell {
        RawCell::Text(s) => s.trim().to_string(),
        RawCell::Number(n) => format_number(*n),
        RawCell::Timestamp(ts) => {
            // Time-of-day cells come back anchored on Excel's day zero
            if ts.date().year() < 1900 {
                ts.format("%H:%M:%S").to_string()
            } else {
                ts.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
        RawCell::Empty => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Trim a text cell in place of its original; other cells pass through
pub fn strip_cell(cell: &RawCell) -> RawCell {
    match cell {
        RawCell::Text(s) => RawCell::Text(s.trim().to_string()),
        other => other.clone(),
    }
}

/// Render a number the way a spreadsheet shows it: integral values lose the `.0`
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
