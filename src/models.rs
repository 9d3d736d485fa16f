use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

// Raw workbook content, as handed over by the loader
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawCell {
    Timestamp(NaiveDateTime),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

static EMPTY_CELL: RawCell = RawCell::Empty;

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    /// Blank text counts as empty, matching how spreadsheet tools treat it
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            RawCell::Number(n) => write!(f, "{n}"),
            RawCell::Text(s) => write!(f, "{s}"),
            RawCell::Empty => Ok(()),
        }
    }
}

/// A worksheet as a grid of cells addressed from A1 (row 0, column 0)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at (row, col); positions outside the grid read as empty
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Species {
    pub french_name: Option<String>,
    pub scientific_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsPoint {
    pub transect_name: Option<String>,
    pub habitat_type: Option<String>,
    pub site_id: Option<String>,
    pub point_id: Option<String>,
}

/// Per-detection-method sub-counts of one observation row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DetectionCounts {
    /// Heard only
    pub auditory: Option<f64>,
    pub visual_no_flight: Option<f64>,
    pub audio_visual_no_flight: Option<f64>,
    pub audio_visual_flight: Option<f64>,
}

impl DetectionCounts {
    /// Sum of the reported sub-counts; unreported methods contribute nothing
    pub fn total(&self) -> f64 {
        [
            self.auditory,
            self.visual_no_flight,
            self.audio_visual_no_flight,
            self.audio_visual_flight,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

/// An assembled observation row before validity filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub observer_name: Option<String>,
    pub department_code: Option<String>,
    pub transect_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub visit_number: Option<String>,
    pub cloud_cover_raw: Option<String>,
    pub rain: Option<String>,
    pub wind: Option<f64>,
    pub visibility: Option<String>,
    pub point_number: Option<String>,
    pub start_time: Option<String>,
    pub species_name: Option<String>,
    pub distance_category_raw: Option<String>,
    pub detection_counts: DetectionCounts,
    pub individual_count: f64,
    pub notes: Option<String>,
}

/// A cleaned observation: essential fields are guaranteed present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub observation_id: u32,
    pub observer_name: Option<String>,
    pub department_code: Option<String>,
    pub transect_name: String,
    pub date: Option<NaiveDate>,
    pub year: i32,
    pub visit_number: Option<String>,
    pub cloud_cover_raw: Option<String>,
    pub rain: Option<String>,
    pub wind: Option<f64>,
    pub visibility: Option<String>,
    pub point_number: Option<String>,
    pub start_time: Option<String>,
    pub species_name: String,
    pub distance_category_raw: Option<String>,
    pub detection_counts: DetectionCounts,
    pub individual_count: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub n_observations: usize,
    pub n_species: usize,
    pub total_abundance: f64,
    pub n_transects: usize,
    pub n_observers: usize,
}

/// Shannon diversity of one year's sample.
///
/// `Undefined` means the year holds no individuals at all, which is distinct
/// from a single-species sample (`Value(0.0)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ShannonIndex {
    Value(f64),
    Undefined,
}

impl ShannonIndex {
    pub fn value(&self) -> Option<f64> {
        match self {
            ShannonIndex::Value(v) => Some(*v),
            ShannonIndex::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ShannonIndex::Undefined)
    }
}

impl fmt::Display for ShannonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShannonIndex::Value(v) => write!(f, "{v:.4}"),
            ShannonIndex::Undefined => write!(f, "undefined"),
        }
    }
}

/// Headline figures of a cleaned observation set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub unique_species: usize,
    pub unique_transects: usize,
    pub unique_observers: usize,
}

impl DatasetSummary {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let species: HashSet<&str> = observations
            .iter()
            .map(|o| o.species_name.as_str())
            .collect();
        let transects: HashSet<&str> = observations
            .iter()
            .map(|o| o.transect_name.as_str())
            .collect();
        let observers: HashSet<&str> = observations
            .iter()
            .filter_map(|o| o.observer_name.as_deref())
            .collect();

        Self {
            records: observations.len(),
            first_year: observations.iter().map(|o| o.year).min(),
            last_year: observations.iter().map(|o| o.year).max(),
            unique_species: species.len(),
            unique_transects: transects.len(),
            unique_observers: observers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let sheet = RawSheet::new("S", vec![vec![RawCell::Number(1.0)]]);
        assert_eq!(sheet.cell(0, 0), &RawCell::Number(1.0));
        assert_eq!(sheet.cell(0, 5), &RawCell::Empty);
        assert_eq!(sheet.cell(9, 0), &RawCell::Empty);
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(RawCell::text("   ").is_empty());
        assert!(!RawCell::text(" x ").is_empty());
        assert!(!RawCell::Number(0.0).is_empty());
    }

    #[test]
    fn test_detection_counts_total_skips_missing() {
        let counts = DetectionCounts {
            auditory: Some(2.0),
            audio_visual_flight: Some(1.5),
            ..Default::default()
        };
        assert_eq!(counts.total(), 3.5);
        assert_eq!(DetectionCounts::default().total(), 0.0);
    }

    #[test]
    fn test_shannon_index_display() {
        assert_eq!(ShannonIndex::Value(0.693147).to_string(), "0.6931");
        assert_eq!(ShannonIndex::Undefined.to_string(), "undefined");
    }
}
