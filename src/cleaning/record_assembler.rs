/// Record Assembler
///
/// Builds one `ObservationRecord` per observation row: decodes the four
/// detection-method counts, totals them, resolves the survey date and coerces
/// the descriptive fields to trimmed text.
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::cleaning::count_decoder::{coerce_numeric, decode_counts, parse_timestamp_text};
use crate::cleaning::sheet_normalizer::ObservationTable;
use crate::models::{DetectionCounts, ObservationRecord, RawCell};
use crate::utils::cell_to_text;

/// Detection-method count columns, in sheet order
pub const COUNT_COLUMNS: [&str; 4] = [
    "count_auditory",
    "count_visual_no_flight",
    "count_audio_visual_no_flight",
    "count_audio_visual_flight",
];

const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

pub fn assemble_records(table: &ObservationTable) -> Vec<ObservationRecord> {
    let rows = table.row_count;
    let empty = vec![RawCell::Empty; rows];
    let column = |name: &str| table.column(name).unwrap_or(&empty);

    let [auditory, visual_no_flight, audio_visual_no_flight, audio_visual_flight] =
        COUNT_COLUMNS.map(|name| decode_counts(column(name)));

    let text = |name: &str, row: usize| column(name).get(row).and_then(cell_to_text);

    let records: Vec<ObservationRecord> = (0..rows)
        .map(|row| {
            let detection_counts = DetectionCounts {
                auditory: auditory[row],
                visual_no_flight: visual_no_flight[row],
                audio_visual_no_flight: audio_visual_no_flight[row],
                audio_visual_flight: audio_visual_flight[row],
            };
            let date = column("date").get(row).and_then(parse_date);

            ObservationRecord {
                observer_name: text("observer_name", row),
                department_code: text("department_code", row),
                transect_name: text("transect_name", row),
                date,
                year: date.map(|d| d.year()),
                visit_number: text("visit_number", row),
                cloud_cover_raw: text("cloud_cover_raw", row),
                rain: text("rain", row),
                wind: column("wind").get(row).and_then(coerce_numeric),
                visibility: text("visibility", row),
                point_number: text("point_number", row),
                start_time: text("start_time", row),
                species_name: text("species_name", row),
                distance_category_raw: text("distance_category_raw", row),
                individual_count: detection_counts.total(),
                detection_counts,
                notes: text("notes", row),
            }
        })
        .collect();

    let undated = records.iter().filter(|r| r.date.is_none()).count();
    if undated > 0 {
        debug!("{} observation rows have no readable date", undated);
    }
    info!("Assembled {} observation records", records.len());

    records
}

/// Resolve a survey date from a date cell, an ISO or day-first text date, or
/// an Excel serial number. Anything else is missing.
pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Timestamp(ts) => Some(ts.date()),
        RawCell::Text(s) => {
            let s = s.trim();
            parse_timestamp_text(s).map(|ts| ts.date()).or_else(|| {
                DAY_FIRST_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            })
        }
        RawCell::Number(serial) if *serial >= 1.0 => excel_serial_to_date(*serial),
        _ => None,
    }
}

/// Convert an Excel date serial to a calendar date
///
/// Excel counts days from 1899-12-30 (accounting for its 1900 leap-year bug).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial as i64)?)
}
