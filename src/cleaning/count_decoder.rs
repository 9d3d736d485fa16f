/// Count Decoder
///
/// The field workbook was keyed in with a tool that stored small integer
/// counts as datetimes: the count lives in the sub-second part of the
/// timestamp, in nanoseconds (1970-01-01 00:00:00.000000005 = 5 birds).
/// Everything downstream of this module only ever sees `Option<f64>`.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::RawCell;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// RFC 3339 takes `Z` and `T`-separated offsets; these cover the looser forms
const OFFSET_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// How a count column was stored, decided from its non-empty cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Temporal,
    Numeric,
    Mixed,
}

/// Classify a column. A column with no values at all is numeric.
pub fn classify_column(cells: &[RawCell]) -> ColumnKind {
    let mut values = cells.iter().filter(|c| !matches!(c, RawCell::Empty));

    let Some(first) = values.next() else {
        return ColumnKind::Numeric;
    };

    let kind = match first {
        RawCell::Timestamp(_) => ColumnKind::Temporal,
        RawCell::Number(_) => ColumnKind::Numeric,
        _ => return ColumnKind::Mixed,
    };

    let uniform = values.all(|c| match kind {
        ColumnKind::Temporal => matches!(c, RawCell::Timestamp(_)),
        _ => matches!(c, RawCell::Number(_)),
    });

    if uniform {
        kind
    } else {
        ColumnKind::Mixed
    }
}

/// Decode a whole count column, preserving length and order
pub fn decode_counts(cells: &[RawCell]) -> Vec<Option<f64>> {
    let kind = classify_column(cells);
    debug!("Decoding {} count cells as {:?} column", cells.len(), kind);

    cells
        .iter()
        .map(|cell| match kind {
            ColumnKind::Temporal => match cell {
                RawCell::Timestamp(ts) => Some(decode_timestamp(ts)),
                _ => None,
            },
            ColumnKind::Numeric => coerce_numeric(cell),
            ColumnKind::Mixed => decode_mixed_cell(cell),
        })
        .collect()
}

/// Count carried by a timestamp: nanoseconds since the epoch, modulo one second
///
/// # Examples
///
/// ```
/// use birds_biodiversity::cleaning::count_decoder::decode_timestamp;
/// use chrono::DateTime;
///
/// let ts = DateTime::from_timestamp(0, 5).unwrap().naive_utc();
/// assert_eq!(decode_timestamp(&ts), 5.0);
/// ```
pub fn decode_timestamp(ts: &NaiveDateTime) -> f64 {
    // Sub-second nanos are measured from the floored second, so this is the
    // euclidean remainder even before the epoch.
    let nanos = i64::from(ts.and_utc().timestamp_subsec_nanos());
    (nanos % NANOS_PER_SECOND) as f64
}

/// Numeric coercion: numbers pass through, numeric text is parsed, anything
/// else is missing. No sign correction happens here.
pub fn coerce_numeric(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(n) if !n.is_nan() => Some(*n),
        RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        _ => None,
    }
}

/// Parse text holding an ISO-style timestamp or date.
///
/// Timestamps with a `Z` or `+hh:mm` suffix keep their wall-clock time, so the
/// calendar date is the one written in the cell. Seconds may be omitted.
pub fn parse_timestamp_text(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if !iso_date_prefix().is_match(value) {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| {
            OFFSET_TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        })
        .map(|ts| ts.naive_local())
        .or_else(|| {
            TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn decode_mixed_cell(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Timestamp(ts) => Some(decode_timestamp(ts)),
        RawCell::Text(s) => match parse_timestamp_text(s) {
            Some(ts) => Some(decode_timestamp(&ts)),
            None => {
                let value = coerce_numeric(cell);
                if value.is_none() {
                    debug!("Unreadable count value {:?}, treating as missing", s);
                }
                value
            }
        },
        other => coerce_numeric(other),
    }
}

fn iso_date_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("static date pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn epoch_plus(nanos: u32) -> RawCell {
        RawCell::Timestamp(DateTime::from_timestamp(0, nanos).unwrap().naive_utc())
    }

    #[test]
    fn test_classify_empty_column_is_numeric() {
        assert_eq!(
            classify_column(&[RawCell::Empty, RawCell::Empty]),
            ColumnKind::Numeric
        );
        assert_eq!(classify_column(&[]), ColumnKind::Numeric);
    }

    #[test]
    fn test_classify_temporal_with_gaps() {
        let cells = vec![epoch_plus(1), RawCell::Empty, epoch_plus(3)];
        assert_eq!(classify_column(&cells), ColumnKind::Temporal);
    }

    #[test]
    fn test_classify_mixed() {
        let cells = vec![epoch_plus(1), RawCell::Number(2.0)];
        assert_eq!(classify_column(&cells), ColumnKind::Mixed);
        assert_eq!(
            classify_column(&[RawCell::text("auditif")]),
            ColumnKind::Mixed
        );
    }

    #[test]
    fn test_decode_timestamp_ignores_whole_seconds() {
        let ts = DateTime::from_timestamp(86_400 * 365, 42).unwrap().naive_utc();
        assert_eq!(decode_timestamp(&ts), 42.0);
    }

    #[test]
    fn test_decode_timestamp_before_epoch() {
        // one nanosecond before the epoch sits 999_999_999 ns into its second
        let ts = DateTime::from_timestamp(-1, 999_999_999).unwrap().naive_utc();
        assert_eq!(decode_timestamp(&ts), 999_999_999.0);
    }

    #[test]
    fn test_parse_timestamp_text_formats() {
        assert!(parse_timestamp_text("2024-01-01T00:00:00.000000007").is_some());
        assert!(parse_timestamp_text("2024-01-01 10:30:00").is_some());
        assert!(parse_timestamp_text("2024-01-01").is_some());
        assert!(parse_timestamp_text("12").is_none());
        assert!(parse_timestamp_text("bad").is_none());
        assert!(parse_timestamp_text("2024-13-45").is_none());
    }

    #[test]
    fn test_parse_timestamp_text_offsets_and_short_times() {
        let expected = NaiveDate::from_ymd_opt(2015, 5, 4)
            .and_then(|d| d.and_hms_opt(7, 30, 0));

        assert_eq!(parse_timestamp_text("2015-05-04 07:30"), expected);
        assert_eq!(parse_timestamp_text("2015-05-04T07:30"), expected);
        assert_eq!(parse_timestamp_text("2015-05-04T07:30:00Z"), expected);
        assert_eq!(parse_timestamp_text("2015-05-04T07:30:00+02:00"), expected);
        assert_eq!(parse_timestamp_text("2015-05-04T07:30+02:00"), expected);
        assert_eq!(parse_timestamp_text("2015-05-04 07:30:00-05:00"), expected);
    }

    #[test]
    fn test_offset_does_not_move_the_date() {
        let ts = parse_timestamp_text("2015-12-31T23:30:00-02:00").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2015, 12, 31).unwrap());
    }

    #[test]
    fn test_coerce_numeric_text() {
        assert_eq!(coerce_numeric(&RawCell::text(" 4 ")), Some(4.0));
        assert_eq!(coerce_numeric(&RawCell::text("NaN")), None);
        assert_eq!(coerce_numeric(&RawCell::text("")), None);
        assert_eq!(coerce_numeric(&RawCell::Number(f64::NAN)), None);
    }
}
