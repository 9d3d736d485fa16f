#![allow(dead_code)]
// Shared fixtures: in-memory sheets shaped like the field workbook

use birds_biodiversity::models::{DetectionCounts, Observation, ObservationRecord, RawCell, RawSheet};
use chrono::DateTime;

pub const OBSERVATION_SHEET: &str = "NOM FRANÇAIS";

/// Header row of the observation sheet. Columns 13-20 hold survey fields the
/// pipeline does not use; 22-25 sit under the merged "totaux" header and are blank.
pub fn observation_header() -> Vec<RawCell> {
    let mut header: Vec<RawCell> = [
        "Nom observateur",
        "code département",
        "Nom transect",
        "date",
        "1er, 2e ou 3e passage",
        "nuages",
        "pluie",
        "vent",
        "visibilité",
        "N° point",
        "heure début",
        "ESPECE",
        "distances de contact",
    ]
    .iter()
    .map(|label| RawCell::text(*label))
    .collect();

    for i in 13..=20 {
        header.push(RawCell::text(format!("habitat {i}")));
    }
    header.push(RawCell::text("totaux"));
    header.extend(vec![RawCell::Empty; 4]);
    header
}

/// Count encoded the way the workbook stores it: epoch + `n` nanoseconds
pub fn ts_count(n: u32) -> RawCell {
    RawCell::Timestamp(DateTime::from_timestamp(0, n).unwrap().naive_utc())
}

pub fn opt_text(value: Option<&str>) -> RawCell {
    value.map(RawCell::text).unwrap_or(RawCell::Empty)
}

#[derive(Clone)]
pub struct ObsRow {
    pub observer: Option<&'static str>,
    pub transect: Option<&'static str>,
    pub date: RawCell,
    pub wind: RawCell,
    pub start_time: RawCell,
    pub species: Option<&'static str>,
    pub counts: [RawCell; 4],
    pub notes: RawCell,
}

impl Default for ObsRow {
    fn default() -> Self {
        Self {
            observer: Some("Alice Martin"),
            transect: Some("T01"),
            date: RawCell::text("2015-05-04"),
            wind: RawCell::Number(1.0),
            start_time: RawCell::text("07:30"),
            species: Some("Merle noir"),
            counts: [ts_count(1), RawCell::Empty, RawCell::Empty, RawCell::Empty],
            notes: RawCell::Empty,
        }
    }
}

impl ObsRow {
    pub fn to_cells(&self) -> Vec<RawCell> {
        let mut cells = vec![RawCell::Empty; 26];
        cells[0] = opt_text(self.observer);
        cells[1] = RawCell::Number(35.0);
        cells[2] = opt_text(self.transect);
        cells[3] = self.date.clone();
        cells[4] = RawCell::Number(1.0);
        cells[7] = self.wind.clone();
        cells[9] = RawCell::Number(3.0);
        cells[10] = self.start_time.clone();
        cells[11] = opt_text(self.species);
        for (i, count) in self.counts.iter().enumerate() {
            cells[21 + i] = count.clone();
        }
        cells[25] = self.notes.clone();
        cells
    }
}

pub fn observation_sheet(rows: &[ObsRow]) -> RawSheet {
    let mut grid = vec![observation_header()];
    grid.extend(rows.iter().map(ObsRow::to_cells));
    RawSheet::new(OBSERVATION_SHEET, grid)
}

pub fn species_sheet() -> RawSheet {
    let row = |french: &str, latin: &str, status: &str| {
        vec![
            RawCell::Empty,
            RawCell::Empty,
            RawCell::text(french),
            RawCell::text(latin),
            RawCell::text(status),
        ]
    };
    RawSheet::new(
        "ESPECES",
        vec![
            vec![RawCell::text("LISTE DES ESPECES")],
            row(" Merle noir", "Turdus merula ", "LC"),
            row("Pie bavarde", "Pica pica", " LC "),
            row("Tourterelle des bois", "Streptopelia turtur", "VU"),
        ],
    )
}

pub fn gps_sheet() -> RawSheet {
    let row = |transect: &str, habitat: &str, site: f64, point: f64| {
        vec![
            RawCell::Empty,
            RawCell::Empty,
            RawCell::text(transect),
            RawCell::Number(652_104.0),
            RawCell::Number(6_862_410.0),
            RawCell::text(habitat),
            RawCell::Number(site),
            RawCell::Number(point),
        ]
    };
    RawSheet::new(
        "GPS-MILIEU",
        vec![
            vec![RawCell::text("GPS"), RawCell::text("MILIEU")],
            row("T01 ", "Bocage", 1.0, 1.0),
            row("T01", "Prairie", 1.0, 2.0),
            row("T02", " Forêt", 2.0, 1.0),
        ],
    )
}

pub fn record(
    year: Option<i32>,
    species: Option<&str>,
    transect: Option<&str>,
    count: f64,
) -> ObservationRecord {
    ObservationRecord {
        observer_name: Some("Alice Martin".to_string()),
        transect_name: transect.map(str::to_string),
        year,
        species_name: species.map(str::to_string),
        detection_counts: DetectionCounts {
            auditory: Some(count),
            ..Default::default()
        },
        individual_count: count,
        ..Default::default()
    }
}

pub fn observation(
    id: u32,
    year: i32,
    species: &str,
    transect: &str,
    observer: Option<&str>,
    count: f64,
) -> Observation {
    Observation {
        observation_id: id,
        observer_name: observer.map(str::to_string),
        department_code: None,
        transect_name: transect.to_string(),
        date: None,
        year,
        visit_number: None,
        cloud_cover_raw: None,
        rain: None,
        wind: None,
        visibility: None,
        point_number: None,
        start_time: None,
        species_name: species.to_string(),
        distance_category_raw: None,
        detection_counts: DetectionCounts {
            auditory: Some(count),
            ..Default::default()
        },
        individual_count: count,
        notes: None,
    }
}
