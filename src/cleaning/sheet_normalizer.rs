/// Sheet Normalizer
///
/// Turns the three raw sheets into tables with fixed field names. Text cells
/// are whitespace-stripped on the way through; wholly blank rows are skipped.
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::cleaning::sheet_schema::{
    PositionalSchema, RenameSchema, SchemaError, GPS_LAYOUT, OBSERVATION_LAYOUT, SPECIES_LAYOUT,
};
use crate::models::{GpsPoint, RawCell, RawSheet, Species};
use crate::utils::{cell_to_text, normalize_header, strip_cell};

/// Observation sheet with canonical column names, still holding raw cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub row_count: usize,
    pub columns: HashMap<&'static str, Vec<RawCell>>,
    /// Canonical columns the sheet did not provide
    pub missing_columns: Vec<&'static str>,
}

impl ObservationTable {
    pub fn column(&self, name: &str) -> Option<&[RawCell]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

pub fn normalize_species(sheet: &RawSheet) -> Result<Vec<Species>, SchemaError> {
    check_layout(sheet, &SPECIES_LAYOUT)?;
    Ok(read_species(sheet))
}

/// Read the described species positions without checking the sheet width
pub fn read_species(sheet: &RawSheet) -> Vec<Species> {
    let layout = &SPECIES_LAYOUT;
    let species: Vec<Species> = data_rows(sheet, layout.header_rows)
        .map(|row| Species {
            french_name: positional_text(sheet, layout, row, "french_name"),
            scientific_name: positional_text(sheet, layout, row, "scientific_name"),
            status: positional_text(sheet, layout, row, "status"),
        })
        .collect();

    info!("Loaded {} species", species.len());
    species
}

pub fn normalize_gps_points(sheet: &RawSheet) -> Result<Vec<GpsPoint>, SchemaError> {
    check_layout(sheet, &GPS_LAYOUT)?;
    Ok(read_gps_points(sheet))
}

pub fn read_gps_points(sheet: &RawSheet) -> Vec<GpsPoint> {
    let layout = &GPS_LAYOUT;
    let points: Vec<GpsPoint> = data_rows(sheet, layout.header_rows)
        .map(|row| GpsPoint {
            transect_name: positional_text(sheet, layout, row, "transect_name"),
            habitat_type: positional_text(sheet, layout, row, "habitat_type"),
            site_id: positional_text(sheet, layout, row, "site_id"),
            point_id: positional_text(sheet, layout, row, "point_id"),
        })
        .collect();

    info!("Loaded {} GPS points", points.len());
    points
}

/// Rename the observation sheet's columns through the header table
pub fn normalize_observations(sheet: &RawSheet) -> ObservationTable {
    normalize_named(sheet, &OBSERVATION_LAYOUT)
}

fn normalize_named(sheet: &RawSheet, schema: &RenameSchema) -> ObservationTable {
    let header = schema.header_row;
    let mut positions: Vec<(usize, &'static str)> = Vec::new();

    for col in 0..sheet.width() {
        let label = normalize_header(sheet.cell(header, col), col);
        match schema.canonical_name(&label) {
            Some(name) if positions.iter().any(|(_, n)| *n == name) => {
                warn!(
                    "Duplicate column '{}' in sheet '{}' at column {}, keeping the first",
                    label, sheet.name, col
                );
            }
            Some(name) => positions.push((col, name)),
            None => debug!("Ignoring unmapped column '{}' in sheet '{}'", label, sheet.name),
        }
    }

    let rows: Vec<usize> = data_rows(sheet, header + 1).collect();

    let columns: HashMap<&'static str, Vec<RawCell>> = positions
        .iter()
        .map(|&(col, name)| {
            let cells = rows
                .iter()
                .map(|&r| strip_cell(sheet.cell(r, col)))
                .collect();
            (name, cells)
        })
        .collect();

    let missing_columns: Vec<&'static str> = schema
        .canonical_names()
        .filter(|name| !columns.contains_key(name))
        .collect();

    for name in &missing_columns {
        warn!("Sheet '{}' has no '{}' column", sheet.name, name);
    }

    info!(
        "Loaded {} observation rows from sheet '{}'",
        rows.len(),
        sheet.name
    );

    ObservationTable {
        row_count: rows.len(),
        columns,
        missing_columns,
    }
}

fn check_layout(sheet: &RawSheet, layout: &PositionalSchema) -> Result<(), SchemaError> {
    layout.validate(sheet)?;
    debug!(
        "Sheet '{}' matches layout v{} ({} columns)",
        sheet.name,
        layout.version,
        layout.columns.len()
    );
    Ok(())
}

fn positional_text(
    sheet: &RawSheet,
    layout: &PositionalSchema,
    row: usize,
    name: &str,
) -> Option<String> {
    layout
        .position(name)
        .and_then(|col| cell_to_text(sheet.cell(row, col)))
}

/// Indices of the non-blank rows below the header
fn data_rows(sheet: &RawSheet, header_rows: usize) -> impl Iterator<Item = usize> + '_ {
    (header_rows..sheet.height()).filter(move |&r| !is_blank_row(sheet, r))
}

fn is_blank_row(sheet: &RawSheet, row: usize) -> bool {
    sheet.rows.get(row).map_or(true, |cells| cells.iter().all(RawCell::is_empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::text(s)
    }

    #[test]
    fn test_species_positional_mapping() {
        let sheet = RawSheet::new(
            "ESPECES",
            vec![
                vec![text("bad"), text("header"), text("Nom"), text("Latin")],
                vec![
                    RawCell::Empty,
                    RawCell::Empty,
                    text("  Merle noir "),
                    text("Turdus merula"),
                    text(" LC"),
                ],
            ],
        );

        let species = normalize_species(&sheet).unwrap();
        assert_eq!(
            species,
            vec![Species {
                french_name: Some("Merle noir".to_string()),
                scientific_name: Some("Turdus merula".to_string()),
                status: Some("LC".to_string()),
            }]
        );
    }

    #[test]
    fn test_gps_numeric_ids_become_text() {
        let sheet = RawSheet::new(
            "GPS-MILIEU",
            vec![
                vec![],
                vec![
                    RawCell::Empty,
                    RawCell::Empty,
                    text("T01 "),
                    RawCell::Number(652_000.5),
                    RawCell::Number(6_862_000.25),
                    text("Bocage"),
                    RawCell::Number(3.0),
                    RawCell::Number(12.0),
                ],
            ],
        );

        let points = normalize_gps_points(&sheet).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].transect_name.as_deref(), Some("T01"));
        assert_eq!(points[0].site_id.as_deref(), Some("3"));
        assert_eq!(points[0].point_id.as_deref(), Some("12"));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let sheet = RawSheet::new(
            "ESPECES",
            vec![
                vec![text("header")],
                vec![RawCell::Empty, RawCell::Empty, text("Pie bavarde")],
                vec![RawCell::Empty, text("   ")],
                vec![RawCell::Empty, RawCell::Empty, text("Geai des chênes")],
            ],
        );
        assert_eq!(normalize_species(&sheet).unwrap().len(), 2);
    }

    #[test]
    fn test_observation_missing_columns_reported() {
        let sheet = RawSheet::new(
            "NOM FRANÇAIS",
            vec![
                vec![text("Nom observateur"), text("ESPECE")],
                vec![text(" Alice "), text("Pie bavarde")],
            ],
        );

        let table = normalize_observations(&sheet);
        assert_eq!(table.row_count, 1);
        assert_eq!(table.column("observer_name").unwrap(), &[text("Alice")]);
        assert!(table.missing_columns.contains(&"transect_name"));
        assert!(!table.missing_columns.contains(&"species_name"));
    }
}
