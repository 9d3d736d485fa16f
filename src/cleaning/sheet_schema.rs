/// Sheet layout descriptors
///
/// Two of the three sheets have unreliable headers, so their columns are
/// addressed by position. Each layout is a versioned descriptor; a sheet that
/// carries data beyond the described positions is reported as a
/// [`SchemaError::WidthMismatch`] instead of being silently misaligned.
use thiserror::Error;

use crate::models::RawSheet;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error(
        "Sheet '{sheet}' does not match layout v{version}: expected {expected} columns, found data in {found}"
    )]
    WidthMismatch {
        sheet: String,
        version: u32,
        expected: usize,
        found: usize,
    },
}

/// What a positional column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Always blank in the source
    Unused,
    /// Kept in the normalized table under this name
    Field(&'static str),
    /// Read but not carried into the normalized table
    Dropped(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalSchema {
    pub version: u32,
    /// Rows skipped before data starts
    pub header_rows: usize,
    pub columns: &'static [ColumnRole],
}

impl PositionalSchema {
    /// Position of a kept or dropped field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|role| match role {
            ColumnRole::Field(n) | ColumnRole::Dropped(n) => *n == name,
            ColumnRole::Unused => false,
        })
    }

    /// Names of the fields kept in the normalized table, in position order
    pub fn fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter_map(|role| match role {
                ColumnRole::Field(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Check that no data row holds a value past the described columns.
    ///
    /// Narrower sheets are fine: trailing blank columns are not stored in the
    /// workbook and read as empty.
    pub fn validate(&self, sheet: &RawSheet) -> Result<(), SchemaError> {
        let expected = self.columns.len();
        let found = sheet
            .rows
            .iter()
            .skip(self.header_rows)
            .filter_map(|row| row.iter().rposition(|c| !c.is_empty()))
            .map(|last| last + 1)
            .max()
            .unwrap_or(0);

        if found > expected {
            return Err(SchemaError::WidthMismatch {
                sheet: sheet.name.clone(),
                version: self.version,
                expected,
                found,
            });
        }
        Ok(())
    }
}

/// Species reference sheet (`ESPECES`)
pub const SPECIES_LAYOUT: PositionalSchema = PositionalSchema {
    version: 1,
    header_rows: 1,
    columns: &[
        ColumnRole::Unused,
        ColumnRole::Unused,
        ColumnRole::Field("french_name"),
        ColumnRole::Field("scientific_name"),
        ColumnRole::Field("status"),
    ],
};

/// Transect location and habitat sheet (`GPS-MILIEU`)
pub const GPS_LAYOUT: PositionalSchema = PositionalSchema {
    version: 1,
    header_rows: 1,
    columns: &[
        ColumnRole::Unused,
        ColumnRole::Unused,
        ColumnRole::Field("transect_name"),
        ColumnRole::Dropped("gps_x"),
        ColumnRole::Dropped("gps_y"),
        ColumnRole::Field("habitat_type"),
        ColumnRole::Field("site_id"),
        ColumnRole::Field("point_id"),
    ],
};

/// Header-addressed layout: source label → canonical field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameSchema {
    pub version: u32,
    pub header_row: usize,
    pub renames: &'static [(&'static str, &'static str)],
}

impl RenameSchema {
    pub fn canonical_name(&self, source_label: &str) -> Option<&'static str> {
        self.renames
            .iter()
            .find(|(label, _)| *label == source_label)
            .map(|(_, canonical)| *canonical)
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.renames.iter().map(|(_, canonical)| *canonical)
    }
}

/// Observation sheet (`NOM FRANÇAIS`)
///
/// The four detection-method counts sit under a merged "totaux" header: the
/// first keeps the label, the other three and the notes column come through
/// blank and are addressed by position.
pub const OBSERVATION_LAYOUT: RenameSchema = RenameSchema {
    version: 1,
    header_row: 0,
    renames: &[
        ("Nom observateur", "observer_name"),
        ("code département", "department_code"),
        ("Nom transect", "transect_name"),
        ("date", "date"),
        ("1er, 2e ou 3e passage", "visit_number"),
        ("nuages", "cloud_cover_raw"),
        ("pluie", "rain"),
        ("vent", "wind"),
        ("visibilité", "visibility"),
        ("N° point", "point_number"),
        ("heure début", "start_time"),
        ("ESPECE", "species_name"),
        ("distances de contact", "distance_category_raw"),
        ("totaux", "count_auditory"),
        ("Unnamed: 22", "count_visual_no_flight"),
        ("Unnamed: 23", "count_audio_visual_no_flight"),
        ("Unnamed: 24", "count_audio_visual_flight"),
        ("Unnamed: 25", "notes"),
    ],
};
