use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::cleaning::{
    assemble_records, clean_observations, normalize_gps_points, normalize_observations,
    normalize_species, read_gps_points, read_species, CleaningReport, SchemaError,
};
use crate::config::{Config, SheetNames};
use crate::importers::{WorkbookError, WorkbookLoader};
use crate::models::{AnnualSummary, GpsPoint, Observation, RawSheet, ShannonIndex, Species};
use crate::services::summary_service;

/// Error types for survey import operations
#[derive(Debug, thiserror::Error)]
pub enum SurveyImportError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
}

/// Rows read from each sheet, before cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadCounts {
    pub species: usize,
    pub gps_points: usize,
    pub observation_rows: usize,
}

/// Everything a reporter needs to narrate an import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineDiagnostics {
    pub loaded: LoadCounts,
    pub cleaning: CleaningReport,
    pub warnings: Vec<String>,
}

/// The cleaned survey: observations plus the two reference tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyDataset {
    pub observations: Vec<Observation>,
    pub species: Vec<Species>,
    pub gps_points: Vec<GpsPoint>,
    pub diagnostics: PipelineDiagnostics,
}

impl SurveyDataset {
    pub fn annual_summary(&self) -> Vec<AnnualSummary> {
        summary_service::annual_summary(&self.observations)
    }

    pub fn shannon_index(&self, year: i32) -> ShannonIndex {
        summary_service::shannon_index(&self.observations, year)
    }

    pub fn diversity_by_year(&self) -> Vec<(i32, ShannonIndex)> {
        summary_service::diversity_by_year(&self.observations)
    }
}

/// Loads the survey workbook and runs it through the cleaning pipeline
#[derive(Debug, Clone)]
pub struct SurveyImportService {
    loader: WorkbookLoader,
    sheets: SheetNames,
}

impl SurveyImportService {
    /// Fails with `FileNotFound` if the configured workbook does not exist
    pub fn new(config: &Config) -> Result<Self, SurveyImportError> {
        Ok(Self {
            loader: WorkbookLoader::open(&config.data_file)?,
            sheets: config.sheets.clone(),
        })
    }

    /// Read the three sheets and clean them.
    ///
    /// Sheets are read one after another; each read holds the workbook open
    /// only for its own duration.
    #[instrument(skip(self), fields(path = %self.loader.path().display()))]
    pub fn import(&self) -> Result<SurveyDataset, SurveyImportError> {
        let start_time = Instant::now();
        info!("Loading data from {}", self.loader.path().display());

        let species = self.loader.load_sheet(&self.sheets.species)?;
        let gps = self.loader.load_sheet(&self.sheets.gps)?;
        let observations = self.loader.load_sheet(&self.sheets.observations)?;

        let dataset = process_sheets(&species, &gps, &observations);

        info!(
            "Import finished in {:.2}s: {} observations kept",
            start_time.elapsed().as_secs_f64(),
            dataset.observations.len()
        );
        Ok(dataset)
    }
}

/// Run already-loaded sheets through normalization, assembly and cleaning.
///
/// A reference sheet that does not match its layout is still read at the
/// described positions; the mismatch is reported in the diagnostics warnings.
#[instrument(skip_all)]
pub fn process_sheets(
    species_sheet: &RawSheet,
    gps_sheet: &RawSheet,
    observation_sheet: &RawSheet,
) -> SurveyDataset {
    let mut warnings: Vec<String> = Vec::new();

    let species = normalize_species(species_sheet).unwrap_or_else(|e| {
        record_mismatch(&mut warnings, e);
        read_species(species_sheet)
    });
    let gps_points = normalize_gps_points(gps_sheet).unwrap_or_else(|e| {
        record_mismatch(&mut warnings, e);
        read_gps_points(gps_sheet)
    });
    let table = normalize_observations(observation_sheet);

    warnings.extend(table.missing_columns.iter().map(|name| {
        format!(
            "column '{}' not found in sheet '{}'; treated as missing",
            name, observation_sheet.name
        )
    }));

    let records = assemble_records(&table);
    let cleaned = clean_observations(records);

    if cleaned.observations.is_empty() {
        warn!("No observations survived cleaning");
    }

    SurveyDataset {
        diagnostics: PipelineDiagnostics {
            loaded: LoadCounts {
                species: species.len(),
                gps_points: gps_points.len(),
                observation_rows: table.row_count,
            },
            cleaning: cleaned.report,
            warnings,
        },
        observations: cleaned.observations,
        species,
        gps_points,
    }
}

fn record_mismatch(warnings: &mut Vec<String>, error: SchemaError) {
    warn!("{}; reading the described columns anyway", error);
    warnings.push(error.to_string());
}
