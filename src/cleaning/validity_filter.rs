/// Validity Filter
///
/// Stages run in a fixed order and each one reports what it touched:
///
/// 1. negative wind readings are sensor faults and become missing (rows kept)
/// 2. rows with a zero or negative total count are removed
/// 3. rows missing year, species, count or transect are removed
/// 4. survivors are numbered 1..n in their current order
use serde::Serialize;
use tracing::{info, warn};

use crate::models::{DatasetSummary, Observation, ObservationRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    NegativeWindCorrected,
    NonPositiveCountRemoved,
    MissingEssentialRemoved,
}

impl CleaningStage {
    pub fn describe(&self) -> &'static str {
        match self {
            CleaningStage::NegativeWindCorrected => "negative wind values set to missing",
            CleaningStage::NonPositiveCountRemoved => "records with zero/negative counts removed",
            CleaningStage::MissingEssentialRemoved => {
                "records with missing essential data removed"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: CleaningStage,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows corrected or removed by the stage
    pub affected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub input_records: usize,
    pub stages: Vec<StageOutcome>,
    pub summary: DatasetSummary,
}

impl CleaningReport {
    pub fn affected_by(&self, stage: CleaningStage) -> usize {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map_or(0, |s| s.affected)
    }

    pub fn removed(&self) -> usize {
        self.input_records - self.summary.records
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedObservations {
    pub observations: Vec<Observation>,
    pub report: CleaningReport,
}

pub fn clean_observations(records: Vec<ObservationRecord>) -> CleanedObservations {
    info!("Cleaning {} observation records", records.len());
    let input_records = records.len();
    let mut records = records;
    let mut stages = Vec::with_capacity(3);

    let mut corrected = 0;
    for record in records.iter_mut() {
        if record.wind.is_some_and(|w| w < 0.0) {
            record.wind = None;
            corrected += 1;
        }
    }
    if corrected > 0 {
        warn!("Found {} negative wind values - setting to missing", corrected);
    }
    stages.push(StageOutcome {
        stage: CleaningStage::NegativeWindCorrected,
        rows_before: records.len(),
        rows_after: records.len(),
        affected: corrected,
    });

    // NaN totals are not comparable and fall through to the essential check
    let before = records.len();
    records.retain(|r| !(r.individual_count <= 0.0));
    stages.push(removal(CleaningStage::NonPositiveCountRemoved, before, records.len()));

    let before = records.len();
    let observations: Vec<Observation> = records
        .into_iter()
        .filter_map(into_essential)
        .enumerate()
        .map(|(idx, observation)| Observation {
            observation_id: idx as u32 + 1,
            ..observation
        })
        .collect();
    stages.push(removal(
        CleaningStage::MissingEssentialRemoved,
        before,
        observations.len(),
    ));

    let summary = DatasetSummary::from_observations(&observations);
    info!(
        "Final dataset: {} records, years {:?} - {:?}, {} species, {} transects, {} observers",
        summary.records,
        summary.first_year,
        summary.last_year,
        summary.unique_species,
        summary.unique_transects,
        summary.unique_observers
    );

    CleanedObservations {
        observations,
        report: CleaningReport {
            input_records,
            stages,
            summary,
        },
    }
}

fn removal(stage: CleaningStage, before: usize, after: usize) -> StageOutcome {
    let removed = before - after;
    if removed > 0 {
        info!("Removed {} {}", removed, stage.describe());
    }
    StageOutcome {
        stage,
        rows_before: before,
        rows_after: after,
        affected: removed,
    }
}

/// Promote a record whose essential fields are all present; the id is set later
fn into_essential(record: ObservationRecord) -> Option<Observation> {
    if record.individual_count.is_nan() {
        return None;
    }

    Some(Observation {
        observation_id: 0,
        year: record.year?,
        species_name: record.species_name?,
        transect_name: record.transect_name?,
        observer_name: record.observer_name,
        department_code: record.department_code,
        date: record.date,
        visit_number: record.visit_number,
        cloud_cover_raw: record.cloud_cover_raw,
        rain: record.rain,
        wind: record.wind,
        visibility: record.visibility,
        point_number: record.point_number,
        start_time: record.start_time,
        distance_category_raw: record.distance_category_raw,
        detection_counts: record.detection_counts,
        individual_count: record.individual_count,
        notes: record.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_count_removed_as_missing() {
        let record = ObservationRecord {
            year: Some(2020),
            species_name: Some("Pie bavarde".to_string()),
            transect_name: Some("T01".to_string()),
            individual_count: f64::NAN,
            ..Default::default()
        };

        let cleaned = clean_observations(vec![record]);
        assert!(cleaned.observations.is_empty());
        assert_eq!(cleaned.report.affected_by(CleaningStage::NonPositiveCountRemoved), 0);
        assert_eq!(cleaned.report.affected_by(CleaningStage::MissingEssentialRemoved), 1);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let cleaned = clean_observations(Vec::new());
        assert!(cleaned.observations.is_empty());
        assert_eq!(cleaned.report.stages.len(), 3);
        assert_eq!(cleaned.report.summary.first_year, None);
    }
}
