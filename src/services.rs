pub mod summary_service;
pub mod survey_import_service;

pub use survey_import_service::{
    process_sheets, PipelineDiagnostics, SurveyDataset, SurveyImportError, SurveyImportService,
};
