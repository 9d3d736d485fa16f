// Survey cleaning pipeline
//
// raw sheets -> sheet_normalizer -> record_assembler (count_decoder per count
// column) -> validity_filter

pub mod count_decoder;
pub mod record_assembler;
pub mod sheet_normalizer;
pub mod sheet_schema;
pub mod validity_filter;

pub use count_decoder::decode_counts;
pub use record_assembler::assemble_records;
pub use sheet_normalizer::{
    normalize_gps_points, normalize_observations, normalize_species, read_gps_points,
    read_species, ObservationTable,
};
pub use sheet_schema::SchemaError;
pub use validity_filter::{clean_observations, CleanedObservations, CleaningReport, CleaningStage};
