use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use birds_biodiversity::config::Config;
use birds_biodiversity::models::{AnnualSummary, Observation, ShannonIndex};
use birds_biodiversity::services::{
    PipelineDiagnostics, SurveyDataset, SurveyImportError, SurveyImportService,
};

#[derive(Parser)]
#[command(name = "birds-biodiversity")]
#[command(about = "Clean bird-survey field data and summarise it per year", long_about = None)]
struct Cli {
    /// Path to the survey workbook (overrides BIRDS_DATA_FILE)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Only report the Shannon index for this year
    #[arg(long)]
    year: Option<i32>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Include the cleaned observations in the JSON report
    #[arg(long, requires = "json")]
    include_records: bool,
}

#[derive(Serialize)]
struct YearDiversity {
    year: i32,
    shannon_index: ShannonIndex,
}

#[derive(Serialize)]
struct Report<'a> {
    diagnostics: &'a PipelineDiagnostics,
    annual_summary: Vec<AnnualSummary>,
    diversity: Vec<YearDiversity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observations: Option<&'a [Observation]>,
}

#[instrument]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,birds_biodiversity=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(file) = cli.file {
        config = config.with_data_file(file);
    }
    info!("Starting survey import with config: {:?}", config);

    let service = SurveyImportService::new(&config)?;

    // Large workbooks take a while to parse
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Reading {}...", config.data_file.display()));

    let dataset = import_with_spinner(&service, &pb)?;

    let diversity: Vec<YearDiversity> = match cli.year {
        Some(year) => vec![YearDiversity {
            year,
            shannon_index: dataset.shannon_index(year),
        }],
        None => dataset
            .diversity_by_year()
            .into_iter()
            .map(|(year, shannon_index)| YearDiversity {
                year,
                shannon_index,
            })
            .collect(),
    };

    if cli.json {
        let report = Report {
            diagnostics: &dataset.diagnostics,
            annual_summary: dataset.annual_summary(),
            diversity,
            observations: cli.include_records.then_some(dataset.observations.as_slice()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&dataset, &diversity);
    }

    Ok(())
}

/// Run the import, leaving the terminal clean if it fails
fn import_with_spinner(
    service: &SurveyImportService,
    pb: &ProgressBar,
) -> Result<SurveyDataset, SurveyImportError> {
    let dataset = service.import().inspect_err(|_| pb.finish_and_clear())?;
    pb.finish_with_message(format!(
        "✓ Loaded {} clean observations",
        dataset.observations.len()
    ));
    Ok(dataset)
}

fn print_report(dataset: &SurveyDataset, diversity: &[YearDiversity]) {
    let diagnostics = &dataset.diagnostics;
    let loaded = &diagnostics.loaded;

    println!("=== Loaded ===");
    println!("  Species:             {}", loaded.species);
    println!("  GPS points:          {}", loaded.gps_points);
    println!("  Observation rows:    {}", loaded.observation_rows);

    for warning in &diagnostics.warnings {
        println!("⚠ {warning}");
    }

    println!("\n=== Data Cleaning ===");
    println!("Starting with {} records", diagnostics.cleaning.input_records);
    for stage in &diagnostics.cleaning.stages {
        println!("  {:>6}  {}", stage.affected, stage.stage.describe());
    }

    let summary = &diagnostics.cleaning.summary;
    println!("\n✓ Final dataset: {} records", summary.records);
    if let (Some(first), Some(last)) = (summary.first_year, summary.last_year) {
        println!("  Years: {first} - {last}");
    }
    println!("  Unique species: {}", summary.unique_species);
    println!("  Unique transects: {}", summary.unique_transects);
    println!("  Unique observers: {}", summary.unique_observers);

    println!("\n=== Annual Summary ===");
    println!(
        "{:>6} {:>8} {:>8} {:>10} {:>10} {:>10}",
        "year", "obs", "species", "abundance", "transects", "observers"
    );
    for row in dataset.annual_summary() {
        println!(
            "{:>6} {:>8} {:>8} {:>10} {:>10} {:>10}",
            row.year,
            row.n_observations,
            row.n_species,
            row.total_abundance,
            row.n_transects,
            row.n_observers
        );
    }

    println!("\n=== Shannon Diversity ===");
    for entry in diversity {
        println!("{:>6} {}", entry.year, entry.shannon_index);
    }
}
