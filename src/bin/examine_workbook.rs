use birds_biodiversity::config::Config;
use birds_biodiversity::importers::WorkbookLoader;
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;
    let file_path: PathBuf = match args.get(1) {
        Some(path) => path.into(),
        None => config.data_file.clone(),
    };

    println!("Opening survey workbook: {}", file_path.display());
    let loader = WorkbookLoader::open(file_path)?;

    println!("\nSheet names:");
    for (i, name) in loader.sheet_names()?.iter().enumerate() {
        println!("  {i}: {name}");
    }

    // Allow specifying which sheet to examine
    let sheet_name = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| config.sheets.observations.clone());

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let sheet = loader.load_sheet(&sheet_name)?;

    println!("Dimensions: ({}, {})", sheet.height(), sheet.width());
    println!("\nFirst 40 rows (showing first 12 columns):");
    println!("{}", "=".repeat(100));

    // Only print rows with data
    let rows_with_data = sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(|cell| cell.is_empty()))
        .take(40);

    for (row_idx, row) in rows_with_data {
        print!("Row {:3}: ", row_idx + 1);
        for cell in row.iter().take(12) {
            if cell.is_empty() {
                print!("[empty] ");
            } else {
                print!("[{cell}] ");
            }
        }
        println!();
    }

    // The header row is where the rename table gets its labels from
    println!("\n{}", "=".repeat(100));
    println!("Header row, all columns:");
    println!("{}", "=".repeat(100));
    if let Some(row) = sheet.rows.first() {
        for (col_idx, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                println!("Col {col_idx:3}: {cell}");
            }
        }
    }

    Ok(())
}
