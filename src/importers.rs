// Workbook import: reads the survey spreadsheet into raw sheets

pub mod workbook_loader;

// Re-export commonly used items
pub use workbook_loader::{WorkbookError, WorkbookLoader};
