//! Output collaborators for a finalized sweep: CSV/XLSX files and upload to
//! a spreadsheet document.

pub mod error;
pub mod sheets;
pub mod tabular;

pub use error::{ExportError, SheetsError};
pub use sheets::{upload_rows, GoogleSheetsStore, SpreadsheetStore, UploadReport};
pub use tabular::{
    csv_filename, export_csv, export_xlsx, read_csv, rows_from_sweep, write_csv, xlsx_bytes,
    xlsx_filename, ExportRow, COLUMNS, HOURS_NOT_AVAILABLE, WORKSHEET_NAME,
};
