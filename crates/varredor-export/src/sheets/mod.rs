//! Upload of exported rows into a worksheet of an existing spreadsheet
//! document.

mod google;

use serde_json::Value;

use crate::error::SheetsError;
use crate::tabular::{ExportRow, COLUMNS};

pub use google::GoogleSheetsStore;

/// The operations [`upload_rows`] needs from a spreadsheet backend.
///
/// Documents are addressed by the id returned from
/// [`SpreadsheetStore::find_document`] and worksheets by title.
#[allow(async_fn_in_trait)]
pub trait SpreadsheetStore {
    /// Id of the document named `name`, or `None` if there is none.
    async fn find_document(&self, name: &str) -> Result<Option<String>, SheetsError>;

    async fn worksheet_titles(&self, document_id: &str) -> Result<Vec<String>, SheetsError>;

    async fn add_worksheet(&self, document_id: &str, title: &str) -> Result<(), SheetsError>;

    /// Cell texts of 1-based row `row`, empty if the row is blank.
    async fn read_row(
        &self,
        document_id: &str,
        tab: &str,
        row: u32,
    ) -> Result<Vec<String>, SheetsError>;

    async fn clear(&self, document_id: &str, tab: &str) -> Result<(), SheetsError>;

    /// Append rows after the last non-empty row, interpreting values as if
    /// typed by a user.
    async fn append_rows(
        &self,
        document_id: &str,
        tab: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), SheetsError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub document_id: String,
    pub tab: String,
    pub created_tab: bool,
    /// The header row was missing or wrong, so the tab was cleared first.
    pub header_rewritten: bool,
    pub rows_appended: usize,
}

/// Append `rows` to worksheet `tab` of the document named `document`.
///
/// The document must already exist. The worksheet is created if absent. If
/// its first row is not exactly [`COLUMNS`], the worksheet is cleared and the
/// header written before appending.
///
/// # Errors
///
/// Returns [`SheetsError::DocumentNotFound`] if no document has that name,
/// or whatever the store reports for a failed operation.
pub async fn upload_rows<S: SpreadsheetStore>(
    store: &S,
    document: &str,
    tab: &str,
    rows: &[ExportRow],
) -> Result<UploadReport, SheetsError> {
    let document_id = store
        .find_document(document)
        .await?
        .ok_or_else(|| SheetsError::DocumentNotFound(document.to_owned()))?;

    let titles = store.worksheet_titles(&document_id).await?;
    let created_tab = !titles.iter().any(|t| t == tab);
    if created_tab {
        store.add_worksheet(&document_id, tab).await?;
        tracing::info!(document, tab, "created worksheet");
    }

    let header = store.read_row(&document_id, tab, 1).await?;
    let header_rewritten = !header.iter().map(String::as_str).eq(COLUMNS);
    if header_rewritten {
        if !created_tab {
            tracing::warn!(
                document,
                tab,
                found = ?header,
                "worksheet header does not match export columns; clearing"
            );
        }
        store.clear(&document_id, tab).await?;
        let header_row: Vec<Value> = COLUMNS.iter().map(|c| Value::from(*c)).collect();
        store.append_rows(&document_id, tab, &[header_row]).await?;
    }

    let values: Vec<Vec<Value>> = rows.iter().map(ExportRow::to_values).collect();
    if !values.is_empty() {
        store.append_rows(&document_id, tab, &values).await?;
    }
    tracing::info!(document, tab, rows = values.len(), "uploaded rows");

    Ok(UploadReport {
        document_id,
        tab: tab.to_owned(),
        created_tab,
        header_rewritten,
        rows_appended: values.len(),
    })
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
