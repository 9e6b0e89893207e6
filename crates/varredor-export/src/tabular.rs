//! Tabular export of a finalized sweep: CSV and XLSX carry identical rows
//! in the same fixed column order.

use std::io::{Read, Write};
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use varredor_core::{PlaceRecord, SweepResult};

use crate::error::ExportError;

pub const COLUMNS: [&str; 6] = [
    "Name",
    "Rating",
    "Total Reviews",
    "Weighted Rating",
    "Address",
    "Opening Hours",
];

/// Written in place of opening hours the service did not report.
pub const HOURS_NOT_AVAILABLE: &str = "Not available";

pub const WORKSHEET_NAME: &str = "Restaurants";

/// One exported place. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Total Reviews")]
    pub total_reviews: u32,
    #[serde(rename = "Weighted Rating")]
    pub weighted_rating: f64,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Opening Hours")]
    pub opening_hours: String,
}

impl ExportRow {
    #[must_use]
    pub fn from_record(record: &PlaceRecord) -> Self {
        let opening_hours = if record.opening_hours.is_empty() {
            HOURS_NOT_AVAILABLE.to_string()
        } else {
            record.opening_hours.join("; ")
        };
        Self {
            name: record.name.clone(),
            rating: record.rating,
            total_reviews: record.review_count,
            weighted_rating: record.weighted_rating.unwrap_or(0.0),
            address: record.address.clone(),
            opening_hours,
        }
    }

    /// Cell values for a spreadsheet append, numbers kept numeric.
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.as_str()),
            Value::from(self.rating),
            Value::from(self.total_reviews),
            Value::from(self.weighted_rating),
            Value::from(self.address.as_str()),
            Value::from(self.opening_hours.as_str()),
        ]
    }
}

/// Rows for every place of a finalized sweep, best weighted rating first.
///
/// # Errors
///
/// Returns [`ExportError::NotFinalized`] if the sweep has not been scored.
pub fn rows_from_sweep(sweep: &SweepResult) -> Result<Vec<ExportRow>, ExportError> {
    if !sweep.is_finalized() {
        return Err(ExportError::NotFinalized(sweep.id));
    }
    Ok(sweep
        .ranked()
        .into_iter()
        .map(ExportRow::from_record)
        .collect())
}

#[must_use]
pub fn csv_filename(slug: &str) -> String {
    format!("restaurants_{slug}.csv")
}

#[must_use]
pub fn xlsx_filename(slug: &str) -> String {
    format!("restaurants_{slug}.xlsx")
}

/// Write `rows` as CSV with a header row. The header is written even when
/// there are no rows.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] on serialization or write failure.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns [`ExportError::Csv`] if a record is malformed.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>, ExportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Encode `rows` as an XLSX workbook with a single worksheet.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] on encoding failure or
/// [`ExportError::TooManyRows`] past the worksheet row limit.
pub fn xlsx_bytes(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(WORKSHEET_NAME)?;

    for (col, title) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, title, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = u32::try_from(i + 1).map_err(|_| ExportError::TooManyRows(rows.len()))?;
        sheet.write_string(r, 0, &row.name)?;
        sheet.write_number(r, 1, row.rating)?;
        sheet.write_number(r, 2, f64::from(row.total_reviews))?;
        sheet.write_number(r, 3, row.weighted_rating)?;
        sheet.write_string(r, 4, &row.address)?;
        sheet.write_string(r, 5, &row.opening_hours)?;
    }
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Write the CSV export into `dir` and return its path.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be created, or any error
/// from [`write_csv`].
pub fn export_csv(
    dir: &Path,
    slug: &str,
    rows: &[ExportRow],
) -> Result<std::path::PathBuf, ExportError> {
    let path = dir.join(csv_filename(slug));
    let file = std::fs::File::create(&path)?;
    write_csv(rows, std::io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote CSV export");
    Ok(path)
}

/// Write the XLSX export into `dir` and return its path.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be written, or any error
/// from [`xlsx_bytes`].
pub fn export_xlsx(
    dir: &Path,
    slug: &str,
    rows: &[ExportRow],
) -> Result<std::path::PathBuf, ExportError> {
    let path = dir.join(xlsx_filename(slug));
    std::fs::write(&path, xlsx_bytes(rows)?)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote XLSX export");
    Ok(path)
}

#[cfg(test)]
#[path = "tabular_test.rs"]
mod tests;
