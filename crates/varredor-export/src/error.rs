use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("sweep {0} has not been finalized; weighted ratings are missing")]
    NotFinalized(uuid::Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0} rows do not fit in a worksheet")]
    TooManyRows(usize),
}

/// Failures of the spreadsheet upload. None of them touch the in-memory
/// sweep or files already exported.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("spreadsheet document \"{0}\" not found")]
    DocumentNotFound(String),

    #[error("GOOGLE_SHEETS_ACCESS_TOKEN is not set; upload is unavailable")]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {context}: {body}")]
    UnexpectedStatus {
        context: String,
        status: u16,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
