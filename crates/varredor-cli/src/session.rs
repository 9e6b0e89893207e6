//! The operator's working state: at most one sweep at a time, plus the
//! commands that act on it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use varredor_core::{SweepParams, SweepResult};
use varredor_export::{
    export_csv, export_xlsx, rows_from_sweep, upload_rows, ExportError, SheetsError,
    SpreadsheetStore, UploadReport,
};
use varredor_scraper::{SweepError, SweepOrchestrator, SweepProgress};

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("no finished sweep in this session; run a sweep first")]
    NoSweep,

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("upload failed: {0}")]
    Upload(#[from] SheetsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Csv,
    Xlsx,
}

#[derive(Debug, Default)]
pub(crate) struct SweepSession {
    current: Option<SweepResult>,
}

impl SweepSession {
    /// Run a new sweep. Any previous result is discarded first, so a failed
    /// or cancelled sweep leaves the session empty.
    pub(crate) async fn start_sweep<F>(
        &mut self,
        orchestrator: &SweepOrchestrator,
        location: &str,
        params: &SweepParams,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<&SweepResult, SessionError>
    where
        F: FnMut(&SweepProgress),
    {
        if let Some(previous) = self.clear_sweep() {
            tracing::info!(
                sweep_id = %previous.id,
                location = %previous.location,
                "discarding previous sweep"
            );
        }
        let sweep = orchestrator
            .run_with_progress(location, params, cancel, on_progress)
            .await?;
        Ok(self.current.insert(sweep))
    }

    pub(crate) fn clear_sweep(&mut self) -> Option<SweepResult> {
        self.current.take()
    }

    fn finished(&self) -> Result<&SweepResult, SessionError> {
        self.current
            .as_ref()
            .filter(|s| s.is_finalized())
            .ok_or(SessionError::NoSweep)
    }

    /// Write the current sweep into `dir` in each of `formats`.
    pub(crate) fn export_sweep(
        &self,
        dir: &Path,
        formats: &[ExportFormat],
    ) -> Result<Vec<PathBuf>, SessionError> {
        let sweep = self.finished()?;
        let rows = rows_from_sweep(sweep)?;
        let slug = sweep.slug();

        let mut paths = Vec::with_capacity(formats.len());
        for format in formats {
            let path = match format {
                ExportFormat::Csv => export_csv(dir, &slug, &rows)?,
                ExportFormat::Xlsx => export_xlsx(dir, &slug, &rows)?,
            };
            paths.push(path);
        }
        Ok(paths)
    }

    /// Append the current sweep to `document`, in a worksheet named after the
    /// location slug.
    pub(crate) async fn upload_sweep<S: SpreadsheetStore>(
        &self,
        store: &S,
        document: &str,
    ) -> Result<UploadReport, SessionError> {
        let sweep = self.finished()?;
        let rows = rows_from_sweep(sweep)?;
        Ok(upload_rows(store, document, &sweep.slug(), &rows).await?)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
