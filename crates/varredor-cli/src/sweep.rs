//! `sweep` command handler.

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use varredor_core::{AppConfig, SweepParams, SweepResult};
use varredor_export::GoogleSheetsStore;
use varredor_scraper::{SweepOrchestrator, SweepProgress};

use crate::session::{ExportFormat, SweepSession};
use crate::SweepArgs;

/// Sweep `args.location`, print a summary, then export and upload as asked.
///
/// # Errors
///
/// Returns an error if the clients cannot be built, the sweep fails or is
/// cancelled, or an export or upload fails. Exports written before a failed
/// upload are kept.
pub(crate) async fn run_sweep(
    config: &AppConfig,
    args: &SweepArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let params = sweep_params(config, args);
    let orchestrator =
        SweepOrchestrator::from_config(config).context("failed to build sweep clients")?;

    let mut session = SweepSession::default();
    let sweep = session
        .start_sweep(&orchestrator, &args.location, &params, cancel, print_progress)
        .await?;
    print_summary(sweep, args.top);

    let mut formats = Vec::new();
    if args.csv {
        formats.push(ExportFormat::Csv);
    }
    if args.xlsx {
        formats.push(ExportFormat::Xlsx);
    }
    if !formats.is_empty() {
        for path in session.export_sweep(&args.out_dir, &formats)? {
            println!("wrote {}", path.display());
        }
    }

    if args.upload {
        let store = GoogleSheetsStore::from_config(config)?;
        let report = session.upload_sweep(&store, &config.sheet_document).await?;
        println!(
            "uploaded {} rows to \"{}\" / {}{}",
            report.rows_appended,
            config.sheet_document,
            report.tab,
            if report.created_tab { " (new tab)" } else { "" }
        );
    }

    Ok(())
}

fn sweep_params(config: &AppConfig, args: &SweepArgs) -> SweepParams {
    let mut params = SweepParams::from_config(config);
    if let Some(step_km) = args.step_km {
        params.step_km = step_km;
    }
    if let Some(radius) = args.radius {
        params.radius_meters = radius;
    }
    if let Some(query) = &args.query {
        params.query.clone_from(query);
    }
    params
}

fn print_progress(progress: &SweepProgress) {
    eprintln!(
        "[{}/{}] {} places (+{})",
        progress.cells_done, progress.cells_total, progress.places_found, progress.new_places
    );
}

fn print_summary(sweep: &SweepResult, top: usize) {
    let stats = &sweep.stats;
    println!(
        "{}: {} places from {} cells ({} truncated, {} pages)",
        sweep.location,
        sweep.places().len(),
        stats.cells_searched,
        stats.cells_truncated,
        stats.pages_fetched
    );
    if top == 0 || sweep.places().is_empty() {
        return;
    }

    println!("{:>3}  {:>6}  {:>6}  {:>7}  name", "#", "score", "rating", "reviews");
    for (rank, place) in sweep.ranked().into_iter().take(top).enumerate() {
        println!(
            "{:>3}  {:>6.3}  {:>6.1}  {:>7}  {}",
            rank + 1,
            place.weighted_rating.unwrap_or(0.0),
            place.rating,
            place.review_count,
            place.name
        );
    }
}
