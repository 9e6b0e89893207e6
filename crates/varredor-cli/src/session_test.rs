use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use varredor_scraper::{Geocoder, PlacesClient, RateLimiter, SearchOptions};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn orchestrator(server: &MockServer) -> SweepOrchestrator {
    let options = SearchOptions {
        page_size: 20,
        page_token_delay: Duration::ZERO,
        max_pages: 3,
    };
    SweepOrchestrator::new(
        Geocoder::with_base_url("k", &server.uri()).unwrap(),
        PlacesClient::with_base_url("k", &server.uri(), options, Arc::new(RateLimiter::unlimited()))
            .unwrap(),
        Duration::ZERO,
        1,
    )
}

fn params() -> SweepParams {
    SweepParams {
        step_km: 5.0,
        radius_meters: 2500,
        query: "restaurant".to_string(),
    }
}

/// Geocodes `address` to a box small enough for a single grid cell.
async fn mount_location(server: &MockServer, address: &str) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", address))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{ "geometry": { "bounds": {
                "northeast": { "lat": 38.71, "lng": -9.13 },
                "southwest": { "lat": 38.70, "lng": -9.14 }
            } } }]
        })))
        .mount(server)
        .await;
}

async fn mount_places(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "places": [
                { "id": "p1", "displayName": { "text": "Ramiro" }, "rating": 4.6, "userRatingCount": 900 },
                { "id": "p2", "displayName": { "text": "Zé" }, "rating": 4.2, "userRatingCount": 40 }
            ]
        })))
        .mount(server)
        .await;
}

async fn swept_session(server: &MockServer, location: &str) -> SweepSession {
    mount_location(server, location).await;
    mount_places(server).await;
    let mut session = SweepSession::default();
    session
        .start_sweep(
            &orchestrator(server),
            location,
            &params(),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();
    session
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("varredor-session-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Default)]
struct RecordingStore {
    appended: Mutex<Vec<(String, usize)>>,
}

impl SpreadsheetStore for RecordingStore {
    async fn find_document(&self, name: &str) -> Result<Option<String>, SheetsError> {
        Ok((name == "restaurantes_varridos").then(|| "doc".to_string()))
    }

    async fn worksheet_titles(&self, _document_id: &str) -> Result<Vec<String>, SheetsError> {
        Ok(Vec::new())
    }

    async fn add_worksheet(&self, _document_id: &str, _title: &str) -> Result<(), SheetsError> {
        Ok(())
    }

    async fn read_row(
        &self,
        _document_id: &str,
        _tab: &str,
        _row: u32,
    ) -> Result<Vec<String>, SheetsError> {
        Ok(Vec::new())
    }

    async fn clear(&self, _document_id: &str, _tab: &str) -> Result<(), SheetsError> {
        Ok(())
    }

    async fn append_rows(
        &self,
        _document_id: &str,
        tab: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), SheetsError> {
        self.appended
            .lock()
            .unwrap()
            .push((tab.to_string(), rows.len()));
        Ok(())
    }
}

#[test]
fn empty_session_has_nothing_to_export() {
    let session = SweepSession::default();
    let err = session
        .export_sweep(&std::env::temp_dir(), &[ExportFormat::Csv])
        .unwrap_err();
    assert!(matches!(err, SessionError::NoSweep));
}

#[tokio::test]
async fn start_sweep_holds_finalized_result() {
    let server = MockServer::start().await;
    let session = swept_session(&server, "Lisboa, Portugal").await;

    let sweep = session.current.as_ref().expect("sweep stored");
    assert!(sweep.is_finalized());
    assert_eq!(sweep.location, "Lisboa, Portugal");
    assert_eq!(sweep.places().len(), 2);
}

#[tokio::test]
async fn new_sweep_replaces_previous_location() {
    let server = MockServer::start().await;
    let mut session = swept_session(&server, "Lisboa").await;
    let first_id = session.current.as_ref().unwrap().id;

    mount_location(&server, "Porto").await;
    let second = session
        .start_sweep(
            &orchestrator(&server),
            "Porto",
            &params(),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();
    assert_eq!(second.location, "Porto");
    assert_ne!(second.id, first_id);
}

#[tokio::test]
async fn failed_sweep_leaves_session_empty() {
    let server = MockServer::start().await;
    let mut session = swept_session(&server, "Lisboa").await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "Atlantis"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let err = session
        .start_sweep(
            &orchestrator(&server),
            "Atlantis",
            &params(),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Sweep(_)));
    assert!(session.current.is_none());
}

#[tokio::test]
async fn clear_sweep_drops_result() {
    let server = MockServer::start().await;
    let mut session = swept_session(&server, "Lisboa").await;

    assert!(session.clear_sweep().is_some());
    assert!(session.current.is_none());
    assert!(session.clear_sweep().is_none());
}

#[tokio::test]
async fn export_writes_both_formats_under_slug() {
    let server = MockServer::start().await;
    let session = swept_session(&server, "Lisboa, Portugal").await;
    let dir = temp_dir("export");

    let paths = session
        .export_sweep(&dir, &[ExportFormat::Csv, ExportFormat::Xlsx])
        .unwrap();

    let names: Vec<String> = paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    assert_eq!(
        names,
        ["restaurants_lisboa_portugal.csv", "restaurants_lisboa_portugal.xlsx"]
    );
    assert!(paths.iter().all(|p| p.exists()));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn upload_targets_slug_tab() {
    let server = MockServer::start().await;
    let session = swept_session(&server, "Lisboa, Portugal").await;
    let store = RecordingStore::default();

    let report = session
        .upload_sweep(&store, "restaurantes_varridos")
        .await
        .unwrap();

    assert_eq!(report.tab, "lisboa_portugal");
    assert_eq!(report.rows_appended, 2);
    let appended = store.appended.lock().unwrap().clone();
    assert_eq!(
        appended,
        [("lisboa_portugal".to_string(), 1), ("lisboa_portugal".to_string(), 2)]
    );
}

#[tokio::test]
async fn upload_to_unknown_document_keeps_sweep() {
    let server = MockServer::start().await;
    let session = swept_session(&server, "Lisboa").await;

    let err = session
        .upload_sweep(&RecordingStore::default(), "other")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Upload(SheetsError::DocumentNotFound(_))
    ));
    assert!(session.current.as_ref().is_some_and(SweepResult::is_finalized));
}
