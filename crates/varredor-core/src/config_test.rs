use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("GOOGLE_API_KEY", "test-google-key");
    m.insert("VARREDOR_ACCESS_PASSKEY", "open-sesame");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "VARREDOR_ENV"));
}

#[test]
fn build_app_config_fails_without_google_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GOOGLE_API_KEY"),
        "expected MissingEnvVar(GOOGLE_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_passkey() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("GOOGLE_API_KEY", "k");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "VARREDOR_ACCESS_PASSKEY"),
        "expected MissingEnvVar(VARREDOR_ACCESS_PASSKEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_required_var_as_missing() {
    let mut map = full_env();
    map.insert("GOOGLE_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "GOOGLE_API_KEY"));
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.google_api_key, "test-google-key");
    assert_eq!(cfg.access_passkey, "open-sesame");
    assert_eq!(cfg.geocode_base_url, "https://maps.googleapis.com");
    assert_eq!(cfg.places_base_url, "https://places.googleapis.com");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert!((cfg.grid_step_km - 1.0).abs() < f64::EPSILON);
    assert_eq!(cfg.search_radius_meters, 4000);
    assert_eq!(cfg.search_query, "restaurant");
    assert_eq!(cfg.page_size, 20);
    assert_eq!(cfg.page_token_delay_ms, 2000);
    assert_eq!(cfg.cell_delay_ms, 100);
    assert_eq!(cfg.max_pages_per_cell, 10);
    assert_eq!(cfg.max_concurrent_cells, 1);
    assert_eq!(cfg.min_request_interval_ms, 100);
    assert!(cfg.sheets_access_token.is_none());
    assert_eq!(cfg.sheet_document, "restaurantes_varridos");
}

#[test]
fn grid_step_override() {
    let mut map = full_env();
    map.insert("VARREDOR_GRID_STEP_KM", "0.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.grid_step_km - 0.5).abs() < f64::EPSILON);
}

#[test]
fn grid_step_rejects_zero_and_negative() {
    for raw in ["0", "-1.5", "NaN", "inf"] {
        let mut map = full_env();
        map.insert("VARREDOR_GRID_STEP_KM", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARREDOR_GRID_STEP_KM"),
            "expected InvalidEnvVar for {raw}, got: {result:?}"
        );
    }
}

#[test]
fn search_radius_invalid() {
    let mut map = full_env();
    map.insert("VARREDOR_SEARCH_RADIUS_METERS", "four-km");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARREDOR_SEARCH_RADIUS_METERS"),
        "got: {result:?}"
    );
}

#[test]
fn max_pages_per_cell_must_be_positive() {
    let mut map = full_env();
    map.insert("VARREDOR_MAX_PAGES_PER_CELL", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARREDOR_MAX_PAGES_PER_CELL"),
        "got: {result:?}"
    );
}

#[test]
fn page_token_delay_override() {
    let mut map = full_env();
    map.insert("VARREDOR_PAGE_TOKEN_DELAY_MS", "2500");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.page_token_delay_ms, 2500);
}

#[test]
fn max_concurrent_cells_invalid() {
    let mut map = full_env();
    map.insert("VARREDOR_MAX_CONCURRENT_CELLS", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VARREDOR_MAX_CONCURRENT_CELLS")
    );
}

#[test]
fn sheets_token_is_read_when_present() {
    let mut map = full_env();
    map.insert("GOOGLE_SHEETS_ACCESS_TOKEN", "ya29.token");
    map.insert("VARREDOR_SHEET_DOCUMENT", "my_sheet");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.sheets_access_token.as_deref(), Some("ya29.token"));
    assert_eq!(cfg.sheet_document, "my_sheet");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("GOOGLE_SHEETS_ACCESS_TOKEN", "ya29.token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-google-key"));
    assert!(!rendered.contains("open-sesame"));
    assert!(!rendered.contains("ya29.token"));
    assert!(rendered.contains("[redacted]"));
}
