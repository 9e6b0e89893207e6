use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let access_passkey = require("VARREDOR_ACCESS_PASSKEY")?;

    let env = parse_environment(&or_default("VARREDOR_ENV", "development"))?;
    let log_level = or_default("VARREDOR_LOG_LEVEL", "info");

    let geocode_base_url = or_default("VARREDOR_GEOCODE_BASE_URL", "https://maps.googleapis.com");
    let places_base_url = or_default("VARREDOR_PLACES_BASE_URL", "https://places.googleapis.com");
    let request_timeout_secs = parse_u64("VARREDOR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("VARREDOR_USER_AGENT", "varredor/0.1 (restaurant-sweep)");

    let grid_step_km = or_default("VARREDOR_GRID_STEP_KM", "1.0")
        .parse::<f64>()
        .map_err(|e| invalid("VARREDOR_GRID_STEP_KM", e.to_string()))?;
    if !grid_step_km.is_finite() || grid_step_km <= 0.0 {
        return Err(invalid(
            "VARREDOR_GRID_STEP_KM",
            format!("must be a positive distance, got {grid_step_km}"),
        ));
    }

    let search_radius_meters = parse_u32("VARREDOR_SEARCH_RADIUS_METERS", "4000")?;
    let search_query = or_default("VARREDOR_SEARCH_QUERY", "restaurant");
    let page_size = parse_u32("VARREDOR_PAGE_SIZE", "20")?;
    let page_token_delay_ms = parse_u64("VARREDOR_PAGE_TOKEN_DELAY_MS", "2000")?;
    let cell_delay_ms = parse_u64("VARREDOR_CELL_DELAY_MS", "100")?;

    let max_pages_per_cell = parse_usize("VARREDOR_MAX_PAGES_PER_CELL", "10")?;
    if max_pages_per_cell == 0 {
        return Err(invalid(
            "VARREDOR_MAX_PAGES_PER_CELL",
            "must be at least 1".to_string(),
        ));
    }

    let max_concurrent_cells = parse_usize("VARREDOR_MAX_CONCURRENT_CELLS", "1")?;
    let min_request_interval_ms = parse_u64("VARREDOR_MIN_REQUEST_INTERVAL_MS", "100")?;

    let sheets_access_token = lookup("GOOGLE_SHEETS_ACCESS_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let sheet_document = or_default("VARREDOR_SHEET_DOCUMENT", "restaurantes_varridos");
    let sheets_base_url = or_default("VARREDOR_SHEETS_BASE_URL", "https://sheets.googleapis.com");
    let drive_base_url = or_default("VARREDOR_DRIVE_BASE_URL", "https://www.googleapis.com");

    Ok(AppConfig {
        env,
        log_level,
        google_api_key,
        access_passkey,
        geocode_base_url,
        places_base_url,
        request_timeout_secs,
        user_agent,
        grid_step_km,
        search_radius_meters,
        search_query,
        page_size,
        page_token_delay_ms,
        cell_delay_ms,
        max_pages_per_cell,
        max_concurrent_cells,
        min_request_interval_ms,
        sheets_access_token,
        sheet_document,
        sheets_base_url,
        drive_base_url,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VARREDOR_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
