#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, built once at startup and passed by reference into
/// the geocoder, search client, and exporters.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub google_api_key: String,
    pub access_passkey: String,
    pub geocode_base_url: String,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub grid_step_km: f64,
    pub search_radius_meters: u32,
    pub search_query: String,
    pub page_size: u32,
    pub page_token_delay_ms: u64,
    pub cell_delay_ms: u64,
    pub max_pages_per_cell: usize,
    pub max_concurrent_cells: usize,
    pub min_request_interval_ms: u64,
    pub sheets_access_token: Option<String>,
    pub sheet_document: String,
    pub sheets_base_url: String,
    pub drive_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("google_api_key", &"[redacted]")
            .field("access_passkey", &"[redacted]")
            .field("geocode_base_url", &self.geocode_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("grid_step_km", &self.grid_step_km)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("search_query", &self.search_query)
            .field("page_size", &self.page_size)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("cell_delay_ms", &self.cell_delay_ms)
            .field("max_pages_per_cell", &self.max_pages_per_cell)
            .field("max_concurrent_cells", &self.max_concurrent_cells)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .field(
                "sheets_access_token",
                &self.sheets_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sheet_document", &self.sheet_document)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("drive_base_url", &self.drive_base_url)
            .finish()
    }
}
