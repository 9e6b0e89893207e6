//! [`SpreadsheetStore`] over the Drive v3 and Sheets v4 REST APIs.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use varredor_core::AppConfig;

use super::SpreadsheetStore;
use crate::error::SheetsError;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Authenticates every request with an OAuth bearer token.
pub struct GoogleSheetsStore {
    client: Client,
    access_token: String,
    sheets_base: Url,
    drive_base: Url,
}

impl GoogleSheetsStore {
    /// # Errors
    ///
    /// Returns [`SheetsError::MissingToken`] when no access token is
    /// configured, [`SheetsError::InvalidBaseUrl`] for a bad base URL, or
    /// [`SheetsError::Http`] if the client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SheetsError> {
        let token = config
            .sheets_access_token
            .as_deref()
            .ok_or(SheetsError::MissingToken)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Self::from_parts(client, token, &config.sheets_base_url, &config.drive_base_url)
    }

    /// Creates a store against custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`GoogleSheetsStore::from_config`], minus the token check.
    pub fn with_base_urls(
        access_token: &str,
        sheets_base_url: &str,
        drive_base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Self::from_parts(client, access_token, sheets_base_url, drive_base_url)
    }

    fn from_parts(
        client: Client,
        access_token: &str,
        sheets_base_url: &str,
        drive_base_url: &str,
    ) -> Result<Self, SheetsError> {
        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            sheets_base: parse_base(sheets_base_url)?,
            drive_base: parse_base(drive_base_url)?,
        })
    }

    fn url(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn values_url(&self, document_id: &str, range: &str) -> Url {
        Self::url(
            &self.sheets_base,
            &["v4", "spreadsheets", document_id, "values", range],
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, SheetsError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::UnexpectedStatus {
                context: context.to_owned(),
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|source| SheetsError::Deserialize {
            context: context.to_owned(),
            source,
        })
    }
}

impl SpreadsheetStore for GoogleSheetsStore {
    async fn find_document(&self, name: &str) -> Result<Option<String>, SheetsError> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            escape_query_literal(name)
        );
        let mut url = Self::url(&self.drive_base, &["drive", "v3", "files"]);
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name)")
            .append_pair("pageSize", "1");

        let list: FileList = self.send(self.client.get(url), "drive file search").await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn worksheet_titles(&self, document_id: &str) -> Result<Vec<String>, SheetsError> {
        let mut url = Self::url(&self.sheets_base, &["v4", "spreadsheets", document_id]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let sheet: Spreadsheet = self.send(self.client.get(url), "spreadsheet get").await?;
        Ok(sheet
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    async fn add_worksheet(&self, document_id: &str, title: &str) -> Result<(), SheetsError> {
        let target = format!("{document_id}:batchUpdate");
        let url = Self::url(&self.sheets_base, &["v4", "spreadsheets", target.as_str()]);
        let body = json!({ "requests": [{ "addSheet": { "properties": { "title": title } } }] });
        let _: Value = self
            .send(self.client.post(url).json(&body), "add worksheet")
            .await?;
        Ok(())
    }

    async fn read_row(
        &self,
        document_id: &str,
        tab: &str,
        row: u32,
    ) -> Result<Vec<String>, SheetsError> {
        let url = self.values_url(document_id, &row_range(tab, row));
        let range: ValueRange = self.send(self.client.get(url), "values get").await?;
        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    async fn clear(&self, document_id: &str, tab: &str) -> Result<(), SheetsError> {
        let url = self.values_url(document_id, &format!("{}:clear", quote_tab(tab)));
        let _: Value = self
            .send(self.client.post(url).json(&json!({})), "values clear")
            .await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        document_id: &str,
        tab: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), SheetsError> {
        let mut url = self.values_url(document_id, &format!("{}:append", quote_tab(tab)));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = json!({ "majorDimension": "ROWS", "values": rows });
        let _: Value = self
            .send(self.client.post(url).json(&body), "values append")
            .await?;
        Ok(())
    }
}

fn parse_base(base_url: &str) -> Result<Url, SheetsError> {
    let url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| SheetsError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(SheetsError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: "URL cannot be a base".to_string(),
        });
    }
    Ok(url)
}

/// A1 sheet reference: `'Tab name'`, with embedded quotes doubled.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

fn row_range(tab: &str, row: u32) -> String {
    format!("{}!{row}:{row}", quote_tab(tab))
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
