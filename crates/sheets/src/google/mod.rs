//! Remote copy of the interaction log in a Google spreadsheet.

pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use hilight_core::config::SheetsConfig;
use hilight_core::{CellValue, LogSheet};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::sink::{header_row, RowSink, SinkError, SinkOutcome};
use auth::{fetch_access_token, AccessToken, ServiceAccountKey};

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLUMNS: u32 = 20;

pub struct GoogleSheetsSink {
    client: Client,
    config: SheetsConfig,
}

#[derive(Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct SpreadsheetSheets {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheetsSink {
    pub fn new(config: &SheetsConfig) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, config: config.clone() })
    }

    pub fn spreadsheet_name(&self) -> &str {
        &self.config.spreadsheet_name
    }

    async fn append(
        &self,
        key: &ServiceAccountKey,
        sheet: LogSheet,
        row: &[CellValue],
    ) -> Result<(), SinkError> {
        let token = fetch_access_token(&self.client, key).await?;
        let spreadsheet_id = self.open_or_create_spreadsheet(&token).await?;
        let title = sheet.title();

        if !self.sheet_titles(&token, &spreadsheet_id).await?.iter().any(|name| name == title) {
            self.add_sheet(&token, &spreadsheet_id, title).await?;
            tracing::info!(
                event_name = "sheets.worksheet_created",
                spreadsheet = %self.config.spreadsheet_name,
                worksheet = title,
                "created missing worksheet"
            );
        }

        if self.sheet_is_empty(&token, &spreadsheet_id, title).await? {
            self.append_values(&token, &spreadsheet_id, title, &header_row(sheet)).await?;
        }
        self.append_values(&token, &spreadsheet_id, title, row).await
    }

    async fn open_or_create_spreadsheet(&self, token: &AccessToken) -> Result<String, SinkError> {
        let mut url = endpoint(&self.config.drive_api_base, &["drive", "v3", "files"])?;
        url.query_pairs_mut()
            .append_pair("q", &drive_query(&self.config.spreadsheet_name))
            .append_pair("fields", "files(id)")
            .append_pair("pageSize", "1");
        let response = self.client.get(url).bearer_auth(token.expose()).send().await?;
        let listing: DriveFileList = ensure_success(response).await?.json().await?;
        if let Some(file) = listing.files.into_iter().next() {
            return Ok(file.id);
        }

        let url = endpoint(&self.config.sheets_api_base, &["v4", "spreadsheets"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose())
            .json(&json!({ "properties": { "title": self.config.spreadsheet_name } }))
            .send()
            .await?;
        let created: CreatedSpreadsheet = ensure_success(response).await?.json().await?;
        tracing::info!(
            event_name = "sheets.spreadsheet_created",
            spreadsheet = %self.config.spreadsheet_name,
            "created spreadsheet"
        );
        Ok(created.spreadsheet_id)
    }

    async fn sheet_titles(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
    ) -> Result<Vec<String>, SinkError> {
        let mut url =
            endpoint(&self.config.sheets_api_base, &["v4", "spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");
        let response = self.client.get(url).bearer_auth(token.expose()).send().await?;
        let spreadsheet: SpreadsheetSheets = ensure_success(response).await?.json().await?;
        Ok(spreadsheet.sheets.into_iter().map(|entry| entry.properties.title).collect())
    }

    async fn add_sheet(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<(), SinkError> {
        let batch_segment = format!("{spreadsheet_id}:batchUpdate");
        let url = endpoint(&self.config.sheets_api_base, &["v4", "spreadsheets", &batch_segment])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLUMNS,
                        },
                    },
                },
            }],
        });
        let response = self.client.post(url).bearer_auth(token.expose()).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn sheet_is_empty(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<bool, SinkError> {
        let url = values_endpoint(&self.config.sheets_api_base, spreadsheet_id, &quoted(title))?;
        let response = self.client.get(url).bearer_auth(token.expose()).send().await?;
        let range: ValueRange = ensure_success(response).await?.json().await?;
        Ok(range.values.iter().all(|row| row.is_empty()))
    }

    async fn append_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        title: &str,
        row: &[CellValue],
    ) -> Result<(), SinkError> {
        let url = append_endpoint(&self.config.sheets_api_base, spreadsheet_id, title)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose())
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    fn name(&self) -> &'static str {
        "google_sheets"
    }

    async fn append_row(
        &self,
        sheet: LogSheet,
        row: &[CellValue],
    ) -> Result<SinkOutcome, SinkError> {
        if !self.config.enabled {
            return Ok(SinkOutcome::skipped("remote logging disabled"));
        }
        let Some(key) = ServiceAccountKey::read_optional(&self.config.credentials_path)? else {
            return Ok(SinkOutcome::skipped(format!(
                "credentials file `{}` not found",
                self.config.credentials_path.display()
            )));
        };

        self.append(&key, sheet, row).await?;
        Ok(SinkOutcome::Appended)
    }
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SinkError::Api { status: status.as_u16(), body })
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SinkError> {
    let mut url = Url::parse(base).map_err(|error| SinkError::Endpoint(format!("{base}: {error}")))?;
    url.path_segments_mut()
        .map_err(|()| SinkError::Endpoint(format!("{base}: cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn values_endpoint(base: &str, spreadsheet_id: &str, range: &str) -> Result<Url, SinkError> {
    endpoint(base, &["v4", "spreadsheets", spreadsheet_id, "values", range])
}

/// Cells are stored as sent. Text such as `=1+1` or `03-14` must not be
/// parsed into formulas or dates.
fn append_endpoint(base: &str, spreadsheet_id: &str, title: &str) -> Result<Url, SinkError> {
    let range = format!("{}!A1:append", quoted(title));
    let mut url = values_endpoint(base, spreadsheet_id, &range)?;
    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

/// A1-notation sheet reference; embedded quotes are doubled.
fn quoted(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hilight_core::config::SheetsConfig;
    use hilight_core::{CellValue, LogSheet};
    use tempfile::TempDir;

    use super::{append_endpoint, drive_query, endpoint, quoted, values_endpoint, GoogleSheetsSink};
    use crate::sink::{RowSink, SinkError, SinkOutcome};

    fn config(enabled: bool, credentials_path: PathBuf) -> SheetsConfig {
        SheetsConfig {
            enabled,
            credentials_path,
            spreadsheet_name: "Hilight_db".to_string(),
            sheets_api_base: "http://127.0.0.1:9".to_string(),
            drive_api_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn endpoint_joins_segments_onto_base() {
        let url = endpoint("https://sheets.googleapis.com/", &["v4", "spreadsheets"])
            .expect("valid base");
        assert_eq!(url.as_str(), "https://sheets.googleapis.com/v4/spreadsheets");
    }

    #[test]
    fn endpoint_rejects_unparseable_base() {
        assert!(matches!(endpoint("not a url", &["v4"]), Err(SinkError::Endpoint(_))));
    }

    #[test]
    fn values_endpoint_escapes_range() {
        let url = values_endpoint("https://sheets.googleapis.com", "abc", "'a b'!A1:append")
            .expect("valid base");
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'a%20b'!A1:append"
        );
    }

    #[test]
    fn append_stores_cells_raw() {
        let url = append_endpoint("https://sheets.googleapis.com", "abc", "it's")
            .expect("valid base");
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'it''s'!A1:append\
             ?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn sheet_titles_are_quoted_for_ranges() {
        assert_eq!(quoted("사용자_로그"), "'사용자_로그'");
        assert_eq!(quoted("it's"), "'it''s'");
    }

    #[test]
    fn drive_query_escapes_name() {
        assert_eq!(
            drive_query("Bob's"),
            "name = 'Bob\\'s' and mimeType = 'application/vnd.google-apps.spreadsheet' \
             and trashed = false"
        );
    }

    #[tokio::test]
    async fn disabled_sink_skips() {
        let sink = GoogleSheetsSink::new(&config(false, PathBuf::from("service_account.json")))
            .expect("client builds");

        let outcome = sink
            .append_row(LogSheet::UserActions, &[CellValue::text("v-1")])
            .await
            .expect("skip is not an error");
        assert!(matches!(outcome, SinkOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn missing_credentials_skip() {
        let dir = TempDir::new().expect("tempdir");
        let sink = GoogleSheetsSink::new(&config(true, dir.path().join("service_account.json")))
            .expect("client builds");

        let outcome = sink
            .append_row(LogSheet::ConsultationRequests, &[CellValue::text("v-1")])
            .await
            .expect("skip is not an error");
        assert!(matches!(outcome, SinkOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn unusable_key_fails_before_any_request() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("service_account.json");
        std::fs::write(&path, r#"{"client_email": "bot@example.iam", "private_key": "nope"}"#)
            .expect("write credentials");
        let sink = GoogleSheetsSink::new(&config(true, path)).expect("client builds");

        let result = sink.append_row(LogSheet::UserActions, &[CellValue::text("v-1")]).await;
        assert!(matches!(result, Err(SinkError::Signing(_))));
    }
}
