use reqwest::{Method, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::auth::TokenSource;
use crate::storage::StoreError;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

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
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    range: &'a str,
    values: Vec<&'a [String]>,
}

/// Тонкая обёртка над REST API Google Sheets и Drive.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: TokenSource,
    sheets_base: String,
    drive_base: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, auth: TokenSource) -> Self {
        Self::with_endpoints(http, auth, SHEETS_API_BASE, DRIVE_API_BASE)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        auth: TokenSource,
        sheets_base: &str,
        drive_base: &str,
    ) -> Self {
        Self {
            http,
            auth,
            sheets_base: sheets_base.trim_end_matches('/').to_string(),
            drive_base: drive_base.trim_end_matches('/').to_string(),
        }
    }

    /// Поиск таблицы по названию через Drive API.
    pub async fn find_spreadsheet_id(&self, name: &str) -> Result<String, StoreError> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let url = build_url(&self.drive_base, &["files"])?;
        let response = self
            .request(Method::GET, url)
            .await?
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .await?;

        let list: FileList = check(response).await?.json().await?;
        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| StoreError::SpreadsheetNotFound(name.to_string()))
    }

    pub async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, StoreError> {
        let url = build_url(&self.sheets_base, &["spreadsheets", spreadsheet_id])?;
        let response = self
            .request(Method::GET, url)
            .await?
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let meta: SpreadsheetMeta = check(response).await?.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    pub async fn add_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        columns: u32,
    ) -> Result<(), StoreError> {
        let batch = format!("{}:batchUpdate", spreadsheet_id);
        let url = build_url(&self.sheets_base, &["spreadsheets", &batch])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": columns }
                    }
                }
            }]
        });

        let response = self.request(Method::POST, url).await?.json(&body).send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = build_url(&self.sheets_base, &["spreadsheets", spreadsheet_id, "values", range])?;
        let response = self.request(Method::GET, url).await?.send().await?;

        let values: ValueRange = check(response).await?.json().await?;
        Ok(values.values)
    }

    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<(), StoreError> {
        let append = format!("{}:append", range);
        let url = build_url(&self.sheets_base, &["spreadsheets", spreadsheet_id, "values", &append])?;
        let body = ValueRangeBody { range, values: vec![row] };

        let response = self
            .request(Method::POST, url)
            .await?
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<(), StoreError> {
        let url = build_url(&self.sheets_base, &["spreadsheets", spreadsheet_id, "values", range])?;
        let body = ValueRangeBody { range, values: vec![row] };

        let response = self
            .request(Method::PUT, url)
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn request(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder, StoreError> {
        let token = self.auth.access_token(&self.http).await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

/// A1-диапазон с экранированным названием листа.
pub fn a1_range(sheet: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet.replace('\'', "''"));
    match cells {
        Some(cells) => format!("{}!{}", quoted, cells),
        None => quoted,
    }
}

fn build_url(base: &str, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = Url::parse(base)
        .map_err(|e| StoreError::Auth(format!("invalid API base {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Auth(format!("API base {} cannot have a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_range_quotes_sheet_titles() {
        assert_eq!(a1_range("Ответы", None), "'Ответы'");
        assert_eq!(a1_range("Irina's", Some("A2:G2")), "'Irina''s'!A2:G2");
    }

    #[test]
    fn build_url_encodes_segments() {
        let url = build_url("https://sheets.googleapis.com/v4", &["spreadsheets", "abc", "values", "'My sheet'!A1:G1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'My%20sheet'!A1:G1"
        );

        let local = build_url("http://127.0.0.1:8080", &["files"]).unwrap();
        assert_eq!(local.as_str(), "http://127.0.0.1:8080/files");
    }
}
