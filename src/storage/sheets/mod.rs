//! Хранилище на Google Sheets.
//!
//! Первый лист таблицы содержит прогресс пользователей, отдельный лист с
//! заданным названием содержит журнал ответов. Поиск пользователя идёт
//! линейным просмотром всех строк по колонке `user_id`.

pub mod auth;
pub mod client;
pub mod rows;

use async_trait::async_trait;

use self::auth::{ServiceAccountAuth, TokenSource};
use self::client::{a1_range, SheetsClient};
use super::{ProgressStore, ResponseLog, StoreError, RESPONSES_HEADER, USERS_HEADER};
use crate::config::SheetsSettings;
use crate::models::{ResponseRecord, UserProgress};

const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLUMNS: u32 = 20;

pub struct SheetsStore {
    client: SheetsClient,
    spreadsheet_id: String,
    users_sheet: String,
    responses_sheet: String,
}

impl SheetsStore {
    pub async fn connect(settings: &SheetsSettings) -> Result<Self, StoreError> {
        let auth = ServiceAccountAuth::from_file(&settings.credentials_file).await?;
        let client = SheetsClient::new(reqwest::Client::new(), TokenSource::ServiceAccount(auth));
        Self::open(client, settings).await
    }

    /// Открывает таблицу, создаёт недостающий лист ответов и проверяет
    /// строки заголовков обоих листов.
    pub async fn open(client: SheetsClient, settings: &SheetsSettings) -> Result<Self, StoreError> {
        let spreadsheet_id = match &settings.spreadsheet_id {
            Some(id) => id.clone(),
            None => client.find_spreadsheet_id(&settings.spreadsheet_name).await?,
        };

        let titles = client.sheet_titles(&spreadsheet_id).await?;
        let users_sheet = titles
            .first()
            .cloned()
            .ok_or_else(|| StoreError::SpreadsheetNotFound(settings.spreadsheet_name.clone()))?;
        log::info!("✅ Google Sheets (users) connected: '{}'", users_sheet);

        let responses_sheet = settings.responses_sheet_name.clone();
        if !titles.contains(&responses_sheet) {
            client
                .add_sheet(&spreadsheet_id, &responses_sheet, NEW_SHEET_ROWS, NEW_SHEET_COLUMNS)
                .await?;
            log::info!("➕ Created responses sheet '{}'", responses_sheet);
        }
        log::info!("✅ Google Sheets (responses) connected: '{}'", responses_sheet);

        let store = Self {
            client,
            spreadsheet_id,
            users_sheet,
            responses_sheet,
        };
        store.ensure_header(&store.users_sheet, &USERS_HEADER).await?;
        store.ensure_header(&store.responses_sheet, &RESPONSES_HEADER).await?;

        Ok(store)
    }

    async fn ensure_header(&self, sheet: &str, header: &[&str]) -> Result<(), StoreError> {
        let range = a1_range(sheet, Some("A1:G1"));
        let values = self.client.get_values(&self.spreadsheet_id, &range).await?;

        match values.first() {
            None => {
                let row: Vec<String> = header.iter().map(|h| h.to_string()).collect();
                self.client
                    .append_row(&self.spreadsheet_id, &a1_range(sheet, Some("A1")), &row)
                    .await?;
                log::info!("📋 Header row written to '{}'", sheet);
                Ok(())
            }
            Some(found) if rows::header_matches(found, header) => Ok(()),
            Some(found) => Err(StoreError::Schema {
                sheet: sheet.to_string(),
                found: found.clone(),
            }),
        }
    }

    /// Номер строки листа (с 1) и сама строка для пользователя. Пробелы
    /// вокруг `user_id` не учитываются, как и при разборе строки.
    async fn find_user_row(&self, user_id: &str) -> Result<Option<(usize, Vec<String>)>, StoreError> {
        let values = self
            .client
            .get_values(&self.spreadsheet_id, &a1_range(&self.users_sheet, None))
            .await?;

        Ok(values
            .into_iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.first().map(|cell| cell.trim()) == Some(user_id))
            .map(|(idx, row)| (idx + 1, row)))
    }
}

#[async_trait]
impl ProgressStore for SheetsStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        match self.find_user_row(user_id).await? {
            Some((_, row)) => rows::progress_from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn put(&self, progress: &UserProgress) -> Result<(), StoreError> {
        let row = rows::progress_to_row(progress);

        match self.find_user_row(&progress.user_id).await? {
            Some((row_number, _)) => {
                let cells = format!("A{}:G{}", row_number, row_number);
                self.client
                    .update_row(&self.spreadsheet_id, &a1_range(&self.users_sheet, Some(&cells)), &row)
                    .await?;
            }
            None => {
                self.client
                    .append_row(&self.spreadsheet_id, &a1_range(&self.users_sheet, Some("A1")), &row)
                    .await?;
            }
        }

        log::debug!("💾 Progress saved for user {}", progress.user_id);
        Ok(())
    }
}

#[async_trait]
impl ResponseLog for SheetsStore {
    async fn append(&self, record: &ResponseRecord) -> Result<(), StoreError> {
        let row = rows::response_to_row(record);
        self.client
            .append_row(&self.spreadsheet_id, &a1_range(&self.responses_sheet, Some("A1")), &row)
            .await?;

        log::info!(
            "✅ Response from user {} for lesson {} saved",
            record.user_id,
            record.lesson_index
        );
        Ok(())
    }
}
