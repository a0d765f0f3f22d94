use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
const DEFAULT_SHEET_NAME: &str = "Пользователи бота";
const DEFAULT_RESPONSES_SHEET_NAME: &str = "Ответы пользователей";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("unknown storage backend '{0}', expected sheets, postgres or memory")]
    UnknownBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sheets,
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sheets" | "google" => Ok(StorageBackend::Sheets),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsSettings {
    pub credentials_file: PathBuf,
    pub spreadsheet_name: String,
    pub spreadsheet_id: Option<String>,
    pub responses_sheet_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub backend: StorageBackend,
    pub sheets: SheetsSettings,
    pub database_url: Option<String>,
    pub lessons_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Пустая переменная в .env равносильна отсутствующей
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::Sheets,
        };

        let database_url = var("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Config {
            bot_token,
            backend,
            sheets: SheetsSettings {
                credentials_file: var("GOOGLE_CREDENTIALS_FILE")
                    .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
                    .into(),
                spreadsheet_name: var("GOOGLE_SHEET_NAME")
                    .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                spreadsheet_id: var("GOOGLE_SPREADSHEET_ID"),
                responses_sheet_name: var("GOOGLE_RESPONSES_SHEET_NAME")
                    .unwrap_or_else(|| DEFAULT_RESPONSES_SHEET_NAME.to_string()),
            },
            database_url,
            lessons_file: var("LESSONS_FILE").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_token_is_fatal() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing("BOT_TOKEN"))));
        assert!(matches!(config(&[("BOT_TOKEN", " ")]), Err(ConfigError::Missing("BOT_TOKEN"))));
    }

    #[test]
    fn defaults_match_the_sheets_setup() {
        let cfg = config(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(cfg.backend, StorageBackend::Sheets);
        assert_eq!(cfg.sheets.credentials_file, PathBuf::from("credentials.json"));
        assert_eq!(cfg.sheets.spreadsheet_name, "Пользователи бота");
        assert_eq!(cfg.sheets.responses_sheet_name, "Ответы пользователей");
        assert!(cfg.sheets.spreadsheet_id.is_none());
        assert!(cfg.lessons_file.is_none());
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("STORAGE_BACKEND", "postgres")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));

        let cfg = config(&[
            ("BOT_TOKEN", "t"),
            ("STORAGE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/course"),
        ])
        .unwrap();
        assert_eq!(cfg.backend, StorageBackend::Postgres);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(
            config(&[("BOT_TOKEN", "t"), ("STORAGE_BACKEND", "excel")]),
            Err(ConfigError::UnknownBackend(ref name)) if name == "excel"
        ));
    }
}
