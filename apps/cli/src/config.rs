pub const DEFAULT_DB_PATH: &str = "./db/tallyfolio.db";
pub const DEFAULT_USER_ID: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: String,
    pub user_id: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `TF_*` variables, loading a `.env` file first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match non_empty("TF_LOG_FORMAT") {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            db_path: non_empty("TF_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into()),
            user_id: non_empty("TF_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.into()),
            log_format,
        }
    }
}
