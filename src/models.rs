use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Column labels of the rating table, in the order the source page lists them.
pub const COLUMN_LABELS: [&str; 5] = ["номер", "согласие", "приоритет", "баллы", "статус"];

/// Extra header appended after the rating columns in the Excel export.
pub const DATE_COLUMN_LABEL: &str = "Дата обновления";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub source_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            source_url: "https://cpk.msu.ru/rating/dep_02".to_string(),
            request_timeout: Duration::from_secs(10),
            // The admissions site rejects default automation User-Agents.
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

/// One scrape of the rating page: the publication date from the page prose
/// plus the extracted applicant rows. Lives for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub date: String,
    /// Each row has exactly 5 fields, ordered as in [`COLUMN_LABELS`].
    pub rows: Vec<Vec<String>>,
}
