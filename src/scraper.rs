use crate::models::{Config, RankingSnapshot};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

// Positional layout of the live rating page. None of these come from a
// documented schema: they mirror where the date paragraph, the rating table
// and the per-applicant text blocks currently sit, and a reshuffle on the
// MSU side shifts them silently.

/// 0-indexed position of the `<p>` element holding the publication date.
pub const DATE_PARAGRAPH_INDEX: usize = 15;
/// 0-indexed position of the `<table>` element holding the rating.
pub const RATING_TABLE_INDEX: usize = 8;
/// Flattened tokens taken up by the table header before the first block.
pub const PREAMBLE_TOKENS: usize = 16;
/// Flattened tokens per applicant block.
pub const BLOCK_TOKENS: usize = 19;
/// Offsets inside a block for номер, согласие, приоритет, баллы, статус.
pub const FIELD_OFFSETS: [usize; 5] = [1, 2, 3, 7, 16];

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The outbound request failed: timeout, unreachable host, body read
    /// failure or a non-success status from the source.
    #[error("Не удалось получить данные с сайта МГУ")]
    Fetch(#[source] reqwest::Error),
    /// Extraction broke internally. The positional lookups themselves never
    /// fail — a moved paragraph or table just produces empty data.
    #[error("Не удалось разобрать страницу рейтинга")]
    Extraction(String),
}

pub struct RatingScraper {
    client: reqwest::Client,
    config: Config,
}

impl RatingScraper {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the rating page and extract one [`RankingSnapshot`] from it.
    pub async fn fetch_snapshot(&self) -> Result<RankingSnapshot, ScrapeError> {
        let response = self
            .client
            .get(&self.config.source_url)
            .timeout(self.config.request_timeout)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(ScrapeError::Fetch)?
            .error_for_status()
            .map_err(ScrapeError::Fetch)?;

        let body = response.text().await.map_err(ScrapeError::Fetch)?;
        extract_snapshot(&body)
    }
}

/// Extract the publication date and the applicant rows from the page HTML.
pub fn extract_snapshot(html: &str) -> Result<RankingSnapshot, ScrapeError> {
    let document = Html::parse_document(html);

    let date = find_publication_date(&document)?;
    let tokens = find_rating_table_tokens(&document)?;
    let rows = collect_rows(&tokens);
    debug!(tokens = tokens.len(), rows = rows.len(), "extracted rating table");

    Ok(RankingSnapshot { date, rows })
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Extraction(e.to_string()))
}

/// The date lives in the page prose, not the table. A missing paragraph
/// yields an empty string, not an error.
fn find_publication_date(document: &Html) -> Result<String, ScrapeError> {
    let paragraphs = selector("p")?;

    Ok(document
        .select(&paragraphs)
        .nth(DATE_PARAGRAPH_INDEX)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default())
}

/// Flatten the rating table's text into trimmed, non-empty tokens.
/// A missing table yields an empty token list.
fn find_rating_table_tokens(document: &Html) -> Result<Vec<String>, ScrapeError> {
    let tables = selector("table")?;

    let Some(table) = document.select(&tables).nth(RATING_TABLE_INDEX) else {
        return Ok(Vec::new());
    };

    let flattened = table.text().collect::<String>();
    Ok(flattened
        .split('\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect())
}

/// Re-group the flat token sequence into 19-token applicant blocks and pull
/// the 5 row fields out of each. A trailing partial block is dropped.
fn collect_rows(tokens: &[String]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    let mut start = PREAMBLE_TOKENS;
    while start + BLOCK_TOKENS <= tokens.len() {
        let block = &tokens[start..start + BLOCK_TOKENS];
        rows.push(
            FIELD_OFFSETS
                .iter()
                .map(|&offset| block[offset].clone())
                .collect(),
        );
        start += BLOCK_TOKENS;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Build a page with `paragraph_count` paragraphs and `table_count`
    /// tables, where the table at position 8 (if present) flattens to
    /// exactly `tokens`, one per line.
    fn rating_page(paragraph_count: usize, table_count: usize, tokens: &[String]) -> String {
        let mut html = String::from("<html><body>\n");

        for i in 0..paragraph_count {
            html.push_str(&format!("<p> параграф {} </p>\n", i));
        }

        for position in 0..table_count {
            if position == RATING_TABLE_INDEX {
                html.push_str("<table>");
                for token in tokens {
                    html.push_str("<tr><td>\n");
                    html.push_str(token);
                    html.push_str("\n</td></tr>");
                }
                html.push_str("</table>\n");
            } else {
                html.push_str("<table><tr><td>декорация</td></tr></table>\n");
            }
        }

        html.push_str("</body></html>\n");
        html
    }

    fn numbered_tokens(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("t{}", i)).collect()
    }

    #[test]
    fn date_is_the_sixteenth_paragraph() {
        let page = rating_page(16, 9, &numbered_tokens(54));
        let snapshot = extract_snapshot(&page).unwrap();
        assert_eq!(snapshot.date, "параграф 15");
    }

    #[test]
    fn missing_date_paragraph_yields_empty_date() {
        let page = rating_page(10, 9, &numbered_tokens(54));
        let snapshot = extract_snapshot(&page).unwrap();
        assert_eq!(snapshot.date, "");
    }

    #[test]
    fn missing_rating_table_yields_zero_rows() {
        let page = rating_page(16, 3, &numbered_tokens(54));
        let snapshot = extract_snapshot(&page).unwrap();
        assert!(snapshot.rows.is_empty());
    }

    #[test]
    fn two_full_blocks_yield_two_rows_from_fixed_offsets() {
        // 16 preamble tokens + two 19-token blocks.
        let page = rating_page(16, 9, &numbered_tokens(54));
        let snapshot = extract_snapshot(&page).unwrap();

        assert_eq!(snapshot.rows.len(), 2);
        // Block one starts at token 16, block two at token 35.
        assert_eq!(snapshot.rows[0], vec!["t17", "t18", "t19", "t23", "t32"]);
        assert_eq!(snapshot.rows[1], vec!["t36", "t37", "t38", "t42", "t51"]);
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        // 16 + 19 + 5: one full block plus a 5-token remainder.
        let page = rating_page(16, 9, &numbered_tokens(40));
        let snapshot = extract_snapshot(&page).unwrap();
        assert_eq!(snapshot.rows.len(), 1);
    }

    #[test]
    fn table_shorter_than_one_block_yields_zero_rows() {
        // 34 tokens: preamble plus an 18-token remainder, no full block.
        let page = rating_page(16, 9, &numbered_tokens(34));
        let snapshot = extract_snapshot(&page).unwrap();
        assert!(snapshot.rows.is_empty());
    }

    #[test]
    fn row_count_follows_the_block_formula() {
        for (token_count, expected_rows) in [(0, 0), (16, 0), (35, 1), (53, 1), (54, 2), (92, 4)] {
            let page = rating_page(16, 9, &numbered_tokens(token_count));
            let snapshot = extract_snapshot(&page).unwrap();
            assert_eq!(
                snapshot.rows.len(),
                expected_rows,
                "{} tokens should give {} rows",
                token_count,
                expected_rows
            );
        }
    }

    fn test_config(server: &MockServer) -> Config {
        Config {
            source_url: format!("{}/rating/dep_02", server.uri()),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn fetch_snapshot_extracts_the_mocked_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rating/dep_02"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(rating_page(16, 9, &numbered_tokens(54))),
            )
            .mount(&server)
            .await;

        let scraper = RatingScraper::new(test_config(&server));
        let snapshot = scraper.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.date, "параграф 15");
        assert_eq!(snapshot.rows.len(), 2);
    }

    #[tokio::test]
    async fn fetch_snapshot_maps_server_errors_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rating/dep_02"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scraper = RatingScraper::new(test_config(&server));
        let error = scraper.fetch_snapshot().await.unwrap_err();

        assert!(matches!(error, ScrapeError::Fetch(_)));
        assert_eq!(error.to_string(), "Не удалось получить данные с сайта МГУ");
    }

    #[tokio::test]
    async fn fetch_snapshot_maps_timeouts_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rating/dep_02"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = Config {
            request_timeout: Duration::from_millis(100),
            ..test_config(&server)
        };
        let scraper = RatingScraper::new(config);
        let error = scraper.fetch_snapshot().await.unwrap_err();

        assert!(matches!(error, ScrapeError::Fetch(_)));
    }
}
