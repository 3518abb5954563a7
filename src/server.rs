use crate::excel;
use crate::scraper::{RatingScraper, ScrapeError};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rust_xlsxwriter::XlsxError;
use std::sync::Arc;
use tracing::{error, info};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const ATTACHMENT_FILENAME: &str = "PMI_Rating.xlsx";

/// Application state shared across handlers.
pub struct AppState {
    pub scraper: RatingScraper,
}

/// Build the router with both endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/download-pmi-excel", get(download_excel_handler))
        .with_state(state)
}

/// Any stage failure surfaces to the client as the same generic 500 page;
/// the distinction only shows up in the server-side log.
#[derive(Debug)]
enum AppError {
    Scrape(ScrapeError),
    Excel(XlsxError),
}

impl From<ScrapeError> for AppError {
    fn from(error: ScrapeError) -> Self {
        AppError::Scrape(error)
    }
}

impl From<XlsxError> for AppError {
    fn from(error: XlsxError) -> Self {
        AppError::Excel(error)
    }
}

impl AppError {
    fn message(&self) -> String {
        match self {
            AppError::Scrape(error) => error.to_string(),
            AppError::Excel(_) => "Не удалось сформировать Excel-файл".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Scrape(e) => error!(error = ?e, "rating export failed"),
            AppError::Excel(e) => error!(error = ?e, "workbook build failed"),
        }

        let body = format!(
            "<h1>Ошибка сервера</h1>\n\
             <p>{}</p>\n\
             <p>Попробуйте позже или обратитесь к администратору</p>",
            self.message()
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Рейтинг ПМИ МГУ</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 40px auto; }
    h1 { color: #1a3d6d; }
    .btn {
      display: inline-block;
      padding: 15px 30px;
      background: #1a3d6d;
      color: white;
      text-decoration: none;
      border-radius: 5px;
      font-size: 18px;
      margin: 20px 0;
    }
    .btn:hover { background: #0d2a4d; }
  </style>
</head>
<body>
  <h1>Рейтинг поступающих на ПМИ МГУ</h1>
  <p>Сервер автоматически получает данные с официального сайта МГУ и формирует Excel-файл</p>
  <a href="/download-pmi-excel" class="btn">Скачать Excel-файл</a>
  <p><small>При проблемах со скачиванием обновите страницу или попробуйте позже</small></p>
</body>
</html>
"#;

/// Handler for `GET /`: a static instructional page with the download link.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler for `GET /download-pmi-excel`: scrape the rating page and return
/// it as an xlsx attachment built entirely in memory.
async fn download_excel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let snapshot = state.scraper.fetch_snapshot().await?;
    let buffer = excel::build_workbook(&snapshot)?;

    info!(
        rows = snapshot.rows.len(),
        bytes = buffer.len(),
        "rating exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ATTACHMENT_FILENAME),
            ),
        ],
        buffer,
    )
        .into_response())
}
