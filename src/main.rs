mod excel;
mod models;
mod scraper;
mod server;

use crate::models::Config;
use crate::scraper::RatingScraper;
use crate::server::AppState;
use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let matches = Command::new("pmi-rating")
        .version("1.0")
        .about("Exports the MSU PMI admission rating as an Excel file")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .env("PORT")
                .help("Port to listen on")
                .default_value("3000"),
        )
        .get_matches();

    let port: u16 = matches
        .get_one::<String>("port")
        .unwrap()
        .parse()
        .context("port must be a number between 1 and 65535")?;

    let config = Config {
        port,
        ..Config::default()
    };

    let state = Arc::new(AppState {
        scraper: RatingScraper::new(config.clone()),
    });
    let app = server::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    info!("listening on http://{}", addr);
    println!("🚀 Сервер запущен на порту {}", config.port);
    println!("🌐 Откройте в браузере: http://localhost:{}", config.port);
    println!(
        "📥 Ссылка для скачивания: http://localhost:{}/download-pmi-excel",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
