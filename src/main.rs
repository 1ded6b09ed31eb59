use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod models;
mod services;
mod utils;

use api::yahoo::YahooClient;
use services::{align_service, chart_service, currency_service, fetch_service};
use utils::errors::PipelineError;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pbrchart=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> Result<(), PipelineError> {
    let today = chrono::Utc::now().date_naive();
    let (start, end) = cli.date_range(today)?;
    let manual_events = cli.manual_events()?;

    let client = match std::env::var("PBRCHART_BASE_URL") {
        Ok(base_url) => YahooClient::with_base_url(base_url),
        Err(_) => YahooClient::new(),
    };

    info!("Fetching {} from {} to {}...", cli.ticker, start, end);
    let fetched = fetch_service::fetch_series(
        &client,
        &cli.ticker,
        start,
        end,
        !cli.no_provider_events,
    )
    .await?;

    let pbrs = fetch_service::pbr_series(&fetched.prices, fetched.info.book_value_per_share);

    let rates =
        currency_service::fetch_fx_series(&client, &fetched.info.native_currency, start, end)
            .await?;
    let prices = currency_service::normalize_to_usd(&fetched.prices, &rates)?;
    if !fetched.info.native_currency.is_usd() {
        info!("Converted prices {} -> USD", fetched.info.native_currency);
    }

    let mut events = fetched.events;
    events.extend(manual_events);

    let mut rows = align_service::align(&prices, &pbrs, &events);
    if cli.interpolate {
        rows = align_service::interpolate_gaps(rows);
    }
    if rows.is_empty() {
        warn!("No data points between {} and {}", start, end);
    }

    let options = chart_service::RenderOptions {
        title: format!(
            "{} ({}) Price & PBR (USD)",
            fetched.info.display_name, fetched.info.symbol
        ),
        width: cli.width,
        height: cli.height,
    };
    chart_service::render(&rows, &options, &cli.out)?;
    info!("Chart written to {}", cli.out.display());

    Ok(())
}
