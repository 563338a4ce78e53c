use chrono::{Local, TimeZone};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weekcap::config::Config;
use weekcap::engine::{Filter, FilterError};
use weekcap::model::{FilterRequest, FilterResponse, Listing};
use weekcap::source::MemoryBookings;

/// Reads a filter request (JSON) from the file named by the first argument,
/// or from stdin, and writes `{"data": [...visible listings]}` to stdout.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    weekcap::observability::init(config.metrics_port)?;

    info!("weekcap filtering");
    info!(
        "  calendar: {}",
        config.calendar.map_or("local".to_string(), |tz| tz.to_string())
    );
    info!("  exclude_end: {}", config.exclude_end);
    info!(
        "  fetch_timeout: {}",
        config
            .fetch_timeout
            .map_or("none".to_string(), |d| format!("{}ms", d.as_millis()))
    );

    let input = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let request: FilterRequest = serde_json::from_str(&input)?;
    info!("  listings: {}", request.listings.len());

    let source = MemoryBookings::from(request.bookings);
    let data = match config.calendar {
        Some(tz) => run(&config, source, tz, &request.query, request.listings).await?,
        None => run(&config, source, Local, &request.query, request.listings).await?,
    };

    let mut out = serde_json::to_vec_pretty(&FilterResponse { data })?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}

async fn run<Tz: TimeZone>(
    config: &Config,
    source: MemoryBookings,
    calendar: Tz,
    query: &weekcap::model::DateQuery,
    listings: Vec<Listing>,
) -> Result<Vec<Listing>, FilterError> {
    Filter::new(source, calendar)
        .with_exclude_end(config.exclude_end)
        .with_fetch_timeout(config.fetch_timeout)
        .apply(query, listings)
        .await
}
