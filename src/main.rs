/// Report the current market window as JSON
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use market_hours::{
    config::{calendar_from_config, load_config},
    Config, MarketHours, SystemClock,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("market_hours={},warn", config.log_level)));

    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&config_path).exists() {
        load_config(&config_path)?
    } else {
        Config::default()
    };

    init_logging(&config);
    info!("Evaluating {} session ({})", config.exchange, config.timezone);

    let provider = calendar_from_config(&config)?;
    let hours = MarketHours::with_offsets(
        provider.as_ref(),
        &SystemClock,
        config.tz()?,
        config.offsets()?,
    )
    .map_err(|e| {
        error!("Failed to build market hours: {} ({})", e, e.error_code());
        e
    })?;

    info!(
        "{} is {} at {}",
        config.exchange,
        hours.current_window().as_str(),
        hours.evaluated_at()
    );

    println!("{}", serde_json::to_string_pretty(&hours.snapshot())?);

    Ok(())
}
