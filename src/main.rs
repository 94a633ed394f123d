use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use tripscout::api::AppState;
use tripscout::{AmadeusClient, Aggregator, TripScoutConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = TripScoutConfig::config_path_from_args(std::env::args().skip(1));
    let config = TripScoutConfig::load_from_path(config_path)?;
    telemetry::init(&config.logging)?;

    if config.amadeus.api_key.is_none() || config.amadeus.api_secret.is_none() {
        warn!("Amadeus credentials are not configured, every pricing call will come back empty");
    }

    let client = Arc::new(AmadeusClient::new(&config.amadeus)?);
    let aggregator = Aggregator::from_client(client, &config);
    let state = AppState::new(aggregator, config.server.aggregation_timeout());

    info!(
        "Starting tripscout {} against {}",
        tripscout::VERSION,
        config.amadeus.base_url
    );
    web::run(&config.server, state).await
}
