use anyhow::{Context, Result};
use std::sync::Arc;

use hod_client::auth::{Authenticator, ClientCredentials, UserCredentials};
use hod_client::client::{HodApiClient, RiverStationParam, UswgStationParam};
use hod_client::config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::load()?;

    // Initialize logging with the configured level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!("Connecting to {}", config.api_url);

    let authenticator = if config.uses_authorization_code() {
        Authenticator::authorization_code(
            &config.oauth_url,
            UserCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                username: config.username.clone().unwrap_or_default(),
                password: config.password.clone().unwrap_or_default(),
                redirect_uri: config.redirect_uri.clone().unwrap_or_default(),
            },
        )?
    } else {
        Authenticator::client_credentials(
            &config.oauth_url,
            ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
        )?
    };
    let authenticator = Arc::new(authenticator);

    // Verify authentication up front
    let token = authenticator
        .get_access_token(false)
        .await
        .context("Authentication failed")?;
    tracing::info!(
        "Authenticated, token valid for {} seconds",
        token.expires_in
    );

    let api = HodApiClient::new(&config.api_url, authenticator)?;

    // County codes
    let counties = api.counties().await?;
    println!("{}", serde_json::to_string_pretty(&counties)?);

    // Town codes
    let towns = api.towns().await?;
    println!("{}", serde_json::to_string_pretty(&towns)?);

    // River-basin codes
    let basins = api.river_basins().await?;
    println!("{}", serde_json::to_string_pretty(&basins)?);

    // River stations by basin code
    let stations = api
        .river_stations(RiverStationParam::BasinCode, "165000")
        .await?;
    println!("{}", serde_json::to_string_pretty(&stations)?);

    // River stations within 5 km of a point
    let stations = api
        .river_stations_within(23.003868, 120.226729, 5000.0)
        .await?;
    println!("{}", serde_json::to_string_pretty(&stations)?);

    // Urban flood sensors by county name
    let sensors = api
        .uswg_stations(UswgStationParam::CountyName, "Tainan")
        .await?;
    println!("{}", serde_json::to_string_pretty(&sensors)?);

    // Urban flood sensors within 5 km of a point
    let sensors = api
        .uswg_stations_within(23.003868, 120.226729, 5000.0)
        .await?;
    println!("{}", serde_json::to_string_pretty(&sensors)?);

    Ok(())
}
