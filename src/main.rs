use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warp::Filter;

use flight_gateway::{
    config::Settings,
    handlers::routes,
    services::AmadeusClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.bind_address()))?;

    let amadeus = AmadeusClient::new(&settings.amadeus).context("failed to build HTTP client")?;
    let state = AppState::new(Arc::new(amadeus))
        .with_city_resolution(settings.amadeus.resolve_city_codes);

    let routes = routes(state).with(warp::trace::request());

    tracing::info!("Flight gateway running on http://{}", addr);
    warp::serve(routes).run(addr).await;

    Ok(())
}
