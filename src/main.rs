#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use rocket::State;
use soliscloud_rs::api::{self, HttpTransport};
use soliscloud_rs::coordinator::Coordinator;
use soliscloud_rs::{settings, Error};
use std::sync::Arc;

mod metrics;

/// Coordinator shared between the poll loop and API handlers.
type StateData = Arc<Coordinator<HttpTransport>>;

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, Error> {
    match state.data() {
        Some(data) => metrics::update(&data, state.is_stale()),
        None => {
            log::warn!("no data fetched yet; returning registry as is");
            metrics::set_stale(true);
        }
    }
    metrics::read()
}

#[get("/records")]
async fn records_route(state: &State<StateData>) -> Result<String, Error> {
    let data = state.data().unwrap_or_default();
    serde_json::to_string_pretty(data.as_ref()).or(Err(Error::FormatError))
}

async fn run() -> Result<(), Error> {
    let settings = settings::read_settings()?;
    let credentials = settings.credentials();

    log::info!("Setting up {}", credentials.title());
    log::debug!("{:?}", credentials);

    let client = api::api(settings.api_url.to_owned(), credentials)?;
    let coordinator = Arc::new(Coordinator::new(client, settings.interval()));

    coordinator.first_refresh().await?;
    tokio::spawn(Arc::clone(&coordinator).run());

    rocket::build()
        .manage(coordinator)
        .mount("/", routes![metrics_route, records_route])
        .launch()
        .await
        .map(|_| ())
        .map_err(|e| {
            let reason = e.to_string();
            log::error!("Exporter failed: {}", reason);
            Error::InternalError
        })
}

#[rocket::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
