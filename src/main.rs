#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use rocket::State;
use smartmeter_ip_rs::api;
use smartmeter_ip_rs::api::endpoint::{
    DEFAULT_CONFIG_INTERVAL_SECONDS, DEFAULT_MEASUREMENTS_INTERVAL_SECONDS,
};
use smartmeter_ip_rs::coordinator::PollCoordinator;
use smartmeter_ip_rs::model;
use std::sync::Arc;

mod metrics;

#[derive(Clone, serde::Deserialize)]
pub struct SmartmeterConfig {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    measurements_interval: u64,
    config_interval: u64,
}

/// Structure containing state for API handlers: the two independent
/// coordinators of the configured meter.
pub struct StateData {
    measurements: Arc<PollCoordinator>,
    configuration: Arc<PollCoordinator>,
}

pub fn read_settings() -> SmartmeterConfig {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("SM"))
        .unwrap()
        .set_default(
            "measurements_interval",
            DEFAULT_MEASUREMENTS_INTERVAL_SECONDS as i64,
        )
        .unwrap()
        .set_default("config_interval", DEFAULT_CONFIG_INTERVAL_SECONDS as i64)
        .unwrap();

    settings.try_into().expect("Configuration error")
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, api::Error> {
    /* Pull-based read path: gauges reflect whatever the coordinators
     * hold at scrape time. */
    metrics::render(&state.measurements, &state.configuration);
    metrics::read().await
}

#[get("/configuration")]
async fn configuration_route(state: &State<StateData>) -> Result<String, api::Error> {
    match state.configuration.latest_snapshot() {
        Some(snapshot) => {
            serde_json::to_string_pretty(&snapshot).or(Err(api::Error::FormatError))
        }
        None => Err(api::Error::NoDataYet("configuration".to_string())),
    }
}

fn coordinator_or_exit(
    coordinator: Result<PollCoordinator, api::Error>,
) -> Arc<PollCoordinator> {
    match coordinator {
        Ok(coordinator) => Arc::new(coordinator),
        Err(e) => {
            log::error!("coordinator setup failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    env_logger::init();

    let settings = read_settings();
    let meter = model::meter(
        &settings.base_url,
        settings.username.clone(),
        settings.password.clone(),
    );

    if let Err(token) = api::validate(&meter).await {
        log::error!("meter validation failed: {}", token);
        std::process::exit(1);
    }

    let measurements = coordinator_or_exit(PollCoordinator::measurements(
        &meter,
        settings.measurements_interval,
    ));
    let configuration = coordinator_or_exit(PollCoordinator::configuration(
        &meter,
        settings.config_interval,
    ));

    /* First refresh is part of setup; a failure here is fatal rather
     * than a transient update-failed state. */
    if let Err(e) = measurements.refresh_now().await {
        log::error!("initial measurements refresh failed: {:?}", e);
        std::process::exit(1);
    }
    if let Err(e) = configuration.refresh_now().await {
        log::error!("initial configuration refresh failed: {:?}", e);
        std::process::exit(1);
    }

    tokio::spawn(measurements.clone().run());
    tokio::spawn(configuration.clone().run());

    let state = StateData {
        measurements,
        configuration,
    };

    let _ = rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, configuration_route])
        .launch()
        .await?;

    Ok(())
}
