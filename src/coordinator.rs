use crate::api::{self, endpoint, Error, FetchError};
use crate::model::{Meter, Snapshot};
use crate::normalize::normalize;

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Owns one endpoint's polling cycle and its cached snapshot.
///
/// The measurements and configuration coordinators of a meter are fully
/// independent: each one holds its own HTTP client and snapshot, and
/// nothing orders their cycles relative to each other. Within a single
/// coordinator cycles are strictly sequential, so the snapshot can never
/// be observed half-updated.
pub struct PollCoordinator {
    pub name: &'static str,
    url: String,
    auth: Option<(String, String)>,
    params: &'static [(&'static str, &'static str)],
    interval: Duration,
    is_measurements: bool,
    client: reqwest::Client,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    snapshot: Option<Snapshot>,
    last_update_success: bool,
}

impl PollCoordinator {
    fn new(
        name: &'static str,
        meter: &Meter,
        path: &endpoint::Endpoint,
        interval_seconds: u64,
        is_measurements: bool,
    ) -> Result<PollCoordinator, Error> {
        /* A zero interval would panic inside the poll loop's timer, long
         * after setup reported success. */
        if interval_seconds == 0 {
            return Err(Error::InvalidInterval(format!(
                "{}: polling interval must be at least 1 second",
                name
            )));
        }

        Ok(PollCoordinator {
            name,
            url: format!("{}{}", meter.base_url, path),
            auth: meter.auth.clone(),
            params: endpoint::QUERY_PARAMS,
            interval: Duration::from_secs(interval_seconds),
            is_measurements,
            client: api::client()?,
            state: Mutex::new(State::default()),
        })
    }

    /// Coordinator for the live measurements endpoint; fetched payloads
    /// are routed through `normalize` before caching.
    pub fn measurements(meter: &Meter, interval_seconds: u64) -> Result<PollCoordinator, Error> {
        PollCoordinator::new(
            "measurements",
            meter,
            endpoint::MEASUREMENTS,
            interval_seconds,
            true,
        )
    }

    /// Coordinator for the device configuration/identity endpoint;
    /// payloads are cached verbatim.
    pub fn configuration(meter: &Meter, interval_seconds: u64) -> Result<PollCoordinator, Error> {
        PollCoordinator::new(
            "configuration",
            meter,
            endpoint::CONFIGURATION,
            interval_seconds,
            false,
        )
    }

    fn contextualize(&self, err: FetchError) -> Error {
        match err {
            FetchError::Status(status) => {
                Error::HttpStatus(format!("{} ({}): HTTP {}", self.name, self.url, status))
            }
            FetchError::Request(detail) => {
                Error::Request(format!("{} ({}): {}", self.name, self.url, detail))
            }
            FetchError::InvalidJson(detail) => {
                Error::InvalidResponse(format!("{} ({}): {}", self.name, self.url, detail))
            }
        }
    }

    fn record_success(&self, snapshot: Snapshot) {
        if let Ok(mut state) = self.state.lock() {
            state.snapshot = Some(snapshot);
            state.last_update_success = true;
        } else {
            log::trace!("unable to lock state of {}, dropping snapshot", self.name)
        }
    }

    fn record_failure(&self) {
        if let Ok(mut state) = self.state.lock() {
            /* Previous snapshot stays available, stale but usable. */
            state.last_update_success = false;
        } else {
            log::trace!("unable to lock state of {}", self.name)
        }
    }

    /// One synchronous fetch-and-normalize cycle. Replaces the cached
    /// snapshot on success; on failure it only clears the success flag
    /// and hands the error to the caller. At setup the caller treats
    /// that as fatal, the scheduled loop merely logs it.
    pub async fn refresh_now(&self) -> Result<(), Error> {
        match api::fetch_json(&self.client, &self.url, &self.auth, self.params).await {
            Ok(raw) => {
                let snapshot = if self.is_measurements {
                    normalize(raw)
                } else {
                    raw
                };
                log::debug!("{}: fetched {} fields", self.name, snapshot.len());
                self.record_success(snapshot);
                Ok(())
            }
            Err(e) => {
                let err = self.contextualize(e);
                log::error!("refresh of {} failed: {:?}", self.name, err);
                self.record_failure();
                Err(err)
            }
        }
    }

    /// Latest successfully normalized snapshot, or `None` if no fetch
    /// has ever succeeded.
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.snapshot.clone())
    }

    pub fn last_update_succeeded(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.last_update_success)
            .unwrap_or(false)
    }

    /// Periodic poll loop. The tick preceding each refresh keeps cycles
    /// strictly sequential; a failed scheduled refresh is logged and
    /// retried on the next tick, never propagated.
    pub async fn run(self: Arc<Self>) {
        let mut ticks = tokio::time::interval(self.interval);
        /* The first tick fires immediately and setup already refreshed. */
        ticks.tick().await;
        loop {
            ticks.tick().await;
            if self.refresh_now().await.is_err() {
                log::info!("{}: keeping previous data until next tick", self.name);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::meter;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn measurements_server(body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/measurements"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn refresh_normalizes_and_caches() {
        let server =
            measurements_server(json!({"IL1": 0, "IL2": 5.4, "IL3": 0, "Tms": 542, "St": 5}))
                .await;
        let m = meter(&server.uri(), None, None);
        let coordinator = PollCoordinator::measurements(&m, 5).unwrap();

        assert!(coordinator.latest_snapshot().is_none());
        assert!(!coordinator.last_update_succeeded());

        coordinator.refresh_now().await.unwrap();

        let snapshot = coordinator.latest_snapshot().unwrap();
        assert_eq!(Some(6.0), snapshot["IMaxCalc"].as_f64());
        assert_eq!(Some(0.542), snapshot["Tsec"].as_f64());
        assert_eq!(Some(5), snapshot["St"].as_i64());
        assert!(coordinator.last_update_succeeded());
    }

    #[tokio::test]
    async fn configuration_payload_is_cached_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/configuration"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Serial": "12345", "FwVersion": "1.2.3"})),
            )
            .mount(&server)
            .await;

        let m = meter(&server.uri(), None, None);
        let coordinator = PollCoordinator::configuration(&m, 300).unwrap();
        coordinator.refresh_now().await.unwrap();

        let snapshot = coordinator.latest_snapshot().unwrap();
        assert_eq!(Some("12345"), snapshot["Serial"].as_str());
        /* No derived measurement keys on the configuration endpoint. */
        assert!(!snapshot.contains_key("IMaxCalc"));
        assert!(!snapshot.contains_key("Tsec"));
    }

    #[tokio::test]
    async fn failed_poll_keeps_previous_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/measurements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IL1": 1.2})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/measurements"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let m = meter(&server.uri(), None, None);
        let coordinator = PollCoordinator::measurements(&m, 5).unwrap();
        coordinator.refresh_now().await.unwrap();

        let err = coordinator.refresh_now().await.unwrap_err();
        match err {
            Error::HttpStatus(message) => {
                assert!(message.contains("measurements"));
                assert!(message.contains(&server.uri()));
                assert!(message.contains("500"));
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }

        /* Stale but available. */
        let snapshot = coordinator.latest_snapshot().unwrap();
        assert_eq!(Some(1.2), snapshot["IL1"].as_f64());
        assert!(!coordinator.last_update_succeeded());
    }

    #[test]
    fn zero_interval_is_rejected_at_setup() {
        let m = meter("http://127.0.0.1:9", None, None);
        assert!(matches!(
            PollCoordinator::measurements(&m, 0),
            Err(Error::InvalidInterval(_))
        ));
        assert!(matches!(
            PollCoordinator::configuration(&m, 0),
            Err(Error::InvalidInterval(_))
        ));
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_snapshot() {
        let server = measurements_server(json!({"IL1": 1.2, "Tms": 542})).await;
        let m = meter(&server.uri(), None, None);
        let coordinator = PollCoordinator::measurements(&m, 5).unwrap();
        coordinator.refresh_now().await.unwrap();
        assert!(coordinator.last_update_succeeded());

        /* Device goes away mid-run; the next cycle fails at the
         * transport layer instead of with an HTTP status. */
        drop(server);

        let err = coordinator.refresh_now().await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));

        /* Stale but available, flagged as failed. */
        let snapshot = coordinator.latest_snapshot().unwrap();
        assert_eq!(Some(1.2), snapshot["IL1"].as_f64());
        assert_eq!(Some(0.542), snapshot["Tsec"].as_f64());
        assert!(!coordinator.last_update_succeeded());
    }

    #[tokio::test]
    async fn unreachable_device_is_a_request_error() {
        /* Nothing listens on the discard port. */
        let m = meter("http://127.0.0.1:9", None, None);
        let coordinator = PollCoordinator::measurements(&m, 5).unwrap();

        let err = coordinator.refresh_now().await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
        assert!(coordinator.latest_snapshot().is_none());
        assert!(!coordinator.last_update_succeeded());
    }

    #[tokio::test]
    async fn non_object_body_is_invalid_response() {
        let server = measurements_server(json!([1, 2, 3])).await;
        let m = meter(&server.uri(), None, None);
        let coordinator = PollCoordinator::measurements(&m, 5).unwrap();

        let err = coordinator.refresh_now().await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
