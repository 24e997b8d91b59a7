pub mod endpoint;
pub mod error;

use crate::model::{Meter, Snapshot};
pub use error::Error;
use serde_json::Value;

use std::fmt;
use std::time::Duration;

/// Hard bound on every call to the device; flaky LAN devices must not
/// hang a poll cycle indefinitely.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw outcome of one fetch attempt, before any coordinator context is
/// attached to it.
#[derive(Debug)]
pub enum FetchError {
    /// Non-2xx response status.
    Status(http::StatusCode),
    /// Connection, timeout or other transport error.
    Request(String),
    /// Body was not parseable as a JSON object.
    InvalidJson(String),
}

/// User-facing outcome tokens of config-time validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAuth,
    AuthRequiredButNotProvided,
    CannotConnectHttp,
    CannotConnectRequest,
    InvalidResponse,
    Unknown,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ValidationError::InvalidAuth => "invalid_auth",
            ValidationError::AuthRequiredButNotProvided => "auth_required_but_not_provided",
            ValidationError::CannotConnectHttp => "cannot_connect_http",
            ValidationError::CannotConnectRequest => "cannot_connect_request",
            ValidationError::InvalidResponse => "invalid_response",
            ValidationError::Unknown => "unknown",
        };
        write!(f, "{}", token)
    }
}

/// Build the per-coordinator HTTP client with the fixed request timeout.
pub fn client() -> Result<reqwest::Client, Error> {
    reqwest::ClientBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .or(Err(Error::InternalError))
}

/// Perform one GET against `url` and parse the body as a flat JSON object.
pub async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    auth: &Option<(String, String)>,
    params: &[(&str, &str)],
) -> Result<Snapshot, FetchError> {
    let mut request = client.get(url).query(params);
    if let Some((user, pass)) = auth {
        request = request.basic_auth(user, Some(pass));
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let text = response
        .text()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FetchError::InvalidJson(format!(
            "expected JSON object, got: {}",
            other
        ))),
        Err(e) => Err(FetchError::InvalidJson(e.to_string())),
    }
}

/// Map a fetch failure to the validation token shown to the user. A 401
/// means bad credentials when some were supplied and missing credentials
/// when none were.
fn classify(err: &FetchError, has_auth: bool) -> ValidationError {
    match err {
        FetchError::Status(status) => match *status {
            http::StatusCode::UNAUTHORIZED if has_auth => ValidationError::InvalidAuth,
            http::StatusCode::UNAUTHORIZED => ValidationError::AuthRequiredButNotProvided,
            _ => ValidationError::CannotConnectHttp,
        },
        FetchError::Request(_) => ValidationError::CannotConnectRequest,
        FetchError::InvalidJson(_) => ValidationError::InvalidResponse,
    }
}

/// Config-time validation: one GET against the measurements endpoint,
/// classified into a user-facing token. Called once before any
/// coordinator is constructed; an error here blocks startup.
pub async fn validate(meter: &Meter) -> Result<(), ValidationError> {
    let client = client().or(Err(ValidationError::Unknown))?;
    let url = format!("{}{}", meter.base_url, endpoint::MEASUREMENTS);

    match fetch_json(&client, &url, &meter.auth, endpoint::QUERY_PARAMS).await {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("validation against {} failed: {:?}", url, e);
            Err(classify(&e, meter.auth.is_some()))
        }
    }
}
