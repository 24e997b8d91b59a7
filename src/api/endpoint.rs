pub type Endpoint = str;

pub const MEASUREMENTS: &Endpoint = "/api/measurements";
pub const CONFIGURATION: &Endpoint = "/api/configuration";

/// Fixed query parameters sent with every request to the device.
pub const QUERY_PARAMS: &[(&str, &str)] = &[("format", "json")];

pub const DEFAULT_MEASUREMENTS_INTERVAL_SECONDS: u64 = 5;
pub const DEFAULT_CONFIG_INTERVAL_SECONDS: u64 = 300;
