use prometheus::{Encoder, GaugeVec, TextEncoder};
use smartmeter_ip_rs::coordinator::PollCoordinator;
use smartmeter_ip_rs::fields::{FIELDS, STATUS_BITS};
use smartmeter_ip_rs::status;
use smartmeter_ip_rs::value::{coerce, Reading};

lazy_static! {
    static ref MEASUREMENT_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_measurement",
            "latest normalized measurement value for one field",
        ),
        &["field", "unit"],
    )
    .unwrap();
    static ref STATUS_FLAG_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_status_flag",
            "decoded status bit, 1 when the condition reads OK",
        ),
        &["bit", "label"],
    )
    .unwrap();
    static ref LAST_UPDATE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_last_update_success",
            "1 when the last scheduled poll of the endpoint succeeded",
        ),
        &["endpoint"],
    )
    .unwrap();
    static ref CONFIGURATION_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "smartmeter_configuration",
            "numeric attribute of the device configuration endpoint",
        ),
        &["field"],
    )
    .unwrap();
}

fn set_update_flag(coordinator: &PollCoordinator) {
    let value = if coordinator.last_update_succeeded() {
        1.0
    } else {
        0.0
    };
    LAST_UPDATE_GAUGE
        .with_label_values(&[coordinator.name])
        .set(value);
}

/// Read the latest snapshots into the exporter registry. Runs on every
/// scrape; a field that is currently unknown is removed from the
/// exposition rather than reported as zero.
pub fn render(measurements: &PollCoordinator, configuration: &PollCoordinator) {
    let snapshot = measurements.latest_snapshot();

    for desc in FIELDS.iter().filter(|desc| desc.enabled_default) {
        let labels = [desc.key, desc.unit.unwrap_or("")];
        match coerce(desc, snapshot.as_ref().and_then(|s| s.get(desc.key))) {
            Reading::Number(value) => {
                MEASUREMENT_GAUGE.with_label_values(&labels).set(value);
            }
            Reading::Unknown => {
                let _ = MEASUREMENT_GAUGE.remove_label_values(&labels);
            }
            Reading::Passthrough(_) => { /* non-numeric, not exported */ }
        }
    }

    for def in STATUS_BITS {
        let bit = def.bit.to_string();
        let labels = [bit.as_str(), def.label];
        match status::flag(snapshot.as_ref(), def.bit) {
            Some(ok) => {
                STATUS_FLAG_GAUGE
                    .with_label_values(&labels)
                    .set(if ok { 1.0 } else { 0.0 });
            }
            /* Unknown stays unknown, it never reads as a failed check. */
            None => {
                let _ = STATUS_FLAG_GAUGE.remove_label_values(&labels);
            }
        }
    }

    set_update_flag(measurements);
    set_update_flag(configuration);

    if let Some(config_snapshot) = configuration.latest_snapshot() {
        for (key, value) in &config_snapshot {
            if let Some(number) = value.as_f64() {
                CONFIGURATION_GAUGE.with_label_values(&[key]).set(number);
            }
        }
    }
}

/// Read metrics from Prometheus exporter registry.
pub async fn read() -> Result<String, smartmeter_ip_rs::Error> {
    // Gather the metrics.
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).or(Err(smartmeter_ip_rs::Error::FormatError))
}
