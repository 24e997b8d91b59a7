use crate::fields::keys;
use crate::model::Snapshot;
use serde_json::Value;

fn current_or_zero(raw: &Snapshot, key: &str) -> f64 {
    raw.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Normalize one raw measurements payload.
///
/// Every raw key is kept verbatim; unknown or future device fields pass
/// straight through. Two keys are synthesized on top:
///
/// * `IMaxCalc`: ceiling of the largest phase current, with a 0.1 floor
///   so a meter with all phases idle still reports 1 instead of 0,
/// * `Tsec`: `Tms / 1000.0`, or an explicit null when `Tms` is missing
///   or not numeric. Absence propagates, it is never turned into 0.
///
/// Total over any JSON object; values of unexpected type are left as-is
/// for the read path to coerce.
pub fn normalize(mut raw: Snapshot) -> Snapshot {
    let il1 = current_or_zero(&raw, keys::CURRENT_L1);
    let il2 = current_or_zero(&raw, keys::CURRENT_L2);
    let il3 = current_or_zero(&raw, keys::CURRENT_L3);
    let imax = il1.max(il2).max(il3).max(0.1).ceil();
    raw.insert(keys::MAX_PHASE_CURRENT.to_string(), Value::from(imax));

    let seconds = raw
        .get(keys::OPERATING_TIME_MS)
        .and_then(Value::as_f64)
        .map_or(Value::Null, |ms| Value::from(ms / 1000.0));
    raw.insert(keys::OPERATING_TIME_S.to_string(), seconds);

    raw
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Snapshot;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;

    fn snapshot(value: Value) -> Snapshot {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be a JSON object"),
        }
    }

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn max_phase_current_single_loaded_phase() {
        let out = normalize(snapshot(json!({"IL1": 0, "IL2": 5.4, "IL3": 0})));
        assert_eq!(Some(6.0), out["IMaxCalc"].as_f64());
    }

    #[test]
    fn max_phase_current_never_below_one() {
        let out = normalize(snapshot(json!({"IL1": 0, "IL2": 0, "IL3": 0})));
        assert_eq!(Some(1.0), out["IMaxCalc"].as_f64());

        /* All phases missing entirely. */
        let out = normalize(snapshot(json!({})));
        assert_eq!(Some(1.0), out["IMaxCalc"].as_f64());
    }

    #[test]
    fn max_phase_current_null_phase_reads_as_zero() {
        let out = normalize(snapshot(json!({"IL1": null, "IL2": 2.1, "IL3": null})));
        assert_eq!(Some(3.0), out["IMaxCalc"].as_f64());
    }

    #[test]
    fn operating_time_milliseconds_to_seconds() {
        let out = normalize(snapshot(json!({"Tms": 542})));
        assert_eq!(Some(0.542), out["Tsec"].as_f64());
    }

    #[test]
    fn operating_time_absent_stays_absent() {
        let out = normalize(snapshot(json!({"UL1": 230.1})));
        assert_eq!(Value::Null, out["Tsec"]);

        let out = normalize(snapshot(json!({"Tms": "soon"})));
        assert_eq!(Value::Null, out["Tsec"]);
    }

    #[test]
    fn raw_keys_pass_through_verbatim() {
        let raw = snapshot(serde_json::from_str(&read_resource("measurements.json")).unwrap());
        let out = normalize(raw.clone());

        for (key, value) in &raw {
            if key != "IMaxCalc" && key != "Tsec" {
                assert_eq!(value, &out[key], "key {} changed by normalize", key);
            }
        }
    }

    #[test]
    fn total_over_odd_payloads() {
        /* Strings, booleans and nested values must not make it fail. */
        let out = normalize(snapshot(json!({
            "IL1": "not a number",
            "Tms": true,
            "Nested": {"a": 1},
        })));
        assert_eq!(Some(1.0), out["IMaxCalc"].as_f64());
        assert_eq!(Value::Null, out["Tsec"]);
        assert_eq!(json!({"a": 1}), out["Nested"]);
    }
}
