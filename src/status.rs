use crate::fields::keys;
use crate::model::Snapshot;
use serde_json::Value;

/// Bit set means the condition reads OK.
pub fn bit_is_set(status_value: i64, bit_index: u8) -> bool {
    status_value & (1i64 << bit_index) != 0
}

/// Decode one status bit out of the latest snapshot. `None` means
/// unknown: no snapshot yet, no status field, or a status field that is
/// not an integer. Missing data must never read as a negative condition.
pub fn flag(snapshot: Option<&Snapshot>, bit_index: u8) -> Option<bool> {
    snapshot?
        .get(keys::STATUS_RAW)
        .and_then(Value::as_i64)
        .map(|status| bit_is_set(status, bit_index))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Snapshot;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test input must be a JSON object"),
        }
    }

    #[test]
    fn bits_match_bitmask_arithmetic() {
        /* 5 = 0b101 */
        assert!(bit_is_set(5, 0));
        assert!(!bit_is_set(5, 1));
        assert!(bit_is_set(5, 2));
        assert!(!bit_is_set(5, 3));

        for bit in 0..32u8 {
            assert_eq!(1i64 << bit & 0x00f0_00ff != 0, bit_is_set(0x00f0_00ff, bit));
        }
    }

    #[test]
    fn flags_from_snapshot() {
        let snap = snapshot(json!({"St": 5}));
        assert_eq!(Some(true), flag(Some(&snap), 0));
        assert_eq!(Some(false), flag(Some(&snap), 1));
        assert_eq!(Some(true), flag(Some(&snap), 2));
    }

    #[test]
    fn missing_data_is_unknown_not_false() {
        assert_eq!(None, flag(None, 0));

        let snap = snapshot(json!({"UL1": 230.0}));
        assert_eq!(None, flag(Some(&snap), 0));

        /* Non-integer status is unknown for every bit. */
        let snap = snapshot(json!({"St": "5"}));
        assert_eq!(None, flag(Some(&snap), 0));
        let snap = snapshot(json!({"St": 5.5}));
        assert_eq!(None, flag(Some(&snap), 0));
    }
}
