use crate::fields::{FieldClass, FieldDescription};
use serde_json::Value;

/// Outcome of reading one field from the latest snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Number(f64),
    /// Non-numeric scalar kept as-is; the configuration endpoint surfaces
    /// arbitrary attributes this way.
    Passthrough(Value),
    /// Absent, null, or a value that could not be coerced. Reported as
    /// unknown downstream, never as zero and never as an error.
    Unknown,
}

fn round_ratio(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Coerce one stored value for presentation. Power-factor fields are a
/// dimensionless ratio rounded to 3 decimals, not a percentage. Strings
/// holding a number are parsed; a failed parse is logged and reported as
/// unknown so a single bad field never disturbs its siblings.
pub fn coerce(desc: &FieldDescription, value: Option<&Value>) -> Reading {
    let value = match value {
        None | Some(Value::Null) => return Reading::Unknown,
        Some(v) => v,
    };

    if let Some(number) = value.as_f64() {
        return match desc.class {
            FieldClass::PowerFactor => Reading::Number(round_ratio(number)),
            _ => Reading::Number(number),
        };
    }

    if let Some(text) = value.as_str() {
        return match text.parse::<f64>() {
            Ok(number) if desc.class == FieldClass::PowerFactor => {
                Reading::Number(round_ratio(number))
            }
            Ok(number) => Reading::Number(number),
            Err(_) => {
                log::warn!(
                    "could not coerce value {:?} of field {} to a number",
                    text,
                    desc.key
                );
                Reading::Unknown
            }
        };
    }

    Reading::Passthrough(value.clone())
}
