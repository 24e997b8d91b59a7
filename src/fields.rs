/// Field keys that the code itself reads or writes. All other keys appear
/// only in the description table below.
pub mod keys {
    pub const CURRENT_L1: &str = "IL1";
    pub const CURRENT_L2: &str = "IL2";
    pub const CURRENT_L3: &str = "IL3";
    /// Derived: ceiling of the largest phase current, never below 1.
    pub const MAX_PHASE_CURRENT: &str = "IMaxCalc";
    pub const OPERATING_TIME_MS: &str = "Tms";
    /// Derived: operating time converted to seconds.
    pub const OPERATING_TIME_S: &str = "Tsec";
    pub const STATUS_RAW: &str = "St";
}

/// Semantic class of a measurement field. Drives read-path coercion
/// (power factors are reported as a rounded dimensionless ratio) and
/// gives the exposition layer a unit hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Voltage,
    Current,
    Power,
    ReactivePower,
    ApparentPower,
    PowerFactor,
    Angle,
    Thd,
    Frequency,
    Temperature,
    Energy,
    ReactiveEnergy,
    ApparentEnergy,
    Duration,
    Counter,
    Status,
}

/// Static description of one surfaced field: device key, human label,
/// unit, semantic class, display precision hint and whether the field is
/// part of the default exposition.
///
/// `precision` is a rendering hint for dashboards consuming the
/// exposition; gauge samples carry full precision, so nothing in this
/// crate reads it.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub class: FieldClass,
    pub precision: u8,
    pub enabled_default: bool,
}

const fn field(
    key: &'static str,
    name: &'static str,
    unit: Option<&'static str>,
    class: FieldClass,
    precision: u8,
    enabled_default: bool,
) -> FieldDescription {
    FieldDescription {
        key,
        name,
        unit,
        class,
        precision,
        enabled_default,
    }
}

pub static FIELDS: &[FieldDescription] = &[
    /* Voltages L-N */
    field("UL1", "Voltage L1", Some("V"), FieldClass::Voltage, 3, true),
    field("UL2", "Voltage L2", Some("V"), FieldClass::Voltage, 3, true),
    field("UL3", "Voltage L3", Some("V"), FieldClass::Voltage, 3, true),
    /* Voltages L-L */
    field("UL1L2", "Voltage L1-L2", Some("V"), FieldClass::Voltage, 3, true),
    field("UL2L3", "Voltage L2-L3", Some("V"), FieldClass::Voltage, 3, true),
    field("UL3L1", "Voltage L3-L1", Some("V"), FieldClass::Voltage, 3, true),
    field("ULNAvg", "Voltage Average L-N", Some("V"), FieldClass::Voltage, 3, false),
    field("ULLAvg", "Voltage Average L-L", Some("V"), FieldClass::Voltage, 3, false),
    /* Voltage phase angles */
    field("PhiUL1", "Voltage Phase Angle L1", Some("°"), FieldClass::Angle, 1, true),
    field("PhiUL2", "Voltage Phase Angle L2", Some("°"), FieldClass::Angle, 1, true),
    field("PhiUL3", "Voltage Phase Angle L3", Some("°"), FieldClass::Angle, 1, true),
    /* Currents */
    field(keys::CURRENT_L1, "Current L1", Some("A"), FieldClass::Current, 3, true),
    field(keys::CURRENT_L2, "Current L2", Some("A"), FieldClass::Current, 3, true),
    field(keys::CURRENT_L3, "Current L3", Some("A"), FieldClass::Current, 3, true),
    field("IN", "Current N", Some("A"), FieldClass::Current, 3, true),
    field("IN0", "Current N0", Some("A"), FieldClass::Current, 3, false),
    field(keys::MAX_PHASE_CURRENT, "Calculated Max Phase Current", Some("A"), FieldClass::Current, 1, true),
    /* Current phase angles */
    field("PhiIL1", "Current Phase Angle L1", Some("°"), FieldClass::Angle, 1, true),
    field("PhiIL2", "Current Phase Angle L2", Some("°"), FieldClass::Angle, 1, true),
    field("PhiIL3", "Current Phase Angle L3", Some("°"), FieldClass::Angle, 1, true),
    /* Active power */
    field("PL1", "Active Power L1", Some("W"), FieldClass::Power, 3, true),
    field("PL2", "Active Power L2", Some("W"), FieldClass::Power, 3, true),
    field("PL3", "Active Power L3", Some("W"), FieldClass::Power, 3, true),
    field("P", "Active Power Total", Some("W"), FieldClass::Power, 3, true),
    /* Reactive power */
    field("QL1", "Reactive Power L1", Some("var"), FieldClass::ReactivePower, 3, true),
    field("QL2", "Reactive Power L2", Some("var"), FieldClass::ReactivePower, 3, true),
    field("QL3", "Reactive Power L3", Some("var"), FieldClass::ReactivePower, 3, true),
    field("Q", "Reactive Power Total", Some("var"), FieldClass::ReactivePower, 3, true),
    /* Apparent power */
    field("SL1", "Apparent Power L1", Some("VA"), FieldClass::ApparentPower, 3, true),
    field("SL2", "Apparent Power L2", Some("VA"), FieldClass::ApparentPower, 3, true),
    field("SL3", "Apparent Power L3", Some("VA"), FieldClass::ApparentPower, 3, true),
    field("S", "Apparent Power Total", Some("VA"), FieldClass::ApparentPower, 3, true),
    /* Power factors, dimensionless ratio -1..1 */
    field("PFL1", "Power Factor L1", None, FieldClass::PowerFactor, 3, true),
    field("PFL2", "Power Factor L2", None, FieldClass::PowerFactor, 3, true),
    field("PFL3", "Power Factor L3", None, FieldClass::PowerFactor, 3, true),
    field("PF", "Power Factor Total", None, FieldClass::PowerFactor, 3, true),
    /* THD voltage & current */
    field("THDUL1", "THD Voltage L1", Some("%"), FieldClass::Thd, 2, true),
    field("THDUL2", "THD Voltage L2", Some("%"), FieldClass::Thd, 2, true),
    field("THDUL3", "THD Voltage L3", Some("%"), FieldClass::Thd, 2, true),
    field("THDIL1", "THD Current L1", Some("%"), FieldClass::Thd, 2, true),
    field("THDIL2", "THD Current L2", Some("%"), FieldClass::Thd, 2, true),
    field("THDIL3", "THD Current L3", Some("%"), FieldClass::Thd, 2, true),
    /* General */
    field("F", "Frequency", Some("Hz"), FieldClass::Frequency, 2, true),
    field("T", "Device Temperature", Some("°C"), FieldClass::Temperature, 0, true),
    field("Smp", "Samples", None, FieldClass::Counter, 0, false),
    field(keys::STATUS_RAW, "Raw Status Code", None, FieldClass::Status, 0, false),
    field(keys::OPERATING_TIME_S, "Operating Time", Some("s"), FieldClass::Duration, 0, true),
    /* Fundamental and harmonic active power */
    field("PFundL1", "Active Power Fundamental L1", Some("W"), FieldClass::Power, 3, false),
    field("PFundL2", "Active Power Fundamental L2", Some("W"), FieldClass::Power, 3, false),
    field("PFundL3", "Active Power Fundamental L3", Some("W"), FieldClass::Power, 3, false),
    field("PFund", "Active Power Fundamental Total", Some("W"), FieldClass::Power, 3, false),
    field("PHarL1", "Active Power Harmonic L1", Some("W"), FieldClass::Power, 3, false),
    field("PHarL2", "Active Power Harmonic L2", Some("W"), FieldClass::Power, 3, false),
    field("PHarL3", "Active Power Harmonic L3", Some("W"), FieldClass::Power, 3, false),
    field("PHar", "Active Power Harmonic Total", Some("W"), FieldClass::Power, 3, false),
    /* Energy totals */
    field("EPImp", "Reverse Active Energy Total", Some("Wh"), FieldClass::Energy, 3, true),
    field("EPExp", "Forward Active Energy Total", Some("Wh"), FieldClass::Energy, 3, true),
    field("EQImp", "Reverse Reactive Energy Total", Some("varh"), FieldClass::ReactiveEnergy, 3, true),
    field("EQExp", "Forward Reactive Energy Total", Some("varh"), FieldClass::ReactiveEnergy, 3, true),
    field("ES", "Apparent Energy Total", Some("VAh"), FieldClass::ApparentEnergy, 3, true),
    field("ESExp", "Forward Apparent Energy Total", Some("VAh"), FieldClass::ApparentEnergy, 3, true),
    field("ESImp", "Reverse Apparent Energy Total", Some("VAh"), FieldClass::ApparentEnergy, 3, true),
    field("EPFundExp", "Forward Active Fundamental Energy Total", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarExp", "Forward Active Harmonic Energy Total", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundImp", "Reverse Active Fundamental Energy Total", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarImp", "Reverse Active Harmonic Energy Total", Some("Wh"), FieldClass::Energy, 3, false),
    /* Per-phase energy registers, excluded from the default exposition to
     * keep /metrics readable; enable per deployment when needed. */
    field("EPExpL1", "Forward Active Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPExpL2", "Forward Active Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPExpL3", "Forward Active Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPImpL1", "Reverse Active Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPImpL2", "Reverse Active Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPImpL3", "Reverse Active Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
    field("EQExpL1", "Forward Reactive Energy L1", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("EQExpL2", "Forward Reactive Energy L2", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("EQExpL3", "Forward Reactive Energy L3", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("EQImpL1", "Reverse Reactive Energy L1", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("EQImpL2", "Reverse Reactive Energy L2", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("EQImpL3", "Reverse Reactive Energy L3", Some("varh"), FieldClass::ReactiveEnergy, 3, false),
    field("ESL1", "Apparent Energy L1", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESL2", "Apparent Energy L2", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESL3", "Apparent Energy L3", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESExpL1", "Forward Apparent Energy L1", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESExpL2", "Forward Apparent Energy L2", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESExpL3", "Forward Apparent Energy L3", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESImpL1", "Reverse Apparent Energy L1", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESImpL2", "Reverse Apparent Energy L2", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("ESImpL3", "Reverse Apparent Energy L3", Some("VAh"), FieldClass::ApparentEnergy, 3, false),
    field("EPFundExpL1", "Forward Active Fundamental Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundExpL2", "Forward Active Fundamental Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundExpL3", "Forward Active Fundamental Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarExpL1", "Forward Active Harmonic Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarExpL2", "Forward Active Harmonic Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarExpL3", "Forward Active Harmonic Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundImpL1", "Reverse Active Fundamental Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundImpL2", "Reverse Active Fundamental Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPFundImpL3", "Reverse Active Fundamental Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarImpL1", "Reverse Active Harmonic Energy L1", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarImpL2", "Reverse Active Harmonic Energy L2", Some("Wh"), FieldClass::Energy, 3, false),
    field("EPHarImpL3", "Reverse Active Harmonic Energy L3", Some("Wh"), FieldClass::Energy, 3, false),
];

/// One independently surfaced bit of the packed status field. Bit set
/// means the condition reads OK.
#[derive(Debug, Clone, Copy)]
pub struct StatusBitDefinition {
    pub bit: u8,
    pub label: &'static str,
}

pub static STATUS_BITS: &[StatusBitDefinition] = &[
    StatusBitDefinition { bit: 0, label: "Voltage L1 OK" },
    StatusBitDefinition { bit: 1, label: "Voltage L2 OK" },
    StatusBitDefinition { bit: 2, label: "Voltage L3 OK" },
    StatusBitDefinition { bit: 3, label: "Voltage Sequence OK" },
    StatusBitDefinition { bit: 4, label: "Current Sequence OK" },
    StatusBitDefinition { bit: 5, label: "Phase Rotation OK" },
    StatusBitDefinition { bit: 6, label: "Frequency OK" },
    StatusBitDefinition { bit: 7, label: "Calibration OK" },
];

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_keys_are_unique() {
        let mut seen = HashSet::new();
        for desc in FIELDS {
            assert!(seen.insert(desc.key), "duplicate field key {}", desc.key);
        }
    }

    #[test]
    fn raw_millisecond_key_is_not_surfaced() {
        /* Only the derived seconds field is presented. */
        assert!(FIELDS.iter().all(|d| d.key != keys::OPERATING_TIME_MS));
        assert!(FIELDS.iter().any(|d| d.key == keys::OPERATING_TIME_S));
    }

    #[test]
    fn status_bits_are_unique_and_labelled() {
        let mut seen = HashSet::new();
        for def in STATUS_BITS {
            assert!(seen.insert(def.bit));
            assert!(!def.label.is_empty());
        }
    }
}
