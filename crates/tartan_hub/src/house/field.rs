use strum::Display;
use strum::EnumIter;
use strum::EnumString;
use strum::IntoStaticStr;

/// Wire key for every field the hub knows about.
///
/// Declaration order is the order fields appear in a state report, so
/// `FieldKey::iter()` drives both the serializer and the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum FieldKey {
    #[strum(serialize = "TR")]
    Temperature,
    #[strum(serialize = "HR")]
    Humidity,
    #[strum(serialize = "DS")]
    Door,
    #[strum(serialize = "LS")]
    Light,
    #[strum(serialize = "PS")]
    Proximity,
    #[strum(serialize = "AS")]
    AlarmTriggered,
    #[strum(serialize = "AA")]
    AlarmArmed,
    #[strum(serialize = "HES")]
    Heater,
    #[strum(serialize = "CHS")]
    Chiller,
    #[strum(serialize = "HM")]
    HvacMode,
    #[strum(serialize = "HUS")]
    Dehumidifier,
    #[strum(serialize = "LKS")]
    Lock,
    #[strum(serialize = "ID")]
    IntruderDetected,
    #[strum(serialize = "NM")]
    NightMode,
    /// Legacy lock flag, accepted on set-state but never reported
    #[strum(serialize = "DL")]
    DoorLock,
}

impl FieldKey {
    /// The two-or-three letter code used on the wire.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Whether the field is part of a state report.
    pub fn is_reported(self) -> bool {
        !matches!(self, FieldKey::DoorLock)
    }

    /// Whether a set-state request may change the field.
    ///
    /// The readings are driven by the simulation only.
    pub fn is_settable(self) -> bool {
        !matches!(self, FieldKey::Temperature | FieldKey::Humidity)
    }
}

/// Which way the HVAC system leans, independent of whether it is running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    #[default]
    Heater,
    Chiller,
}

impl HvacMode {
    pub fn from_wire(value: &str) -> Self {
        if value == "1" {
            HvacMode::Heater
        } else {
            HvacMode::Chiller
        }
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            HvacMode::Heater => "1",
            HvacMode::Chiller => "0",
        }
    }
}

/// Decode a boolean: only `"1"` is true.
pub fn flag_from_wire(value: &str) -> bool {
    value == "1"
}

pub fn flag_to_wire(flag: bool) -> &'static str {
    if flag { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for key in FieldKey::iter() {
            assert_eq!(FieldKey::from_str(key.code()).unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(FieldKey::from_str("XX").is_err());
        assert!(FieldKey::from_str("ls").is_err());
    }

    #[test]
    fn test_report_order() {
        let order: Vec<&str> = FieldKey::iter()
            .filter(|k| k.is_reported())
            .map(FieldKey::code)
            .collect();
        assert_eq!(
            order,
            [
                "TR", "HR", "DS", "LS", "PS", "AS", "AA", "HES", "CHS", "HM", "HUS", "LKS", "ID",
                "NM"
            ]
        );
    }

    #[test]
    fn test_readings_are_not_settable() {
        assert!(!FieldKey::Temperature.is_settable());
        assert!(!FieldKey::Humidity.is_settable());
        assert!(FieldKey::DoorLock.is_settable());
        assert!(!FieldKey::DoorLock.is_reported());
    }

    #[test]
    fn test_flag_decoding_only_accepts_one() {
        assert!(flag_from_wire("1"));
        assert!(!flag_from_wire("0"));
        assert!(!flag_from_wire("true"));
        assert!(!flag_from_wire(""));
        assert!(!flag_from_wire("1."));
    }

    #[test]
    fn test_hvac_mode_wire() {
        assert_eq!(HvacMode::from_wire("1"), HvacMode::Heater);
        assert_eq!(HvacMode::from_wire("0"), HvacMode::Chiller);
        assert_eq!(HvacMode::from_wire("2"), HvacMode::Chiller);
        assert_eq!(HvacMode::default().to_wire(), "1");
        assert_eq!(HvacMode::Chiller.to_wire(), "0");
    }
}
