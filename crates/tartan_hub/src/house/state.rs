use std::fmt::Write;
use std::str::FromStr;

use strum::IntoEnumIterator;

use super::field::FieldKey;
use super::field::HvacMode;
use super::field::flag_from_wire;
use super::field::flag_to_wire;
use crate::protocol::ProtocolError;

/// Something the occupant can flip from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Door,
    Light,
    Proximity,
    Intruder,
}

/// Every sensor and actuator value of the simulated house.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseState {
    /// Degrees Fahrenheit
    pub temperature: i64,
    /// Relative humidity, nominally 0-100
    pub humidity: i64,
    /// true if the door is open
    pub door: bool,
    pub lock: bool,
    pub night_mode: bool,
    pub intruder_detected: bool,
    /// true if the light is on
    pub light: bool,
    /// true if the house is occupied
    pub proximity_detected: bool,
    pub alarm_armed: bool,
    /// true while the alarm is sounding
    pub alarm_triggered: bool,
    pub heater_on: bool,
    pub chiller_on: bool,
    pub dehumidifier_on: bool,
    pub hvac_mode: HvacMode,
    pub door_lock: bool,
}

impl Default for HouseState {
    fn default() -> Self {
        Self {
            temperature: 65,
            humidity: 90,
            door: true,
            lock: false,
            night_mode: false,
            intruder_detected: false,
            light: true,
            proximity_detected: true,
            alarm_armed: false,
            alarm_triggered: false,
            heater_on: false,
            chiller_on: false,
            dehumidifier_on: false,
            hvac_mode: HvacMode::Heater,
            door_lock: false,
        }
    }
}

impl HouseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulation by one step.
    ///
    /// Heater and chiller both act if both are on. Humidity only drifts
    /// while strictly inside (0, 100), so it can reach a bound but never
    /// move past it.
    pub fn tick(&mut self) {
        if self.heater_on {
            self.temperature += 1;
        }
        if self.chiller_on {
            self.temperature -= 1;
        }

        if self.humidity > 0 && self.humidity < 100 {
            if self.dehumidifier_on {
                self.humidity -= 1;
            } else {
                self.humidity += 1;
            }
        }
    }

    /// Apply set-state pairs in order. Unknown and read-only keys are skipped.
    pub fn apply_update<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (code, value) in pairs {
            let Ok(key) = FieldKey::from_str(code) else {
                continue;
            };
            if !key.is_settable() {
                continue;
            }
            self.set_field(key, value);
        }
    }

    fn set_field(&mut self, key: FieldKey, value: &str) {
        if key == FieldKey::HvacMode {
            self.hvac_mode = HvacMode::from_wire(value);
        } else if let Some(flag) = self.flag_mut(key) {
            *flag = flag_from_wire(value);
        }
    }

    fn flag_mut(&mut self, key: FieldKey) -> Option<&mut bool> {
        let flag = match key {
            FieldKey::Door => &mut self.door,
            FieldKey::Light => &mut self.light,
            FieldKey::Proximity => &mut self.proximity_detected,
            FieldKey::AlarmTriggered => &mut self.alarm_triggered,
            FieldKey::AlarmArmed => &mut self.alarm_armed,
            FieldKey::Heater => &mut self.heater_on,
            FieldKey::Chiller => &mut self.chiller_on,
            FieldKey::Dehumidifier => &mut self.dehumidifier_on,
            FieldKey::Lock => &mut self.lock,
            FieldKey::IntruderDetected => &mut self.intruder_detected,
            FieldKey::NightMode => &mut self.night_mode,
            FieldKey::DoorLock => &mut self.door_lock,
            FieldKey::Temperature | FieldKey::Humidity | FieldKey::HvacMode => return None,
        };
        Some(flag)
    }

    fn wire_value(&self, key: FieldKey) -> String {
        match key {
            FieldKey::Temperature => self.temperature.to_string(),
            FieldKey::Humidity => self.humidity.to_string(),
            FieldKey::HvacMode => self.hvac_mode.to_wire().to_string(),
            FieldKey::Door => flag_to_wire(self.door).to_string(),
            FieldKey::Light => flag_to_wire(self.light).to_string(),
            FieldKey::Proximity => flag_to_wire(self.proximity_detected).to_string(),
            FieldKey::AlarmTriggered => flag_to_wire(self.alarm_triggered).to_string(),
            FieldKey::AlarmArmed => flag_to_wire(self.alarm_armed).to_string(),
            FieldKey::Heater => flag_to_wire(self.heater_on).to_string(),
            FieldKey::Chiller => flag_to_wire(self.chiller_on).to_string(),
            FieldKey::Dehumidifier => flag_to_wire(self.dehumidifier_on).to_string(),
            FieldKey::Lock => flag_to_wire(self.lock).to_string(),
            FieldKey::IntruderDetected => flag_to_wire(self.intruder_detected).to_string(),
            FieldKey::NightMode => flag_to_wire(self.night_mode).to_string(),
            FieldKey::DoorLock => flag_to_wire(self.door_lock).to_string(),
        }
    }

    /// Serialize every reported field as `KEY=value;...` in report order.
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for key in FieldKey::iter().filter(|k| k.is_reported()) {
            if !out.is_empty() {
                out.push(';');
            }
            // Writing to a String cannot fail
            let _ = write!(out, "{}={}", key, self.wire_value(key));
        }
        out
    }

    /// Rebuild a house from a snapshot string.
    ///
    /// Fields absent from the text keep their defaults, except the two
    /// readings, which must be present.
    pub fn from_snapshot(text: &str) -> Result<Self, ProtocolError> {
        let mut state = Self::default();
        let mut temperature = None;
        let mut humidity = None;

        for piece in text.split(';').filter(|p| !p.is_empty()) {
            let (code, value) = split_pair(piece)?;
            let key = FieldKey::from_str(code)
                .map_err(|_| ProtocolError::UnknownField(code.to_string()))?;
            match key {
                FieldKey::Temperature => temperature = Some(parse_reading(key, value)?),
                FieldKey::Humidity => humidity = Some(parse_reading(key, value)?),
                other => state.set_field(other, value),
            }
        }

        state.temperature = temperature.ok_or(ProtocolError::MissingField(FieldKey::Temperature))?;
        state.humidity = humidity.ok_or(ProtocolError::MissingField(FieldKey::Humidity))?;
        Ok(state)
    }

    /// Flip one occupant-controlled flag and return its new value.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let flag = match toggle {
            Toggle::Door => &mut self.door,
            Toggle::Light => &mut self.light,
            Toggle::Proximity => &mut self.proximity_detected,
            Toggle::Intruder => &mut self.intruder_detected,
        };
        *flag = !*flag;
        *flag
    }

    /// Set the temperature reading without any range check.
    pub fn set_temperature(&mut self, temperature: i64) {
        self.temperature = temperature;
    }

    /// Set the humidity reading without clamping; only `tick` respects the bounds.
    pub fn set_humidity(&mut self, humidity: i64) {
        self.humidity = humidity;
    }
}

/// Split `KEY=value`, rejecting pieces without exactly one `=`.
pub(crate) fn split_pair(piece: &str) -> Result<(&str, &str), ProtocolError> {
    match piece.split_once('=') {
        Some((key, value)) if !value.contains('=') => Ok((key, value)),
        _ => Err(ProtocolError::MalformedField(piece.to_string())),
    }
}

fn parse_reading(key: FieldKey, value: &str) -> Result<i64, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL: &str =
        "TR=65;HR=90;DS=1;LS=1;PS=1;AS=0;AA=0;HES=0;CHS=0;HM=1;HUS=0;LKS=0;ID=0;NM=0";

    fn pairs(payload: &str) -> Vec<(&str, &str)> {
        payload
            .split(';')
            .filter(|p| !p.is_empty())
            .map(|p| split_pair(p).unwrap())
            .collect()
    }

    #[test]
    fn test_initial_snapshot() {
        let house = HouseState::new();
        insta::assert_snapshot!(
            house.snapshot(),
            @"TR=65;HR=90;DS=1;LS=1;PS=1;AS=0;AA=0;HES=0;CHS=0;HM=1;HUS=0;LKS=0;ID=0;NM=0"
        );
    }

    #[test]
    fn test_every_settable_flag_is_reflected() {
        let codes = [
            "DS", "LS", "PS", "AS", "AA", "HES", "CHS", "HM", "HUS", "LKS", "ID", "NM",
        ];

        for code in codes {
            for value in ["0", "1"] {
                let mut house = HouseState::new();
                house.apply_update([(code, value)]);
                let expected = format!("{}={}", code, value);
                assert!(
                    house.snapshot().split(';').any(|p| p == expected),
                    "{} not found in {}",
                    expected,
                    house.snapshot()
                );
            }
        }
    }

    #[test]
    fn test_any_value_other_than_one_is_false() {
        let mut house = HouseState::new();
        house.apply_update([("LS", "yes"), ("DS", ""), ("PS", "0")]);
        assert!(!house.light);
        assert!(!house.door);
        assert!(!house.proximity_detected);
    }

    #[test]
    fn test_door_lock_is_set_but_not_reported() {
        let mut house = HouseState::new();
        house.apply_update([("DL", "1")]);
        assert!(house.door_lock);
        assert_eq!(house.snapshot(), INITIAL);
    }

    #[test]
    fn test_unknown_and_reading_keys_are_ignored() {
        let mut house = HouseState::new();
        house.apply_update([("XY", "1"), ("TR", "10"), ("HR", "3"), ("PC", "1234")]);
        assert_eq!(house, HouseState::new());
    }

    #[test]
    fn test_update_is_idempotent() {
        let payload = pairs("LS=0;HES=1;HM=0;LKS=1;NM=1");

        let mut once = HouseState::new();
        once.apply_update(payload.iter().copied());

        let mut twice = HouseState::new();
        twice.apply_update(payload.iter().copied());
        twice.apply_update(payload.iter().copied());

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_last_write_wins() {
        let mut house = HouseState::new();
        house.apply_update(pairs("LS=0;AA=1;LS=1;AA=0"));
        assert!(house.light);
        assert!(!house.alarm_armed);
    }

    #[test]
    fn test_heater_raises_temperature_every_tick() {
        let mut house = HouseState::new();
        house.heater_on = true;
        for expected in 66..=200 {
            house.tick();
            assert_eq!(house.temperature, expected);
        }
    }

    #[test]
    fn test_chiller_lowers_temperature_without_floor() {
        let mut house = HouseState::new();
        house.chiller_on = true;
        house.set_temperature(-5);
        house.tick();
        assert_eq!(house.temperature, -6);
    }

    #[test]
    fn test_idle_hvac_keeps_temperature() {
        let mut house = HouseState::new();
        house.tick();
        house.tick();
        assert_eq!(house.temperature, 65);
    }

    #[test]
    fn test_heater_and_chiller_cancel_out() {
        let mut house = HouseState::new();
        house.heater_on = true;
        house.chiller_on = true;
        house.tick();
        assert_eq!(house.temperature, 65);
    }

    #[test]
    fn test_humidity_stops_at_zero() {
        let mut house = HouseState::new();
        house.dehumidifier_on = true;
        house.set_humidity(1);
        house.tick();
        assert_eq!(house.humidity, 0);
        house.tick();
        assert_eq!(house.humidity, 0);
    }

    #[test]
    fn test_humidity_rises_to_hundred_and_stays() {
        let mut house = HouseState::new();
        for _ in 0..20 {
            house.tick();
        }
        assert_eq!(house.humidity, 100);
    }

    #[test]
    fn test_out_of_range_humidity_is_left_alone() {
        let mut house = HouseState::new();
        house.set_humidity(150);
        house.tick();
        assert_eq!(house.humidity, 150);

        house.set_humidity(-3);
        house.dehumidifier_on = true;
        house.tick();
        assert_eq!(house.humidity, -3);
    }

    #[test]
    fn test_toggle_flips_and_reports() {
        let mut house = HouseState::new();
        assert!(!house.toggle(Toggle::Door));
        assert!(!house.toggle(Toggle::Light));
        assert!(!house.toggle(Toggle::Proximity));
        assert!(house.toggle(Toggle::Intruder));
        assert!(house.toggle(Toggle::Door));
        assert_eq!(
            house.snapshot(),
            "TR=65;HR=90;DS=1;LS=0;PS=0;AS=0;AA=0;HES=0;CHS=0;HM=1;HUS=0;LKS=0;ID=1;NM=0"
        );
    }

    #[test]
    fn test_from_snapshot_rebuilds_state() {
        let mut house = HouseState::new();
        house.apply_update(pairs("LS=0;HM=0;HUS=1;NM=1"));
        house.set_temperature(71);
        house.set_humidity(40);

        let parsed = HouseState::from_snapshot(&house.snapshot()).unwrap();
        assert_eq!(parsed, house);
    }

    #[test]
    fn test_from_snapshot_errors() {
        assert_eq!(
            HouseState::from_snapshot("HR=90;DS=1"),
            Err(ProtocolError::MissingField(FieldKey::Temperature))
        );
        assert_eq!(
            HouseState::from_snapshot("TR=warm;HR=90"),
            Err(ProtocolError::InvalidValue {
                key: FieldKey::Temperature,
                value: "warm".to_string(),
            })
        );
        assert_eq!(
            HouseState::from_snapshot("TR=65;HR=90;QQ=1"),
            Err(ProtocolError::UnknownField("QQ".to_string()))
        );
        assert_eq!(
            HouseState::from_snapshot("TR=65;HR"),
            Err(ProtocolError::MalformedField("HR".to_string()))
        );
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("LS=1").unwrap(), ("LS", "1"));
        assert_eq!(split_pair("LS=").unwrap(), ("LS", ""));
        assert!(split_pair("LS").is_err());
        assert!(split_pair("LS=1=2").is_err());
    }
}
