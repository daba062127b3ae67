//! Mapping of merged inverter records onto named, individually identified values.

use crate::model::{InverterRecord, InverterState};
use serde_json::Value;

const DEFAULT_STATION_NAME: &str = "Solis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Measurement,
    Total,
    TotalIncreasing,
    State,
}

#[derive(Debug, Clone, Copy)]
pub struct Sensor {
    /// Field key in the merged record.
    pub key: &'static str,
    pub name: &'static str,
    /// Used when the record does not carry a `<key>Str` unit field.
    pub unit: Option<&'static str>,
    pub kind: Kind,
}

impl Sensor {
    const fn new(
        key: &'static str,
        name: &'static str,
        unit: Option<&'static str>,
        kind: Kind,
    ) -> Self {
        Sensor {
            key,
            name,
            unit,
            kind,
        }
    }
}

pub const SENSORS: [Sensor; 9] = [
    Sensor::new("pac", "Current Power", Some("W"), Kind::Measurement),
    Sensor::new("eToday", "Energy Today", Some("kWh"), Kind::TotalIncreasing),
    Sensor::new("eMonth", "Energy This Month", Some("kWh"), Kind::Total),
    Sensor::new("eYear", "Energy This Year", Some("kWh"), Kind::Total),
    Sensor::new("eTotal", "Energy Total", Some("kWh"), Kind::TotalIncreasing),
    Sensor::new("batteryPower", "Battery Power", Some("kW"), Kind::Measurement),
    Sensor::new("batteryCapacitySoc", "Battery State of Charge", Some("%"), Kind::Measurement),
    Sensor::new("inverterTemperature", "Temperature", Some("°C"), Kind::Measurement),
    Sensor::new("state", "State", None, Kind::State),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// `<serial number>_<key>`, stable across polls.
    pub unique_id: String,
    pub sn: String,
    pub key: &'static str,
    pub name: String,
    pub unit: Option<String>,
    pub kind: Kind,
    pub value: Option<f64>,
    /// `Online`/`Offline`/`Alarm`/`Unknown` for the state sensor.
    pub text: Option<String>,
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn state_text(code: Option<f64>) -> String {
    code.filter(|c| c.fract() == 0.0 && *c >= 0.0)
        .and_then(|c| InverterState::from_code(c as u64))
        .map(|state| state.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Readings of every known sensor of `record`. Records without a serial number cannot be
/// identified across polls and yield nothing.
pub fn readings(record: &InverterRecord) -> Vec<Reading> {
    let sn = match &record.sn {
        Some(sn) => sn,
        None => return Vec::new(),
    };
    let station_name = record.station_name().unwrap_or(DEFAULT_STATION_NAME);

    SENSORS
        .iter()
        .map(|sensor| {
            let value = record.fields.get(sensor.key).and_then(as_f64);
            let unit = record
                .fields
                .get(&format!("{}Str", sensor.key))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| sensor.unit.map(str::to_string));
            let text = match sensor.kind {
                Kind::State => Some(state_text(value)),
                _ => None,
            };

            Reading {
                unique_id: format!("{}_{}", sn, sensor.key),
                sn: sn.to_owned(),
                key: sensor.key,
                name: format!("{} {}", station_name, sensor.name),
                unit,
                kind: sensor.kind,
                value,
                text,
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn record(sn: Option<&str>, fields: Value) -> InverterRecord {
        InverterRecord {
            id: Some("1".to_string()),
            sn: sn.map(str::to_string),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    fn find<'a>(readings: &'a [Reading], key: &str) -> &'a Reading {
        readings.iter().find(|r| r.key == key).unwrap()
    }

    #[test]
    fn readings_use_serial_and_key() {
        let readings = readings(&record(
            Some("1033320253070089"),
            json!({"stationName": "Home", "pac": 2.53, "pacStr": "kW", "eToday": "14.7", "state": 1}),
        ));

        assert_eq!(SENSORS.len(), readings.len());

        let pac = find(&readings, "pac");
        assert_eq!("1033320253070089_pac", pac.unique_id);
        assert_eq!("Home Current Power", pac.name);
        assert_eq!(Some(2.53), pac.value);
        assert_eq!(Some("kW".to_string()), pac.unit);

        let today = find(&readings, "eToday");
        assert_eq!(Some(14.7), today.value);
        assert_eq!(Some("kWh".to_string()), today.unit);
        assert_eq!(Kind::TotalIncreasing, today.kind);

        let state = find(&readings, "state");
        assert_eq!(Some(1.0), state.value);
        assert_eq!(Some("Online".to_string()), state.text);

        assert_eq!(None, find(&readings, "batteryPower").value);
    }

    #[test]
    fn unknown_state() {
        let readings = readings(&record(Some("SN"), json!({"state": 9})));
        assert_eq!(Some("Unknown".to_string()), find(&readings, "state").text);

        let missing = super::readings(&record(Some("SN"), json!({})));
        assert_eq!(Some("Unknown".to_string()), find(&missing, "state").text);
    }

    #[test]
    fn default_station_name() {
        let readings = readings(&record(Some("SN"), json!({"state": "3"})));
        let state = find(&readings, "state");
        assert_eq!("Solis State", state.name);
        assert_eq!(Some("Alarm".to_string()), state.text);
    }

    #[test]
    fn no_serial_no_readings() {
        assert!(readings(&record(None, json!({"pac": 1.0}))).is_empty());
    }
}
