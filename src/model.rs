use num_derive::FromPrimitive;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub type Fields = Map<String, Value>;

/// Key under which the parent station's display name is attached to each inverter.
pub const STATION_NAME: &str = "stationName";

#[derive(Clone)]
pub struct Credentials {
    pub key_id: String,
    pub secret: String,
    pub username: Option<String>,
}

impl Credentials {
    /// Human readable name of the account, used when the exporter starts up.
    pub fn title(&self) -> String {
        let name = match &self.username {
            Some(username) if !username.is_empty() => username.to_owned(),
            _ => self.key_id.chars().take(10).collect(),
        };
        format!("Solis Cloud ({})", name)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: String,
    pub name: String,
}

/// Inverter as returned by the list endpoint, enriched with detail fields when
/// both `id` and `sn` are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InverterRecord {
    pub id: Option<String>,
    pub sn: Option<String>,
    pub fields: Fields,
}

impl InverterRecord {
    pub fn station_name(&self) -> Option<&str> {
        self.fields.get(STATION_NAME).and_then(Value::as_str)
    }

    /// Overlay `detail` onto the summary fields; detail values win.
    pub fn merge(&mut self, detail: Fields) {
        self.fields.extend(detail);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    pub records: Vec<InverterRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum InverterState {
    Online = 1,
    Offline = 2,
    Alarm = 3,
}

impl InverterState {
    pub fn from_code(code: u64) -> Option<InverterState> {
        num::FromPrimitive::from_u64(code)
    }
}

impl fmt::Display for InverterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InverterState::Online => "Online",
            InverterState::Offline => "Offline",
            InverterState::Alarm => "Alarm",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_debug_redacts_secret() {
        let credentials = Credentials {
            key_id: "1300386381677986852".to_string(),
            secret: "super-secret".to_string(),
            username: None,
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("1300386381677986852"));
    }

    #[test]
    fn title_prefers_username() {
        let mut credentials = Credentials {
            key_id: "1300386381677986852".to_string(),
            secret: "s".to_string(),
            username: Some("alice@example.com".to_string()),
        };
        assert_eq!("Solis Cloud (alice@example.com)", credentials.title());

        credentials.username = None;
        assert_eq!("Solis Cloud (1300386381)", credentials.title());
    }

    #[test]
    fn merge_detail_wins() {
        let mut record = InverterRecord {
            id: Some("1".to_string()),
            sn: Some("SN1".to_string()),
            fields: json!({"pac": 1.0, "state": 2, "stationName": "Home"})
                .as_object()
                .cloned()
                .unwrap(),
        };
        let detail = json!({"pac": 2.5, "batteryCapacitySoc": 80})
            .as_object()
            .cloned()
            .unwrap();

        record.merge(detail);

        assert_eq!(Some(&json!(2.5)), record.fields.get("pac"));
        assert_eq!(Some(&json!(2)), record.fields.get("state"));
        assert_eq!(Some(&json!(80)), record.fields.get("batteryCapacitySoc"));
        assert_eq!(Some("Home"), record.station_name());
    }

    #[test]
    fn inverter_state_codes() {
        assert_eq!(Some(InverterState::Online), InverterState::from_code(1));
        assert_eq!(Some(InverterState::Offline), InverterState::from_code(2));
        assert_eq!(Some(InverterState::Alarm), InverterState::from_code(3));
        assert_eq!(None, InverterState::from_code(0));
        assert_eq!(None, InverterState::from_code(4));
        assert_eq!("Alarm", InverterState::Alarm.to_string());
    }
}
