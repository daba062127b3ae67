use super::value_to_string;
use crate::model::{Fields, InverterRecord, Station, STATION_NAME};
use serde_json::Value;

/* Serial number key differs between API revisions */
const SERIAL_KEYS: [&str; 2] = ["sn", "inverterSn"];

pub fn record(station: &Station, mut fields: Fields) -> InverterRecord {
    let id = fields.get("id").and_then(value_to_string);
    let sn = SERIAL_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(value_to_string));

    /* keep a name supplied by the list endpoint if the station has none */
    if !station.name.is_empty() || !fields.contains_key(STATION_NAME) {
        fields.insert(
            STATION_NAME.to_string(),
            Value::String(station.name.to_owned()),
        );
    }

    InverterRecord { id, sn, fields }
}
