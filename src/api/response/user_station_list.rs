use super::value_to_string;
use crate::model::{Fields, Station};
use serde_json::Value;

const NAME_KEYS: [&str; 2] = ["stationName", "name"];

/// Station of one `userStationList` record, or `None` when the record has no usable id.
pub fn station(fields: &Fields) -> Option<Station> {
    let id = fields.get("id").and_then(value_to_string)?;
    let name = NAME_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    Some(Station { id, name })
}
