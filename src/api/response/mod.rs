pub mod inverter_detail;
pub mod inverter_list;
pub mod user_station_list;

use super::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const NO_MESSAGE: &str = "(no error message received)";

/// Outer wrapper of every SolisCloud response.
#[derive(Debug, PartialEq)]
pub enum Envelope {
    Success { data: Value },
    Failure { message: String },
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;
        let object = value
            .as_object()
            .ok_or_else(|| serde::de::Error::custom("response envelope is not an object"))?;

        /* anything but a literal `true` is a failure */
        let success = object
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if success {
            Ok(Envelope::Success {
                data: object.get("data").cloned().unwrap_or(Value::Null),
            })
        } else {
            let message = ["message", "msg"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .unwrap_or(NO_MESSAGE);
            Ok(Envelope::Failure {
                message: message.to_string(),
            })
        }
    }
}

/* List endpoints nest their records under `data.page.records` */
#[derive(Deserialize)]
pub struct PageData<T> {
    #[serde(default = "Page::default")]
    pub page: Page<T>,
}

#[derive(Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            records: Vec::new(),
        }
    }
}

/// Records of a list endpoint; a missing `data` means no records.
pub fn records<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, Error> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value::<PageData<T>>(data)
        .map(|data| data.page.records)
        .or(Err(Error::UnexpectedApiResponse))
}

/// Ids and serial numbers are sent either as strings or as numbers.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
