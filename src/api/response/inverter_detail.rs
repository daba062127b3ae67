use crate::api::Error;
use crate::model::Fields;
use serde_json::Value;

/* `data` of a successful inverterDetail response is the detail object itself */
pub fn fields(data: Value) -> Result<Fields, Error> {
    match data {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Fields::new()),
        _ => Err(Error::UnexpectedApiResponse),
    }
}
