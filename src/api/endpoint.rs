pub type Endpoint = str;

pub const USER_STATION_LIST: &Endpoint = "/v1/api/userStationList";
pub const INVERTER_LIST: &Endpoint = "/v1/api/inverterList";
pub const INVERTER_DETAIL: &Endpoint = "/v1/api/inverterDetail";
