use serde::Serialize;

/* Field order is part of the signed body */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStationList {
    pub page_no: String,
    pub page_size: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InverterList<'a> {
    pub station_id: &'a str,
}

#[derive(Serialize)]
pub struct InverterDetail<'a> {
    pub id: &'a str,
    pub sn: &'a str,
}
