pub mod endpoint;
pub mod error;
pub mod request;
pub mod response;
pub mod sign;
pub mod transport;

use crate::model::{self, AggregateResult, Credentials, Fields, InverterRecord};
pub use error::Error;
use response::{inverter_detail, inverter_list, user_station_list, Envelope};
use serde::Serialize;
use serde_json::Value;
pub use transport::{HttpTransport, Transport};

pub const API_URL: &str = "https://www.soliscloud.com:13333";

const FIRST_PAGE: u32 = 1;
const PAGE_SIZE: u32 = 10;

/// SolisCloud client. Holds nothing but immutable credentials and the transport.
pub struct Client<T: Transport> {
    credentials: Credentials,
    transport: T,
}

pub fn api(api_url: String, credentials: Credentials) -> Result<Client<HttpTransport>, Error> {
    Ok(Client::new(credentials, HttpTransport::new(api_url)?))
}

/// Decode the envelope of a valid HTTP response, carrying `data` forward on success and the
/// vendor message as `Error::ApiError` otherwise.
fn map_response_status(value: Value) -> Result<Value, Error> {
    match serde_json::from_value::<Envelope>(value).or(Err(Error::UnexpectedApiResponse))? {
        Envelope::Success { data } => Ok(data),
        Envelope::Failure { message } => Err(Error::ApiError(message)),
    }
}

impl<T: Transport> Client<T> {
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Client {
            credentials,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post<B: Serialize>(
        &self,
        endpoint: &endpoint::Endpoint,
        body: &B,
    ) -> Result<Value, Error> {
        let body = serde_json::to_vec(body).or(Err(Error::FormatError))?;
        let date = sign::gmt_now();
        let headers = sign::sign(
            &self.credentials.key_id,
            &self.credentials.secret,
            &body,
            &date,
            endpoint,
        )?;

        log::trace!(
            "endpoint: {}, body: {}",
            endpoint,
            String::from_utf8_lossy(&body)
        );

        let response_text = self.transport.post(endpoint, &headers, body).await?;

        log::trace!(
            "endpoint: {}, response_text: {}",
            endpoint,
            response_text
        );

        serde_json::from_str::<Value>(&response_text)
            .map_err(|e| Error::InvalidResponse(response_text.clone(), e.to_string()))
            .and_then(map_response_status)
    }

    /// List stations visible to the API key.
    pub async fn list_stations(
        &self,
        page_no: u32,
        page_size: u32,
    ) -> Result<Vec<model::Station>, Error> {
        let request_body = request::UserStationList {
            page_no: page_no.to_string(),
            page_size: page_size.to_string(),
        };

        let data = self.post(endpoint::USER_STATION_LIST, &request_body).await?;
        let stations = response::records::<Fields>(data)?
            .iter()
            .filter_map(|fields| {
                let station = user_station_list::station(fields);
                if station.is_none() {
                    log::warn!(
                        "Skipping station record without id: {}",
                        Value::Object(fields.clone())
                    );
                }
                station
            })
            .collect();
        Ok(stations)
    }

    /// List inverters of `station`, each tagged with the station's name.
    pub async fn list_inverters(
        &self,
        station: &model::Station,
    ) -> Result<Vec<InverterRecord>, Error> {
        let request_body = request::InverterList {
            station_id: &station.id,
        };

        let data = self.post(endpoint::INVERTER_LIST, &request_body).await?;
        let inverters = response::records::<Fields>(data)?
            .into_iter()
            .map(|fields| inverter_list::record(station, fields))
            .collect();
        Ok(inverters)
    }

    pub async fn get_inverter_detail(&self, id: &str, sn: &str) -> Result<Fields, Error> {
        let request_body = request::InverterDetail { id, sn };

        self.post(endpoint::INVERTER_DETAIL, &request_body)
            .await
            .and_then(inverter_detail::fields)
    }

    async fn enrich(&self, inverter: &mut InverterRecord) {
        match (inverter.id.clone(), inverter.sn.clone()) {
            (Some(id), Some(sn)) => match self.get_inverter_detail(&id, &sn).await {
                Ok(detail) => inverter.merge(detail),
                Err(e) => log::warn!("No detail for inverter {} ({}): {}", id, sn, e),
            },
            _ => log::warn!(
                "Inverter without id or serial number in station {:?}, skipping detail",
                inverter.station_name()
            ),
        }
    }

    /// Fetch every inverter of every station, enriched with live detail.
    ///
    /// Only the station list is fatal. A station whose inverters cannot be listed contributes
    /// nothing, and an inverter whose detail cannot be read keeps its summary fields.
    pub async fn fetch_all(&self) -> Result<AggregateResult, Error> {
        let stations = self.list_stations(FIRST_PAGE, PAGE_SIZE).await?;

        if stations.is_empty() {
            log::info!("No stations returned");
            return Ok(AggregateResult::default());
        }

        let mut records = Vec::new();
        for station in &stations {
            let inverters = match self.list_inverters(station).await {
                Ok(inverters) => inverters,
                Err(e) => {
                    log::warn!(
                        "Skipping station {} ({}): {}",
                        station.id,
                        station.name,
                        e
                    );
                    continue;
                }
            };

            for mut inverter in inverters {
                self.enrich(&mut inverter).await;
                records.push(inverter);
            }
        }

        log::info!(
            "Fetched {} inverter(s) from {} station(s)",
            records.len(),
            stations.len()
        );
        Ok(AggregateResult { records })
    }

    /// One-shot check that the credentials work. Any failure is reported as
    /// `Error::CannotConnect`.
    pub async fn validate(&self) -> Result<AggregateResult, Error> {
        match self.fetch_all().await {
            Ok(result) => {
                log::info!(
                    "Successfully validated connection, found {} inverter(s)",
                    result.records.len()
                );
                Ok(result)
            }
            Err(e) => {
                log::error!("Error connecting to Solis Cloud: {}", e);
                Err(Error::CannotConnect(e.to_string()))
            }
        }
    }
}
