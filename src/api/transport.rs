use super::endpoint::Endpoint;
use super::sign::{self, SignedHeaders};
use super::Error;
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a signed POST and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        endpoint: &Endpoint,
        headers: &SignedHeaders,
        body: Vec<u8>,
    ) -> Result<String, Error>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    api_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .or(Err(Error::InternalError))?;

        let mut api_url = api_url.into();
        /* endpoints carry their own leading slash */
        while api_url.ends_with('/') {
            api_url.pop();
        }

        Ok(HttpTransport { api_url, client })
    }
}

/// Map failed request or Non-2xx API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        Some(http::StatusCode::UNAUTHORIZED) | Some(http::StatusCode::FORBIDDEN) => {
            Error::LoginError(error.to_string())
        }
        _ => Error::TransportError(error.to_string()),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        endpoint: &Endpoint,
        headers: &SignedHeaders,
        body: Vec<u8>,
    ) -> Result<String, Error> {
        let url = format!("{}{}", self.api_url, endpoint);

        self.client
            .post(url)
            .header(header::CONTENT_TYPE, sign::CONTENT_TYPE)
            .header("Content-MD5", &headers.content_md5)
            .header(header::DATE, &headers.date)
            .header(header::AUTHORIZATION, &headers.authorization)
            .body(body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(map_api_err)?
            .text()
            .await
            .map_err(|e| Error::TransportError(format!("Error reading API response: {}", e)))
    }
}
