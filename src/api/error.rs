use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Vendor rejected the request signature or key (HTTP 401/403).
    #[error("authentication rejected: {0}")]
    LoginError(String),
    /// Envelope reported `success != true`; carries the vendor message.
    #[error("API error: {0}")]
    ApiError(String),
    /// Connection failure, timeout or non-2xx HTTP status.
    #[error("transport error: {0}")]
    TransportError(String),
    #[error("unexpected API response")]
    UnexpectedApiResponse,
    /// Response body and the reason it could not be decoded.
    #[error("invalid response ({1}): {0}")]
    InvalidResponse(String, String),
    #[error("rate exceeded: {0}")]
    RateExceeded(String),
    #[error("cannot connect: {0}")]
    CannotConnect(String),
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("format error")]
    FormatError,
    #[error("internal error")]
    InternalError,
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::ConfigError(error.to_string())
    }
}

fn html(status: Status, error: String) -> response::Result<'static> {
    Response::build()
        .status(status)
        .sized_body(error.len(), Cursor::new(error))
        .header(ContentType::new("text", "html"))
        .ok()
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Error::RateExceeded(s) => html(
                Status::TooManyRequests,
                format!("<html><body><h3>429 Too Many Requests</h3>Downstream API response: <code>{}</code></body></html>", s),
            ),
            Error::LoginError(s) => html(
                Status::Forbidden,
                format!("<html><body><h3>403 Forbidden</h3>Error while authenticating to downstream API: <code>{}</code></body></html>", s),
            ),
            Error::TransportError(s) | Error::ApiError(s) | Error::CannotConnect(s) => html(
                Status::BadGateway,
                format!("<html><body><h3>502 Bad Gateway</h3>Downstream API unavailable: <code>{}</code></body></html>", s),
            ),
            _ => html(
                Status::InternalServerError,
                format!(
                    "<html><body><h3>Unknown exception</h3><code>{}</code></body></html>",
                    self
                ),
            ),
        }
    }
}
