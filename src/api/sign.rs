//! Request signing for the SolisCloud API.
//!
//! Every request carries `Content-MD5`, `Date` and `Authorization` headers. The
//! authorization value is `API {key_id}:{signature}` where the signature is a
//! base64 encoded HMAC-SHA1 over
//!
//! ```text
//! POST\n{Content-MD5}\napplication/json\n{Date}\n{resource}
//! ```
//!
//! The content type that is signed has no charset, even though requests are
//! sent with `application/json;charset=UTF-8`. The server only accepts the
//! former.

use super::Error;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const METHOD: &str = "POST";

/// Content type used in the canonical string.
pub const SIGNING_CONTENT_TYPE: &str = "application/json";

/// Content type sent in the `Content-Type` header.
pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub content_md5: String,
    pub date: String,
}

/// Current time formatted for the `Date` header.
pub fn gmt_now() -> String {
    chrono::Utc::now().format(DATE_FORMAT).to_string()
}

/// Base64 encoded MD5 digest of the exact body bytes.
pub fn content_md5(body: &[u8]) -> String {
    general_purpose::STANDARD.encode(Md5::digest(body))
}

pub fn canonical_string(content_md5: &str, date: &str, resource: &str) -> String {
    [METHOD, content_md5, SIGNING_CONTENT_TYPE, date, resource].join("\n")
}

/// Base64 encoded HMAC-SHA1 of `canonical` keyed with `secret`.
pub fn signature(secret: &str, canonical: &str) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).or(Err(Error::InternalError))?;
    mac.update(canonical.as_bytes());
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub fn sign(
    key_id: &str,
    secret: &str,
    body: &[u8],
    date: &str,
    resource: &str,
) -> Result<SignedHeaders, Error> {
    let content_md5 = content_md5(body);
    let canonical = canonical_string(&content_md5, date, resource);
    let signature = signature(secret, &canonical)?;

    Ok(SignedHeaders {
        authorization: format!("API {}:{}", key_id, signature),
        content_md5,
        date: date.to_owned(),
    })
}
