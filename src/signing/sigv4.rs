//! Derived-key request signing.
//!
//! The signing key is never the raw secret: it is derived through a fixed
//! HMAC-SHA256 cascade that binds it to one day, one region, and one
//! service, and the final signature covers the canonical request built in
//! [`super::canonical`]. The whole computation is a pure function of its
//! inputs, so fixed credentials and a fixed timestamp always reproduce the
//! same signature.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::domain::{Region, SecretKey, SigningCredentials};
use crate::signing::canonical::{CanonicalRequest, SigningError};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const KEY_PREFIX: &str = "AWS4";
const SERVICE: &str = "sns";
const SCOPE_TERMINATOR: &str = "aws4_request";

#[derive(Debug, Clone)]
/// Everything a signature depends on besides the request itself.
///
/// Constructed fresh per request and dropped after signing; the timestamp
/// is baked into the signature, so a reused context past the remote
/// validity window signs requests the provider will reject.
pub struct SigningContext {
    credentials: SigningCredentials,
    region: Region,
    timestamp: DateTime<Utc>,
}

impl SigningContext {
    /// Bind credentials and region to a request timestamp.
    pub fn new(credentials: SigningCredentials, region: Region, timestamp: DateTime<Utc>) -> Self {
        Self {
            credentials,
            region,
            timestamp,
        }
    }

    /// Compact timestamp (`YYYYMMDDTHHMMSSZ`), seconds precision.
    pub fn amz_date(&self) -> String {
        self.timestamp.format("%Y%m%dT%H%M%SZ").to_string()
    }

    /// Date stamp (`YYYYMMDD`) keying the first cascade stage.
    pub fn date_stamp(&self) -> String {
        self.timestamp.format("%Y%m%d").to_string()
    }

    /// `date/region/service/aws4_request` scope string.
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date_stamp(),
            self.region.as_str(),
            SERVICE,
            SCOPE_TERMINATOR
        )
    }
}

/// Sign one request and return the headers to send with it.
///
/// The returned set carries `x-amz-date`, `x-amz-content-sha256`, any
/// caller-supplied headers, and the final `authorization` header. The
/// `host` header participates in the signature but is left to the HTTP
/// client, which derives it from the URL.
pub fn sign_request(
    method: &str,
    url: &Url,
    extra_headers: &[(String, String)],
    payload: &[u8],
    context: &SigningContext,
) -> Result<Vec<(String, String)>, SigningError> {
    let amz_date = context.amz_date();
    let canonical = CanonicalRequest::build(method, url, extra_headers, payload, &amz_date)?;

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{}\n{}",
        context.credential_scope(),
        hex::encode(Sha256::digest(canonical.text().as_bytes()))
    );

    let signing_key = derive_key(
        context.credentials.secret_key(),
        &context.date_stamp(),
        context.region.as_str(),
        SERVICE,
    );
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={signature}",
        context.credentials.access_key_id().as_str(),
        context.credential_scope(),
        canonical.signed_headers(),
    );

    let mut headers: Vec<(String, String)> = canonical
        .headers()
        .iter()
        .filter(|(name, _)| name != "host")
        .cloned()
        .collect();
    headers.push(("authorization".to_owned(), authorization));
    Ok(headers)
}

/// Four-stage key cascade, each stage keyed by the previous stage's output.
fn derive_key(secret: &SecretKey, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let seed = format!("{KEY_PREFIX}{}", secret.as_str());
    let k_date = hmac_sha256(seed.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
