//! Deterministic serialization of an HTTP request into signing input.

use sha2::{Digest, Sha256};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The request URL carries no host, so no `host` header can be signed.
    #[error("request url has no host: {url}")]
    MissingHost { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Canonical form of one HTTP request.
///
/// Pure function of its inputs; the remote side rebuilds the same bytes
/// independently, so every detail of the layout is load-bearing.
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    /// Lower-cased header names with trimmed values, sorted by name.
    headers: Vec<(String, String)>,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Assemble the canonical request.
    ///
    /// The query string is taken from the URL as-is; the caller is
    /// responsible for having percent-encoded it in sorted key order.
    /// `host`, `x-amz-date`, and `x-amz-content-sha256` are injected on
    /// top of `extra_headers` before sorting.
    pub fn build(
        method: &str,
        url: &Url,
        extra_headers: &[(String, String)],
        payload: &[u8],
        amz_date: &str,
    ) -> Result<Self, SigningError> {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(SigningError::MissingHost {
                    url: url.to_string(),
                });
            }
        };

        let payload_hash = hash_payload(payload);

        let mut headers: Vec<(String, String)> = extra_headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_owned()))
            .collect();
        headers.push(("host".to_owned(), host));
        headers.push(("x-amz-date".to_owned(), amz_date.to_owned()));
        headers.push(("x-amz-content-sha256".to_owned(), payload_hash.clone()));
        headers.sort();

        let signed_headers = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        Ok(Self {
            method: method.to_uppercase(),
            uri: url.path().to_owned(),
            query: url.query().unwrap_or_default().to_owned(),
            headers,
            signed_headers,
            payload_hash,
        })
    }

    /// The exact byte sequence hashed into the string-to-sign.
    pub fn text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.method);
        out.push('\n');
        out.push_str(&self.uri);
        out.push('\n');
        out.push_str(&self.query);
        out.push('\n');
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.signed_headers);
        out.push('\n');
        out.push_str(&self.payload_hash);
        out
    }

    /// Semicolon-joined list of signed header names.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Sorted `(name, value)` pairs, `host` included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Hex SHA-256 of the request payload.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }
}

/// Hex SHA-256 digest of a request payload.
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Percent-encode a query component the way the signing protocol expects:
/// unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through, everything
/// else becomes `%XX` with uppercase hex. Spaces are `%20`, never `+`.
pub fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hex SHA-256 of the empty payload.
    const EMPTY_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn empty_payload_hash_matches_known_digest() {
        assert_eq!(hash_payload(b""), EMPTY_HASH);
    }

    #[test]
    fn canonical_text_layout_is_exact() {
        let url =
            Url::parse("https://sns.us-east-1.amazonaws.com/?Action=Publish&Version=2010-03-31")
                .unwrap();
        let canonical =
            CanonicalRequest::build("GET", &url, &[], b"", "20150830T123600Z").unwrap();

        let expected = format!(
            "GET\n\
             /\n\
             Action=Publish&Version=2010-03-31\n\
             host:sns.us-east-1.amazonaws.com\n\
             x-amz-content-sha256:{EMPTY_HASH}\n\
             x-amz-date:20150830T123600Z\n\
             \n\
             host;x-amz-content-sha256;x-amz-date\n\
             {EMPTY_HASH}"
        );
        assert_eq!(canonical.text(), expected);
        assert_eq!(
            canonical.signed_headers(),
            "host;x-amz-content-sha256;x-amz-date"
        );
    }

    #[test]
    fn header_names_are_lowercased_and_sorted() {
        let url = Url::parse("https://example.com/path?a=1").unwrap();
        let extra = vec![("X-Custom-Header".to_owned(), "  padded  ".to_owned())];
        let canonical =
            CanonicalRequest::build("get", &url, &extra, b"body", "20250101T000000Z").unwrap();

        let names: Vec<&str> = canonical
            .headers()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(
            names,
            ["host", "x-amz-content-sha256", "x-amz-date", "x-custom-header"]
        );
        let custom = canonical
            .headers()
            .iter()
            .find(|(name, _)| name == "x-custom-header")
            .unwrap();
        assert_eq!(custom.1, "padded");
        assert!(canonical.text().starts_with("GET\n/path\na=1\n"));
    }

    #[test]
    fn non_default_port_lands_in_host_header() {
        let url = Url::parse("https://localhost:8443/?x=1").unwrap();
        let canonical =
            CanonicalRequest::build("GET", &url, &[], b"", "20250101T000000Z").unwrap();
        assert!(canonical.text().contains("host:localhost:8443\n"));
    }

    #[test]
    fn query_is_preserved_verbatim() {
        let url = Url::parse("https://example.com/?Message=hi%20there&PhoneNumber=%2B12065551234")
            .unwrap();
        let canonical =
            CanonicalRequest::build("GET", &url, &[], b"", "20250101T000000Z").unwrap();
        assert!(canonical
            .text()
            .contains("\nMessage=hi%20there&PhoneNumber=%2B12065551234\n"));
    }

    #[test]
    fn uri_encode_covers_the_unreserved_set_only() {
        assert_eq!(uri_encode("AZaz09-_.~"), "AZaz09-_.~");
        assert_eq!(uri_encode("+12065551234"), "%2B12065551234");
        assert_eq!(uri_encode("hi there"), "hi%20there");
        assert_eq!(uri_encode("a/b=c&d"), "a%2Fb%3Dc%26d");
        assert_eq!(uri_encode("héllo"), "h%C3%A9llo");
    }
}
