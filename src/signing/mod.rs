//! Request signing: canonical serialization plus the derived-key
//! HMAC-SHA256 cascade. No signing library is involved; the remote side
//! recomputes the signature bit-for-bit, so the layout here is the
//! protocol.

mod canonical;
mod sigv4;

pub use canonical::{hash_payload, uri_encode, CanonicalRequest, SigningError};
pub use sigv4::{sign_request, SigningContext};
