//! SMS verification dispatch over an SNS-compatible publish API.
//!
//! The crate sequences one dispatch call end to end: phone-number
//! normalization and validation, optional VoIP screening (remote carrier
//! lookup or a local heuristic cascade), from-scratch request signing via
//! the canonical-request + derived-key HMAC-SHA256 protocol, and targeted
//! extraction of the publish reply. The design follows a domain layer of
//! strong types, a transport layer for wire-format quirks, and a client
//! layer orchestrating requests.
//!
//! ```rust,no_run
//! use smsgate::{
//!     AccessKeyId, DispatchClient, DispatchOptions, DispatchRequest, Region, SecretKey,
//!     SigningCredentials, VoipStrategy,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsgate::DispatchError> {
//!     let credentials = SigningCredentials::new(
//!         AccessKeyId::new("AKIA...")?,
//!         SecretKey::new("...")?,
//!     );
//!     let client = DispatchClient::new(credentials, Region::new("us-east-1")?);
//!
//!     let request = DispatchRequest::with_generated_code("206-555-1234", 6).options(
//!         DispatchOptions {
//!             voip_screening: Some(VoipStrategy::Heuristic),
//!             ..DispatchOptions::default()
//!         },
//!     );
//!     let report = client.send_verification(&request).await;
//!     println!("success: {}, message id: {:?}", report.success, report.message_id);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod screening;
pub mod signing;
mod transport;

pub use client::{DispatchClient, DispatchClientBuilder, DispatchError};
pub use domain::{
    mask_phone, AccessKeyId, DispatchOptions, DispatchReport, DispatchRequest, MessageId,
    MessageTemplate, NumberType, PhoneNormalizer, PhoneRecord, Region, SecretKey, SenderId,
    SigningCredentials, SmsClass, ValidationError, VerificationCode, VoipStrategy,
    DEFAULT_CODE_TTL_SECS,
};
pub use screening::{HeuristicClassifier, VoipClassifier, VoipRule, VoipVerdict};
pub use signing::{sign_request, CanonicalRequest, SigningContext, SigningError};
