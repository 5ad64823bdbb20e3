//! Domain layer: strong types with validation and invariants (no I/O).

pub(crate) mod phone;
mod request;
mod response;
mod validation;
mod value;

pub use phone::{mask_phone, NumberType, PhoneNormalizer, PhoneRecord};
pub use request::{DispatchOptions, DispatchRequest, VoipStrategy, DEFAULT_CODE_TTL_SECS};
pub use response::DispatchReport;
pub use validation::ValidationError;
pub use value::{
    AccessKeyId, MessageId, MessageTemplate, Region, SecretKey, SenderId, SigningCredentials,
    SmsClass, VerificationCode,
};
