use std::fmt;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::domain::validation::ValidationError;

static CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{4,}$").expect("code regex is well-formed"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Access key id identifying the signing credentials.
///
/// Invariant: non-empty after trimming.
pub struct AccessKeyId(String);

impl AccessKeyId {
    /// Create a validated [`AccessKeyId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "access key id",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Secret signing key.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
/// The value never appears in `Debug` output; it is read only while a
/// signature is being computed.
pub struct SecretKey(String);

impl SecretKey {
    /// Create a validated [`SecretKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty {
                field: "secret key",
            });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(****)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Access key id + secret key pair used to sign publish requests.
pub struct SigningCredentials {
    access_key_id: AccessKeyId,
    secret_key: SecretKey,
}

impl SigningCredentials {
    /// Pair an access key id with its secret.
    pub fn new(access_key_id: AccessKeyId, secret_key: SecretKey) -> Self {
        Self {
            access_key_id,
            secret_key,
        }
    }

    pub fn access_key_id(&self) -> &AccessKeyId {
        &self.access_key_id
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Provider region, e.g. `us-east-1`.
///
/// Invariant: non-empty, lowercase ASCII alphanumerics and dashes only.
/// The region is baked into the credential scope, so a malformed value
/// would produce signatures the provider can never match.
pub struct Region(String);

impl Region {
    /// Create a validated [`Region`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "region" });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError::InvalidRegion {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated region.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Alphanumeric sender id shown as the SMS originator.
///
/// Invariant: non-empty after trimming, at most 11 characters.
pub struct SenderId(String);

impl SenderId {
    /// Message attribute name carrying the sender id on the wire.
    pub const ATTRIBUTE: &'static str = "AWS.SNS.SMS.SenderID";

    /// Maximum sender id length accepted by the provider.
    pub const MAX_LEN: usize = 11;

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "sender id" });
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(ValidationError::SenderIdTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Routing class for the message.
pub enum SmsClass {
    /// Time-sensitive messages (verification codes); routed for reliability.
    #[default]
    Transactional,
    /// Marketing messages; routed for cost.
    Promotional,
}

impl SmsClass {
    /// Message attribute name carrying the class on the wire.
    pub const ATTRIBUTE: &'static str = "AWS.SNS.SMS.SMSType";

    /// Wire value for this class.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transactional => "Transactional",
            Self::Promotional => "Promotional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One-time verification code sent to the recipient.
///
/// Invariant: at least 4 alphanumeric characters, nothing else.
pub struct VerificationCode(String);

impl VerificationCode {
    /// Minimum accepted code length.
    pub const MIN_LEN: usize = 4;

    /// Create a validated [`VerificationCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if !CODE_REGEX.is_match(trimmed) {
            return Err(ValidationError::InvalidCode {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a random digit-only code of at least [`Self::MIN_LEN`] digits.
    pub fn generate(length: usize) -> Self {
        let length = length.max(Self::MIN_LEN);
        let mut rng = rand::thread_rng();
        let digits = (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(digits)
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message text with a `{code}` placeholder for the verification code.
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Placeholder replaced by the verification code at render time.
    pub const CODE_PLACEHOLDER: &'static str = "{code}";

    /// Create a validated [`MessageTemplate`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "message template",
            });
        }
        if !value.contains(Self::CODE_PLACEHOLDER) {
            return Err(ValidationError::MissingCodePlaceholder);
        }
        Ok(Self(value))
    }

    /// Substitute the code into the template.
    pub fn render(&self, code: &VerificationCode) -> String {
        self.0.replace(Self::CODE_PLACEHOLDER, code.as_str())
    }

    /// Borrow the template text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self("Your verification code is {code}".to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Provider-assigned message id returned on a successful publish.
///
/// Invariant: non-empty after trimming.
pub struct MessageId(String);

impl MessageId {
    /// Create a validated [`MessageId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "message id",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated message id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
