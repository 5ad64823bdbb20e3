use crate::domain::phone::PhoneNormalizer;
use crate::domain::value::MessageTemplate;

/// Default number of seconds a dispatched code is advertised as valid.
pub const DEFAULT_CODE_TTL_SECS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// VoIP screening strategy, selected per request.
///
/// Adding a strategy means adding a variant here and a classifier for it;
/// the dispatch pipeline is untouched.
pub enum VoipStrategy {
    /// Ask an external carrier-intelligence endpoint. Fails open.
    Lookup,
    /// Local rule cascade over the number itself. No network I/O.
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Per-request configuration, one field per recognized option.
pub struct DispatchOptions {
    /// Normalization/validation strategy for the recipient number.
    pub normalizer: PhoneNormalizer,
    /// VoIP screening strategy; `None` sends to any valid number.
    pub voip_screening: Option<VoipStrategy>,
    /// Advertised code lifetime, reported back to the caller.
    pub code_ttl_secs: u32,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            normalizer: PhoneNormalizer::default(),
            voip_screening: None,
            code_ttl_secs: DEFAULT_CODE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone)]
/// One verification dispatch: recipient, code, message shape, options.
///
/// Immutable once built. The phone number and code are carried raw here;
/// the dispatch pipeline owns normalization and validation so that every
/// rejection surfaces as a structured report rather than a constructor
/// error.
pub struct DispatchRequest {
    phone: String,
    code: String,
    template: MessageTemplate,
    options: DispatchOptions,
}

impl DispatchRequest {
    /// Build a request with the default template and options.
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
            template: MessageTemplate::default(),
            options: DispatchOptions::default(),
        }
    }

    /// Build a request with a freshly generated digit code.
    pub fn with_generated_code(phone: impl Into<String>, code_len: usize) -> Self {
        let code = crate::domain::value::VerificationCode::generate(code_len);
        Self::new(phone, code.as_str())
    }

    /// Replace the message template.
    pub fn template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replace the options.
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Raw phone input as supplied by the caller.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Raw verification code as supplied by the caller.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message template.
    pub fn message_template(&self) -> &MessageTemplate {
        &self.template
    }

    /// The request options.
    pub fn dispatch_options(&self) -> &DispatchOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::VerificationCode;

    #[test]
    fn defaults_are_permissive() {
        let options = DispatchOptions::default();
        assert_eq!(options.normalizer, PhoneNormalizer::Basic);
        assert_eq!(options.voip_screening, None);
        assert_eq!(options.code_ttl_secs, DEFAULT_CODE_TTL_SECS);
    }

    #[test]
    fn request_builders_compose() {
        let request = DispatchRequest::new("2065551234", "123456")
            .template(MessageTemplate::new("Code: {code}").unwrap())
            .options(DispatchOptions {
                voip_screening: Some(VoipStrategy::Heuristic),
                ..DispatchOptions::default()
            });
        assert_eq!(request.phone(), "2065551234");
        assert_eq!(request.code(), "123456");
        assert_eq!(request.message_template().as_str(), "Code: {code}");
        assert_eq!(
            request.dispatch_options().voip_screening,
            Some(VoipStrategy::Heuristic)
        );
    }

    #[test]
    fn generated_code_requests_carry_a_valid_code() {
        let request = DispatchRequest::with_generated_code("2065551234", 6);
        assert!(VerificationCode::new(request.code()).is_ok());
        assert_eq!(request.code().len(), 6);
    }
}
