//! Client layer: orchestrates one verification dispatch end to end.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{
    mask_phone, AccessKeyId, DispatchReport, DispatchRequest, MessageId, PhoneNormalizer, Region,
    SecretKey, SenderId, SigningCredentials, SmsClass, ValidationError, VerificationCode,
    VoipStrategy,
};
use crate::screening::{HeuristicClassifier, LookupClassifier, VoipClassifier, VoipRule};
use crate::signing::{sign_request, SigningContext};
use crate::transport::{
    decode_publish_response, encode_publish_query, HttpTransport, PublishReply, ReqwestTransport,
};

fn default_publish_endpoint(region: &Region) -> String {
    format!("https://sns.{}.amazonaws.com/", region.as_str())
}

#[derive(Debug, thiserror::Error)]
/// Failures a dispatch can run into.
///
/// None of these escape [`DispatchClient::send_verification`]; they are
/// converted into the uniform [`DispatchReport`] failure shape at the
/// orchestrator boundary.
pub enum DispatchError {
    /// The caller supplied an invalid code, phone number, or option value.
    #[error("validation error: {0}")]
    Input(#[from] ValidationError),

    /// VoIP screening rejected the number; nothing was dispatched.
    #[error("voip number rejected ({})", .rule.as_str())]
    Policy { rule: VoipRule },

    /// Signing credentials are absent from the environment.
    #[error("missing signing credentials: {0}")]
    Credentials(&'static str),

    /// The provider returned an explicit error code and message.
    #[error("provider error: {code}: {message}")]
    RemoteProtocol { code: String, message: String },

    /// Non-successful HTTP status without a recognizable error body.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The reply body matched none of the expected shapes.
    #[error("unrecognized provider response")]
    UnparseableResponse,
}

impl DispatchError {
    /// Caller-facing summary line for the failure report.
    fn summary(&self) -> &'static str {
        match self {
            Self::Input(ValidationError::InvalidCode { .. }) => "invalid verification code format",
            Self::Input(ValidationError::InvalidPhoneNumber { .. }) => {
                "invalid phone number format"
            }
            Self::Input(_) => "invalid request",
            Self::Policy { .. } => "VoIP numbers are not allowed",
            Self::Credentials(_) => "missing SMS provider credentials",
            Self::RemoteProtocol { .. } => "SMS provider rejected the request",
            Self::HttpStatus { .. } => "SMS provider request failed",
            Self::Transport(_) => "failed to reach SMS provider",
            Self::UnparseableResponse => "unrecognized SMS provider response",
        }
    }

    /// Lower-level message carried alongside the summary, when one exists.
    fn details(&self) -> Option<String> {
        match self {
            Self::Input(err) => Some(err.to_string()),
            Self::Policy { rule } => Some(rule.as_str().to_owned()),
            Self::Credentials(message) => Some((*message).to_owned()),
            Self::RemoteProtocol { code, message } => Some(format!("{code}: {message}")),
            Self::HttpStatus { status, body } => Some(match body {
                Some(body) => format!("HTTP {status}: {body}"),
                None => format!("HTTP {status}"),
            }),
            Self::Transport(err) => Some(err.to_string()),
            Self::UnparseableResponse => None,
        }
    }

    fn into_report(self) -> DispatchReport {
        let is_voip = matches!(self, Self::Policy { .. }).then_some(true);
        DispatchReport::failed(self.summary(), self.details(), is_voip)
    }
}

#[derive(Debug, Clone)]
/// Builder for [`DispatchClient`].
///
/// Use this when you need to customize endpoints, the sender identity, the
/// HTTP timeout, or the user-agent.
pub struct DispatchClientBuilder {
    credentials: SigningCredentials,
    region: Region,
    sender_id: Option<SenderId>,
    sms_class: SmsClass,
    publish_endpoint: String,
    lookup_endpoint: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl DispatchClientBuilder {
    /// Create a builder with the default publish endpoint for the region.
    pub fn new(credentials: SigningCredentials, region: Region) -> Self {
        let publish_endpoint = default_publish_endpoint(&region);
        Self {
            credentials,
            region,
            sender_id: None,
            sms_class: SmsClass::default(),
            publish_endpoint,
            lookup_endpoint: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Set the alphanumeric sender id attached to outgoing messages.
    pub fn sender_id(mut self, sender_id: SenderId) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    /// Set the routing class for outgoing messages.
    pub fn sms_class(mut self, sms_class: SmsClass) -> Self {
        self.sms_class = sms_class;
        self
    }

    /// Override the publish endpoint URL.
    pub fn publish_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.publish_endpoint = endpoint.into();
        self
    }

    /// Set the carrier-lookup endpoint used by [`VoipStrategy::Lookup`].
    pub fn lookup_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.lookup_endpoint = Some(endpoint.into());
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`DispatchClient`].
    pub fn build(self) -> Result<DispatchClient, DispatchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| DispatchError::Transport(Box::new(err)))?;

        Ok(DispatchClient {
            credentials: self.credentials,
            region: self.region,
            sender_id: self.sender_id,
            sms_class: self.sms_class,
            publish_endpoint: self.publish_endpoint,
            lookup_endpoint: self.lookup_endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Verification dispatch client.
///
/// Sequences one dispatch: code and phone validation, optional VoIP
/// screening, message rendering, request signing, publish, and reply
/// extraction. All state is call-scoped; concurrent calls share nothing
/// but the HTTP connection pool.
pub struct DispatchClient {
    credentials: SigningCredentials,
    region: Region,
    sender_id: Option<SenderId>,
    sms_class: SmsClass,
    publish_endpoint: String,
    lookup_endpoint: Option<String>,
    http: Arc<dyn HttpTransport>,
}

impl DispatchClient {
    /// Create a client with the default publish endpoint for the region.
    ///
    /// For more customization, use [`DispatchClient::builder`].
    pub fn new(credentials: SigningCredentials, region: Region) -> Self {
        let publish_endpoint = default_publish_endpoint(&region);
        Self {
            credentials,
            region,
            sender_id: None,
            sms_class: SmsClass::default(),
            publish_endpoint,
            lookup_endpoint: None,
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Create a client from `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`.
    pub fn from_env(region: Region) -> Result<Self, DispatchError> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| DispatchError::Credentials("AWS_ACCESS_KEY_ID is not set"))?;
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| DispatchError::Credentials("AWS_SECRET_ACCESS_KEY is not set"))?;
        let credentials = SigningCredentials::new(
            AccessKeyId::new(access_key_id)
                .map_err(|_| DispatchError::Credentials("AWS_ACCESS_KEY_ID is empty"))?,
            SecretKey::new(secret_key)
                .map_err(|_| DispatchError::Credentials("AWS_SECRET_ACCESS_KEY is empty"))?,
        );
        Ok(Self::new(credentials, region))
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: SigningCredentials, region: Region) -> DispatchClientBuilder {
        DispatchClientBuilder::new(credentials, region)
    }

    /// Dispatch one verification message.
    ///
    /// Never fails: every outcome, including validation and policy
    /// rejections, is folded into the returned [`DispatchReport`].
    pub async fn send_verification(&self, request: &DispatchRequest) -> DispatchReport {
        match self.dispatch(request).await {
            Ok(report) => report,
            Err(err) => {
                warn!("verification dispatch failed: {err}");
                err.into_report()
            }
        }
    }

    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchReport, DispatchError> {
        let options = request.dispatch_options();
        let normalizer = options.normalizer;

        let code = VerificationCode::new(request.code())?;

        let phone = normalizer.normalize(request.phone());
        if !normalizer.is_valid(&phone) {
            return Err(ValidationError::InvalidPhoneNumber { input: phone }.into());
        }
        debug!("dispatching verification to {}", mask_phone(&phone));

        // Screening gates dispatch: a rejected number must never reach the
        // transport, so the two calls are strictly sequential.
        if let Some(strategy) = options.voip_screening {
            if let Some(classifier) = self.classifier(strategy, normalizer) {
                let verdict = classifier.classify(&phone).await;
                if verdict.is_voip {
                    info!(
                        "blocked dispatch to {}: voip rule matched ({})",
                        mask_phone(&phone),
                        verdict.rule.as_str()
                    );
                    return Err(DispatchError::Policy { rule: verdict.rule });
                }
            }
        }

        let message = request.message_template().render(&code);
        let message_id = self.publish(&message, &phone).await?;
        info!(
            "verification code sent to {} (message id: {})",
            mask_phone(&phone),
            message_id.as_ref().map_or("none", MessageId::as_str)
        );

        Ok(DispatchReport::sent(
            message_id.map(|id| id.as_str().to_owned()),
            &code,
            phone,
            options.code_ttl_secs,
        ))
    }

    fn classifier(
        &self,
        strategy: VoipStrategy,
        normalizer: PhoneNormalizer,
    ) -> Option<VoipClassifier> {
        match strategy {
            VoipStrategy::Heuristic => Some(VoipClassifier::Heuristic(HeuristicClassifier::new(
                normalizer,
            ))),
            VoipStrategy::Lookup => match &self.lookup_endpoint {
                Some(endpoint) => Some(VoipClassifier::Lookup(LookupClassifier::new(
                    endpoint.clone(),
                    Arc::clone(&self.http),
                ))),
                None => {
                    warn!("no lookup endpoint configured; VoIP screening skipped");
                    None
                }
            },
        }
    }

    async fn publish(
        &self,
        message: &str,
        phone: &str,
    ) -> Result<Option<MessageId>, DispatchError> {
        let query =
            encode_publish_query(message, phone, self.sender_id.as_ref(), self.sms_class);
        let url = Url::parse(&format!("{}?{query}", self.publish_endpoint))
            .map_err(|err| DispatchError::Transport(Box::new(err)))?;

        // The context lives exactly as long as the signing operation; the
        // timestamp it carries is baked into the signature.
        let context = SigningContext::new(
            self.credentials.clone(),
            self.region.clone(),
            Utc::now(),
        );
        let headers = sign_request("GET", &url, &[], b"", &context)
            .map_err(|err| DispatchError::Transport(Box::new(err)))?;

        let response = self
            .http
            .get(url.as_str(), headers)
            .await
            .map_err(DispatchError::Transport)?;

        let reply = decode_publish_response(&response.body);
        if !(200..=299).contains(&response.status) {
            return match reply {
                PublishReply::Failed { code, message } => {
                    Err(DispatchError::RemoteProtocol { code, message })
                }
                _ => {
                    let body = if response.body.trim().is_empty() {
                        None
                    } else {
                        Some(response.body)
                    };
                    Err(DispatchError::HttpStatus {
                        status: response.status,
                        body,
                    })
                }
            };
        }

        match reply {
            PublishReply::Published { message_id, .. } => {
                Ok(Some(MessageId::new(message_id)?))
            }
            PublishReply::Failed { code, message } => {
                Err(DispatchError::RemoteProtocol { code, message })
            }
            PublishReply::Unrecognized { raw } => {
                if raw.trim().is_empty() {
                    return Err(DispatchError::UnparseableResponse);
                }
                debug!("publish reply matched no known shape, keeping it: {raw}");
                Ok(None)
            }
        }
    }
}
