//! External carrier-intelligence VoIP lookup.
//!
//! This strategy fails open: a network failure, a non-2xx reply, malformed
//! JSON, or missing fields all classify as "not VoIP" so that a flaky
//! enrichment service can never block legitimate traffic. Each fail-open
//! path is logged at `warn` level.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::domain::mask_phone;
use crate::signing::uri_encode;
use crate::transport::HttpTransport;

use super::{VoipRule, VoipVerdict};

/// Carrier names whose presence (substring, case-insensitive) marks a
/// number as VoIP.
const VOIP_CARRIER_NAMES: &[&str] = &[
    "google voice",
    "twilio",
    "bandwidth",
    "textnow",
    "pinger",
    "onvoy",
    "vonage",
    "magicjack",
    "skype",
    "sinch",
    "plivo",
    "telnyx",
    "level 3",
    "grasshopper",
];

/// Line types treated as dispatch risks. `mobile` is included as a
/// liveness-risk signal, not only literal VoIP service.
const RISK_LINE_TYPES: &[&str] = &["voip", "mobile"];

#[derive(Debug, Clone, Deserialize)]
struct LookupBody {
    #[serde(default)]
    carrier: Option<CarrierInfo>,
    #[serde(default)]
    portability: Option<PortabilityInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct CarrierInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    carrier_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PortabilityInfo {
    #[serde(default)]
    line_type: Option<String>,
}

/// Carrier-lookup VoIP classifier.
pub struct LookupClassifier {
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl LookupClassifier {
    pub(crate) fn new(endpoint: String, http: Arc<dyn HttpTransport>) -> Self {
        Self { endpoint, http }
    }

    /// Look the number up and classify from the reply.
    pub async fn classify(&self, phone: &str) -> VoipVerdict {
        let url = format!("{}?phone={}", self.endpoint, uri_encode(phone));
        let response = match self.http.get(&url, Vec::new()).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "carrier lookup for {} failed, treating as not VoIP: {err}",
                    mask_phone(phone)
                );
                return VoipVerdict::clear();
            }
        };

        if !(200..=299).contains(&response.status) {
            warn!(
                "carrier lookup for {} returned HTTP {}, treating as not VoIP",
                mask_phone(phone),
                response.status
            );
            return VoipVerdict::clear();
        }

        match serde_json::from_str::<LookupBody>(&response.body) {
            Ok(body) => verdict_from_body(&body),
            Err(err) => {
                warn!(
                    "carrier lookup for {} returned malformed JSON, treating as not VoIP: {err}",
                    mask_phone(phone)
                );
                VoipVerdict::clear()
            }
        }
    }
}

fn verdict_from_body(body: &LookupBody) -> VoipVerdict {
    if let Some(carrier) = &body.carrier {
        if let Some(name) = &carrier.name {
            let name = name.to_lowercase();
            if VOIP_CARRIER_NAMES.iter().any(|known| name.contains(known)) {
                return VoipVerdict::voip(VoipRule::CarrierName);
            }
        }
        if let Some(carrier_type) = &carrier.carrier_type {
            if carrier_type.eq_ignore_ascii_case("voip") {
                return VoipVerdict::voip(VoipRule::CarrierType);
            }
        }
    }

    if let Some(portability) = &body.portability {
        if let Some(line_type) = &portability.line_type {
            let line_type = line_type.to_lowercase();
            if RISK_LINE_TYPES.contains(&line_type.as_str()) {
                return VoipVerdict::voip(VoipRule::LineType);
            }
        }
    }

    VoipVerdict::clear()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::transport::{BoxError, BoxFuture, HttpResponse};

    use super::*;

    struct FakeTransport {
        state: Arc<Mutex<FakeState>>,
    }

    struct FakeState {
        last_url: Option<String>,
        response: Result<HttpResponse, String>,
    }

    impl FakeTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    last_url: None,
                    response: Ok(HttpResponse {
                        status,
                        body: body.to_owned(),
                    }),
                })),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    last_url: None,
                    response: Err(message.to_owned()),
                })),
            }
        }

        fn last_url(&self) -> Option<String> {
            self.state.lock().unwrap().last_url.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn get<'a>(
            &'a self,
            url: &'a str,
            _headers: Vec<(String, String)>,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async move {
                let mut state = self.state.lock().unwrap();
                state.last_url = Some(url.to_owned());
                match &state.response {
                    Ok(response) => Ok(response.clone()),
                    Err(message) => Err(message.clone().into()),
                }
            })
        }
    }

    fn make_classifier(transport: FakeTransport) -> (LookupClassifier, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (
            LookupClassifier::new(
                "https://lookup.example/v1/phone".to_owned(),
                Arc::clone(&transport) as Arc<dyn HttpTransport>,
            ),
            transport,
        )
    }

    #[tokio::test]
    async fn queries_the_endpoint_with_the_encoded_number() {
        let (classifier, transport) = make_classifier(FakeTransport::replying(200, "{}"));
        classifier.classify("+12065551234").await;
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://lookup.example/v1/phone?phone=%2B12065551234")
        );
    }

    #[tokio::test]
    async fn known_voip_carrier_name_is_voip() {
        let body = r#"{"carrier": {"name": "Twilio Inc.", "type": "wireless"}}"#;
        let (classifier, _) = make_classifier(FakeTransport::replying(200, body));
        let verdict = classifier.classify("+12065551234").await;
        assert!(verdict.is_voip);
        assert_eq!(verdict.rule, VoipRule::CarrierName);
    }

    #[tokio::test]
    async fn voip_carrier_type_is_voip() {
        let body = r#"{"carrier": {"name": "Some Telecom", "type": "VoIP"}}"#;
        let (classifier, _) = make_classifier(FakeTransport::replying(200, body));
        let verdict = classifier.classify("+12065551234").await;
        assert!(verdict.is_voip);
        assert_eq!(verdict.rule, VoipRule::CarrierType);
    }

    #[tokio::test]
    async fn risky_line_types_are_voip() {
        for line_type in ["voip", "Mobile"] {
            let body = format!(r#"{{"portability": {{"line_type": "{line_type}"}}}}"#);
            let (classifier, _) = make_classifier(FakeTransport::replying(200, &body));
            let verdict = classifier.classify("+12065551234").await;
            assert!(verdict.is_voip, "line_type {line_type}");
            assert_eq!(verdict.rule, VoipRule::LineType);
        }
    }

    #[tokio::test]
    async fn landline_carrier_is_clear() {
        let body = r#"
        {
          "carrier": {"name": "CenturyLink", "type": "landline"},
          "portability": {"line_type": "landline"}
        }
        "#;
        let (classifier, _) = make_classifier(FakeTransport::replying(200, body));
        assert!(!classifier.classify("+12065551234").await.is_voip);
    }

    #[tokio::test]
    async fn fails_open_on_transport_error() {
        let (classifier, _) = make_classifier(FakeTransport::failing("connection refused"));
        assert!(!classifier.classify("+12065551234").await.is_voip);
    }

    #[tokio::test]
    async fn fails_open_on_http_error_status() {
        let (classifier, _) = make_classifier(FakeTransport::replying(500, "oops"));
        assert!(!classifier.classify("+12065551234").await.is_voip);
    }

    #[tokio::test]
    async fn fails_open_on_malformed_json() {
        let (classifier, _) = make_classifier(FakeTransport::replying(200, "{ not json"));
        assert!(!classifier.classify("+12065551234").await.is_voip);
    }

    #[tokio::test]
    async fn fails_open_on_missing_fields() {
        let (classifier, _) = make_classifier(FakeTransport::replying(200, "{}"));
        assert!(!classifier.classify("+12065551234").await.is_voip);

        let (classifier, _) = make_classifier(FakeTransport::replying(200, r#"{"carrier": {}}"#));
        assert!(!classifier.classify("+12065551234").await.is_voip);
    }
}
