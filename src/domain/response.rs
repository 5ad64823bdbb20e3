use serde::Serialize;

use crate::domain::value::VerificationCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Terminal result of one dispatch call, shaped for the surrounding HTTP
/// layer to return verbatim.
///
/// Exactly one of the success/failure field groups is populated; absent
/// fields are omitted from the serialized form.
pub struct DispatchReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_voip: Option<bool>,
}

impl DispatchReport {
    /// Report a dispatched verification.
    pub fn sent(
        message_id: Option<String>,
        code: &VerificationCode,
        phone_number: impl Into<String>,
        expires_in: u32,
    ) -> Self {
        Self {
            success: true,
            message: Some("verification code sent".to_owned()),
            message_id,
            code: Some(code.as_str().to_owned()),
            phone_number: Some(phone_number.into()),
            expires_in: Some(expires_in),
            error: None,
            details: None,
            is_voip: None,
        }
    }

    /// Report a failed dispatch.
    pub fn failed(
        error: impl Into<String>,
        details: Option<String>,
        is_voip: Option<bool>,
    ) -> Self {
        Self {
            success: false,
            message: None,
            message_id: None,
            code: None,
            phone_number: None,
            expires_in: None,
            error: Some(error.into()),
            details,
            is_voip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sent_report_serializes_camel_case_and_omits_failure_fields() {
        let code = VerificationCode::new("123456").unwrap();
        let report = DispatchReport::sent(
            Some("mid-1".to_owned()),
            &code,
            "+12065551234",
            600,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["messageId"], "mid-1");
        assert_eq!(json["code"], "123456");
        assert_eq!(json["phoneNumber"], "+12065551234");
        assert_eq!(json["expiresIn"], 600);
        assert!(json.get("error").is_none());
        assert!(json.get("isVoip").is_none());
    }

    #[test]
    fn failed_report_carries_error_details_and_voip_flag() {
        let report = DispatchReport::failed(
            "VoIP numbers are not allowed",
            Some("reserved prefix".to_owned()),
            Some(true),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "VoIP numbers are not allowed");
        assert_eq!(json["details"], "reserved prefix");
        assert_eq!(json["isVoip"], true);
        assert!(json.get("messageId").is_none());
        assert!(json.get("expiresIn").is_none());
    }
}
