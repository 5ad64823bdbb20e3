//! Publish wire format: query encoding and reply field extraction.
//!
//! The reply is scanned for a handful of known tags rather than parsed as
//! XML; the bodies the provider produces are small and fixed, and only two
//! outcomes are distinguished.

use crate::domain::{SenderId, SmsClass};
use crate::signing::uri_encode;

pub(crate) const PUBLISH_ACTION: &str = "Publish";
pub(crate) const API_VERSION: &str = "2010-03-31";

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a publish reply body turned out to contain.
pub(crate) enum PublishReply {
    Published {
        message_id: String,
        request_id: Option<String>,
    },
    Failed {
        code: String,
        message: String,
    },
    /// Neither of the expected shapes; kept verbatim for the caller.
    Unrecognized {
        raw: String,
    },
}

/// Encode the publish query string, percent-encoded and sorted by key so
/// it can be signed verbatim.
pub(crate) fn encode_publish_query(
    message: &str,
    phone: &str,
    sender_id: Option<&SenderId>,
    class: SmsClass,
) -> String {
    let mut params: Vec<(String, String)> = vec![
        ("Action".to_owned(), PUBLISH_ACTION.to_owned()),
        ("Version".to_owned(), API_VERSION.to_owned()),
        ("Message".to_owned(), message.to_owned()),
        ("PhoneNumber".to_owned(), phone.to_owned()),
    ];

    let mut entry = 1;
    if let Some(sender_id) = sender_id {
        push_attribute(&mut params, entry, SenderId::ATTRIBUTE, sender_id.as_str());
        entry += 1;
    }
    push_attribute(&mut params, entry, SmsClass::ATTRIBUTE, class.as_str());

    params.sort();
    params
        .iter()
        .map(|(key, value)| format!("{}={}", uri_encode(key), uri_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_attribute(params: &mut Vec<(String, String)>, entry: usize, name: &str, value: &str) {
    params.push((
        format!("MessageAttributes.entry.{entry}.Name"),
        name.to_owned(),
    ));
    params.push((
        format!("MessageAttributes.entry.{entry}.Value.DataType"),
        "String".to_owned(),
    ));
    params.push((
        format!("MessageAttributes.entry.{entry}.Value.StringValue"),
        value.to_owned(),
    ));
}

/// Classify a publish reply body.
///
/// An error code together with an error message wins over a message id,
/// matching how the provider reports failures even on 200-class replies.
pub(crate) fn decode_publish_response(body: &str) -> PublishReply {
    if let (Some(code), Some(message)) =
        (extract_tag(body, "Code"), extract_tag(body, "Message"))
    {
        return PublishReply::Failed { code, message };
    }
    if let Some(message_id) = extract_tag(body, "MessageId") {
        return PublishReply::Published {
            message_id,
            request_id: extract_tag(body, "RequestId"),
        };
    }
    PublishReply::Unrecognized {
        raw: body.to_owned(),
    }
}

fn extract_tag(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_owned())
}
