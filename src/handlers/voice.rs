//! Inbound call webhook.
//!
//! The telephony provider posts here when a call arrives. The response is a
//! TwiML document that bridges the call audio to the `/stream` WebSocket and
//! passes the caller's number through as a custom stream parameter.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Form fields of the call webhook that this server reads.
#[derive(Debug, Default, Deserialize)]
pub struct CallWebhook {
    #[serde(rename = "Caller")]
    pub caller: Option<String>,
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

pub async fn voice_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(webhook): Form<CallWebhook>,
) -> AppResult<Response> {
    let caller = webhook
        .caller
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing Caller".to_string()))?;

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let stream_url = state.config.stream_url(host);

    info!(
        caller = %caller,
        call_sid = webhook.call_sid.as_deref().unwrap_or("-"),
        stream_url = %stream_url,
        "Incoming call"
    );

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        connect_stream_twiml(&stream_url, &caller),
    )
        .into_response())
}

fn connect_stream_twiml(stream_url: &str, caller: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Response><Connect><Stream name=\"stream\" url=\"{}\">\
         <Parameter name=\"caller\" value=\"{}\"/>\
         </Stream></Connect></Response>",
        xml_escape(stream_url),
        xml_escape(caller)
    )
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("+15551234567"), "+15551234567");
        assert_eq!(
            xml_escape("a&b<c>\"d'"),
            "a&amp;b&lt;c&gt;&quot;d&apos;"
        );
    }

    #[test]
    fn test_twiml_document() {
        let twiml = connect_stream_twiml("wss://example.com/stream", "+1555");
        assert!(twiml.starts_with("<?xml"));
        assert!(twiml.contains(
            "<Response><Connect><Stream name=\"stream\" url=\"wss://example.com/stream\">"
        ));
        assert!(twiml.contains("<Parameter name=\"caller\" value=\"+1555\"/>"));
        assert!(twiml.ends_with("</Stream></Connect></Response>"));
    }
}
