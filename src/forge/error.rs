use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForgeError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Validation failed: {}", summarize_validation(.message, .fields))]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Forge API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: String,
    errors: BTreeMap<String, Vec<String>>,
}

/// Classify a non-2xx response. The body is expected to look like
/// `{"message": "...", "errors": {"field": ["..."]}}` but may be anything.
pub(crate) fn classify(status: u16, reason: Option<&str>, body: &str) -> ForgeError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        reason.unwrap_or("Unknown error").to_string()
    } else {
        parsed.message
    };

    match status {
        401 => ForgeError::Authentication { message },
        404 => ForgeError::NotFound { message },
        422 => ForgeError::Validation {
            message,
            fields: parsed.errors,
        },
        429 => ForgeError::RateLimited { message },
        _ => ForgeError::Api { status, message },
    }
}

fn summarize_validation(message: &str, fields: &BTreeMap<String, Vec<String>>) -> String {
    let details: Vec<String> = fields
        .iter()
        .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
        .collect();
    if details.is_empty() {
        message.to_string()
    } else {
        format!("{} ({})", message, details.join("; "))
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ForgeError::Parse {
                message: e.to_string(),
            }
        } else {
            ForgeError::Network {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(401, "Authentication")]
    #[case(404, "NotFound")]
    #[case(422, "Validation")]
    #[case(429, "RateLimited")]
    #[case(500, "Api")]
    #[case(403, "Api")]
    fn test_classify_by_status(#[case] status: u16, #[case] expected: &str) {
        let err = classify(status, None, r#"{"message":"nope"}"#);
        let kind = match err {
            ForgeError::Authentication { .. } => "Authentication",
            ForgeError::NotFound { .. } => "NotFound",
            ForgeError::Validation { .. } => "Validation",
            ForgeError::RateLimited { .. } => "RateLimited",
            ForgeError::Api { .. } => "Api",
            _ => "other",
        };
        assert_eq!(kind, expected);
    }

    #[test]
    fn test_validation_carries_field_messages() {
        let body = r#"{"message":"The given data was invalid.","errors":{"name":["The name has already been taken."]}}"#;
        let err = classify(422, Some("Unprocessable Entity"), body);
        assert_eq!(
            err.to_string(),
            "Validation failed: The given data was invalid. (name: The name has already been taken.)"
        );
        match err {
            ForgeError::Validation { fields, .. } => {
                assert_eq!(fields["name"], vec!["The name has already been taken.".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_message_falls_back_to_reason() {
        let err = classify(503, Some("Service Unavailable"), "<html>down</html>");
        assert_eq!(
            err,
            ForgeError::Api {
                status: 503,
                message: "Service Unavailable".to_string()
            }
        );
    }
}
