//! Extraction from archived API payloads.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StatusPayload {
    text: String,
    #[serde(default)]
    in_reply_to_screen_name: Option<String>,
    #[serde(default)]
    quoted_status: Option<QuotedStatus>,
}

#[derive(Debug, Deserialize)]
struct QuotedStatus {
    text: String,
    user: QuotedUser,
}

#[derive(Debug, Deserialize)]
struct QuotedUser {
    screen_name: String,
}

/// Fields recovered from a status payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonFields {
    pub text: String,
    pub reply_to_handle: Option<String>,
    pub quoted_handle: Option<String>,
    pub quoted_text: Option<String>,
}

/// Parse a status payload. `text` is required; a present `quoted_status`
/// must carry both its text and its author.
pub fn extract_json(body: &str) -> Result<JsonFields, serde_json::Error> {
    let payload: StatusPayload = serde_json::from_str(body)?;
    let (quoted_handle, quoted_text) = match payload.quoted_status {
        Some(quote) => (Some(quote.user.screen_name), Some(quote.text)),
        None => (None, None),
    };

    Ok(JsonFields {
        text: payload.text,
        reply_to_handle: payload.in_reply_to_screen_name,
        quoted_handle,
        quoted_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_and_quote() {
        let body = r#"{
            "text": "look at this",
            "in_reply_to_screen_name": "bob",
            "quoted_status": {"text": "original words", "user": {"screen_name": "carol"}}
        }"#;
        let fields = extract_json(body).unwrap();
        assert_eq!(fields.text, "look at this");
        assert_eq!(fields.reply_to_handle.as_deref(), Some("bob"));
        assert_eq!(fields.quoted_handle.as_deref(), Some("carol"));
        assert_eq!(fields.quoted_text.as_deref(), Some("original words"));
    }

    #[test]
    fn neither_reply_nor_quote() {
        let fields = extract_json(r#"{"text": "plain"}"#).unwrap();
        assert_eq!(fields.reply_to_handle, None);
        assert_eq!(fields.quoted_handle, None);
        assert_eq!(fields.quoted_text, None);
    }

    #[test]
    fn null_reply_is_absent() {
        let fields =
            extract_json(r#"{"text": "plain", "in_reply_to_screen_name": null}"#).unwrap();
        assert_eq!(fields.reply_to_handle, None);
    }

    #[test]
    fn missing_text_fails() {
        assert!(extract_json(r#"{"id": 1}"#).is_err());
        assert!(extract_json("not json").is_err());
    }

    #[test]
    fn incomplete_quote_fails() {
        assert!(extract_json(r#"{"text": "x", "quoted_status": {"text": "y"}}"#).is_err());
    }
}
