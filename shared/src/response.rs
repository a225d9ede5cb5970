//! Response bodies

use serde::{Deserialize, Serialize};

/// Webhook reply: `{"fulfillmentText": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub fulfillment_text: String,
}

impl FulfillmentResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: text.into(),
        }
    }
}

/// Success body of the REST endpoints: `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfillment_serializes_camel_case() {
        let json = serde_json::to_string(&FulfillmentResponse::new("hi")).unwrap();
        assert_eq!(json, r#"{"fulfillmentText":"hi"}"#);
    }

    #[test]
    fn message_omits_missing_username() {
        let json = serde_json::to_string(&MessageResponse::new("ok")).unwrap();
        assert_eq!(json, r#"{"message":"ok"}"#);
    }
}
