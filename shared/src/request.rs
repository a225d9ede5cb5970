//! Inbound request types
//!
//! The webhook payload is the Dialogflow ES `WebhookRequest` shape. Only the
//! fields the fulfillment workflows read are modeled; everything else is
//! ignored on deserialization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

static SESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/sessions/(.*?)/contexts/").expect("session pattern is a valid regex")
});

/// Webhook request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    pub query_result: QueryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    pub intent: IntentRef,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub output_contexts: Vec<OutputContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRef {
    pub display_name: String,
}

/// Conversation context attached to a query result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputContext {
    /// `projects/<p>/agent/sessions/<session>/contexts/<context>`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan_count: Option<i64>,
}

impl OutputContext {
    /// Session identifier embedded in the context name
    pub fn session_id(&self) -> Option<String> {
        extract_session_id(&self.name)
    }
}

/// Extract the session identifier from a context resource name
pub fn extract_session_id(context_name: &str) -> Option<String> {
    SESSION_PATTERN
        .captures(context_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

/// Structural problems with a webhook body
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing field in request: {0}.")]
    MissingField(&'static str),
    #[error("Malformed request: {0}")]
    Malformed(String),
}

impl WebhookRequest {
    /// Decode a webhook body, naming the first missing required field
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        let query_result = value
            .get("queryResult")
            .ok_or(RequestError::MissingField("queryResult"))?;
        let intent = query_result
            .get("intent")
            .ok_or(RequestError::MissingField("queryResult.intent"))?;
        if intent.get("displayName").is_none() {
            return Err(RequestError::MissingField(
                "queryResult.intent.displayName",
            ));
        }
        serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))
    }

    pub fn intent_name(&self) -> &str {
        &self.query_result.intent.display_name
    }

    /// Session of the first output context, if any
    pub fn session_id(&self) -> Option<String> {
        self.query_result
            .output_contexts
            .first()
            .and_then(OutputContext::session_id)
    }
}

/// Parameter values that could not be interpreted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// `queryResult.parameters`: string keys to strings, numbers or lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(pub Map<String, Value>);

impl Parameters {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// List of non-empty texts; a scalar counts as a one-element list
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(values)) => values.iter().filter_map(value_text).collect(),
            Some(value) => value_text(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// List of positive integer quantities (`2`, `2.0` and `"2"` are all 2)
    pub fn quantities(&self, key: &str) -> Result<Vec<u32>, ParamError> {
        match self.get(key) {
            Some(Value::Array(values)) => values.iter().map(quantity).collect(),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(value) => quantity(value).map(|q| vec![q]),
        }
    }

    /// Parallel name/quantity lists with blank names dropped pairwise
    ///
    /// When both lists have the same length a blank name removes its
    /// quantity too, so positions stay aligned. Lists of different lengths
    /// are returned as-is for the caller to reject.
    pub fn item_quantities(
        &self,
        name_key: &str,
        quantity_key: &str,
    ) -> Result<(Vec<String>, Vec<u32>), ParamError> {
        let names: Vec<Option<String>> = self.values(name_key).into_iter().map(value_text).collect();
        let quantities = self.values(quantity_key);
        if names.len() != quantities.len() {
            return Ok((names.into_iter().flatten().collect(), self.quantities(quantity_key)?));
        }

        let mut kept_names = Vec::with_capacity(names.len());
        let mut kept_quantities = Vec::with_capacity(names.len());
        for (name, value) in names.into_iter().zip(quantities) {
            let Some(name) = name else { continue };
            kept_quantities.push(quantity(value)?);
            kept_names.push(name);
        }
        Ok((kept_names, kept_quantities))
    }

    fn values(&self, key: &str) -> Vec<&Value> {
        match self.get(key) {
            Some(Value::Array(values)) => values.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(value) => vec![value],
        }
    }

    /// First non-empty text of a parameter (first element for lists)
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Array(values) => values.iter().find_map(value_text),
            value => value_text(value),
        }
    }

    /// Text of the first key holding a non-empty value
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Integer id taken from the first non-empty key
    ///
    /// `Ok(None)` when no key holds a value, `Err` when the value is not an
    /// integer.
    pub fn id(&self, keys: &[&str]) -> Result<Option<i64>, ParamError> {
        let Some(raw) = self.first_text(keys) else {
            return Ok(None);
        };
        parse_integer(&raw)
            .map(Some)
            .ok_or(ParamError::InvalidId(raw))
    }
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        // sys.person style entities: {"name": "..."}
        Value::Object(map) => return map.get("name").and_then(value_text),
        Value::Array(_) | Value::Null => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }
    let f = raw.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

fn quantity(value: &Value) -> Result<u32, ParamError> {
    let raw = value_text(value).unwrap_or_default();
    parse_integer(&raw)
        .filter(|q| *q > 0)
        .and_then(|q| u32::try_from(q).ok())
        .ok_or(ParamError::InvalidQuantity(raw))
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
