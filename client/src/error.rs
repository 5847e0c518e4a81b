use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback message when a failed response carries nothing usable.
pub const GENERIC_FAILURE: &str = "Request failed";

/// `message` of an error body: a string, a list of strings, or a map of
/// field name to string or list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    List(Vec<String>),
    Fields(Map<String, Value>),
}

impl ErrorMessage {
    /// Flattens to one line: lists are joined with `"; "`, maps contribute
    /// their first entry only.
    pub fn extract(&self) -> String {
        match self {
            ErrorMessage::Text(text) => text.clone(),
            ErrorMessage::List(items) => items.join("; "),
            ErrorMessage::Fields(fields) => match fields.values().next() {
                None => GENERIC_FAILURE.to_string(),
                Some(Value::String(text)) => text.clone(),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
                Some(other) => other.to_string(),
            },
        }
    }
}

/// Error body returned by the backend on any non-2xx response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub status_code: u16,
    pub message: ErrorMessage,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A non-2xx response, reduced to its status and a readable message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub body: Option<ApiErrorResponse>,
}

impl ApiError {
    /// Builds the error from a raw response body; bodies that are not a
    /// recognizable error payload give the generic message.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiErrorResponse>(body) {
            Ok(parsed) => Self {
                status_code,
                message: parsed.message.extract(),
                body: Some(parsed),
            },
            Err(_) => Self::generic(status_code),
        }
    }

    pub fn generic(status_code: u16) -> Self {
        Self {
            status_code,
            message: GENERIC_FAILURE.to_string(),
            body: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 401: bad credentials, or a missing/expired bearer token.
    #[error("{0}")]
    Unauthorized(ApiError),

    /// Any other non-2xx response.
    #[error("{0}")]
    Api(ApiError),

    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn from_api(err: ApiError) -> Self {
        if err.status_code == 401 {
            ClientError::Unauthorized(err)
        } else {
            ClientError::Api(err)
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(e) | ClientError::Api(e) => Some(e.status_code),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::Decode(_) => None,
        }
    }

    /// The server-provided message, when there is one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized(e) | ClientError::Api(e) => Some(&e.message),
            _ => None,
        }
    }
}
