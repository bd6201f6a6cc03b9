use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use serde_json::{json, Value};
use thiserror::Error;

// Query error raised by the execution layer with a ready-made HTTP mapping.
// `message` always holds a JSON document of the form {"errors": [...]}.
#[derive(Debug, Clone, Error)]
#[error("GraphQL query failed with status {status_code}")]
pub struct HttpQueryError {
    pub status_code: StatusCode,
    pub headers: HeaderMap,
    pub message: String,
}

impl HttpQueryError {
    // Wraps an already JSON-encoded error document
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        HttpQueryError {
            status_code,
            headers: HeaderMap::new(),
            message: message.into(),
        }
    }

    // Builds an error carrying a single plain-text GraphQL error
    pub fn from_text(status_code: StatusCode, text: &str) -> Self {
        Self::new(status_code, json!({ "errors": [{ "message": text }] }).to_string())
    }

    pub fn bad_request(text: &str) -> Self {
        Self::from_text(StatusCode::BAD_REQUEST, text)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    // Structured errors carried by the message. A message that is not the
    // expected JSON document is reported as a single error entry.
    pub fn errors(&self) -> Vec<Value> {
        match serde_json::from_str::<Value>(&self.message) {
            Ok(Value::Object(mut body)) => match body.remove("errors") {
                Some(Value::Array(errors)) => errors,
                _ => vec![json!({ "message": self.message })],
            },
            _ => vec![json!({ "message": self.message })],
        }
    }
}

// Failures produced while executing a query
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Http(#[from] HttpQueryError),
    #[error("failed to build executable schema: {0}")]
    Schema(String),
    #[error("failed to serialize GraphQL response: {0}")]
    Serialize(#[from] serde_json::Error),
}

// Errors escaping the adapter. These go through actix's own error pipeline.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0} requires options")]
    MissingOptions(&'static str),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("malformed GraphQL response: {0}")]
    Response(#[from] serde_json::Error),
}

impl ResponseError for AdapterError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
