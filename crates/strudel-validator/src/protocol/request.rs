//! Request decoding.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when an input line is not a usable request object.
#[derive(Debug, Error)]
pub enum RequestParseError {
    /// The line is not valid JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// The line is valid JSON but not an object.
    #[error("request must be a JSON object")]
    NotAnObject,
}

/// The kind of work a request asks for, keyed by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Validate the snippet held in `code`, which may be absent or mistyped.
    Validate {
        /// Raw `code` field as received.
        code: Option<Value>,
    },
    /// Liveness probe.
    Ping,
    /// Missing, non-string or unrecognised `type`.
    Unknown,
}

/// A decoded request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: Option<Value>,
    kind: RequestKind,
}

impl Request {
    /// Decodes one input line.
    ///
    /// The `id` is kept as a JavaScript client would see it after its own
    /// JSON round trip: an explicit `null` stays `null`, integral floats
    /// such as `1.0` become integers and numbers beyond `f64` range become
    /// `null`. Every other value is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError`] when the line is not valid JSON or is
    /// not a JSON object.
    pub fn parse(line: &str) -> Result<Self, RequestParseError> {
        match serde_json::from_str::<Value>(line)? {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            _ => Err(RequestParseError::NotAnObject),
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let id = fields.remove("id").map(javascript_id);
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) if kind == "validate" => RequestKind::Validate {
                code: fields.remove("code"),
            },
            Some(Value::String(kind)) if kind == "ping" => RequestKind::Ping,
            _ => RequestKind::Unknown,
        };
        Self { id, kind }
    }

    /// Returns the caller-supplied identifier, if present.
    #[must_use]
    pub const fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Returns the request kind.
    #[must_use]
    pub const fn kind(&self) -> &RequestKind {
        &self.kind
    }
}

fn javascript_id(id: Value) -> Value {
    match id {
        Value::Number(number) if !(number.is_i64() || number.is_u64()) => {
            number.as_f64().map_or(Value::Null, |float| {
                float
                    .to_string()
                    .parse::<i64>()
                    .map_or(Value::Number(number), Value::from)
            })
        }
        other => other,
    }
}
