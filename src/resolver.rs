use crate::control::StatusOverride;
use crate::model::Response as ModelResponse;
use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;

/// Concrete status and payload for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<Bytes>,
}

impl Reply {
    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(bytes) => (self.status, Body::from(bytes)).into_response(),
            None => self.status.into_response(),
        };
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Reply forced by the status override header, if any
pub fn short_circuit(status_override: Option<StatusOverride>) -> Option<Reply> {
    status_override.map(|forced| Reply::empty(forced.status()))
}

/// Turn a selected response definition into a reply.
///
/// `example_key` chooses a named example; the default example is used when
/// it is absent or unknown. A missing or null example yields no body.
pub fn resolve(response: &ModelResponse, example_key: Option<&str>) -> Reply {
    let status = StatusCode::from_u16(response.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match response.example(example_key) {
        None | Some(JsonValue::Null) => None,
        Some(example) => serialize(example),
    };

    Reply { status, body }
}

fn serialize(example: &JsonValue) -> Option<Bytes> {
    match serde_json::to_vec(example) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            tracing::error!(error = %e, "serialize response");
            None
        }
    }
}
