use crate::resolver::Reply;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Per-request failures of the resolution pipeline
///
/// Each kind maps to a status code at the dispatch boundary. The response
/// body stays empty so no internal detail reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No route matches the path and method
    #[error("no route matches {method} {path}")]
    NoRouteMatch { method: String, path: String },
    /// The body is not a JSON document
    #[error("malformed request body: {0}")]
    MalformedRequestBody(#[from] serde_json::Error),
    /// The body stream failed before it was fully read
    #[error("unreadable request body: {0}")]
    UnreadableBody(#[source] axum::Error),
    /// A required field is absent, null or an empty string
    #[error("required field '{0}' is empty")]
    EmptyRequiredField(String),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NoRouteMatch { .. } => StatusCode::NOT_FOUND,
            RequestError::MalformedRequestBody(_)
            | RequestError::UnreadableBody(_)
            | RequestError::EmptyRequiredField(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        tracing::info!(error = %self, status = %self.status(), "Request rejected");
        Reply::empty(self.status()).into_response()
    }
}
