use crate::control::Controls;
use crate::error::RequestError;
use crate::matcher::{MatchResult, find_route, normalize_path};
use crate::model::Api;
use crate::resolver::{self, Reply};
use crate::state::AppState;
use crate::validator::{RequestBody, select_response};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};

/// Fallback handler answering every path and method from the route model
///
/// The status override header is honored before anything else, then the
/// path is normalized, matched, validated and resolved.
pub async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let controls = Controls::from_headers(&headers);

    if let Some(reply) = resolver::short_circuit(controls.status_override) {
        tracing::info!(status = %reply.status, "Status override applied");
        return reply.into_response();
    }

    let path = normalize_path(uri.path());

    match dispatch(&state.api, path, method.as_str(), body, &controls).await {
        Ok(reply) => {
            tracing::info!(%method, path, status = %reply.status, "Served mock response");
            reply.into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Resolve one request against the model.
///
/// `path` must already be normalized. The body is only read once a route
/// matched, and without a size limit.
pub async fn dispatch(
    api: &Api,
    path: &str,
    method: &str,
    body: Body,
    controls: &Controls,
) -> Result<Reply, RequestError> {
    let MatchResult::Matched { route, bindings } = find_route(api.routes(), path, method) else {
        return Err(RequestError::NoRouteMatch {
            method: method.to_string(),
            path: path.to_string(),
        });
    };

    tracing::debug!(?bindings, "Path parameters");

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(RequestError::UnreadableBody)?;
    let body = RequestBody::parse(&bytes)?;
    let response = select_response(route, &body)?;

    Ok(resolver::resolve(response, controls.example_key()))
}
