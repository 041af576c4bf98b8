use crate::error::RequestError;
use crate::model::{Response, Route};
use serde_json::Value as JsonValue;

/// A request body, parsed once per request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Empty or whitespace-only payload
    Absent,
    Document(JsonValue),
}

impl RequestBody {
    /// Parse raw bytes into a body.
    ///
    /// Anything that is neither blank nor valid JSON is malformed.
    pub fn parse(bytes: &[u8]) -> Result<Self, RequestError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RequestBody::Absent);
        }

        Ok(RequestBody::Document(serde_json::from_slice(bytes)?))
    }

    fn field(&self, name: &str) -> Option<&JsonValue> {
        match self {
            RequestBody::Document(JsonValue::Object(map)) => map.get(name),
            _ => None,
        }
    }
}

/// Check one response candidate's required fields against the body
pub fn validate(response: &Response, body: &RequestBody) -> Result<(), RequestError> {
    for field in &response.required_fields {
        let empty = match body.field(field) {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => s.is_empty(),
            Some(_) => false,
        };

        if empty {
            return Err(RequestError::EmptyRequiredField(field.clone()));
        }
    }

    Ok(())
}

/// Pick the first response of `route` whose contract the body satisfies.
///
/// Candidates are tried in declaration order. When none passes, the error of
/// the last candidate is returned. Routes loaded from an OpenAPI document
/// share one request body contract across their responses, so a later
/// candidate is only reached for models whose responses declare different
/// required fields.
pub fn select_response<'a>(
    route: &'a Route,
    body: &RequestBody,
) -> Result<&'a Response, RequestError> {
    let mut last_error = None;

    for response in &route.responses {
        match validate(response, body) {
            Ok(()) => return Ok(response),
            Err(err) => {
                tracing::debug!(
                    status = response.status_code,
                    error = %err,
                    "Response candidate rejected"
                );
                last_error = Some(err);
            }
        }
    }

    // routes always carry at least one response once the model is built
    Err(last_error.unwrap_or_else(|| {
        RequestError::NoRouteMatch {
            method: route.method.clone(),
            path: route.template.to_string(),
        }
    }))
}
