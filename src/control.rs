//! Client control headers.
//!
//! Test authors steer the mock through two request headers:
//!
//! | header | values | effect |
//! | --- | --- | --- |
//! | `X-Set-Status-Code` | `500` | answer 500 with no body, skipping routing |
//! | `X-Example` | any example name | pick a named example of the matched response |
//!
//! Unrecognized `X-Set-Status-Code` values are ignored.

use axum::http::{HeaderMap, HeaderName, StatusCode};

pub const SET_STATUS_CODE: HeaderName = HeaderName::from_static("x-set-status-code");
pub const EXAMPLE: HeaderName = HeaderName::from_static("x-example");

/// Forced response status requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOverride {
    InternalServerError,
}

impl StatusOverride {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "500" => Some(StatusOverride::InternalServerError),
            _ => None,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            StatusOverride::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Control values read from one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub status_override: Option<StatusOverride>,
    pub example: Option<String>,
}

impl Controls {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

        Self {
            status_override: header(&SET_STATUS_CODE).and_then(StatusOverride::parse),
            example: header(&EXAMPLE)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
        }
    }

    pub fn example_key(&self) -> Option<&str> {
        self.example.as_deref()
    }
}
