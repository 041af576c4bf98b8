//! Mock HTTP server driven by an OpenAPI 3 specification.
//!
//! The specification is loaded once into an immutable route model. Every
//! request is then resolved against it:
//!
//! 1. `X-Set-Status-Code: 500` short-circuits with an empty 500.
//! 2. The path loses its fragment and one trailing slash.
//! 3. The most specific route for path and method is selected; literal
//!    segments outrank parameters. No route yields 404.
//! 4. The body must be JSON and carry the required fields of a response
//!    candidate, otherwise 400.
//! 5. The selected response answers with its status and example payload;
//!    `X-Example` picks a named example.
//!
//! All replies carry `Content-Type: application/json`.

pub mod config;
pub mod control;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod model;
pub mod openapi;
pub mod resolver;
pub mod server;
pub mod state;
pub mod validator;

pub use model::Api;
pub use state::AppState;
