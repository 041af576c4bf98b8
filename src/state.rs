use crate::model::Api;
use std::sync::Arc;

/// Shared application state
///
/// The route model is read-only after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<Api>,
}

impl AppState {
    pub fn new(api: Api) -> Self {
        Self { api: Arc::new(api) }
    }
}
