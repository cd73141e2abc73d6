// state.rs
use std::sync::Arc;

use crate::store::PollStore;

/// Shared handler state: the store behind a trait object so the HTTP layer
/// is indifferent to the backend (PostgreSQL in production, in-memory in
/// tests).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PollStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self { store }
    }
}
