//! Application state - shared across all handlers.

use std::sync::Arc;

use posts_core::ports::{PostRepository, TokenVerifier};

use crate::observability::Metrics;

/// Shared application state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        verifier: Arc<dyn TokenVerifier>,
        metrics: Metrics,
    ) -> Self {
        tracing::info!("Application state initialized");

        Self {
            posts,
            verifier,
            metrics,
        }
    }
}
