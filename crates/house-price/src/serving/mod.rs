//! Form-based prediction web app.
//!
//! A single page at `/`: `GET` renders the form, `POST` returns the estimate.
//! The artifact is loaded lazily through an [`ArtifactCache`] shared by all
//! requests.

mod cache;
mod form;
mod handlers;
mod page;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::io::DEFAULT_ARTIFACT_PATH;

pub use cache::ArtifactCache;
pub use form::{bounds, FieldBounds, FormError, PredictionForm, NUMERIC_FIELDS};
pub use handlers::{predict, show_form};
pub use page::{form_page, format_currency, unavailable_page, Notice};

/// Address and artifact used by the web app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub address: SocketAddr,
    pub artifact: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 8501)),
            artifact: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub cache: Arc<ArtifactCache>,
}

impl AppState {
    pub fn new(cache: ArtifactCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn from_config(config: &ServeConfig) -> Self {
        Self::new(ArtifactCache::new(&config.artifact))
    }
}

/// Routes of the app.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(predict))
        .with_state(state)
}
