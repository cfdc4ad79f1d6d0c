//! Cookie-backed session gating and attribution capture for Axum.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use linkbio_session::middleware::{GateConfig, RequireSession, PeekSession, page_routes};
//!
//! // 1. Implement UserDirectory for your profile store
//! // 2. Configure from environment
//! let config = GateConfig::from_env()?;
//!
//! // 3. Mount the page shells
//! let app = axum::Router::new().merge(page_routes(config, directory));
//!
//! // 4. Or gate your own handlers
//! async fn settings(RequireSession(user_id): RequireSession) -> impl IntoResponse { /* ... */ }
//! ```

mod attribution;
mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;

pub use attribution::track_attribution;
pub use config::GateConfig;
pub use cookies::CookieStore;
pub use error::GateError;
pub use extractor::{Attribution, PeekSession, RequireSession};
pub use routes::page_routes;
