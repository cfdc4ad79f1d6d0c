use std::sync::Arc;

use axum::extract::FromRef;

use super::config::GateConfig;
use crate::directory::UserDirectory;

/// Shared state for the page handlers.
pub(super) struct PageState<D> {
    pub(super) config: GateConfig,
    pub(super) directory: Arc<D>,
}

// Manual Clone: avoid derive adding a `D: Clone` bound.
impl<D> Clone for PageState<D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            directory: self.directory.clone(),
        }
    }
}

// The gate extractors pull their settings out of the router state
impl<D: UserDirectory> FromRef<PageState<D>> for GateConfig {
    fn from_ref(state: &PageState<D>) -> Self {
        state.config.clone()
    }
}
