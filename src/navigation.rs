use std::sync::Mutex;

use crate::error::Error;

/// Client-side navigation, issued by the strict gate.
///
/// Navigation is asynchronous from the caller's point of view: returning
/// `Ok` means the request was dispatched, not that the page has changed.
pub trait Navigator {
    /// # Errors
    ///
    /// Returns [`Error::Navigation`] if the host could not dispatch the request.
    fn navigate(&self, path: &str) -> Result<(), Error>;
}

impl<T: Navigator + ?Sized> Navigator for &T {
    fn navigate(&self, path: &str) -> Result<(), Error> {
        (**self).navigate(path)
    }
}

/// Records navigation requests so the host can act on them once the
/// current render pass is over (e.g. turn them into an HTTP redirect).
#[derive(Debug, Default)]
pub struct DeferredNavigator {
    requested: Mutex<Vec<String>>,
}

impl DeferredNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All paths requested so far, oldest first.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    /// Take the most recent request, clearing the log.
    pub fn take(&self) -> Option<String> {
        self.requested
            .lock()
            .ok()
            .and_then(|mut paths| {
                let latest = paths.pop();
                paths.clear();
                latest
            })
    }
}

impl Navigator for DeferredNavigator {
    fn navigate(&self, path: &str) -> Result<(), Error> {
        self.requested
            .lock()
            .map_err(|e| Error::Navigation(e.to_string()))?
            .push(path.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_take_returns_latest() {
        let nav = DeferredNavigator::new();
        nav.navigate("/login").unwrap();
        nav.navigate("/login?next=%2Fcheckout").unwrap();

        assert_eq!(nav.requested().len(), 2);
        assert_eq!(nav.take().as_deref(), Some("/login?next=%2Fcheckout"));
        assert!(nav.requested().is_empty());
        assert_eq!(nav.take(), None);
    }
}
