//! Test double for the [`ModuleFetcher`] trait.

use crate::{FetchError, ModuleFetcher};
use std::collections::HashMap;
use std::path::PathBuf;

/// A [`ModuleFetcher`] with a fixed import-path routing table.
#[derive(Clone, Debug, Default)]
pub struct FakeFetcher {
    routes: HashMap<String, PathBuf>,
    failure: Option<String>,
}

impl FakeFetcher {
    /// A fetcher that knows no modules and fails every resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `import_path` to `dir`.
    #[must_use]
    pub fn route(mut self, import_path: &str, dir: impl Into<PathBuf>) -> Self {
        self.routes.insert(import_path.to_string(), dir.into());
        self
    }

    /// Fail every resolution with `reason`, regardless of routes.
    #[must_use]
    pub fn fail_with(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl ModuleFetcher for FakeFetcher {
    fn resolve(&self, import_path: &str) -> Result<PathBuf, FetchError> {
        if let Some(reason) = &self.failure {
            return Err(FetchError::Unavailable {
                import_path: import_path.to_string(),
                reason: reason.clone(),
            });
        }
        self.routes
            .get(import_path)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable {
                import_path: import_path.to_string(),
                reason: "no route configured".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_fetcher_routes() {
        let fetcher = FakeFetcher::new().route("example.com/a", "/tmp/a");
        assert_eq!(
            fetcher.resolve("example.com/a").unwrap(),
            PathBuf::from("/tmp/a")
        );
        assert!(matches!(
            fetcher.resolve("example.com/b"),
            Err(FetchError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_fake_fetcher_forced_failure() {
        let fetcher = FakeFetcher::new()
            .route("example.com/a", "/tmp/a")
            .fail_with("backend down");
        assert!(matches!(
            fetcher.resolve("example.com/a"),
            Err(FetchError::Unavailable { .. })
        ));
    }
}
