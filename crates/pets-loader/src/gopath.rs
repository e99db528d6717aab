//! GOPATH-style import path resolution.

use crate::{FetchError, ModuleFetcher};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Resolves import paths under `<workspace>/src/<import-path>`, the way Go
/// source workspaces are laid out.
///
/// Roots come from the `GOPATH` environment variable (or `$HOME/go` when
/// unset). When no root contains the tree and fetching is enabled, a single
/// `go get -d` is attempted before giving back the candidate under the first
/// root; a failed fetch is logged, not fatal, because remote modules are
/// optional dependencies.
#[derive(Clone, Debug)]
pub struct GopathFetcher {
    roots: Vec<PathBuf>,
    fetch: bool,
}

impl GopathFetcher {
    /// A fetcher over explicit workspace roots, with fetching disabled.
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            fetch: false,
        }
    }

    /// A fetcher configured from the process environment, with fetching on.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NoWorkspace`] when neither `GOPATH` nor `HOME`
    /// is set.
    pub fn from_env() -> Result<Self, FetchError> {
        let mut roots: Vec<PathBuf> = match std::env::var_os("GOPATH") {
            Some(gopath) => std::env::split_paths(&gopath).collect(),
            None => Vec::new(),
        };
        if roots.is_empty() {
            let home = std::env::var_os("HOME").ok_or(FetchError::NoWorkspace)?;
            roots.push(PathBuf::from(home).join("go"));
        }
        Ok(Self { roots, fetch: true })
    }

    /// Enable or disable `go get` for modules absent from every root.
    #[must_use]
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }

    fn fetch_into(&self, root: &Path, import_path: &str) {
        let result = Command::new("go")
            .args(["get", "-d", import_path])
            .env("GOPATH", root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match result {
            Ok(status) if status.success() => {
                debug!(import_path, "fetched module");
            }
            Ok(status) => {
                warn!(import_path, %status, "go get failed");
            }
            Err(error) => {
                warn!(import_path, %error, "could not invoke go get");
            }
        }
    }
}

impl ModuleFetcher for GopathFetcher {
    fn resolve(&self, import_path: &str) -> Result<PathBuf, FetchError> {
        validate(import_path)?;

        for root in &self.roots {
            let candidate = root.join("src").join(import_path);
            if candidate.is_dir() {
                debug!(import_path, dir = %candidate.display(), "resolved module");
                return Ok(candidate);
            }
        }

        let root = self.roots.first().ok_or(FetchError::NoWorkspace)?;
        if self.fetch {
            self.fetch_into(root, import_path);
        }

        // May not exist; the caller decides whether that is an error.
        Ok(root.join("src").join(import_path))
    }
}

/// Import paths address trees inside a workspace, so they must be relative
/// and free of `.`/`..` components.
fn validate(import_path: &str) -> Result<(), FetchError> {
    let well_formed = !import_path.is_empty()
        && Path::new(import_path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if well_formed {
        Ok(())
    } else {
        Err(FetchError::InvalidImportPath {
            import_path: import_path.to_string(),
        })
    }
}
