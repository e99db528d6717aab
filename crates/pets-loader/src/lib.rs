//! Remote module loader for the pets manifest runner.
//!
//! `load("go-get://github.com/org/repo")` in a manifest needs a local
//! directory for that import path. The [`ModuleFetcher`] trait is that
//! contract; [`GopathFetcher`] implements it against GOPATH-style source
//! workspaces, and [`FakeFetcher`] serves resolver tests.
//!
//! A fetcher resolves import paths to directories — it does not promise the
//! directory exists. The engine treats a missing remote module as an
//! optional dependency, so fetchers return the candidate location and leave
//! the existence check to the caller.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod fake;
mod gopath;

pub use fake::FakeFetcher;
pub use gopath::GopathFetcher;

use std::path::PathBuf;
use thiserror::Error;

/// Resolves a repository import path to a local source directory.
pub trait ModuleFetcher: Send + Sync {
    /// Materialize (or locate) the source tree for `import_path` and return
    /// its local directory. The directory is not guaranteed to exist.
    fn resolve(&self, import_path: &str) -> Result<PathBuf, FetchError>;
}

/// Errors reported by module fetchers.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No source workspace is configured to resolve against.
    #[error("no module workspace configured (set GOPATH)")]
    NoWorkspace,

    /// The import path is empty, absolute, or escapes the workspace.
    #[error("invalid import path {import_path:?}")]
    InvalidImportPath {
        /// The rejected import path.
        import_path: String,
    },

    /// The fetcher could not make the module available.
    #[error("module {import_path:?} unavailable: {reason}")]
    Unavailable {
        /// The import path that could not be resolved.
        import_path: String,
        /// Why resolution failed.
        reason: String,
    },
}
