//! Per-manifest execution state.

use crate::error::{EngineError, EngineResult};
use std::io;
use std::path::{Component, Path, PathBuf};

/// State carried through one manifest execution.
///
/// A context is constructed fresh for every manifest — top-level or loaded —
/// and never shared between executions. It pins the absolute path of the
/// file currently running, so `load()` can resolve relative imports against
/// that file's directory, and records the chain of manifests currently
/// executing so circular imports fail fast instead of recursing.
#[derive(Clone, Debug)]
pub struct ExecContext {
    source_file: PathBuf,
    chain: Vec<PathBuf>,
}

impl ExecContext {
    /// Context for a top-level manifest at an absolute path.
    #[must_use]
    pub fn root(source_file: impl Into<PathBuf>) -> Self {
        let source_file = source_file.into();
        Self {
            chain: vec![source_file.clone()],
            source_file,
        }
    }

    /// Absolute path of the manifest currently executing.
    #[must_use]
    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// Directory relative imports resolve against.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.source_file.parent().unwrap_or(Path::new("/"))
    }

    /// Context for a manifest loaded from this one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ImportCycle`] when `source_file` is already
    /// executing somewhere up the chain.
    pub fn child(&self, source_file: PathBuf) -> EngineResult<Self> {
        if self.chain.contains(&source_file) {
            let mut chain: Vec<String> = self
                .chain
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            chain.push(source_file.display().to_string());
            return Err(EngineError::ImportCycle {
                chain: chain.join(" -> "),
            });
        }
        let mut chain = self.chain.clone();
        chain.push(source_file.clone());
        Ok(Self { source_file, chain })
    }
}

/// Lexically remove `.` and `..` components without touching the
/// filesystem, so paths for modules that may not exist still come out clean.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `path` against the process working directory and normalize it.
pub(crate) fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}
