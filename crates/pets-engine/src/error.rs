//! Error types for manifest execution.

use pets_loader::FetchError;
use pets_proc::ProcError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while executing a manifest or resolving an import.
///
/// Every variant aborts the manifest currently executing and unwinds
/// through any enclosing `load()` calls to the entry point. The single
/// non-error degradation — an optional remote module that failed to
/// materialize — never reaches this type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The import reference string could not be parsed at all.
    #[error("invalid import reference {reference:?}: {source}")]
    ParseImport {
        /// The string passed to `load()`.
        reference: String,
        /// The underlying parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The import reference uses a scheme this engine does not know.
    #[error("unknown load() scheme {scheme:?} (available load schemes: go-get)")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
    },

    /// A `go-get` reference carries query or fragment data.
    #[error("go-get imports may not contain query or fragment info: {reference:?}")]
    MalformedRemoteReference {
        /// The string passed to `load()`.
        reference: String,
    },

    /// The remote module loader failed.
    #[error("load {import_path:?}: {source}")]
    RemoteResolution {
        /// The import path handed to the loader.
        import_path: String,
        /// The loader's error.
        #[source]
        source: FetchError,
    },

    /// A required local manifest or directory does not exist.
    #[error("manifest not found at {}", .path.display())]
    NotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// The resolved target exists but is not a regular file.
    #[error("{} should be a plaintext Petsfile", .path.display())]
    NotAManifest {
        /// The resolved target.
        path: PathBuf,
    },

    /// A builtin received an argument of the wrong type.
    #[error("{builtin} expects a string command; got {type_name} ({value})")]
    ArgumentType {
        /// The builtin that rejected the argument.
        builtin: &'static str,
        /// The actual script-level type.
        type_name: String,
        /// The actual value, rendered for debugging.
        value: String,
    },

    /// A manifest (directly or transitively) re-imported itself.
    #[error("import cycle detected: {chain}")]
    ImportCycle {
        /// The chain of manifests, oldest first.
        chain: String,
    },

    /// The process bridge reported a spawn failure or abnormal exit.
    #[error(transparent)]
    Process(#[from] ProcError),

    /// The interpreter reported a script-level failure.
    #[error("error in {}: {source}", .path.display())]
    Script {
        /// The manifest that was executing.
        path: PathBuf,
        /// The interpreter's error.
        #[source]
        source: Box<rhai::EvalAltResult>,
    },

    /// Filesystem access failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// Host errors cross back into the interpreter as runtime errors, so a
// failing builtin aborts the manifest with the full message intact.
impl From<EngineError> for Box<rhai::EvalAltResult> {
    fn from(err: EngineError) -> Self {
        err.to_string().into()
    }
}
