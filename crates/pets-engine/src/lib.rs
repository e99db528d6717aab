//! Manifest execution and module resolution for the pets runner.
//!
//! A `Petsfile` is a manifest: a rhai script describing commands to run,
//! processes to start, and other manifests to import. This crate hosts the
//! interpreter, injects the builtin capability set (`run`, `start`, `load`)
//! into every execution, and resolves `load()` references across two
//! addressing schemes — local relative paths and `go-get://` repository
//! import paths.
//!
//! Each manifest executes in its own [`ExecContext`], so relative imports
//! always resolve against the directory of the manifest that wrote them,
//! never the process's working directory. The namespace a manifest exports
//! (its top-level bindings plus a synthesized `dir` entry) is returned to
//! the `load()` caller as a script map.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod command;
mod context;
mod error;
mod import_ref;
mod petsitter;

pub use command::shell_command;
pub use context::ExecContext;
pub use error::{EngineError, EngineResult};
pub use import_ref::ImportRef;
pub use petsitter::{ModuleNamespace, PETSFILE, Petsitter};
