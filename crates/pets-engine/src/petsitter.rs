//! The manifest host: builtin capability set and recursive module resolver.

use crate::command::shell_command;
use crate::context::{ExecContext, absolutize, normalize};
use crate::error::{EngineError, EngineResult};
use crate::import_ref::ImportRef;
use pets_loader::ModuleFetcher;
use pets_proc::{OutputSink, Runner};
use rhai::{Dynamic, Engine, EvalAltResult, ImmutableString, Map, Scope};
use std::fs::Metadata;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use tracing::debug;

/// Conventional manifest filename.
pub const PETSFILE: &str = "Petsfile";

/// The namespace a manifest exports: a synthesized `dir` entry plus every
/// top-level binding the manifest defined. A binding literally named `dir`
/// shadows the synthesized entry (last write wins).
pub type ModuleNamespace = Map;

/// Executes manifests and serves the builtins they call.
///
/// A `Petsitter` owns the host's output sinks and its two collaborators:
/// the [`Runner`] that spawns processes for `run`/`start` and the
/// [`ModuleFetcher`] that materializes remote imports for `load`. Every
/// manifest execution gets a fresh interpreter with the builtin capability
/// set registered against that manifest's [`ExecContext`].
#[derive(Clone)]
pub struct Petsitter {
    runner: Arc<dyn Runner>,
    fetcher: Arc<dyn ModuleFetcher>,
    stdout: OutputSink,
    stderr: OutputSink,
}

impl Petsitter {
    /// A host wired to the given collaborators and output sinks.
    #[must_use]
    pub fn new(
        runner: Arc<dyn Runner>,
        fetcher: Arc<dyn ModuleFetcher>,
        stdout: OutputSink,
        stderr: OutputSink,
    ) -> Self {
        Self {
            runner,
            fetcher,
            stdout,
            stderr,
        }
    }

    /// Canonical manifest path for a working directory.
    #[must_use]
    pub fn default_manifest_path(cwd: &Path) -> PathBuf {
        cwd.join(PETSFILE)
    }

    /// Execute a manifest file and return its exported namespace.
    ///
    /// The path is absolutized against the process working directory; from
    /// then on all relative imports resolve against manifest directories.
    ///
    /// # Errors
    ///
    /// Any failure inside the manifest or its transitive imports surfaces
    /// unmodified.
    pub fn exec_file(&self, manifest: impl AsRef<Path>) -> EngineResult<ModuleNamespace> {
        let manifest = absolutize(manifest.as_ref())?;
        let ctx = ExecContext::root(manifest);

        let mut namespace = Map::new();
        namespace.insert("dir".into(), ctx.dir().display().to_string().into());
        let globals = self.exec_manifest(&ctx)?;
        namespace.extend(globals);
        Ok(namespace)
    }

    /// Run one manifest in a fresh interpreter and collect its globals.
    fn exec_manifest(&self, ctx: &ExecContext) -> EngineResult<Map> {
        debug!(manifest = %ctx.source_file().display(), "executing manifest");

        let engine = self.engine_for(ctx);
        let mut scope = Scope::new();
        engine
            .run_file_with_scope(&mut scope, ctx.source_file().to_path_buf())
            .map_err(|source| EngineError::Script {
                path: ctx.source_file().to_path_buf(),
                source,
            })?;

        Ok(scope
            .iter()
            .map(|(name, _, value)| (name.into(), value))
            .collect())
    }

    /// A fresh interpreter with the builtin capability set bound to `ctx`.
    fn engine_for(&self, ctx: &ExecContext) -> Engine {
        let mut engine = Engine::new();
        engine.set_max_call_levels(64);
        engine.set_max_operations(10_000_000);
        engine.set_max_string_size(1_000_000);
        engine.set_max_array_size(100_000);
        engine.set_max_map_size(100_000);

        let stdout = Arc::clone(&self.stdout);
        engine.on_print(move |message| {
            let mut sink = stdout.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = writeln!(sink, "{message}");
        });

        let host = self.clone();
        engine.register_fn(
            "run",
            move |command: Dynamic| -> Result<(), Box<EvalAltResult>> {
                host.run_builtin(&command).map_err(Into::into)
            },
        );

        let host = self.clone();
        engine.register_fn(
            "start",
            move |command: Dynamic| -> Result<Map, Box<EvalAltResult>> {
                host.start_builtin(&command).map_err(Into::into)
            },
        );

        let host = self.clone();
        let caller = ctx.clone();
        engine.register_fn(
            "load",
            move |module: ImmutableString| -> Result<Map, Box<EvalAltResult>> {
                host.load_module(&caller, module.as_str()).map_err(Into::into)
            },
        );

        engine
    }

    /// `run(cmd)`: block until the command exits; non-zero exit aborts.
    fn run_builtin(&self, command: &Dynamic) -> EngineResult<()> {
        let argv = shell_command("run", command)?;
        let cwd = std::env::current_dir()?;
        self.runner.run_with_io(
            &argv,
            &cwd,
            Arc::clone(&self.stdout),
            Arc::clone(&self.stderr),
        )?;
        Ok(())
    }

    /// `start(cmd)`: spawn and return `{"pid": ...}` without waiting.
    fn start_builtin(&self, command: &Dynamic) -> EngineResult<Map> {
        let argv = shell_command("start", command)?;
        let cwd = std::env::current_dir()?;
        let handle = self.runner.start_with_io(
            &argv,
            &cwd,
            Arc::clone(&self.stdout),
            Arc::clone(&self.stderr),
        )?;

        let mut process = Map::new();
        process.insert("pid".into(), Dynamic::from(i64::from(handle.pid())));
        Ok(process)
    }

    /// `load(ref)`: classify the reference, locate the manifest, execute it
    /// with a fresh context, and return the merged namespace.
    fn load_module(&self, caller: &ExecContext, module: &str) -> EngineResult<ModuleNamespace> {
        match ImportRef::parse(module)? {
            ImportRef::Remote { import_path } => {
                let dir = self.fetcher.resolve(&import_path).map_err(|source| {
                    EngineError::RemoteResolution {
                        import_path: import_path.clone(),
                        source,
                    }
                })?;
                // Remote modules are optional dependencies: a tree that
                // failed to materialize degrades to `{"dir": ...}`.
                self.exec_manifest_at(caller, &dir, true)
            }
            ImportRef::Local(path) => {
                let dir = normalize(&caller.dir().join(path));
                self.exec_manifest_at(caller, &dir, false)
            }
        }
    }

    /// Execute the manifest at `target` (a Petsfile or a directory holding
    /// one) and merge its globals over `{"dir": target}`.
    fn exec_manifest_at(
        &self,
        caller: &ExecContext,
        target: &Path,
        is_missing_ok: bool,
    ) -> EngineResult<ModuleNamespace> {
        let mut namespace = Map::new();
        namespace.insert("dir".into(), target.display().to_string().into());

        let Some(metadata) = probe(target, is_missing_ok)? else {
            return Ok(namespace);
        };

        let mut manifest = target.to_path_buf();
        let metadata = if metadata.is_dir() {
            manifest = target.join(PETSFILE);
            match probe(&manifest, is_missing_ok)? {
                Some(metadata) => metadata,
                None => return Ok(namespace),
            }
        } else {
            metadata
        };

        if !metadata.is_file() {
            return Err(EngineError::NotAManifest { path: manifest });
        }

        let ctx = caller.child(manifest)?;
        let globals = self.exec_manifest(&ctx)?;
        namespace.extend(globals);
        Ok(namespace)
    }
}

/// Stat `path`, mapping "does not exist" to `Ok(None)` when the caller
/// tolerates missing modules.
fn probe(path: &Path, is_missing_ok: bool) -> EngineResult<Option<Metadata>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            if is_missing_ok {
                Ok(None)
            } else {
                Err(EngineError::NotFound {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(error) => Err(error.into()),
    }
}
