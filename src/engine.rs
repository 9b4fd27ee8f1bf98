//! Core template processing orchestration.
//!
//! The [`Engine`] owns the handler registry and a [`Workspace`] holding
//! everything a handler action may touch: the path mapper, the substitution
//! table, the work queue and the log of written files. `process()` drains the
//! queue one path at a time, dispatching each to the highest priority handler
//! that accepts it. Directory descent happens only through the queue.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::handler::{Action, Handler, HandlerRegistry, Matcher};
use crate::mapper::PathMapper;
use crate::queue::WorkQueue;
use crate::substitution::SubstitutionTable;

/// Creates every missing parent directory of `path`.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
    }
    Ok(())
}

/// Ensures the project directory is safe to deploy into.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Dot files and editor backups never leave the template.
fn is_skipped(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || name.ends_with('~')
}

/// Engine state visible to handler actions.
#[derive(Debug)]
pub struct Workspace {
    mapper: PathMapper,
    substitutions: SubstitutionTable,
    queue: WorkQueue,
    generated: Vec<PathBuf>,
}

impl Workspace {
    pub(crate) fn new(mapper: PathMapper) -> Self {
        Self {
            mapper,
            substitutions: SubstitutionTable::new(),
            queue: WorkQueue::new(),
            generated: Vec::new(),
        }
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// Schedules `path` for dispatch.
    pub fn enqueue<P: Into<PathBuf>>(&mut self, path: P) {
        self.queue.push(path);
    }

    /// Unsubstituted destination of `source`.
    pub fn destination_of(&self, source: &Path) -> Result<PathBuf> {
        self.mapper.destination_of(source)
    }

    /// Runs the substitution table over a whole path, project root included.
    ///
    /// Regex substitutions therefore also see the project root: a pattern such
    /// as `\d{4}` rewrites `/home/u/2024/app` as well as the template part.
    pub fn substitute_path(&self, path: &Path) -> PathBuf {
        PathBuf::from(self.substitutions.apply(&path.to_string_lossy()))
    }

    /// Adds `path` to the log of files written by this engine.
    pub fn record_output<P: Into<PathBuf>>(&mut self, path: P) {
        self.generated.push(path.into());
    }

    /// The default action: expand directories, copy everything else with
    /// substitution. Always reports the path as handled.
    pub(crate) fn copy_or_expand(&mut self, source: &Path) -> Result<bool> {
        if source.is_dir() {
            self.expand_directory(source)?;
        } else {
            let target = self.substitute_path(&self.destination_of(source)?);
            self.copy_with_substitution(source, &target)?;
            self.record_output(target);
        }
        Ok(true)
    }

    pub(crate) fn binary_copy(&mut self, source: &Path) -> Result<bool> {
        let target = self.substitute_path(&self.destination_of(source)?);
        info!("Binary copy '{}' to '{}'", source.display(), target.display());
        ensure_parent_dir(&target)?;
        fs::copy(source, &target).map_err(|e| Error::fs(source, e))?;
        self.record_output(target);
        Ok(true)
    }

    fn expand_directory(&mut self, dir: &Path) -> Result<()> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::fs(dir, e))? {
            let entry = entry.map_err(|e| Error::fs(dir, e))?;
            let name = entry.file_name();
            if is_skipped(&name) {
                debug!("Skipping '{}'", dir.join(&name).display());
                continue;
            }
            names.push(name);
        }
        // read_dir order is platform dependent
        names.sort();

        for name in names {
            self.queue.push(dir.join(name));
        }
        Ok(())
    }

    fn copy_with_substitution(&self, from: &Path, to: &Path) -> Result<()> {
        info!("Copying '{}' to '{}'", from.display(), to.display());
        ensure_parent_dir(to)?;

        let mut reader = BufReader::new(File::open(from).map_err(|e| Error::fs(from, e))?);
        let mut writer = BufWriter::new(File::create(to).map_err(|e| Error::fs(to, e))?);

        // byte lines, so non UTF-8 content passes through
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).map_err(|e| Error::fs(from, e))? == 0 {
                break;
            }
            let mut output = self.substitutions.apply_bytes(&line);
            if output.last() != Some(&b'\n') {
                output.push(b'\n');
            }
            writer.write_all(&output).map_err(|e| Error::fs(to, e))?;
        }
        writer.flush().map_err(|e| Error::fs(to, e))
    }
}

/// Reproduces a template tree under a project root.
///
/// # Example
/// ```no_run
/// use prjtpl::engine::Engine;
///
/// let mut engine = Engine::new("/templates/c-app", "/home/me/projects/demo");
/// engine.add_substitution("%NAME%", "demo");
/// engine.process()?;
/// # Ok::<(), prjtpl::error::Error>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    handlers: HandlerRegistry,
    workspace: Workspace,
}

impl Engine {
    /// Creates an engine with the default `eruby -Mf` generator for `.erb` files.
    pub fn new<T: Into<PathBuf>, P: Into<PathBuf>>(template_root: T, project_root: P) -> Self {
        Self::with_generator(template_root, project_root, Generator::default())
    }

    /// Creates an engine with a custom generator.
    ///
    /// Two handlers are registered: the catch-all copy action first, then the
    /// generator for paths ending in the generator's suffix. The generator
    /// therefore takes priority over the catch-all.
    pub fn with_generator<T: Into<PathBuf>, P: Into<PathBuf>>(
        template_root: T,
        project_root: P,
        generator: Generator,
    ) -> Self {
        let mut handlers = HandlerRegistry::new();
        handlers.register(Handler::new(Matcher::Any, Action::CopyOrExpand));
        handlers.register(Handler::new(
            Matcher::suffix(generator.suffix()),
            Action::Generate(generator),
        ));

        Self { handlers, workspace: Workspace::new(PathMapper::new(template_root, project_root)) }
    }

    pub fn template_root(&self) -> &Path {
        self.workspace.mapper.template_root()
    }

    pub fn project_root(&self) -> &Path {
        self.workspace.mapper.project_root()
    }

    pub fn add_substitution<P: Into<String>, R: Into<String>>(
        &mut self,
        pattern: P,
        replacement: R,
    ) {
        self.workspace.substitutions.add(pattern, replacement);
    }

    /// # Errors
    /// * `Error::PatternError` if the expression does not compile
    pub fn add_regex_substitution<R: Into<String>>(
        &mut self,
        pattern: &str,
        replacement: R,
    ) -> Result<()> {
        self.workspace.substitutions.add_regex(pattern, replacement)
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.workspace.substitutions
    }

    /// Registers `handler` ahead of all existing handlers.
    pub fn add_handler(&mut self, handler: Handler) {
        self.handlers.register(handler);
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Queues a path for the next `process()` call. A non-empty queue
    /// suppresses seeding with the template root.
    pub fn enqueue<P: Into<PathBuf>>(&mut self, path: P) {
        self.workspace.enqueue(path);
    }

    pub fn destination_of<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf> {
        self.workspace.mapper.destination_of(source)
    }

    /// Files written by the built-in actions, in write order.
    pub fn generated(&self) -> &[PathBuf] {
        &self.workspace.generated
    }

    /// Drains the work queue, seeding it with the template root when empty.
    ///
    /// # Errors
    /// The first handler error aborts the run. The remaining queue is dropped
    /// and the project tree is left as far as it got.
    pub fn process(&mut self) -> Result<()> {
        if self.workspace.queue.is_empty() {
            debug!("Seeding queue with '{}'", self.template_root().display());
            let root = self.template_root().to_path_buf();
            self.workspace.queue.push(root);
        }

        while let Some(path) = self.workspace.queue.pop() {
            match self.handlers.dispatch(&mut self.workspace, &path) {
                Ok(true) => {}
                Ok(false) => warn!("'{}' was not handled", path.display()),
                Err(e) => {
                    self.workspace.queue.clear();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
