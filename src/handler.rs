//! Handler dispatch.
//!
//! Handlers are (matcher, action) pairs kept in priority order. Registering puts
//! the new handler in front of every existing one, including the built-ins, and
//! dispatch runs the first handler whose matcher accepts the path.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use log::debug;
use regex::Regex;

use crate::engine::Workspace;
use crate::error::Result;
use crate::generator::Generator;

/// Decides whether a handler applies to a path.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Accepts every path
    Any,
    /// Path text ends with the given suffix
    Suffix(String),
    /// Exactly this path
    Exact(PathBuf),
    /// Unanchored search over the path text
    Regex(Regex),
    Glob(GlobMatcher),
}

impl Matcher {
    pub fn suffix<S: Into<String>>(suffix: S) -> Self {
        Matcher::Suffix(suffix.into())
    }

    pub fn exact<P: Into<PathBuf>>(path: P) -> Self {
        Matcher::Exact(path.into())
    }

    /// # Errors
    /// * `Error::PatternError` if the expression does not compile
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Matcher::Regex(Regex::new(pattern)?))
    }

    /// # Errors
    /// * `Error::GlobError` if the glob is invalid
    pub fn glob(pattern: &str) -> Result<Self> {
        Ok(Matcher::Glob(Glob::new(pattern)?.compile_matcher()))
    }

    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Suffix(suffix) => path.to_string_lossy().ends_with(suffix.as_str()),
            Matcher::Exact(expected) => path == expected,
            Matcher::Regex(regex) => regex.is_match(&path.to_string_lossy()),
            Matcher::Glob(glob) => glob.is_match(path),
        }
    }
}

/// Closure signature for caller supplied actions.
pub type CustomAction = dyn Fn(&mut Workspace, &Path) -> Result<bool>;

/// What to do with a matched path. The returned flag is the "handled" signal.
pub enum Action {
    /// Expand directories into the queue, copy files with substitution
    CopyOrExpand,
    /// Copy bytes unchanged
    BinaryCopy,
    /// Run the external generator
    Generate(Generator),
    Custom(Box<CustomAction>),
}

impl Action {
    fn run(&self, workspace: &mut Workspace, path: &Path) -> Result<bool> {
        match self {
            Action::CopyOrExpand => workspace.copy_or_expand(path),
            Action::BinaryCopy => workspace.binary_copy(path),
            Action::Generate(generator) => generator.run(workspace, path),
            Action::Custom(action) => action(workspace, path),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CopyOrExpand => write!(f, "CopyOrExpand"),
            Action::BinaryCopy => write!(f, "BinaryCopy"),
            Action::Generate(generator) => f.debug_tuple("Generate").field(generator).finish(),
            Action::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Handler {
    pub matcher: Matcher,
    pub action: Action,
}

impl Handler {
    pub fn new(matcher: Matcher, action: Action) -> Self {
        Self { matcher, action }
    }

    /// Builds a handler around a closure.
    pub fn custom<F>(matcher: Matcher, action: F) -> Self
    where
        F: Fn(&mut Workspace, &Path) -> Result<bool> + 'static,
    {
        Self::new(matcher, Action::Custom(Box::new(action)))
    }

    pub fn binary(matcher: Matcher) -> Self {
        Self::new(matcher, Action::BinaryCopy)
    }
}

/// Handlers in priority order, highest first.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `handler` ahead of every registered handler.
    pub fn register(&mut self, handler: Handler) {
        self.handlers.insert(0, handler);
    }

    /// The handler that would be dispatched for `path`.
    pub fn find(&self, path: &Path) -> Option<&Handler> {
        self.handlers.iter().find(|handler| handler.matcher.accepts(path))
    }

    /// Runs the first matching handler and returns its result.
    ///
    /// Later handlers are never consulted, even if the first match reports the
    /// path as not handled. Returns `Ok(false)` when nothing matches.
    pub fn dispatch(&self, workspace: &mut Workspace, path: &Path) -> Result<bool> {
        match self.find(path) {
            Some(handler) => {
                debug!("Dispatching '{}' to {:?}", path.display(), handler.action);
                handler.action.run(workspace, path)
            }
            None => {
                debug!("No handler accepts '{}'", path.display());
                Ok(false)
            }
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Handler> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
