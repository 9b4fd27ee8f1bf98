//! prjtpl reproduces a template directory tree as a new project.
//! File contents and names are rewritten by replacing substitution markers,
//! and special files can be routed to alternate handlers such as an external
//! text generator.

/// Command-line interface module for the prjtpl binary
pub mod cli;

/// Substitution config parsing and the config echo handler
pub mod config;

/// Queue-driven processing loop and the default copy actions
pub mod engine;

/// Error types and handling
pub mod error;

/// External generator invocation for `.erb` style templates
pub mod generator;

/// Matchers, actions and the priority ordered handler registry
pub mod handler;

/// Template root to project root path mapping
pub mod mapper;

/// User input for interactive config entries
pub mod prompt;

/// LIFO queue of pending template paths
pub mod queue;

/// Ordered marker substitution
pub mod substitution;

/// Repository initialisation for deployed projects
pub mod vcs;
