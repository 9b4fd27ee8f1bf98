//! Substitution config handling.
//!
//! A config file holds one `name = value` pair per line. Every pair becomes a
//! `%name%` marker substitution, in file order. A name ending in `?` is asked
//! for: the value of the environment variable with the same name is used when
//! set, otherwise the line's value is shown as a prompt.
//!
//! The config file lives at the top of the template tree. It is not copied;
//! [`echo_handler`] writes the resolved values next to the project instead.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::engine::ensure_parent_dir;
use crate::error::{Error, Result};
use crate::handler::{Handler, Matcher};
use crate::prompt::Prompter;
use crate::substitution::bare_name;

/// Extension appended to the echoed config in the project tree.
pub const ECHO_EXTENSION: &str = ".out";

/// A parsed config line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    /// The value, or the prompt text for interactive entries
    pub value: String,
    pub interactive: bool,
}

/// Wraps a config name in the marker delimiters: `NAME` becomes `%NAME%`.
pub fn marker(name: &str) -> String {
    format!("%{}%", name)
}

/// Parses config text.
///
/// Each line is split on `=` with surrounding whitespace dropped. Lines without
/// both a name and a value are skipped and fields after the second are ignored.
pub fn parse_config(content: &str) -> Vec<ConfigEntry> {
    let mut entries = Vec::new();

    for line in content.lines() {
        let mut fields = line.split('=').map(str::trim);
        let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        if name.is_empty() || value.is_empty() {
            debug!("Skipping config line '{}'", line);
            continue;
        }

        let (name, interactive) = match name.strip_suffix('?') {
            Some(name) => (name, true),
            None => (name, false),
        };
        entries.push(ConfigEntry {
            name: name.to_string(),
            value: value.to_string(),
            interactive,
        });
    }

    entries
}

/// Reads and parses a config file.
///
/// # Errors
/// * `Error::ConfigError` if the file cannot be read
pub fn read_config<P: AsRef<Path>>(config_path: P) -> Result<Vec<ConfigEntry>> {
    let config_path = config_path.as_ref();
    debug!("Loading configuration from {}", config_path.display());
    let content = fs::read_to_string(config_path).map_err(|e| {
        Error::ConfigError(format!("cannot read '{}': {}", config_path.display(), e))
    })?;
    Ok(parse_config(&content))
}

/// Turns config entries into (name, value) pairs, asking for interactive ones.
///
/// # Arguments
/// * `entries` - Parsed config entries
/// * `prompter` - Asked when an interactive entry has no environment value
/// * `env` - Environment lookup
pub fn resolve_entries<F>(
    entries: Vec<ConfigEntry>,
    prompter: &dyn Prompter,
    env: F,
) -> Result<Vec<(String, String)>>
where
    F: Fn(&str) -> Option<String>,
{
    entries
        .into_iter()
        .map(|entry| -> Result<(String, String)> {
            let value = if !entry.interactive {
                entry.value
            } else if let Some(value) = env(&entry.name) {
                debug!("Taking '{}' from the environment", entry.name);
                value
            } else {
                prompter.input(&entry.value)?
            };
            Ok((entry.name, value))
        })
        .collect()
}

/// Handler for the config file itself.
///
/// Instead of copying the config it writes `<destination>.out` with one
/// `name=value` line per substitution currently held by the engine.
pub fn echo_handler<P: Into<PathBuf>>(config_path: P) -> Handler {
    Handler::custom(Matcher::exact(config_path), |workspace, source| {
        let mut target = workspace.destination_of(source)?.into_os_string();
        target.push(ECHO_EXTENSION);
        let target = PathBuf::from(target);

        info!("Writing template config to '{}'", target.display());

        let mut content = String::new();
        for substitution in workspace.substitutions() {
            content.push_str(&format!(
                "{}={}\n",
                bare_name(substitution.pattern.as_str()),
                substitution.replacement
            ));
        }

        ensure_parent_dir(&target)?;
        fs::write(&target, content).map_err(|e| Error::fs(&target, e))?;
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker() {
        assert_eq!(marker("NAME"), "%NAME%");
    }

    #[test]
    fn test_parse_config() {
        let entries =
            parse_config("NAME = demo\nAUTHOR?=Your name: \n\nbroken\n=orphan\nEMPTY =\nA=b=c\n");
        assert_eq!(
            entries,
            vec![
                ConfigEntry { name: "NAME".into(), value: "demo".into(), interactive: false },
                ConfigEntry {
                    name: "AUTHOR".into(),
                    value: "Your name:".into(),
                    interactive: true
                },
                ConfigEntry { name: "A".into(), value: "b".into(), interactive: false },
            ]
        );
    }

    #[test]
    fn test_parse_config_handles_crlf() {
        let entries = parse_config("NAME=demo\r\nKIND=lib\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, "demo");
        assert_eq!(entries[1].value, "lib");
    }
}
