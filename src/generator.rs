//! External text generation.
//!
//! Files ending in the generator suffix (`.erb` by default) are not copied but
//! fed to an external program whose stdout becomes the destination file. The
//! literal substitutions are exported to the child as environment variables.
//! The engine waits for the child and fails the run if it exits unsuccessfully.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, error, info};

use crate::engine::{ensure_parent_dir, Workspace};
use crate::error::{Error, Result};

/// External generator invocation: `program args... <source> > <destination>`.
#[derive(Debug, Clone)]
pub struct Generator {
    program: String,
    args: Vec<String>,
    suffix: String,
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new("eruby", ["-Mf"], ".erb")
    }
}

impl Generator {
    pub fn new<P, I, A, S>(program: P, args: I, suffix: S) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            suffix: suffix.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Destination of `source` with the suffix removed, then substituted.
    pub fn destination(&self, workspace: &Workspace, source: &Path) -> Result<PathBuf> {
        let target = workspace.destination_of(source)?;
        let target = target.to_string_lossy();
        let stripped = target.strip_suffix(self.suffix.as_str()).unwrap_or(&*target);
        Ok(PathBuf::from(workspace.substitutions().apply(stripped)))
    }

    /// Shell rendition of the invocation, used for logging only.
    pub fn command_line(&self, env: &[(String, String)], source: &Path, target: &Path) -> String {
        let mut line = String::new();
        for (name, value) in env {
            line.push_str(&format!("{}='{}' ", name, value));
        }
        line.push_str(&self.program);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line.push_str(&format!(" '{}' >'{}'", source.display(), target.display()));
        line
    }

    pub(crate) fn run(&self, workspace: &mut Workspace, source: &Path) -> Result<bool> {
        let target = self.destination(workspace, source)?;
        let env = workspace.substitutions().environment();

        info!("Generating '{}' from '{}'", target.display(), source.display());
        debug!("Command: {}", self.command_line(&env, source, &target));

        ensure_parent_dir(&target)?;
        let output = File::create(&target).map_err(|e| Error::fs(&target, e))?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .envs(env)
            .stdout(output)
            .status()
            .map_err(|e| {
                let err = Error::ExternalProcessError(format!(
                    "failed to start '{}': {}",
                    self.program, e
                ));
                error!("{}", err);
                err
            })?;

        if !status.success() {
            let err = Error::ExternalProcessError(format!(
                "'{}' failed with {} while generating '{}'",
                self.program,
                status,
                target.display()
            ));
            error!("{}", err);
            return Err(err);
        }

        workspace.record_output(target);
        Ok(true)
    }
}
