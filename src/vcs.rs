//! Git repository initialisation for freshly deployed projects.

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Repository, Signature};
use log::debug;

use crate::cli::GitMode;
use crate::error::Result;

const COMMIT_MESSAGE: &str = "Initial commit";

/// Creates a repository in `project_root` and commits the initial tree.
///
/// # Arguments
/// * `project_root` - Directory of the deployed project
/// * `mode` - `All` stages every file, `Project` only those in `generated`
/// * `generated` - Files written by the engine
///
/// # Errors
/// * `Error::Git2Error` if any repository operation fails
pub fn init_repository(project_root: &Path, mode: GitMode, generated: &[PathBuf]) -> Result<()> {
    debug!("Initializing repository in '{}'", project_root.display());
    let repo = Repository::init(project_root)?;
    let mut index = repo.index()?;

    match mode {
        GitMode::All => index.add_all(["*"], IndexAddOption::DEFAULT, None)?,
        GitMode::Project => {
            for path in generated {
                let Ok(relative) = path.strip_prefix(project_root) else {
                    debug!("'{}' is outside the project, not staged", path.display());
                    continue;
                };
                index.add_path(relative)?;
            }
        }
    }
    index.write()?;

    let tree = repo.find_tree(index.write_tree()?)?;
    let signature = match repo.signature() {
        Ok(signature) => signature,
        Err(_) => Signature::now("prjtpl", "prjtpl@localhost")?,
    };
    repo.commit(Some("HEAD"), &signature, &signature, COMMIT_MESSAGE, &tree, &[])?;
    Ok(())
}
