//! Source to destination path mapping.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Maps paths inside the template root to their place under the project root.
#[derive(Debug, Clone)]
pub struct PathMapper {
    template_root: PathBuf,
    project_root: PathBuf,
}

impl PathMapper {
    pub fn new<T: Into<PathBuf>, P: Into<PathBuf>>(template_root: T, project_root: P) -> Self {
        Self { template_root: template_root.into(), project_root: project_root.into() }
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Returns where `source` lands in the project tree.
    ///
    /// No substitution is applied here; callers substitute the result when the
    /// destination name should vary.
    ///
    /// # Errors
    /// * `Error::MappingError` if `source` is not under the template root
    pub fn destination_of<P: AsRef<Path>>(&self, source: P) -> Result<PathBuf> {
        let source = source.as_ref();
        let relative = source.strip_prefix(&self.template_root).map_err(|_| {
            Error::MappingError {
                source_path: source.to_path_buf(),
                template_root: self.template_root.clone(),
            }
        })?;

        if relative.as_os_str().is_empty() {
            Ok(self.project_root.clone())
        } else {
            Ok(self.project_root.join(relative))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_nested_file() {
        let mapper = PathMapper::new("/tpl", "/out");
        assert_eq!(
            mapper.destination_of("/tpl/src/%NAME%.c").unwrap(),
            PathBuf::from("/out/src/%NAME%.c")
        );
    }

    #[test]
    fn test_root_maps_to_project_root() {
        let mapper = PathMapper::new("/tpl", "/out");
        assert_eq!(mapper.destination_of("/tpl").unwrap(), PathBuf::from("/out"));
    }

    #[test]
    fn test_outside_path_is_rejected() {
        let mapper = PathMapper::new("/tpl", "/out");
        match mapper.destination_of("/etc/passwd") {
            Err(Error::MappingError { source_path, .. }) => {
                assert_eq!(source_path, PathBuf::from("/etc/passwd"))
            }
            other => panic!("Expected MappingError, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_must_match_whole_components() {
        let mapper = PathMapper::new("/tpl", "/out");
        assert!(mapper.destination_of("/tpl-other/file").is_err());
    }
}
