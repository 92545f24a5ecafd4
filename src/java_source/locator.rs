use std::path::{Path, PathBuf};

use super::ast::CompilationUnit;
use super::errors::JavaSourceError;
use super::parser::parse_compilation_unit;

/// Maps fully qualified type names to parsed compilation units.
pub trait SourceLocator: Send + Sync {
    fn exists(&self, qualified_name: &str) -> bool;

    fn load(&self, qualified_name: &str) -> Result<CompilationUnit, JavaSourceError>;
}

/// Resolves `com.acme.Ward` to `<base>/com/acme/Ward.java`.
#[derive(Debug, Clone)]
pub struct FileSourceLocator {
    base_path: PathBuf,
}

impl FileSourceLocator {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        FileSourceLocator {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path_for(&self, qualified_name: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        for segment in qualified_name.split('.') {
            path.push(segment);
        }
        path.set_extension("java");
        path
    }
}

impl SourceLocator for FileSourceLocator {
    fn exists(&self, qualified_name: &str) -> bool {
        self.path_for(qualified_name).is_file()
    }

    fn load(&self, qualified_name: &str) -> Result<CompilationUnit, JavaSourceError> {
        let path = self.path_for(qualified_name);
        if !path.is_file() {
            return Err(JavaSourceError::NotFound {
                type_name: qualified_name.to_string(),
                path: path.display().to_string(),
            });
        }

        let src = std::fs::read_to_string(&path).map_err(|e| JavaSourceError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        log::debug!("Parsing {}", path.display());

        parse_compilation_unit(&src).map_err(|e| e.in_file(path.display().to_string()))
    }
}
