use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Suffixes of source and text files worth embedding
const SUPPORTED_SUFFIXES: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".rs", ".py", ".sh", ".yaml", ".yml", ".md", ".css", ".json",
    ".toml", ".config",
];

/// Generated, minified and lockfile suffixes. These win over `SUPPORTED_SUFFIXES`.
const EXCLUDED_SUFFIXES: &[&str] = &[
    ".min.js",
    ".min.css",
    "pnpm-lock.yaml",
    "package-lock.json",
];

/// Check if a repository path should be indexed based on its suffix
pub fn is_supported_file(path: &str) -> bool {
    let path = path.to_lowercase();

    if EXCLUDED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        return false;
    }

    SUPPORTED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

/// Source of candidate files for an indexing run
pub trait SourceRepository: Send + Sync {
    /// Every tracked path, relative to the repository root, in listing order
    fn list_files(&self) -> Result<Vec<String>>;

    /// Full UTF-8 content of a tracked path
    fn read_file(&self, path: &str) -> Result<String>;
}

/// Tracked files of a git working tree
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl SourceRepository for GitRepository {
    fn list_files(&self) -> Result<Vec<String>> {
        // -z keeps git from quoting paths with unusual characters
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["ls-files", "-z"])
            .output()
            .map_err(|e| Error::Repository(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Repository(format!(
                "git ls-files failed in {}: {}",
                self.root.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let listing = String::from_utf8(output.stdout)
            .map_err(|e| Error::Repository(format!("git listing is not UTF-8: {}", e)))?;

        Ok(listing
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(path))?)
    }
}
