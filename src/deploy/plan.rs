//! Which local files get shipped to the sandbox.
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{AppError, AppResult};

const IGNORED_DIRS: &[&str] = &["target", ".git", "node_modules"];
const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEntry {
    pub local: PathBuf,
    /// Path relative to the sandbox root, always `/`-separated.
    pub remote: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadPlan {
    pub files: Vec<UploadEntry>,
}

impl UploadPlan {
    pub fn collect(root: &Path) -> AppResult<Self> {
        if !root.is_dir() {
            return Err(AppError::Deploy(format!("{} is not a directory", root.display())));
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e));
        for entry in walker {
            let entry = entry.map_err(|e| AppError::Deploy(format!("Failed to walk {}: {}", root.display(), e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| AppError::Deploy(e.to_string()))?;
            let remote = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(UploadEntry { local: entry.path().to_path_buf(), remote });
        }
        Ok(UploadPlan { files })
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if entry.file_type().is_dir() {
        if IGNORED_DIRS.contains(&name.as_ref()) {
            tracing::info!("Skipping dir: {}", entry.path().display());
            return true;
        }
        false
    } else {
        IGNORED_FILES.contains(&name.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_build_and_vcs_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/api")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        fs::write(root.join("src/api/mod.rs"), "").unwrap();
        fs::write(root.join("src/.DS_Store"), "").unwrap();
        fs::write(root.join("target/debug/bin"), "").unwrap();
        fs::write(root.join(".git/HEAD"), "").unwrap();

        let plan = UploadPlan::collect(root).unwrap();
        let remotes: Vec<&str> = plan.files.iter().map(|f| f.remote.as_str()).collect();
        assert_eq!(remotes, vec!["Cargo.toml", "src/api/mod.rs"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(UploadPlan::collect(Path::new("/no/such/dir")).is_err());
    }
}
