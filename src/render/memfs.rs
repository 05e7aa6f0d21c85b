// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory filesystem used to stage kustomize directories.

use crate::error::{Result, ZtpError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct MemFs {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mkdir(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = normalize(path.as_ref())?;
        if self.files.contains_key(&path) {
            return Err(ZtpError::Render(format!("{} is a file", path.display())));
        }
        for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
            self.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    /// Store a file; its parent directory must exist
    pub fn add_file_string(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        let path = normalize(path.as_ref())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.dirs.contains(parent) {
                return Err(ZtpError::Render(format!(
                    "directory {} does not exist",
                    parent.display()
                )));
            }
        }
        if self.dirs.contains(&path) {
            return Err(ZtpError::Render(format!("{} is a directory", path.display())));
        }
        self.files.insert(path, content.into());
        Ok(())
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<&str> {
        let path = normalize(path.as_ref())?;
        self.files
            .get(&path)
            .map(String::as_str)
            .ok_or_else(|| ZtpError::Render(format!("file {} not found", path.display())))
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        normalize(path.as_ref())
            .map(|p| self.files.contains_key(&p) || self.dirs.contains(&p))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Paths are relative to the filesystem root and may not escape it
fn normalize(path: &Path) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return Err(ZtpError::Render(format!(
                        "path {} escapes the filesystem root",
                        path.display()
                    )));
                }
            }
            Component::Prefix(_) => {
                return Err(ZtpError::Render(format!("unsupported path {}", path.display())));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read() {
        let mut fs = MemFs::new();
        fs.mkdir("kustomize").unwrap();
        fs.add_file_string("kustomize/schema.json", "{}").unwrap();

        assert!(fs.exists("kustomize"));
        assert!(fs.exists("./kustomize/schema.json"));
        assert_eq!(fs.read_to_string("kustomize/schema.json").unwrap(), "{}");
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut fs = MemFs::new();
        assert!(fs.add_file_string("nope/file.yaml", "").is_err());
        assert!(fs.is_empty());
    }

    #[test]
    fn test_escape_rejected() {
        let mut fs = MemFs::new();
        fs.mkdir("a").unwrap();
        assert!(fs.read_to_string("../etc/passwd").is_err());
        assert!(fs.add_file_string("a/../../x", "").is_err());
    }
}
