// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Filesystem helpers shared by both translators.

use crate::error::{Result, ZtpError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// All `.yaml` / `.yml` files under `path` (or `path` itself), in walk order
pub fn yaml_files_in(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| ZtpError::io(path, e.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn create_if_missing(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| ZtpError::io(dir, e))
}

/// Write a file, creating its parent directory first
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_if_missing(parent)?;
    }
    fs::write(path, content).map_err(|e| ZtpError::io(path, e))
}

/// Copy a regular file unless the destination already exists.
/// Returns whether a copy was made.
pub fn copy_file(src: &Path, dest: &Path) -> Result<bool> {
    if let Some(parent) = dest.parent() {
        create_if_missing(parent)?;
    }

    let metadata = fs::metadata(src).map_err(|e| ZtpError::io(src, e))?;
    if !metadata.is_file() {
        return Err(ZtpError::reference(src, "is not a regular file"));
    }

    if dest.exists() {
        debug!("Skipping file: {}, already exists", dest.display());
        return Ok(false);
    }

    fs::copy(src, dest).map_err(|e| ZtpError::io(dest, e))?;
    Ok(true)
}

/// Recursively copy `src` into `dest`, recreating symlinks and keeping
/// permissions. Files already present at the destination are left alone.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    create_if_missing(dest)?;

    let src_real = fs::canonicalize(src).map_err(|e| ZtpError::io(src, e))?;
    let dest_real = fs::canonicalize(dest).map_err(|e| ZtpError::io(dest, e))?;
    if dest_real.starts_with(&src_real) {
        warn!(
            "Not copying {} into itself at {}",
            src.display(),
            dest.display()
        );
        return Ok(());
    }

    let mut entries = fs::read_dir(src)
        .map_err(|e| ZtpError::io(src, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| ZtpError::io(src, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let metadata = fs::symlink_metadata(&source_path).map_err(|e| ZtpError::io(&source_path, e))?;

        if metadata.file_type().is_symlink() {
            copy_symlink(&source_path, &dest_path)?;
            continue;
        }

        let created = if metadata.is_dir() {
            let existed = dest_path.exists();
            copy_dir(&source_path, &dest_path)?;
            !existed
        } else {
            copy_file(&source_path, &dest_path)?
        };
        if created {
            fs::set_permissions(&dest_path, metadata.permissions()).map_err(|e| ZtpError::io(&dest_path, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    if fs::symlink_metadata(dest).is_ok() {
        return Ok(());
    }
    let target = fs::read_link(src).map_err(|e| ZtpError::io(src, e))?;
    std::os::unix::fs::symlink(target, dest).map_err(|e| ZtpError::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    copy_file(src, dest).map(|_| ())
}

/// `dir/file` becomes `dir/<prefix>file`
pub fn prefix_last_component(path: &Path, prefix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefixed = format!("{}{}", prefix, file_name);
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(prefixed),
        _ => PathBuf::from(prefixed),
    }
}

/// Lexically clean a path: drop `.` and fold `name/..`
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    let cleaned: PathBuf = out.iter().collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Path of `path` relative to `base`, computed lexically
pub fn relative_to(base: &Path, path: &Path) -> Result<PathBuf> {
    let base = clean(base);
    let target = clean(path);
    if base.is_absolute() != target.is_absolute() {
        return Err(ZtpError::reference(
            path,
            format!("cannot be made relative to {}", base.display()),
        ));
    }

    let base_parts: Vec<Component> = base.components().filter(|c| *c != Component::CurDir).collect();
    let target_parts: Vec<Component> = target.components().filter(|c| *c != Component::CurDir).collect();
    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if base_parts[common..].contains(&Component::ParentDir) {
        return Err(ZtpError::reference(
            path,
            format!("cannot be made relative to {}", base.display()),
        ));
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}
