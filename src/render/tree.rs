// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, ZtpError};
use crate::fsutil;
use std::path::Path;
use std::process::Command;
use tracing::{info, instrument};

/// Run `kustomize build` on an on-disk tree and return the rendered stream
#[instrument(skip(kustomize_bin))]
pub fn render_tree(root: &Path, kustomize_bin: &str) -> Result<String> {
    let output = Command::new(kustomize_bin)
        .arg("build")
        .arg("--load-restrictor")
        .arg("LoadRestrictionsNone")
        .arg("--enable-alpha-plugins")
        .arg(root)
        .output()
        .map_err(|e| ZtpError::Render(format!("could not run {}: {}", kustomize_bin, e)))?;

    if !output.status.success() {
        return Err(ZtpError::Render(format!(
            "{} build {} failed: {}",
            kustomize_bin,
            root.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| ZtpError::Render(format!("non UTF-8 output rendering {}: {}", root.display(), e)))
}

/// Render `root` and write the result to `target`
pub fn render_tree_to_file(root: &Path, target: &Path, kustomize_bin: &str) -> Result<()> {
    let rendered = render_tree(root, kustomize_bin)?;
    fsutil::write_file(target, &rendered)?;
    info!("Rendered {} to {}", root.display(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;

    #[test]
    fn test_missing_binary_is_render_error() {
        let dir = TestDir::new();
        let err = render_tree(dir.path(), "/nonexistent/kustomize-binary").unwrap_err();
        assert!(matches!(err, ZtpError::Render(_)));
        assert!(!dir.exists("out.yaml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_tree_to_file_writes_stdout() {
        let dir = TestDir::new();
        let bin = dir.write_script("bin/kustomize", "echo \"kind: Rendered\"\necho \"args: $*\"\n");
        let target = dir.join("out.yaml");

        render_tree_to_file(&dir.join("tree"), &target, &bin.to_string_lossy()).unwrap();
        assert_eq!(
            dir.read("out.yaml"),
            format!(
                "kind: Rendered\nargs: build --load-restrictor LoadRestrictionsNone --enable-alpha-plugins {}\n",
                dir.join("tree").display()
            )
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_reports_stderr() {
        let dir = TestDir::new();
        let bin = dir.write_script("bin/kustomize", "echo \"unknown generator\" >&2\nexit 1\n");

        let err = render_tree_to_file(dir.path(), &dir.join("out.yaml"), &bin.to_string_lossy()).unwrap_err();
        assert!(matches!(err, ZtpError::Render(_)));
        assert!(err.to_string().ends_with("failed: unknown generator"));
        assert!(!dir.exists("out.yaml"));
    }
}
