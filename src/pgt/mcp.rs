// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::pgt;
use crate::error::Result;
use crate::fsutil;
use crate::yaml::read_file;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*: \$\S*").expect("placeholder pattern is valid"));

/// Substitute `$mcp` in a source CR.
///
/// A file mentioning `$mcp` is written to `<name>-MCP-<mcp>.yaml` next to the
/// original; any other file is rewritten in place. Either way, remaining
/// `: $placeholder` lines are commented out. Returns the path that was written.
pub fn render_mcp_lines(path: &Path, mcp: &str) -> Result<PathBuf> {
    let mut content = read_file(path)?;
    let mut target = path.to_path_buf();

    if content.contains(pgt::MCP_TOKEN) {
        content = content.replace(pgt::MCP_TOKEN, mcp);
        target = mcp_file_name(path, mcp);
    }

    fsutil::write_file(&target, &comment_out_placeholders(&content))?;
    info!("Wrote converted ACM template: {}", target.display());
    Ok(target)
}

fn mcp_file_name(path: &Path, mcp: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".yaml").unwrap_or(&file_name);
    path.with_file_name(format!("{}-MCP-{}.yaml", stem, mcp))
}

/// Prefix every line still carrying an unresolved `: $value` with `# `
pub fn comment_out_placeholders(content: &str) -> String {
    content
        .split('\n')
        .map(|line| {
            if PLACEHOLDER.is_match(line) && !line.trim_start().starts_with('#') {
                format!("# {}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
