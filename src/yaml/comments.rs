// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented comment scanner for block-style YAML.
//!
//! Every mapping key and sequence item gets a dotted path such as
//! `spec.clusters[0].nodes[1].hostName`. Comment lines preceding a node are
//! recorded under its path, trailing comments under `<path>_line` and comments
//! left at the end of the document under `_foot`.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const LINE_SUFFIX: &str = "_line";
pub const FOOT_PATH: &str = "_foot";

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"^("[^"]*"|'[^']*'|[^\s'"#{}\[\],][^:]*?)\s*:(?:\s+(.*))?$"##).expect("valid key pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub path: String,
    pub text: String,
}

/// Result of scanning one YAML text
#[derive(Debug, Default)]
pub struct ScannedYaml {
    /// Comments in document order
    pub comments: Vec<Comment>,
    /// Paths introduced on each line of the text
    pub line_paths: Vec<Vec<String>>,
}

impl ScannedYaml {
    pub fn comment(&self, path: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|c| c.path == path)
            .map(|c| c.text.as_str())
    }

    /// Index of the line that introduces `path`
    pub fn line_of(&self, path: &str) -> Option<usize> {
        self.line_paths
            .iter()
            .position(|paths| paths.iter().any(|p| p == path))
    }
}

#[derive(Debug, PartialEq)]
enum FrameKind {
    Key,
    Item,
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    path: String,
    kind: FrameKind,
}

#[derive(Default)]
struct Scanner {
    frames: Vec<Frame>,
    item_counters: HashMap<String, usize>,
    pending: Vec<String>,
    block_indent: Option<usize>,
    result: ScannedYaml,
}

pub fn scan(text: &str) -> ScannedYaml {
    let mut scanner = Scanner::default();
    for line in text.lines() {
        let paths = scanner.scan_line(line);
        scanner.result.line_paths.push(paths);
    }

    if !scanner.pending.is_empty() {
        let text = scanner.pending.join("\n");
        scanner.add_comment(FOOT_PATH.to_string(), text);
    }
    scanner.result
}

impl Scanner {
    fn scan_line(&mut self, line: &str) -> Vec<String> {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(block_indent) = self.block_indent {
            if trimmed.is_empty() || indent > block_indent {
                return Vec::new();
            }
            self.block_indent = None;
        }

        if trimmed.is_empty() {
            return Vec::new();
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            self.pending.push(comment.trim().to_string());
            return Vec::new();
        }

        if trimmed == "---" || trimmed.starts_with("--- ") || trimmed == "..." {
            self.frames.clear();
            self.item_counters.clear();
            return Vec::new();
        }

        if trimmed == "-" || trimmed.starts_with("- ") {
            return self.scan_item(indent, trimmed);
        }

        let (content, trailing) = split_trailing_comment(trimmed);
        match parse_key(content) {
            Some((key, value)) => {
                let path = self.push_key(indent, &key);
                self.attach(&path, trailing);
                if is_block_scalar(value) {
                    self.block_indent = Some(indent);
                }
                vec![path]
            }
            None => Vec::new(),
        }
    }

    fn scan_item(&mut self, indent: usize, trimmed: &str) -> Vec<String> {
        while let Some(top) = self.frames.last() {
            if top.indent > indent || (top.indent == indent && top.kind == FrameKind::Item) {
                self.frames.pop();
            } else {
                break;
            }
        }

        let parent = self.frames.last().map(|f| f.path.clone()).unwrap_or_default();
        let counter = self.item_counters.entry(parent.clone()).or_insert(0);
        let item_path = format!("{}[{}]", parent, counter);
        *counter += 1;

        self.frames.push(Frame {
            indent,
            path: item_path.clone(),
            kind: FrameKind::Item,
        });

        let rest = trimmed[1..].trim_start();
        let inner_indent = indent + (trimmed.len() - rest.len());
        let (content, trailing) = split_trailing_comment(rest);

        match parse_key(content) {
            Some((key, value)) => {
                let path = self.push_key(inner_indent, &key);
                self.attach(&path, trailing);
                if is_block_scalar(value) {
                    self.block_indent = Some(inner_indent);
                }
                vec![item_path, path]
            }
            None => {
                self.attach(&item_path, trailing);
                vec![item_path]
            }
        }
    }

    fn push_key(&mut self, indent: usize, key: &str) -> String {
        while self.frames.last().is_some_and(|top| top.indent >= indent) {
            self.frames.pop();
        }

        let path = match self.frames.last() {
            Some(parent) => format!("{}.{}", parent.path, key),
            None => key.to_string(),
        };
        self.item_counters.remove(&path);
        self.frames.push(Frame {
            indent,
            path: path.clone(),
            kind: FrameKind::Key,
        });
        path
    }

    fn attach(&mut self, path: &str, trailing: Option<&str>) {
        if !self.pending.is_empty() {
            let head = self.pending.join("\n");
            self.pending.clear();
            self.add_comment(path.to_string(), head);
        }
        if let Some(text) = trailing.filter(|t| !t.is_empty()) {
            self.add_comment(format!("{}{}", path, LINE_SUFFIX), text.to_string());
        }
    }

    fn add_comment(&mut self, path: String, text: String) {
        match self.result.comments.iter_mut().find(|c| c.path == path) {
            Some(existing) => {
                existing.text.push('\n');
                existing.text.push_str(&text);
            }
            None => self.result.comments.push(Comment { path, text }),
        }
    }
}

fn parse_key(content: &str) -> Option<(String, &str)> {
    let caps = KEY_RE.captures(content)?;
    let raw = caps.get(1)?.as_str();
    let key = raw
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')))
        .unwrap_or(raw);
    let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((key.to_string(), value))
}

fn is_block_scalar(value: &str) -> bool {
    value.starts_with('|') || value.starts_with('>')
}

/// Split off a ` #` comment that is not inside a quoted string
fn split_trailing_comment(content: &str) -> (&str, Option<&str>) {
    let mut in_single = false;
    let mut in_double = false;
    let mut previous = ' ';

    for (idx, ch) in content.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && previous.is_whitespace() => {
                let comment = content[idx + 1..].trim();
                return (content[..idx].trim_end(), Some(comment));
            }
            _ => {}
        }
        previous = ch;
    }
    (content.trim_end(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"# Site for the far edge
apiVersion: ran.openshift.io/v1
kind: SiteConfig
spec:
  # Lab domain
  baseDomain: example.com
  clusters:
  - clusterName: "sno1" # first cluster
    installConfigOverrides: |
      # not a comment
      {"capabilities": {}}
    nodes:
      # The only node
      - hostName: node1
        role: master
      - hostName: node2
# trailing note
"#;

    #[test]
    fn test_head_comments_attach_to_next_key() {
        let scanned = scan(SITE);
        assert_eq!(scanned.comment("apiVersion"), Some("Site for the far edge"));
        assert_eq!(scanned.comment("spec.baseDomain"), Some("Lab domain"));
    }

    #[test]
    fn test_line_comment_on_inline_item_key() {
        let scanned = scan(SITE);
        assert_eq!(scanned.comment("spec.clusters[0].clusterName_line"), Some("first cluster"));
    }

    #[test]
    fn test_nested_item_paths() {
        let scanned = scan(SITE);
        assert_eq!(
            scanned.comment("spec.clusters[0].nodes[0].hostName"),
            Some("The only node")
        );
        assert!(scanned.line_of("spec.clusters[0].nodes[1].hostName").is_some());
        assert!(scanned.line_of("spec.clusters[0].nodes[0].role").is_some());
    }

    #[test]
    fn test_block_scalar_lines_skipped() {
        let scanned = scan(SITE);
        assert!(scanned.comments.iter().all(|c| c.text != "not a comment"));
        assert!(scanned.line_of("spec.clusters[0].nodes").is_some());
    }

    #[test]
    fn test_foot_comment() {
        let scanned = scan(SITE);
        assert_eq!(scanned.comment(FOOT_PATH), Some("trailing note"));
    }

    #[test]
    fn test_sequence_at_parent_indent() {
        let scanned = scan("a:\n- x: 1\n- x: 2\nb: 3\n");
        assert_eq!(scanned.line_of("a[1].x"), Some(2));
        assert_eq!(scanned.line_of("b"), Some(3));
    }

    #[test]
    fn test_hash_inside_quotes_is_not_comment() {
        let (content, comment) = split_trailing_comment(r#"key: "a # b" # real"#);
        assert_eq!(content, r#"key: "a # b""#);
        assert_eq!(comment, Some("real"));
    }

    #[test]
    fn test_quoted_keys_and_flow_collections() {
        let (key, value) = parse_key(r#""quoted: key": 1"#).unwrap();
        assert_eq!(key, "quoted: key");
        assert_eq!(value, "1");
        let (key, _) = parse_key("'single': x").unwrap();
        assert_eq!(key, "single");

        assert!(parse_key("{a: 1}").is_none());
        assert!(parse_key("[a, b]: c").is_none());
        assert!(parse_key("#x: 1").is_none());
    }

    #[test]
    fn test_scalar_with_colons_is_not_key() {
        assert!(parse_key("1111:2222:3333:4444::1:1").is_none());
        let (key, value) = parse_key("bmcAddress: redfish://10.0.0.1/x").unwrap();
        assert_eq!(key, "bmcAddress");
        assert_eq!(value, "redfish://10.0.0.1/x");
    }
}
