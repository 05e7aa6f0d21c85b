// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Validation and pre-rendering of manifest patches.

use crate::error::{Result, ZtpError};
use crate::render;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const MANIFEST_FIELD_ERROR: &str = "all manifests must have the \"{}\" field set to a non-empty string";
const PATCH_FIELD_ERROR: &str = "patches must have the \"{}\" field set to a non-empty string when there is more than one manifest it can apply to";

/// Manifests of one source CR file and the patches aimed at them
#[derive(Debug, Clone)]
pub struct ManifestPatcher {
    path: PathBuf,
    pub manifests: Vec<Map<String, Value>>,
    pub patches: Vec<Map<String, Value>>,
}

impl ManifestPatcher {
    pub fn new(path: &Path, manifests: Vec<Map<String, Value>>, patches: Vec<Map<String, Value>>) -> Self {
        ManifestPatcher {
            path: path.to_path_buf(),
            manifests,
            patches,
        }
    }

    /// Check that patches can be matched to manifests.
    ///
    /// With a single manifest, patches missing `apiVersion`, `kind`,
    /// `metadata.name` or `metadata.namespace` inherit them from it.
    pub fn validate(&mut self) -> Result<()> {
        if self.manifests.is_empty() {
            return Err(self.error("there must be one or more manifests".to_string()));
        }

        for manifest in &self.manifests {
            if let Some(field) = missing_identity_field(manifest) {
                return Err(self.error(MANIFEST_FIELD_ERROR.replace("{}", field)));
            }
        }

        if self.manifests.len() > 1 {
            for patch in &self.patches {
                if let Some(field) = missing_identity_field(patch) {
                    return Err(self.error(PATCH_FIELD_ERROR.replace("{}", field)));
                }
            }
            return Ok(());
        }

        let manifest = &self.manifests[0];
        let defaults = [
            (&["apiVersion"][..], text_at(manifest, &["apiVersion"])),
            (&["kind"][..], text_at(manifest, &["kind"])),
            (&["metadata", "name"][..], text_at(manifest, &["metadata", "name"])),
            (&["metadata", "namespace"][..], text_at(manifest, &["metadata", "namespace"])),
        ];
        let name = text_at(manifest, &["metadata", "name"]);
        let kind = text_at(manifest, &["kind"]);

        for patch in &mut self.patches {
            for (fields, value) in &defaults {
                set_default(patch, fields, value).map_err(|detail| {
                    ZtpError::patch(
                        &self.path,
                        format!(
                            "failed to set the \"{}\" field on the patch from the manifest of name \"{}\" and kind \"{}\": {}",
                            fields.join("."),
                            name,
                            kind,
                            detail
                        ),
                    )
                })?;
            }
        }
        Ok(())
    }

    /// Apply the patches with the list merge rules of `schema`
    pub fn apply(&self, schema: &Path) -> Result<Vec<Map<String, Value>>> {
        render::apply_patches(&self.manifests, &self.patches, schema).map_err(|e| self.error(e.to_string()))
    }

    fn error(&self, detail: String) -> ZtpError {
        ZtpError::patch(&self.path, detail)
    }
}

fn missing_identity_field(object: &Map<String, Value>) -> Option<&'static str> {
    if text_at(object, &["apiVersion"]).is_empty() {
        Some("apiVersion")
    } else if text_at(object, &["kind"]).is_empty() {
        Some("kind")
    } else if text_at(object, &["metadata", "name"]).is_empty() {
        Some("metadata.name")
    } else {
        None
    }
}

fn text_at(object: &Map<String, Value>, fields: &[&str]) -> String {
    let Some((last, parents)) = fields.split_last() else {
        return String::new();
    };
    let mut current = object;
    for field in parents {
        match current.get(*field) {
            Some(Value::Object(map)) => current = map,
            _ => return String::new(),
        }
    }
    current
        .get(*last)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Set `fields` to `value` unless it already holds a non-empty string.
/// Empty defaults are not written.
fn set_default(object: &mut Map<String, Value>, fields: &[&str], value: &str) -> std::result::Result<(), String> {
    let Some((last, parents)) = fields.split_last() else {
        return Ok(());
    };

    let mut current = object;
    for field in parents {
        let entry = current
            .entry(field.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            other => return Err(format!("{} is of the type {}, expected map", field, type_name(other))),
        };
    }

    match current.get(*last) {
        Some(Value::String(existing)) if !existing.is_empty() => Ok(()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            if !value.is_empty() {
                current.insert(last.to_string(), Value::String(value.to_string()));
            }
            Ok(())
        }
        Some(other) => Err(format!("{} is of the type {}, expected string", last, type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
