// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Native evaluation of the kustomization subset used for patching:
//! `openapi.path`, `resources` and `patches[].path`.

use super::memfs::MemFs;
use super::merge::merge_map;
use super::schema::OpenApiSchema;
use crate::error::{Result, ZtpError};
use crate::yaml::parse_manifests;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Kustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<OpenApiRef>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub patches: Vec<PatchRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OpenApiRef {
    pub path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PatchRef {
    pub path: String,
}

/// Identity used to match a patch to the resource it targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl ResourceId {
    pub fn of(object: &Map<String, Value>) -> Self {
        let top = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        let meta = |key: &str| {
            object
                .get("metadata")
                .and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        ResourceId {
            api_version: top("apiVersion"),
            kind: top("kind"),
            name: meta("name"),
            namespace: meta("namespace"),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {}/{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

pub struct Kustomizer<'a> {
    fs: &'a MemFs,
}

impl<'a> Kustomizer<'a> {
    pub fn new(fs: &'a MemFs) -> Self {
        Self { fs }
    }

    /// Build the kustomization rooted at `dir` and return the resulting resources
    pub fn run(&self, dir: &Path) -> Result<Vec<Map<String, Value>>> {
        let kustomization_path = dir.join(KUSTOMIZATION_FILE);
        let kustomization: Kustomization = serde_yaml::from_str(self.fs.read_to_string(&kustomization_path)?)
            .map_err(|e| ZtpError::parse(&kustomization_path, e))?;

        let schema = match &kustomization.openapi {
            Some(openapi) => {
                let path = dir.join(&openapi.path);
                OpenApiSchema::parse(self.fs.read_to_string(&path)?, &path)?
            }
            None => OpenApiSchema::default(),
        };

        let mut resources = Vec::new();
        for resource in &kustomization.resources {
            let path = dir.join(resource);
            resources.extend(parse_manifests(self.fs.read_to_string(&path)?, &path)?);
        }

        for patch_ref in &kustomization.patches {
            let path = dir.join(&patch_ref.path);
            for patch in parse_manifests(self.fs.read_to_string(&path)?, &path)? {
                apply_patch(&mut resources, &patch, &schema, &path)?;
            }
        }

        Ok(resources)
    }
}

fn apply_patch(
    resources: &mut [Map<String, Value>],
    patch: &Map<String, Value>,
    schema: &OpenApiSchema,
    patch_path: &Path,
) -> Result<()> {
    let id = ResourceId::of(patch);
    let mut targets: Vec<usize> = resources
        .iter()
        .enumerate()
        .filter(|(_, resource)| ResourceId::of(resource) == id)
        .map(|(idx, _)| idx)
        .collect();

    // A lone resource takes any patch, which lets a patch rename it
    if targets.is_empty() && resources.len() == 1 {
        targets.push(0);
    }
    if targets.is_empty() {
        return Err(ZtpError::reference(
            patch_path,
            format!("no resource matches the patch target {}", id),
        ));
    }

    for idx in targets {
        let target_id = ResourceId::of(&resources[idx]);
        debug!("Applying patch {} to {}", patch_path.display(), target_id);
        let node = schema.definition_for(&target_id.api_version, &target_id.kind);
        merge_map(&mut resources[idx], patch, schema, node);
    }
    Ok(())
}
