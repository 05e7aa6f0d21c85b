// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template rendering: patch application through an in-memory kustomization
//! and full tree rendering through the kustomize executable.

pub mod kustomize;
pub mod memfs;
pub mod merge;
pub mod schema;
pub mod tree;

pub use kustomize::{Kustomization, Kustomizer};
pub use memfs::MemFs;
pub use tree::{render_tree, render_tree_to_file};

use crate::error::{Result, ZtpError};
use crate::yaml::read_file;
use kustomize::{OpenApiRef, PatchRef, KUSTOMIZATION_FILE};
use serde_json::{Map, Value};
use std::path::Path;

const KUSTOMIZE_DIR: &str = "kustomize";
const SCHEMA_FILE: &str = "schema.json";

/// Apply `patches` to `manifests` using the list merge rules of the schema at `schema_path`
pub fn apply_patches(
    manifests: &[Map<String, Value>],
    patches: &[Map<String, Value>],
    schema_path: &Path,
) -> Result<Vec<Map<String, Value>>> {
    let schema = read_file(schema_path)?;
    let fs = stage(manifests, patches, schema)
        .map_err(|e| ZtpError::Render(format!("failed to initialize Kustomize dir: {}", e)))?;

    Kustomizer::new(&fs).run(Path::new(KUSTOMIZE_DIR)).map_err(|e| {
        ZtpError::Render(format!(
            "failed to apply the patch(es) to the manifest(s) using Kustomize: {}",
            e
        ))
    })
}

fn stage(manifests: &[Map<String, Value>], patches: &[Map<String, Value>], schema: String) -> Result<MemFs> {
    let dir = Path::new(KUSTOMIZE_DIR);
    let mut fs = MemFs::new();
    fs.mkdir(dir)?;
    fs.add_file_string(dir.join(SCHEMA_FILE), schema)?;

    let mut kustomization = Kustomization {
        openapi: Some(OpenApiRef {
            path: SCHEMA_FILE.to_string(),
        }),
        ..Default::default()
    };

    for (i, manifest) in manifests.iter().enumerate() {
        let name = format!("manifest{}.yaml", i);
        fs.add_file_string(dir.join(&name), serde_yaml::to_string(manifest)?)?;
        kustomization.resources.push(name);
    }

    for (i, patch) in patches.iter().enumerate() {
        let name = format!("patch{}.yaml", i);
        fs.add_file_string(dir.join(&name), serde_yaml::to_string(patch)?)?;
        kustomization.patches.push(PatchRef { path: name });
    }

    fs.add_file_string(dir.join(KUSTOMIZATION_FILE), serde_yaml::to_string(&kustomization)?)?;
    Ok(fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::schema::tests::PTP_SCHEMA;
    use crate::test_utils::TestDir;
    use serde_json::json;

    fn make_manifest() -> Map<String, Value> {
        json!({
            "apiVersion": "ptp.openshift.io/v1",
            "kind": "PtpConfig",
            "metadata": {"name": "slave", "namespace": "openshift-ptp"},
            "spec": {"profile": [{"name": "slave", "interface": "$interface"}]}
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_empty_patch_list_round_trip() {
        let dir = TestDir::new();
        let schema = dir.write("schema.json", PTP_SCHEMA);
        let manifest = make_manifest();

        let patched = apply_patches(&[manifest.clone()], &[], &schema).unwrap();
        assert_eq!(patched, vec![manifest.clone()]);
        assert_eq!(
            serde_yaml::to_string(&patched[0]).unwrap(),
            serde_yaml::to_string(&manifest).unwrap()
        );
    }

    #[test]
    fn test_rename_patch_changes_only_name() {
        let dir = TestDir::new();
        let schema = dir.write("schema.json", PTP_SCHEMA);
        let patch = json!({
            "apiVersion": "ptp.openshift.io/v1",
            "kind": "PtpConfig",
            "metadata": {"name": "du-ptp-slave", "namespace": "openshift-ptp"}
        });

        let patched = apply_patches(&[make_manifest()], &[patch.as_object().unwrap().clone()], &schema).unwrap();
        let mut expected = make_manifest();
        expected["metadata"]["name"] = json!("du-ptp-slave");
        assert_eq!(patched, vec![expected]);
    }

    #[test]
    fn test_patch_merges_profile_by_name() {
        let dir = TestDir::new();
        let schema = dir.write("schema.json", PTP_SCHEMA);
        let patch = json!({
            "apiVersion": "ptp.openshift.io/v1",
            "kind": "PtpConfig",
            "metadata": {"name": "slave", "namespace": "openshift-ptp"},
            "spec": {"profile": [{"name": "slave", "interface": "ens5f0"}]}
        });

        let patched = apply_patches(&[make_manifest()], &[patch.as_object().unwrap().clone()], &schema).unwrap();
        assert_eq!(
            Value::Object(patched[0].clone())["spec"]["profile"],
            json!([{"name": "slave", "interface": "ens5f0"}])
        );
    }

    #[test]
    fn test_missing_schema_is_io_error() {
        let dir = TestDir::new();
        let err = apply_patches(&[make_manifest()], &[], &dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, ZtpError::Io { .. }));
    }
}
