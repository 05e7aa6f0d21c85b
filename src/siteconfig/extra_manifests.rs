// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Expansion of the extra manifests a SiteConfig cluster would have received.

use super::templates::render_template;
use crate::constants::{annotations, pgt};
use crate::constants::siteconfig::workload;
use crate::error::{Result, ZtpError};
use crate::fsutil;
use crate::types::siteconfig::{Cluster, Filter};
use crate::yaml::{dump_documents, parse_documents, read_file};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TEMPLATE_SUFFIX: &str = ".tmpl";
const INCLUDE: &str = "include";
const EXCLUDE: &str = "exclude";

/// Generated manifests keyed by file name
pub type ManifestSet = BTreeMap<String, String>;

/// Collect the extra manifests of `cluster`.
///
/// Relative search paths and `extraManifestPath` resolve against `input_dir`,
/// the directory holding the SiteConfig. Without search paths the manifests of
/// `default_dir` are used, if there is one.
pub fn expand(cluster: &Cluster, input_dir: &Path, default_dir: Option<&Path>) -> Result<ManifestSet> {
    let roles: BTreeSet<&str> = cluster.nodes.iter().map(|n| n.effective_role()).collect();

    let search_dirs: Vec<PathBuf> = match cluster.search_paths() {
        Some(paths) => paths.iter().map(|p| resolve(input_dir, p)).collect(),
        None => default_dir.filter(|d| d.is_dir()).map(Path::to_path_buf).into_iter().collect(),
    };

    let data = serde_json::to_value(cluster)?;
    let mut manifests = ManifestSet::new();
    for dir in &search_dirs {
        collect_dir(dir, &roles, &data, &mut manifests)?;
    }

    if cluster.is_sno() {
        add_workload_partitioning(cluster, &search_dirs, &mut manifests)?;
    }

    if cluster.search_paths().is_none() && !cluster.extra_manifest_path.is_empty() {
        add_user_manifests(cluster, input_dir, &mut manifests)?;
    }

    filter_manifests(manifests, cluster.extra_manifests.filter.as_ref()).map_err(|e| {
        ZtpError::InvalidConfig(format!(
            "could not filter {}.{}: {}",
            cluster.cluster_name, cluster.extra_manifest_path, e
        ))
    })
}

/// Write `manifests` into `dir`, returning the written paths
pub fn write_manifests(dir: &Path, manifests: &ManifestSet) -> Result<Vec<PathBuf>> {
    fsutil::create_if_missing(dir)?;
    let mut written = Vec::with_capacity(manifests.len());
    for (name, content) in manifests {
        let path = dir.join(name);
        fsutil::write_file(&path, content)?;
        written.push(path);
    }
    info!("Wrote {} extra manifests to {}", written.len(), dir.display());
    Ok(written)
}

fn resolve(input_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        fsutil::clean(&input_dir.join(path))
    }
}

/// Files of a directory sorted by name, or the path itself when it is a file
fn entries(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|e| ZtpError::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| ZtpError::io(path, e))? {
        entries.push(entry.map_err(|e| ZtpError::io(path, e))?.path());
    }
    entries.sort();
    Ok(entries)
}

fn is_hidden_or_dir(path: &Path) -> bool {
    path.is_dir() || file_name(path).starts_with('.')
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn collect_dir(dir: &Path, roles: &BTreeSet<&str>, data: &Value, manifests: &mut ManifestSet) -> Result<()> {
    for path in entries(dir)? {
        if is_hidden_or_dir(&path) {
            continue;
        }
        let name = file_name(&path);

        if let Some(stem) = name.strip_suffix(TEMPLATE_SUFFIX) {
            let text = read_file(&path)?;
            for role in roles {
                let rendered = render_template(&name, &text, role, data)?;
                if rendered.trim().is_empty() {
                    debug!("Template {} rendered nothing for role {}", name, role);
                    continue;
                }
                if let Some(annotated) = annotate(&rendered, &path)? {
                    manifests.insert(format!("{}-{}", role, stem), annotated);
                }
            }
        } else {
            let text = read_file(&path)?;
            if let Some(annotated) = annotate(&text, &path)? {
                manifests.insert(name, annotated);
            }
        }
    }
    Ok(())
}

/// Workload partitioning MachineConfig for a single node cluster with a cpuset
fn add_workload_partitioning(cluster: &Cluster, search_dirs: &[PathBuf], manifests: &mut ManifestSet) -> Result<()> {
    let Some(node) = cluster.nodes.first().filter(|n| !n.cpuset.is_empty()) else {
        return Ok(());
    };
    let role = node.effective_role();

    for dir in search_dirs {
        let workload_dir = dir.join(workload::DIR);
        if !dir.is_dir() || !workload_dir.exists() {
            continue;
        }
        let machine_config = workload_machine_config(&workload_dir, &node.cpuset, role).map_err(|e| {
            ZtpError::reference(
                &workload_dir,
                format!(
                    "could not read workload manifest for cluster {}: {}",
                    cluster.cluster_name, e
                ),
            )
        })?;
        if let Some(annotated) = annotate(&machine_config, &workload_dir)? {
            manifests.insert(workload_file_name(role), annotated);
        }
    }
    Ok(())
}

fn workload_machine_config(dir: &Path, cpuset: &str, role: &str) -> Result<String> {
    let encode = |file: &str| -> Result<String> {
        let content = read_file(&dir.join(file))?.replace(workload::CPUSET_TOKEN, cpuset);
        Ok(STANDARD.encode(content))
    };
    let crio = encode(workload::CRIO_CONF)?;
    let kubelet = encode(workload::KUBELET_CONF)?;

    Ok(read_file(&dir.join(workload::MACHINE_CONFIG))?
        .replace(workload::CRIO_TOKEN, &crio)
        .replace(workload::KUBELET_TOKEN, &kubelet)
        .replace(pgt::MCP_TOKEN, role))
}

/// `03-workload-partitioning.yaml` becomes `03-<role>-workload-partitioning.yaml`
fn workload_file_name(role: &str) -> String {
    match workload::MACHINE_CONFIG.split_once('-') {
        Some((order, rest)) => format!("{}-{}-{}", order, role, rest),
        None => format!("{}-{}", role, workload::MACHINE_CONFIG),
    }
}

fn add_user_manifests(cluster: &Cluster, input_dir: &Path, manifests: &mut ManifestSet) -> Result<()> {
    let path = resolve(input_dir, &cluster.extra_manifest_path);
    let files = entries(&path).map_err(|e| {
        ZtpError::reference(
            &path,
            format!(
                "failed to access extraManifestPath {} (resolved from {}): {}",
                path.display(),
                cluster.extra_manifest_path,
                e
            ),
        )
    })?;

    for file in files {
        if is_hidden_or_dir(&file) {
            continue;
        }
        let name = file_name(&file);
        if manifests.contains_key(&name) {
            return Err(ZtpError::InvalidConfig(format!(
                "Pre-defined extra-manifest cannot be over written {}",
                name
            )));
        }
        if let Some(annotated) = annotate(&read_file(&file)?, &file)? {
            manifests.insert(name, annotated);
        }
    }
    Ok(())
}

/// Mark every document of a manifest as generated by ZTP. Returns `None` for
/// manifests without any document.
fn annotate(text: &str, path: &Path) -> Result<Option<String>> {
    let mut documents = parse_documents(text, path)?;
    if documents.is_empty() {
        return Ok(None);
    }

    for document in &mut documents {
        let Value::Object(object) = document else {
            return Err(ZtpError::parse(path, "extra manifests must be YAML objects"));
        };
        let metadata = child_map(object, "metadata").ok_or_else(|| ZtpError::parse(path, "metadata is not a map"))?;
        let generated = child_map(metadata, "annotations")
            .ok_or_else(|| ZtpError::parse(path, "metadata.annotations is not a map"))?;
        generated.insert(
            annotations::ZTP_GITOPS_GENERATED.to_string(),
            Value::String(annotations::ZTP_GITOPS_GENERATED_VALUE.to_string()),
        );
    }

    if documents.len() == 1 {
        Ok(Some(serde_yaml::to_string(&documents[0])?))
    } else {
        Ok(Some(dump_documents(&documents)?))
    }
}

/// Map stored under `key`, created when missing or null
fn child_map<'a>(object: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let child = object.entry(key).or_insert(Value::Null);
    if child.is_null() {
        *child = Value::Object(Map::new());
    }
    child.as_object_mut()
}

fn names_of(manifests: &ManifestSet) -> String {
    manifests.keys().cloned().collect::<Vec<_>>().join(",")
}

/// Apply an `extraManifests.filter`
pub fn filter_manifests(mut manifests: ManifestSet, filter: Option<&Filter>) -> std::result::Result<ManifestSet, String> {
    let Some(filter) = filter else {
        return Ok(manifests);
    };

    let exclude_by_default = match filter.inclusion_default.as_deref() {
        None => false,
        Some(value) if value.eq_ignore_ascii_case(INCLUDE) => false,
        Some(value) if value.eq_ignore_ascii_case(EXCLUDE) => true,
        Some(value) => {
            return Err(format!(
                "acceptable values for inclusionDefault are {} and {}. You have entered {}",
                INCLUDE, EXCLUDE, value
            ))
        }
    };

    if exclude_by_default {
        if !filter.exclude.is_empty() {
            return Err("when InclusionDefault is set to exclude, exclude list can not have entries".to_string());
        }
        let mut kept = ManifestSet::new();
        for name in &filter.include {
            match manifests.get(name) {
                Some(content) => {
                    kept.insert(name.clone(), content.clone());
                }
                None => {
                    return Err(format!(
                        "Filename {} under include array is invalid. Valid files names are: {}",
                        name,
                        names_of(&manifests)
                    ))
                }
            }
        }
        return Ok(kept);
    }

    if !filter.include.is_empty() {
        return Err("when InclusionDefault is set to include, include list can not have entries".to_string());
    }
    for name in &filter.exclude {
        if manifests.remove(name).is_none() {
            return Err(format!(
                "Filename {} under exclude array is invalid. Valid files names are: {}",
                name,
                names_of(&manifests)
            ));
        }
    }
    Ok(manifests)
}
