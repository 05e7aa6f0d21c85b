// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{kinds, siteconfig};
use crate::error::{Result, ZtpError};
use crate::fsutil;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Kustomization fragment generating the extra manifests ConfigMaps
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapSnippet {
    pub api_version: String,
    pub kind: String,
    pub config_map_generator: Vec<ConfigMapGenerator>,
    pub generator_options: GeneratorOptions,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConfigMapGenerator {
    pub files: Vec<String>,
    pub name: String,
    pub namespace: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    pub disable_name_suffix_hash: bool,
}

impl ConfigMapSnippet {
    pub fn new(config_map_generator: Vec<ConfigMapGenerator>) -> Self {
        ConfigMapSnippet {
            api_version: kinds::KUSTOMIZATION_API_VERSION.to_string(),
            kind: "Kustomization".to_string(),
            config_map_generator,
            generator_options: GeneratorOptions {
                disable_name_suffix_hash: true,
            },
        }
    }
}

/// A generator for the YAML files directly inside `manifests_dir`, listed
/// relative to `base_dir` in sorted order
pub fn generator_for(base_dir: &Path, manifests_dir: &Path, name: &str, namespace: &str) -> Result<ConfigMapGenerator> {
    if !manifests_dir.is_dir() {
        return Err(ZtpError::reference(manifests_dir, "directory not found"));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(manifests_dir).map_err(|e| ZtpError::io(manifests_dir, e))? {
        let path = entry.map_err(|e| ZtpError::io(manifests_dir, e))?.path();
        if path.is_file() && fsutil::is_yaml(&path) {
            files.push(fsutil::relative_to(base_dir, &path)?.to_string_lossy().into_owned());
        }
    }
    files.sort();

    if files.is_empty() {
        info!("No YAML files found in {}", manifests_dir.display());
    }

    Ok(ConfigMapGenerator {
        files,
        name: name.to_string(),
        namespace: namespace.to_string(),
    })
}

/// Write the snippet into `output_dir`
pub fn write_snippet(output_dir: &Path, generators: Vec<ConfigMapGenerator>) -> Result<PathBuf> {
    let target = output_dir.join(siteconfig::SNIPPET_FILE);
    let snippet = ConfigMapSnippet::new(generators);
    fsutil::write_file(&target, &serde_yaml::to_string(&snippet)?)?;
    info!("{} generated successfully at: {}", siteconfig::SNIPPET_FILE, target.display());
    Ok(target)
}
