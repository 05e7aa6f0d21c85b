// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! SiteConfig to ClusterInstance conversion.

pub mod comments;
pub mod convert;
pub mod extra_manifests;
pub mod snippet;
pub mod templates;
pub mod warnings;

pub use convert::{convert_cluster, ConversionOptions};
pub use warnings::Warnings;

use crate::config::ConverterConfig;
use crate::constants::{kinds, siteconfig};
use crate::error::{Result, ZtpError};
use crate::fsutil;
use crate::types::{ClusterInstance, SiteConfig};
use crate::yaml::documents::DOCUMENT_SEPARATOR;
use crate::yaml::{first_document, read_file, scan, ScannedYaml};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// One converted cluster
#[derive(Debug, Clone)]
pub struct ConvertedCluster {
    pub cluster_name: String,
    pub path: PathBuf,
    pub warnings: Warnings,
    /// Whether the warnings were written into the file
    pub warnings_written: bool,
}

/// Outcome of converting one SiteConfig file
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub clusters: Vec<ConvertedCluster>,
    pub snippet: Option<PathBuf>,
}

impl Conversion {
    /// Warnings that still have to be shown to the user
    pub fn pending_warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.clusters
            .iter()
            .filter(|c| !c.warnings_written)
            .flat_map(|c| c.warnings.console_lines())
    }
}

/// Convert the SiteConfig named by `config`, stamping the current time
pub fn convert_file(config: &ConverterConfig) -> Result<Conversion> {
    convert_file_at(config, Utc::now())
}

#[instrument(skip(config), fields(input = %config.input.display(), output = %config.output_dir.display()))]
pub fn convert_file_at(config: &ConverterConfig, converted_at: DateTime<Utc>) -> Result<Conversion> {
    let text = read_file(&config.input)?;
    let site = parse_site_config(&text, &config.input)?;
    info!(
        "Successfully read SiteConfig: {}/{}",
        site.metadata.namespace.as_deref().unwrap_or_default(),
        site.metadata.name.as_deref().unwrap_or_default()
    );

    let options = ConversionOptions {
        cluster_templates: templates::parse_template_refs(&config.cluster_templates)?,
        node_templates: templates::parse_template_refs(&config.node_templates)?,
        extra_manifests_refs: config.extra_manifests_refs.clone(),
        suppressed_manifests: config.suppressed_manifests.clone(),
        source_name: config
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        converted_at,
    };

    let scanned = config.copy_comments.then(|| scan(&text));
    fsutil::create_if_missing(&config.output_dir)?;

    let site_warnings = warnings::site_warnings(&site.spec, &config.extra_manifests_refs);
    let mut conversion = Conversion::default();
    for (index, cluster) in site.spec.clusters.iter().enumerate() {
        let mut cluster_warnings = site_warnings.clone();
        cluster_warnings.extend(&warnings::cluster_warnings(cluster));

        let instance = convert_cluster(&site.spec, cluster, &options, &mut cluster_warnings);
        let content = render_instance(&instance, &cluster_warnings, config.write_warnings, scanned.as_ref(), index)?;

        let path = config.output_dir.join(format!("{}.yaml", cluster.cluster_name));
        fsutil::write_file(&path, &content)?;
        info!(
            "Converted cluster {} ({}) to ClusterInstance: {}",
            index + 1,
            cluster.cluster_name,
            path.display()
        );

        conversion.clusters.push(ConvertedCluster {
            cluster_name: cluster.cluster_name.clone(),
            path,
            warnings: cluster_warnings,
            warnings_written: config.write_warnings,
        });
    }

    if site.spec.clusters.is_empty() {
        warn!("No clusters found in SiteConfig, skipping extra manifests generation");
        return Ok(conversion);
    }

    conversion.snippet = Some(generate_extra_manifests(&site, config)?);
    Ok(conversion)
}

fn parse_site_config(text: &str, path: &Path) -> Result<SiteConfig> {
    let document = first_document(text, path)?;
    let kind = document.get("kind").and_then(Value::as_str).unwrap_or_default();
    if kind != kinds::SITE_CONFIG {
        return Err(ZtpError::parse(
            path,
            format!("file does not contain a SiteConfig (found kind: {})", kind),
        ));
    }
    serde_json::from_value(document).map_err(|e| ZtpError::parse(path, e))
}

/// Serialize a ClusterInstance with its leading separator, optional warnings
/// block and propagated comments
fn render_instance(
    instance: &ClusterInstance,
    warnings: &Warnings,
    write_warnings: bool,
    scanned: Option<&ScannedYaml>,
    cluster_index: usize,
) -> Result<String> {
    let mut body = serde_yaml::to_string(instance)?;
    let mut header = String::new();
    if let Some(scanned) = scanned {
        (header, body) = comments::propagate(scanned, &body, cluster_index, instance.spec.nodes.len());
    }

    let warnings_block = if write_warnings {
        warnings.as_yaml_comments()
    } else {
        String::new()
    };
    Ok(format!("{}{}{}{}", DOCUMENT_SEPARATOR, header, warnings_block, body))
}

/// Expand the extra manifests of every cluster into
/// `<output>/extra-manifests/<cluster>/` and write the ConfigMap snippet
fn generate_extra_manifests(site: &SiteConfig, config: &ConverterConfig) -> Result<PathBuf> {
    let input_dir = config
        .input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let manifests_root = config.output_dir.join(siteconfig::EXTRA_MANIFESTS_OUTPUT_DIR);

    let mut generators = Vec::with_capacity(site.spec.clusters.len());
    for cluster in &site.spec.clusters {
        let manifests = extra_manifests::expand(cluster, input_dir, config.default_extra_manifest_dir.as_deref())?;

        let cluster_dir = manifests_root.join(&cluster.cluster_name);
        extra_manifests::write_manifests(&cluster_dir, &manifests)?;
        generators.push(snippet::generator_for(
            &config.output_dir,
            &cluster_dir,
            &cluster.cluster_name,
            &cluster.cluster_name,
        )?);
    }

    snippet::write_snippet(&config.output_dir, generators)
}
