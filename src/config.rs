// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{pgt, siteconfig};
use crate::error::{Result, ZtpError};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};

/// Command line of the PolicyGenTemplate to PolicyGenerator translator
#[derive(Parser, Debug)]
#[command(name = "pgt2acmpg", version, about = "Convert PolicyGenTemplates to ACM PolicyGenerator templates", long_about = None)]
pub struct PgtArgs {
    /// The PGT input file or directory
    #[arg(short = 'i', value_name = "PATH")]
    pub input: PathBuf,

    /// The ACMPG output directory
    #[arg(short = 'o', value_name = "DIR")]
    pub output: PathBuf,

    /// The optional schema for all non base CRDs
    #[arg(short = 's', value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Comma separated manifest kinds for which to pre-render patches
    #[arg(short = 'k', value_name = "KINDS")]
    pub kinds: Option<String>,

    /// Also render PGT and ACMPG templates to pgt-out.yaml and acmpg-out.yaml
    #[arg(short = 'g')]
    pub render: bool,

    /// The namespace file to seed into the output tree
    #[arg(short = 'n', value_name = "FILE", default_value = pgt::NAMESPACE_FILE)]
    pub namespace_file: String,

    /// Do not add default placement bindings to the namespace file
    #[arg(short = 'p')]
    pub skip_placement_bindings: bool,

    /// Comma separated reference source CR directories
    #[arg(short = 'c', value_name = "DIRS")]
    pub source_crs: Option<String>,

    /// Generate Placement API files carrying the unreachable toleration
    #[arg(short = 'w')]
    pub placement_api: bool,
}

/// Command line of the SiteConfig to ClusterInstance converter
#[derive(Parser, Debug)]
#[command(name = "siteconfig-converter", version, about = "Convert a SiteConfig to ClusterInstance resources", long_about = None)]
pub struct ConverterArgs {
    /// Output directory for converted ClusterInstance files
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Cluster template references (namespace/name,...)
    #[arg(short = 't', value_name = "REFS", default_value = siteconfig::DEFAULT_CLUSTER_TEMPLATES)]
    pub cluster_templates: String,

    /// Node template references (namespace/name,...)
    #[arg(short = 'n', value_name = "REFS", default_value = siteconfig::DEFAULT_NODE_TEMPLATES)]
    pub node_templates: String,

    /// Extra manifests ConfigMap names
    #[arg(short = 'm', value_name = "NAMES", default_value = "")]
    pub extra_manifests_refs: String,

    /// Manifest names to suppress at cluster level
    #[arg(short = 's', value_name = "NAMES", default_value = "")]
    pub suppressed_manifests: String,

    /// Write conversion warnings as comments at the head of converted files
    #[arg(short = 'w')]
    pub write_warnings: bool,

    /// Copy comments from the SiteConfig to the converted files
    #[arg(short = 'c')]
    pub copy_comments: bool,

    /// Path to the SiteConfig
    #[arg(value_name = "SITECONFIG")]
    pub input: PathBuf,
}

/// Validated settings for a PGT translation run
#[derive(Debug, Clone)]
pub struct PgtConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub schema: Option<PathBuf>,
    pub pre_render_kinds: Vec<String>,
    pub render_policies: bool,
    pub namespace_file: Option<PathBuf>,
    pub skip_placement_bindings: bool,
    pub source_crs: Vec<PathBuf>,
    pub placement_api: bool,
    /// Wave annotation forced on every generated policy
    pub force_wave: Option<String>,
    pub kustomize_bin: String,
    /// Directory receiving `pgt-out.yaml` and `acmpg-out.yaml`
    pub render_dir: PathBuf,
}

impl PgtConfig {
    pub fn from_args(args: PgtArgs) -> Result<Self> {
        let pre_render_kinds = split_csv(args.kinds.as_deref().unwrap_or_default());
        if !pre_render_kinds.is_empty() && args.schema.is_none() {
            return Err(ZtpError::InvalidConfig(
                "a schema (-s) is required to pre-render patches (-k)".to_string(),
            ));
        }

        let namespace_file = if args.namespace_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(args.namespace_file.trim()))
        };

        Ok(PgtConfig {
            input: args.input,
            output_dir: args.output,
            schema: args.schema,
            pre_render_kinds,
            render_policies: args.render,
            namespace_file,
            skip_placement_bindings: args.skip_placement_bindings,
            source_crs: split_csv(args.source_crs.as_deref().unwrap_or_default())
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            placement_api: args.placement_api,
            force_wave: None,
            kustomize_bin: kustomize_bin_from_env(),
            render_dir: PathBuf::from("."),
        })
    }

    /// Directory that relative template paths are computed from
    pub fn base_dir(&self) -> &Path {
        if self.input.is_file() {
            self.input.parent().unwrap_or_else(|| Path::new("."))
        } else {
            &self.input
        }
    }
}

/// Validated settings for a SiteConfig conversion run
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub cluster_templates: String,
    pub node_templates: String,
    pub extra_manifests_refs: Vec<String>,
    pub suppressed_manifests: Vec<String>,
    pub write_warnings: bool,
    pub copy_comments: bool,
    /// Default extra-manifest source used when a cluster names no search paths
    pub default_extra_manifest_dir: Option<PathBuf>,
}

impl ConverterConfig {
    pub fn from_args(args: ConverterArgs) -> Result<Self> {
        Ok(ConverterConfig {
            input: args.input,
            output_dir: args.output,
            cluster_templates: args.cluster_templates,
            node_templates: args.node_templates,
            extra_manifests_refs: split_csv(&args.extra_manifests_refs),
            suppressed_manifests: split_csv(&args.suppressed_manifests),
            write_warnings: args.write_warnings,
            copy_comments: args.copy_comments,
            default_extra_manifest_dir: default_extra_manifest_dir(),
        })
    }
}

/// Split a comma separated flag value, trimming entries and dropping empty ones
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn kustomize_bin_from_env() -> String {
    env::var("KUSTOMIZE_BIN").unwrap_or_else(|_| "kustomize".to_string())
}

/// Resolve the default extra-manifest directory.
///
/// `ZTP_EXTRA_MANIFEST_DIR` wins when set. Otherwise `extra-manifest` next to the
/// executable is used, then `extra-manifest` in the working directory. A missing
/// directory means there are no default manifests.
fn default_extra_manifest_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var("ZTP_EXTRA_MANIFEST_DIR") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join(siteconfig::DEFAULT_EXTRA_MANIFEST_DIR)));
    if let Some(dir) = beside_exe.filter(|d| d.is_dir()) {
        return Some(dir);
    }

    env::current_dir()
        .ok()
        .map(|cwd| cwd.join(siteconfig::DEFAULT_EXTRA_MANIFEST_DIR))
        .filter(|d| d.is_dir())
}
