// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Advisories for SiteConfig fields that have no ClusterInstance equivalent.

use crate::types::siteconfig::{Cluster, SiteConfigSpec};

const WARNING_PREFIX: &str = "WARNING: ";

const BIOS_HINT: &str = "Please create a custom node template for HostFirmwareSettings and reference it through templateRefs instead. \
Any nodes which use that custom template will then get the bios settings indicated in that CR";
const CR_TEMPLATES_HINT: &str =
    "To provide custom CR templates please use ConfigMaps and reference them through templateRefs instead.";

/// Conversion warnings in the order they were raised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Warnings {
    messages: Vec<String>,
}

impl Warnings {
    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn extend(&mut self, other: &Warnings) {
        self.messages.extend(other.messages.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Lines as printed on the console
    pub fn console_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.iter().map(|m| format!("{}{}", WARNING_PREFIX, m))
    }

    /// `# Conversion Warnings:` block placed at the head of a converted file
    pub fn as_yaml_comments(&self) -> String {
        if self.messages.is_empty() {
            return String::new();
        }

        let mut block = String::from("# Conversion Warnings:\n");
        for message in self.iter().map(str::trim).filter(|m| !m.is_empty()) {
            block.push_str("# - ");
            block.push_str(message);
            block.push('\n');
        }
        block.push_str("#\n");
        block
    }
}

/// Advisories raised by the SiteConfig spec and the command line, shared by every cluster
pub fn site_warnings(spec: &SiteConfigSpec, extra_manifests_refs: &[String]) -> Warnings {
    let mut warnings = Warnings::default();

    for name in extra_manifests_refs {
        warnings.add(format!(
            "The specified extra manifests ConfigMap '{}' is expected to contain the correct set of manifests for the cluster \
which must match the content generated by the extraManifests content from the original SiteConfig. \
This tool can't validate that expectation",
            name
        ));
    }

    if !spec.ssh_private_key_secret_ref.name.is_empty() {
        warnings.add(format!(
            "sshPrivateKeySecretRef field '{}' is not supported in ClusterInstance and will be ignored",
            spec.ssh_private_key_secret_ref.name
        ));
    }

    if !spec.bios_config_ref.file_path.is_empty() {
        warnings.add(format!(
            "biosConfigRef field '{}' at SiteConfig spec level is not supported in ClusterInstance and will be ignored. {}",
            spec.bios_config_ref.file_path, BIOS_HINT
        ));
    }

    if !spec.cr_templates.is_empty() {
        warnings.add(format!(
            "crTemplates field at SiteConfig spec level is not supported in ClusterInstance and will be ignored. {}",
            CR_TEMPLATES_HINT
        ));
    }

    warnings
}

/// Advisories raised by one cluster and its nodes
pub fn cluster_warnings(cluster: &Cluster) -> Warnings {
    let mut warnings = Warnings::default();

    if !cluster.api_vip.is_empty() {
        warnings.add(
            "apiVIP is removed in ClusterInstance. Using apiVIPs instead. If you are doing a live cluster migration, \
you need to create a custom template for AgentClusterInstall or suppress it.",
        );
    }

    if !cluster.ingress_vip.is_empty() {
        warnings.add(
            "ingressVIP is removed in ClusterInstance. Using ingressVIPs instead. If you are doing a live cluster migration, \
you need to create a custom template for AgentClusterInstall or suppress it.",
        );
    }

    if !cluster.bios_config_ref.file_path.is_empty() {
        warnings.add(format!(
            "biosConfigRef field '{}' at cluster level is not supported in ClusterInstance and will be ignored. {}",
            cluster.bios_config_ref.file_path, BIOS_HINT
        ));
    }

    if !cluster.cr_templates.is_empty() {
        warnings.add(format!(
            "crTemplates field at cluster level is not supported in ClusterInstance and will be ignored. {}",
            CR_TEMPLATES_HINT
        ));
    }

    if cluster.merge_default_machine_configs {
        warnings.add(
            "mergeDefaultMachineConfigs field is not supported in ClusterInstance and will be ignored. \
Use a ConfigMap which contains the already merged MachineConfigs and reference it through extraManifestsRefs instead.",
        );
    }

    if cluster.extra_manifest_only {
        warnings.add(
            "extraManifestOnly field is not part of ClusterInstance spec. Extra manifests will be generated from this SiteConfig \
and included in the extraManifestsRefs ConfigMap, but the full ClusterInstance CR set will also be generated.",
        );
    }

    if !cluster.extra_manifest_path.is_empty() {
        warnings.add(format!(
            "extraManifestPath field '{}' is not supported in ClusterInstance and will be ignored. Use extraManifests field instead",
            cluster.extra_manifest_path
        ));
    }

    if cluster.extra_manifests.is_set() {
        warnings.add(format!(
            "extraManifests field is not part of ClusterInstance spec. The selected manifests are rendered into the \
extraManifestsRefs ConfigMap '{}' instead.",
            cluster.cluster_name
        ));
    }

    if !cluster.site_config_map.name.is_empty() {
        warnings.add(format!(
            "siteConfigMap field '{}' is not supported in ClusterInstance and will be ignored. \
Create the site specific ConfigMap and place in git as a separate resource.",
            cluster.site_config_map.name
        ));
    }

    if !cluster.disk_encryption.tpm2.pcr_list.is_empty() {
        warnings.add(
            "tpm2 disk encryption configuration is not supported in ClusterInstance and will be ignored. \
Conversion will be done only for the Tang server field. Disk encryption MachineConfig with correct parameters \
must be added directly to the extramanifests configmap",
        );
    }

    for node in &cluster.nodes {
        if !node.disk_partition.is_empty() {
            warnings.add(format!(
                "diskPartition field on node '{}' is not supported in ClusterInstance and will be ignored. \
Consider using IgnitionConfigOverride at the node level to configure disk partitions instead.",
                node.host_name
            ));
        }
        if !node.user_data.is_empty() {
            warnings.add(format!(
                "userData field on node '{}' is not supported in ClusterInstance and will be ignored. \
Add userData through custom templates which add the necessary field to BareMetalHost",
                node.host_name
            ));
        }
        if !node.bios_config_ref.file_path.is_empty() {
            warnings.add(format!(
                "biosConfigRef field '{}' on node '{}' is not supported in ClusterInstance and will be ignored. {}",
                node.bios_config_ref.file_path, node.host_name, BIOS_HINT
            ));
        }
        if !node.cr_templates.is_empty() {
            warnings.add(format!(
                "crTemplates field on node '{}' is not supported in ClusterInstance and will be ignored. {}",
                node.host_name, CR_TEMPLATES_HINT
            ));
        }
        if !node.cpuset.is_empty() {
            warnings.add(format!(
                "cpuset field '{}' on node '{}' is not supported in ClusterInstance and will be ignored. \
Please see Workload Partitioning Feature for setting specific reserved/isolated CPUSets.",
                node.cpuset, node.host_name
            ));
        }
    }

    warnings
}
