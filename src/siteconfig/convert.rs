// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::warnings::Warnings;
use crate::constants::{annotations, siteconfig};
use crate::types::clusterinstance::{
    ClusterInstance, ClusterInstanceSpec, DiskEncryption, LocalObjectReference, NetworkEntry, NetworkInterface,
    NodeNetwork, NodeSpec, Proxy, TangServer, TemplateRef,
};
use crate::types::siteconfig::{Cluster, Node, SiteConfigSpec};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

const MANAGED_CLUSTER: &str = "ManagedCluster";

/// Settings shared by every cluster of one SiteConfig
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub cluster_templates: Vec<TemplateRef>,
    pub node_templates: Vec<TemplateRef>,
    pub extra_manifests_refs: Vec<String>,
    pub suppressed_manifests: Vec<String>,
    /// Base name of the SiteConfig file, recorded in the provenance annotation
    pub source_name: String,
    pub converted_at: DateTime<Utc>,
}

impl ConversionOptions {
    fn provenance(&self) -> String {
        format!(
            "from {} at {}",
            self.source_name,
            self.converted_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Build the ClusterInstance for one SiteConfig cluster
pub fn convert_cluster(
    spec: &SiteConfigSpec,
    cluster: &Cluster,
    options: &ConversionOptions,
    warnings: &mut Warnings,
) -> ClusterInstance {
    let api_vips = vips(&cluster.api_vip, &cluster.api_vips);
    if !cluster.api_vips.is_empty() && !cluster.api_vip.is_empty() && cluster.api_vip != cluster.api_vips[0] {
        warnings.add("apiVIP must be the same as the first element of apiVIPs");
    }

    let ingress_vips = vips(&cluster.ingress_vip, &cluster.ingress_vips);
    if !cluster.ingress_vips.is_empty()
        && !cluster.ingress_vip.is_empty()
        && cluster.ingress_vip != cluster.ingress_vips[0]
    {
        warnings.add("ingressVIP must be the same as the first element of ingressVIPs");
    }

    let mut extra_manifests_refs: Vec<LocalObjectReference> = cluster
        .manifests_config_map_refs
        .iter()
        .map(|r| LocalObjectReference::new(&r.name))
        .chain(options.extra_manifests_refs.iter().map(LocalObjectReference::new))
        .collect();
    extra_manifests_refs.push(LocalObjectReference::new(&cluster.cluster_name));
    warnings.add(format!(
        "Added default extraManifest ConfigMap '{}' to extraManifestsRefs. This configmap is created automatically.",
        cluster.cluster_name
    ));

    let suppressed_manifests = cluster
        .cr_suppression
        .iter()
        .chain(options.suppressed_manifests.iter())
        .cloned()
        .collect();

    let extra_labels = if cluster.cluster_labels.is_empty() {
        BTreeMap::new()
    } else {
        BTreeMap::from([(MANAGED_CLUSTER.to_string(), cluster.cluster_labels.clone())])
    };

    let cluster_image_set_name_ref = if cluster.cluster_image_set_name_ref.is_empty() {
        spec.cluster_image_set_name_ref.clone()
    } else {
        cluster.cluster_image_set_name_ref.clone()
    };

    let cluster_type = if cluster.is_sno() {
        siteconfig::CLUSTER_TYPE_SNO
    } else {
        siteconfig::CLUSTER_TYPE_HA
    };

    let instance_spec = ClusterInstanceSpec {
        cluster_name: cluster.cluster_name.clone(),
        pull_secret_ref: LocalObjectReference::new(&spec.pull_secret_ref.name),
        cluster_image_set_name_ref,
        ssh_public_key: spec.ssh_public_key.clone(),
        base_domain: spec.base_domain.clone(),
        api_vips,
        ingress_vips,
        hold_installation: cluster.hold_installation,
        additional_ntp_sources: cluster.additional_ntp_sources.clone(),
        machine_network: cluster.machine_network.iter().map(|n| cidr(&n.cidr)).collect(),
        cluster_network: cluster
            .cluster_network
            .iter()
            .map(|n| NetworkEntry {
                cidr: n.cidr.clone(),
                host_prefix: (n.host_prefix != 0).then_some(n.host_prefix),
            })
            .collect(),
        service_network: cluster.service_network.iter().map(|n| cidr(n)).collect(),
        network_type: non_empty(&cluster.network_type),
        platform_type: non_empty(&cluster.platform_type),
        extra_annotations: cluster.cr_annotations.add.clone(),
        extra_labels,
        install_config_overrides: non_empty(&cluster.install_config_overrides),
        ignition_config_override: non_empty(&cluster.ignition_config_override),
        disk_encryption: disk_encryption(cluster),
        proxy: proxy(cluster),
        extra_manifests_refs,
        suppressed_manifests,
        cpu_partitioning_mode: non_empty(&cluster.cpu_partitioning_mode),
        cpu_architecture: non_empty(&cluster.cpu_architecture),
        cluster_type: Some(cluster_type.to_string()),
        template_refs: options.cluster_templates.clone(),
        nodes: cluster
            .nodes
            .iter()
            .map(|node| convert_node(node, &options.node_templates))
            .collect(),
    };

    let mut instance = ClusterInstance::new(&cluster.cluster_name, instance_spec);
    instance.metadata.namespace = Some(cluster.cluster_name.clone());
    instance.metadata.annotations = Some(BTreeMap::from([(
        annotations::SITECONFIG_CONVERTER.to_string(),
        options.provenance(),
    )]));
    instance
}

fn convert_node(node: &Node, templates: &[TemplateRef]) -> NodeSpec {
    let node_network = (!node.node_network.is_empty()).then(|| NodeNetwork {
        config: node.node_network.config.clone(),
        interfaces: node
            .node_network
            .interfaces
            .iter()
            .map(|i| NetworkInterface {
                name: i.name.clone(),
                mac_address: i.mac_address.clone(),
            })
            .collect(),
    });

    NodeSpec {
        bmc_address: node.bmc_address.clone(),
        bmc_credentials_name: LocalObjectReference::new(&node.bmc_credentials_name.name),
        boot_mac_address: node.boot_mac_address.clone(),
        automated_cleaning_mode: non_empty(&node.automated_cleaning_mode),
        root_device_hints: node.root_device_hints.clone(),
        node_network,
        node_labels: node.node_labels.clone(),
        host_name: node.host_name.clone(),
        boot_mode: non_empty(&node.boot_mode),
        installer_args: non_empty(&node.installer_args),
        ignition_config_override: non_empty(&node.ignition_config_override),
        role: non_empty(&node.role),
        extra_annotations: node.cr_annotations.add.clone(),
        suppressed_manifests: node.cr_suppression.clone(),
        ironic_inspect: non_empty(&node.ironic_inspect).filter(|i| i != siteconfig::IRONIC_INSPECT_ENABLED),
        template_refs: templates.to_vec(),
    }
}

/// The plural list wins over the legacy single VIP
fn vips(single: &str, plural: &[String]) -> Vec<String> {
    if !plural.is_empty() {
        plural.to_vec()
    } else if !single.is_empty() {
        vec![single.to_string()]
    } else {
        Vec::new()
    }
}

fn cidr(value: &str) -> NetworkEntry {
    NetworkEntry {
        cidr: value.to_string(),
        host_prefix: None,
    }
}

fn disk_encryption(cluster: &Cluster) -> Option<DiskEncryption> {
    let source = &cluster.disk_encryption;
    if source.encryption_type.is_empty() {
        return None;
    }
    Some(DiskEncryption {
        encryption_type: source.encryption_type.clone(),
        tang: source
            .tang
            .iter()
            .map(|t| TangServer {
                url: t.url.clone(),
                thumbprint: t.thumbprint.clone(),
            })
            .collect(),
    })
}

fn proxy(cluster: &Cluster) -> Option<Proxy> {
    let source = &cluster.proxy;
    if source.is_empty() {
        return None;
    }
    Some(Proxy {
        http_proxy: source.http_proxy.clone(),
        https_proxy: source.https_proxy.clone(),
        no_proxy: source.no_proxy.clone(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
