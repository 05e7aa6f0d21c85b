// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::siteconfig::KindAnnotations;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "siteconfig.open-cluster-management.io",
    version = "v1alpha1",
    kind = "ClusterInstance"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInstanceSpec {
    pub cluster_name: String,
    pub pull_secret_ref: LocalObjectReference,
    pub cluster_image_set_name_ref: String,
    pub ssh_public_key: String,
    pub base_domain: String,
    #[serde(default, rename = "apiVIPs", skip_serializing_if = "Vec::is_empty")]
    pub api_vips: Vec<String>,
    #[serde(default, rename = "ingressVIPs", skip_serializing_if = "Vec::is_empty")]
    pub ingress_vips: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hold_installation: bool,
    #[serde(default, rename = "additionalNTPSources", skip_serializing_if = "Vec::is_empty")]
    pub additional_ntp_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub machine_network: Vec<NetworkEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_network: Vec<NetworkEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_network: Vec<NetworkEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_annotations: KindAnnotations,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_labels: KindAnnotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_config_overrides: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignition_config_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_encryption: Option<DiskEncryption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Proxy>,
    #[serde(default)]
    pub extra_manifests_refs: Vec<LocalObjectReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed_manifests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_partitioning_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    #[serde(default)]
    pub template_refs: Vec<TemplateRef>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct LocalObjectReference {
    pub name: String,
}

impl LocalObjectReference {
    pub fn new(name: impl Into<String>) -> Self {
        LocalObjectReference { name: name.into() }
    }
}

/// Machine, cluster and service network entry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub cidr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_prefix: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct DiskEncryption {
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub encryption_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tang: Vec<TangServer>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct TangServer {
    pub url: String,
    pub thumbprint: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub http_proxy: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub https_proxy: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub no_proxy: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct TemplateRef {
    pub name: String,
    pub namespace: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub bmc_address: String,
    pub bmc_credentials_name: LocalObjectReference,
    #[serde(rename = "bootMACAddress")]
    pub boot_mac_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automated_cleaning_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub root_device_hints: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_network: Option<NodeNetwork>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_labels: BTreeMap<String, String>,
    pub host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignition_config_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_annotations: KindAnnotations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed_manifests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ironic_inspect: Option<String>,
    #[serde(default)]
    pub template_refs: Vec<TemplateRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NodeNetwork {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NetworkInterface>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: String,
    pub mac_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_instance() -> ClusterInstance {
        let mut instance = ClusterInstance::new(
            "sno1",
            ClusterInstanceSpec {
                cluster_name: "sno1".to_string(),
                base_domain: "example.com".to_string(),
                extra_manifests_refs: vec![LocalObjectReference::new("sno1")],
                nodes: vec![NodeSpec {
                    host_name: "node1".to_string(),
                    role: Some("master".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
        );
        instance.metadata.namespace = Some("sno1".to_string());
        instance
    }

    #[test]
    fn test_serializes_envelope() {
        let yaml = serde_yaml::to_string(&make_instance()).unwrap();
        assert!(yaml.starts_with("apiVersion: siteconfig.open-cluster-management.io/v1alpha1\nkind: ClusterInstance\n"));
        assert!(yaml.contains("namespace: sno1"));
    }

    #[test]
    fn test_required_fields_always_emitted() {
        let yaml = serde_yaml::to_string(&make_instance()).unwrap();
        assert!(yaml.contains("pullSecretRef:"));
        assert!(yaml.contains("clusterImageSetNameRef:"));
        assert!(yaml.contains("templateRefs: []"));
        assert!(yaml.contains("bootMACAddress:"));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let yaml = serde_yaml::to_string(&make_instance()).unwrap();
        assert!(!yaml.contains("apiVIPs"));
        assert!(!yaml.contains("holdInstallation"));
        assert!(!yaml.contains("proxy"));
        assert!(!yaml.contains("diskEncryption"));
        assert!(!yaml.contains("ironicInspect"));
    }

    #[test]
    fn test_spec_field_order() {
        let yaml = serde_yaml::to_string(&make_instance()).unwrap();
        let cluster_name = yaml.find("clusterName:").unwrap();
        let refs = yaml.find("extraManifestsRefs:").unwrap();
        let nodes = yaml.find("nodes:").unwrap();
        assert!(cluster_name < refs && refs < nodes);
    }
}
