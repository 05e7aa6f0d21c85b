// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Annotations to add per CR kind, keyed by kind
pub type KindAnnotations = BTreeMap<String, BTreeMap<String, String>>;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "ran.openshift.io", version = "v1", kind = "SiteConfig")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigSpec {
    #[serde(default)]
    pub pull_secret_ref: NameRef,
    #[serde(default)]
    pub cluster_image_set_name_ref: String,
    #[serde(default)]
    pub ssh_public_key: String,
    #[serde(default)]
    pub ssh_private_key_secret_ref: NameRef,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub base_domain: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cr_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub cr_annotations: CrAnnotations,
    #[serde(default)]
    pub bios_config_ref: BiosConfigRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NameRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct CrAnnotations {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub add: KindAnnotations,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BiosConfigRef {
    #[serde(default)]
    pub file_path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, rename = "apiVIP")]
    pub api_vip: String,
    #[serde(default, rename = "ingressVIP")]
    pub ingress_vip: String,
    #[serde(default, rename = "apiVIPs")]
    pub api_vips: Vec<String>,
    #[serde(default, rename = "ingressVIPs")]
    pub ingress_vips: Vec<String>,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub hold_installation: bool,
    #[serde(default, rename = "additionalNTPSources")]
    pub additional_ntp_sources: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub machine_network: Vec<CidrEntry>,
    #[serde(default)]
    pub service_network: Vec<String>,
    #[serde(default)]
    pub cluster_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub network_type: String,
    #[serde(default)]
    pub install_config_overrides: String,
    #[serde(default)]
    pub cluster_network: Vec<ClusterNetwork>,
    #[serde(default)]
    pub ignition_config_override: String,
    #[serde(default)]
    pub disk_encryption: DiskEncryption,
    #[serde(default)]
    pub proxy: Proxy,
    #[serde(default)]
    pub extra_manifest_path: String,
    #[serde(default)]
    pub cluster_image_set_name_ref: String,
    #[serde(default)]
    pub bios_config_ref: BiosConfigRef,
    #[serde(default)]
    pub extra_manifests: ExtraManifests,
    #[serde(default)]
    pub cpu_partitioning_mode: String,
    #[serde(default)]
    pub site_config_map: SiteConfigMap,
    #[serde(default)]
    pub platform_type: String,
    #[serde(default)]
    pub cpu_architecture: String,
    #[serde(default)]
    pub extra_manifest_only: bool,
    #[serde(default)]
    pub cr_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub cr_annotations: CrAnnotations,
    #[serde(default)]
    pub cr_suppression: Vec<String>,
    #[serde(default)]
    pub manifests_config_map_refs: Vec<NameRef>,
    #[serde(default)]
    pub merge_default_machine_configs: bool,
}

impl Cluster {
    /// Single node clusters are SNO, everything else is highly available
    pub fn is_sno(&self) -> bool {
        self.nodes.len() == 1
    }

    /// SiteConfig paths are relative to the directory of the SiteConfig file
    pub fn search_paths(&self) -> Option<&[String]> {
        self.extra_manifests.search_paths.as_deref()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct CidrEntry {
    #[serde(default)]
    pub cidr: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetwork {
    #[serde(default)]
    pub cidr: String,
    #[serde(default)]
    pub host_prefix: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct DiskEncryption {
    #[serde(default, rename = "type")]
    pub encryption_type: String,
    #[serde(default)]
    pub tang: Vec<TangServer>,
    #[serde(default)]
    pub tpm2: Tpm2Config,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct TangServer {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbprint: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tpm2Config {
    #[serde(default)]
    pub pcr_list: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub no_proxy: String,
}

impl Proxy {
    pub fn is_empty(&self) -> bool {
        self.http_proxy.is_empty() && self.https_proxy.is_empty() && self.no_proxy.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraManifests {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl ExtraManifests {
    pub fn is_set(&self) -> bool {
        self.search_paths.is_some() || self.filter.is_some()
    }
}

/// Extra manifest selection. An unset `inclusionDefault` behaves as `include`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_default: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct SiteConfigMap {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub bmc_address: String,
    #[serde(default, rename = "bootMACAddress")]
    pub boot_mac_address: String,
    #[serde(default)]
    pub automated_cleaning_mode: String,
    #[serde(default)]
    pub root_device_hints: Map<String, Value>,
    #[serde(default)]
    pub cpuset: String,
    #[serde(default)]
    pub node_network: NodeNetwork,
    #[serde(default)]
    pub node_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub bmc_credentials_name: NameRef,
    #[serde(default)]
    pub boot_mode: String,
    #[serde(default)]
    pub user_data: Map<String, Value>,
    #[serde(default)]
    pub installer_args: String,
    #[serde(default)]
    pub ignition_config_override: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub cr_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub cr_annotations: CrAnnotations,
    #[serde(default)]
    pub cr_suppression: Vec<String>,
    #[serde(default)]
    pub bios_config_ref: BiosConfigRef,
    #[serde(default)]
    pub disk_partition: Vec<Value>,
    #[serde(default)]
    pub ironic_inspect: String,
}

impl Node {
    /// Role used when rendering per-role manifests; nodes without one are masters
    pub fn effective_role(&self) -> &str {
        if self.role.is_empty() {
            "master"
        } else {
            &self.role
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct NodeNetwork {
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
}

impl NodeNetwork {
    pub fn is_empty(&self) -> bool {
        self.config.is_empty() && self.interfaces.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mac_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"
apiVersion: ran.openshift.io/v1
kind: SiteConfig
metadata:
  name: site-plan-sno
  namespace: ztp-site
spec:
  baseDomain: example.com
  pullSecretRef:
    name: assisted-deployment-pull-secret
  clusterImageSetNameRef: openshift-4.16
  sshPublicKey: ssh-rsa AAAA
  clusters:
    - clusterName: sno1
      networkType: OVNKubernetes
      apiVIP: 10.0.0.1
      clusterLabels:
        common: "true"
      serviceNetwork:
        - 172.30.0.0/16
      clusterNetwork:
        - cidr: 10.128.0.0/14
          hostPrefix: 23
      extraManifests:
        filter:
          inclusionDefault: exclude
          include:
            - 03-sctp-machine-config-master.yaml
      nodes:
        - hostName: node1.example.com
          role: master
          bmcAddress: idrac-virtualmedia+https://10.16.231.87/redfish/v1/Systems/System.Embedded.1
          bmcCredentialsName:
            name: node1-bmc-secret
          bootMACAddress: "0C:42:A1:8A:74:EC"
          cpuset: "0-3"
          rootDeviceHints:
            deviceName: /dev/sda
            minSizeGigabytes: 300
          nodeNetwork:
            interfaces:
              - name: eno1
                macAddress: "0C:42:A1:8A:74:EC"
"#;

    fn make_site() -> SiteConfig {
        serde_yaml::from_str(SITE).unwrap()
    }

    #[test]
    fn test_parse_cluster_fields() {
        let site = make_site();
        assert_eq!(site.spec.base_domain, "example.com");
        assert_eq!(site.spec.pull_secret_ref.name, "assisted-deployment-pull-secret");

        let cluster = &site.spec.clusters[0];
        assert_eq!(cluster.cluster_name, "sno1");
        assert_eq!(cluster.api_vip, "10.0.0.1");
        assert!(cluster.api_vips.is_empty());
        assert_eq!(cluster.cluster_network[0].host_prefix, 23);
        assert_eq!(cluster.cluster_labels.get("common").map(String::as_str), Some("true"));
        assert!(cluster.is_sno());
    }

    #[test]
    fn test_parse_filter_keeps_inclusion_default_nullable() {
        let site = make_site();
        let filter = site.spec.clusters[0].extra_manifests.filter.as_ref().unwrap();
        assert_eq!(filter.inclusion_default.as_deref(), Some("exclude"));
        assert!(site.spec.clusters[0].search_paths().is_none());

        let empty: Filter = serde_yaml::from_str("exclude: []").unwrap();
        assert!(empty.inclusion_default.is_none());
    }

    #[test]
    fn test_parse_node_fields() {
        let site = make_site();
        let node = &site.spec.clusters[0].nodes[0];
        assert_eq!(node.boot_mac_address, "0C:42:A1:8A:74:EC");
        assert_eq!(node.cpuset, "0-3");
        assert_eq!(node.root_device_hints["minSizeGigabytes"], 300);
        assert_eq!(node.node_network.interfaces[0].name, "eno1");
        assert!(node.ironic_inspect.is_empty());
    }

    #[test]
    fn test_effective_role_defaults_to_master() {
        let node = Node::default();
        assert_eq!(node.effective_role(), "master");

        let worker = Node {
            role: "worker".to_string(),
            ..Default::default()
        };
        assert_eq!(worker.effective_role(), "worker");
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let cluster: Cluster =
            serde_yaml::from_str("clusterName: c1\nsomethingNew: 42\nnodes: []\n").unwrap();
        assert_eq!(cluster.cluster_name, "c1");
    }
}
