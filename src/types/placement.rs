// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "cluster.open-cluster-management.io", version = "v1beta1", kind = "Placement")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSpec {
    #[serde(default)]
    pub predicates: Vec<Predicate>,
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub required_cluster_selector: ClusterSelector,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSelector {
    pub label_selector: LabelSelector,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct Toleration {
    pub key: String,
    pub operator: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1beta2",
    kind = "ManagedClusterSetBinding"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSetBindingSpec {
    pub cluster_set: String,
}

impl ManagedClusterSetBinding {
    /// Binding of a cluster set into a namespace; the binding is named after the set
    pub fn for_namespace(cluster_set: &str, namespace: &str) -> Self {
        let mut binding = ManagedClusterSetBinding::new(
            cluster_set,
            ManagedClusterSetBindingSpec {
                cluster_set: cluster_set.to_string(),
            },
        );
        binding.metadata.namespace = Some(namespace.to_string());
        binding
    }
}
