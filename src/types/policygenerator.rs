// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! PolicyGenerator configuration consumed by the ACM policy generator plugin.

use crate::constants::{kinds, pgt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyGenerator {
    pub api_version: String,
    pub kind: String,
    pub metadata: GeneratorMetadata,
    pub placement_binding_defaults: PlacementBindingDefaults,
    pub policy_defaults: PolicyDefaults,
    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
}

impl PolicyGenerator {
    pub fn new(name: &str) -> Self {
        PolicyGenerator {
            api_version: kinds::POLICY_GENERATOR_API_VERSION.to_string(),
            kind: kinds::POLICY_GENERATOR.to_string(),
            metadata: GeneratorMetadata {
                name: name.to_string(),
            },
            placement_binding_defaults: PlacementBindingDefaults {
                name: format!("{}-placement-binding", name),
            },
            policy_defaults: PolicyDefaults::default(),
            policies: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeneratorMetadata {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacementBindingDefaults {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDefaults {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementConfig>,
    pub remediation_action: String,
    pub severity: String,
    pub namespace_selector: NamespaceSelector,
    pub evaluation_interval: EvaluationInterval,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        PolicyDefaults {
            namespace: String::new(),
            placement: None,
            remediation_action: pgt::DEFAULT_REMEDIATION_ACTION.to_string(),
            severity: pgt::DEFAULT_SEVERITY.to_string(),
            namespace_selector: NamespaceSelector::default(),
            evaluation_interval: EvaluationInterval::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NamespaceSelector {
    pub exclude: Vec<String>,
    pub include: Vec<String>,
}

impl Default for NamespaceSelector {
    fn default() -> Self {
        NamespaceSelector {
            exclude: vec!["kube-*".to_string()],
            include: vec!["*".to_string()],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_path: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EvaluationInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncompliant: Option<String>,
}

impl EvaluationInterval {
    pub fn is_empty(&self) -> bool {
        self.compliant.is_none() && self.noncompliant.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementConfig>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub policy_annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_action: Option<String>,
    #[serde(default, skip_serializing_if = "EvaluationInterval::is_empty")]
    pub evaluation_interval: EvaluationInterval,
    #[serde(default)]
    pub manifests: Vec<Manifest>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<Map<String, Value>>,
}
