// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::pgt;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "ran.openshift.io", version = "v1", kind = "PolicyGenTemplate")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PolicyGenTemplateSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binding_rules: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binding_excluded_rules: BTreeMap<String, String>,
    #[serde(default)]
    pub mcp: String,
    #[serde(default = "default_remediation_action")]
    pub remediation_action: String,
    #[serde(default = "default_compliance_type")]
    pub compliance_type: String,
    #[serde(default)]
    pub evaluation_interval: PolicyEvaluationInterval,
    #[serde(default)]
    pub source_files: Vec<SourceFile>,
}

fn default_remediation_action() -> String {
    pgt::DEFAULT_REMEDIATION_ACTION.to_string()
}

fn default_compliance_type() -> String {
    pgt::DEFAULT_COMPLIANCE_TYPE.to_string()
}

fn default_compliant() -> String {
    pgt::DEFAULT_COMPLIANT_INTERVAL.to_string()
}

fn default_noncompliant() -> String {
    pgt::DEFAULT_NONCOMPLIANT_INTERVAL.to_string()
}

/// Spec level evaluation interval; missing values fall back to 10m / 10s
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
pub struct PolicyEvaluationInterval {
    #[serde(default = "default_compliant")]
    pub compliant: String,
    #[serde(default = "default_noncompliant")]
    pub noncompliant: String,
}

impl Default for PolicyEvaluationInterval {
    fn default() -> Self {
        PolicyEvaluationInterval {
            compliant: default_compliant(),
            noncompliant: default_noncompliant(),
        }
    }
}

/// Per source file override; `None` means the spec level value applies
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct SourceEvaluationInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncompliant: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub policy_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_action: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub spec: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub status: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub binary_data: Map<String, Value>,
    #[serde(default)]
    pub evaluation_interval: SourceEvaluationInterval,
}

impl SourceFile {
    /// Overlay built from the non-empty patch sections, if any
    pub fn patch(&self) -> Option<Map<String, Value>> {
        let sections = [
            ("metadata", &self.metadata),
            ("spec", &self.spec),
            ("status", &self.status),
            ("data", &self.data),
            ("binaryData", &self.binary_data),
        ];

        let patch: Map<String, Value> = sections
            .into_iter()
            .filter(|(_, section)| !section.is_empty())
            .map(|(key, section)| (key.to_string(), Value::Object(section.clone())))
            .collect();

        if patch.is_empty() {
            None
        } else {
            Some(patch)
        }
    }
}

impl PolicyGenTemplate {
    /// Distinct policy names across all source files, sorted
    pub fn policy_names(&self) -> BTreeSet<&str> {
        self.spec
            .source_files
            .iter()
            .map(|f| f.policy_name.as_str())
            .collect()
    }

    /// Source files of one policy, in authoring order
    pub fn source_files_for<'a>(&'a self, policy: &'a str) -> impl Iterator<Item = &'a SourceFile> + 'a {
        self.spec
            .source_files
            .iter()
            .filter(move |f| f.policy_name == policy)
    }
}
