// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! OpenAPI lookups that drive list merging.

use crate::error::{Result, ZtpError};
use serde_json::Value;
use std::path::Path;

const GVK_EXTENSION: &str = "x-kubernetes-group-version-kind";
const PATCH_STRATEGY: &str = "x-kubernetes-patch-strategy";
const PATCH_MERGE_KEY: &str = "x-kubernetes-patch-merge-key";
const LIST_TYPE: &str = "x-kubernetes-list-type";
const LIST_MAP_KEYS: &str = "x-kubernetes-list-map-keys";

/// How a list in a patch combines with the list it targets
#[derive(Debug, Clone, PartialEq)]
pub enum ListStrategy {
    Replace,
    /// Elements with equal values under the key are merged
    MergeByKey(String),
    /// Scalar elements are unioned
    MergeScalars,
}

#[derive(Debug, Clone, Default)]
pub struct OpenApiSchema {
    root: Value,
}

impl OpenApiSchema {
    /// Parse a JSON (or YAML) OpenAPI document
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text).map_err(|e| ZtpError::parse(path, e))?;
        Ok(OpenApiSchema { root })
    }

    fn definitions(&self) -> Option<&serde_json::Map<String, Value>> {
        self.root
            .get("definitions")
            .or_else(|| self.root.pointer("/components/schemas"))
            .and_then(Value::as_object)
    }

    /// Schema of the resource with the given apiVersion and kind
    pub fn definition_for(&self, api_version: &str, kind: &str) -> Option<&Value> {
        let (group, version) = match api_version.rsplit_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };

        self.definitions()?.values().find(|definition| {
            definition
                .get(GVK_EXTENSION)
                .and_then(Value::as_array)
                .is_some_and(|gvks| {
                    gvks.iter().any(|gvk| {
                        gvk.get("group").and_then(Value::as_str).unwrap_or("") == group
                            && gvk.get("version").and_then(Value::as_str) == Some(version)
                            && gvk.get("kind").and_then(Value::as_str) == Some(kind)
                    })
                })
        })
    }

    /// Follow `$ref` (and single-entry `allOf`) to the referenced schema
    pub fn resolve<'a>(&'a self, node: &'a Value) -> &'a Value {
        let mut current = node;
        for _ in 0..32 {
            let reference = current.get("$ref").and_then(Value::as_str).or_else(|| {
                current
                    .get("allOf")
                    .and_then(Value::as_array)
                    .filter(|all| all.len() == 1)
                    .and_then(|all| all[0].get("$ref"))
                    .and_then(Value::as_str)
            });
            match reference.and_then(|r| self.lookup_ref(r)) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    fn lookup_ref(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        self.root.pointer(pointer)
    }

    pub fn property<'a>(&'a self, node: &'a Value, name: &str) -> Option<&'a Value> {
        self.resolve(node).get("properties")?.get(name)
    }

    pub fn items<'a>(&'a self, node: &'a Value) -> Option<&'a Value> {
        self.resolve(node).get("items")
    }

    pub fn list_strategy(&self, node: Option<&Value>) -> ListStrategy {
        let Some(node) = node else {
            return ListStrategy::Replace;
        };

        for candidate in [node, self.resolve(node)] {
            let strategy = candidate.get(PATCH_STRATEGY).and_then(Value::as_str).unwrap_or("");
            if strategy.split(',').any(|s| s.trim() == "merge") {
                return match candidate.get(PATCH_MERGE_KEY).and_then(Value::as_str) {
                    Some(key) => ListStrategy::MergeByKey(key.to_string()),
                    None => ListStrategy::MergeScalars,
                };
            }

            if candidate.get(LIST_TYPE).and_then(Value::as_str) == Some("map") {
                if let Some(key) = candidate
                    .get(LIST_MAP_KEYS)
                    .and_then(Value::as_array)
                    .and_then(|keys| keys.first())
                    .and_then(Value::as_str)
                {
                    return ListStrategy::MergeByKey(key.to_string());
                }
            }
        }
        ListStrategy::Replace
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PTP_SCHEMA: &str = r##"{
  "definitions": {
    "com.github.openshift.ptp.v1.PtpConfig": {
      "x-kubernetes-group-version-kind": [
        {"group": "ptp.openshift.io", "kind": "PtpConfig", "version": "v1"}
      ],
      "properties": {
        "spec": {"$ref": "#/definitions/com.github.openshift.ptp.v1.PtpConfigSpec"}
      }
    },
    "com.github.openshift.ptp.v1.PtpConfigSpec": {
      "properties": {
        "profile": {
          "type": "array",
          "x-kubernetes-patch-strategy": "merge",
          "x-kubernetes-patch-merge-key": "name",
          "items": {"$ref": "#/definitions/com.github.openshift.ptp.v1.PtpProfile"}
        },
        "recommend": {
          "type": "array",
          "x-kubernetes-list-type": "map",
          "x-kubernetes-list-map-keys": ["profile"],
          "items": {"type": "object"}
        }
      }
    },
    "com.github.openshift.ptp.v1.PtpProfile": {
      "properties": {
        "name": {"type": "string"},
        "interface": {"type": "string"}
      }
    }
  }
}"##;

    fn make_schema() -> OpenApiSchema {
        OpenApiSchema::parse(PTP_SCHEMA, Path::new("schema.json")).unwrap()
    }

    #[test]
    fn test_definition_for_gvk() {
        let schema = make_schema();
        assert!(schema.definition_for("ptp.openshift.io/v1", "PtpConfig").is_some());
        assert!(schema.definition_for("ptp.openshift.io/v2", "PtpConfig").is_none());
        assert!(schema.definition_for("v1", "ConfigMap").is_none());
    }

    #[test]
    fn test_property_navigation_and_strategy() {
        let schema = make_schema();
        let root = schema.definition_for("ptp.openshift.io/v1", "PtpConfig").unwrap();
        let spec = schema.property(root, "spec").unwrap();
        let profile = schema.property(spec, "profile");
        assert_eq!(
            schema.list_strategy(profile),
            ListStrategy::MergeByKey("name".to_string())
        );

        let recommend = schema.property(spec, "recommend");
        assert_eq!(
            schema.list_strategy(recommend),
            ListStrategy::MergeByKey("profile".to_string())
        );

        let item = schema.items(profile.unwrap()).unwrap();
        assert!(schema.property(item, "interface").is_some());
    }

    #[test]
    fn test_unknown_is_replace() {
        let schema = OpenApiSchema::default();
        assert_eq!(schema.list_strategy(None), ListStrategy::Replace);
    }
}
