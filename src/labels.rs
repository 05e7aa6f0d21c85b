// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label selector synthesis from binding rules.

use crate::error::Result;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use serde_json::Value;
use std::collections::BTreeMap;

pub const OP_IN: &str = "In";
pub const OP_EXISTS: &str = "Exists";
pub const OP_DOES_NOT_EXIST: &str = "DoesNotExist";

/// Build a selector where every rule becomes a `matchExpressions` requirement.
///
/// A required key with an empty value must exist, a required key with a value
/// must carry that value, and every excluded key must be absent. Requirements
/// are ordered by key; empty keys are ignored.
pub fn label_selector(
    required: &BTreeMap<String, String>,
    excluded: &BTreeMap<String, String>,
) -> LabelSelector {
    let mut requirements: Vec<LabelSelectorRequirement> = required
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| {
            if value.is_empty() {
                requirement(key, OP_EXISTS, None)
            } else {
                requirement(key, OP_IN, Some(vec![value.clone()]))
            }
        })
        .chain(
            excluded
                .keys()
                .filter(|key| !key.is_empty())
                .map(|key| requirement(key, OP_DOES_NOT_EXIST, None)),
        )
        .collect();
    requirements.sort_by(|a, b| a.key.cmp(&b.key));

    LabelSelector {
        match_expressions: if requirements.is_empty() {
            None
        } else {
            Some(requirements)
        },
        match_labels: None,
    }
}

fn requirement(key: &str, operator: &str, values: Option<Vec<String>>) -> LabelSelectorRequirement {
    LabelSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values,
    }
}

/// Generic value of a selector for inline embedding, `None` when it selects everything
pub fn selector_value(selector: &LabelSelector) -> Result<Option<Value>> {
    let value = serde_json::to_value(selector)?;
    match &value {
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(value)),
    }
}
