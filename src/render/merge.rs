// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Strategic merge of patch overlays into manifests.

use super::schema::{ListStrategy, OpenApiSchema};
use serde_json::{Map, Value};

const PATCH_DIRECTIVE: &str = "$patch";

fn is_directive(key: &str) -> bool {
    key == PATCH_DIRECTIVE
        || key == "$retainKeys"
        || key.starts_with("$setElementOrder/")
        || key.starts_with("$deleteFromPrimitiveList/")
}

fn directive(map: &Map<String, Value>) -> Option<&str> {
    map.get(PATCH_DIRECTIVE).and_then(Value::as_str)
}

/// Merge `patch` into `target`.
///
/// Scalars overwrite, maps merge recursively and `null` removes a key. Lists are
/// replaced unless `node` (the schema of `target`) declares a merge strategy.
/// Keys already in `target` keep their position.
pub fn merge_map(
    target: &mut Map<String, Value>,
    patch: &Map<String, Value>,
    schema: &OpenApiSchema,
    node: Option<&Value>,
) {
    if directive(patch) == Some("replace") {
        *target = strip_directives_map(patch);
        return;
    }

    for (key, patch_value) in patch {
        if is_directive(key) {
            continue;
        }
        let property = node.and_then(|n| schema.property(n, key));

        match patch_value {
            Value::Null => {
                target.shift_remove(key);
            }
            Value::Object(patch_map) => {
                if directive(patch_map) == Some("delete") {
                    target.shift_remove(key);
                    continue;
                }
                match target.get_mut(key) {
                    Some(Value::Object(existing)) => merge_map(existing, patch_map, schema, property),
                    _ => {
                        target.insert(key.clone(), Value::Object(strip_directives_map(patch_map)));
                    }
                }
            }
            Value::Array(patch_list) => {
                let strategy = schema.list_strategy(property);
                let mergeable =
                    strategy != ListStrategy::Replace && matches!(target.get(key), Some(Value::Array(_)));
                if !mergeable {
                    target.insert(key.clone(), strip_directives(patch_value));
                    continue;
                }

                if let Some(Value::Array(existing)) = target.get_mut(key) {
                    match strategy {
                        ListStrategy::MergeByKey(merge_key) => {
                            let items = property.and_then(|p| schema.items(p));
                            merge_list_by_key(existing, patch_list, &merge_key, schema, items);
                        }
                        ListStrategy::MergeScalars => {
                            for item in patch_list {
                                if !existing.contains(item) {
                                    existing.push(item.clone());
                                }
                            }
                        }
                        ListStrategy::Replace => {}
                    }
                }
            }
            scalar => {
                target.insert(key.clone(), scalar.clone());
            }
        }
    }
}

fn merge_list_by_key(
    target: &mut Vec<Value>,
    patch: &[Value],
    merge_key: &str,
    schema: &OpenApiSchema,
    items: Option<&Value>,
) {
    let replace_all = patch
        .iter()
        .any(|item| item.as_object().and_then(directive) == Some("replace"));
    if replace_all {
        *target = patch
            .iter()
            .filter(|item| item.as_object().and_then(directive) != Some("replace"))
            .map(strip_directives)
            .collect();
        return;
    }

    for patch_item in patch {
        let Some(patch_map) = patch_item.as_object() else {
            target.push(patch_item.clone());
            continue;
        };
        let Some(key_value) = patch_map.get(merge_key) else {
            target.push(strip_directives(patch_item));
            continue;
        };

        let position = target
            .iter()
            .position(|existing| existing.get(merge_key) == Some(key_value));

        match (position, directive(patch_map)) {
            (Some(idx), Some("delete")) => {
                target.remove(idx);
            }
            (None, Some("delete")) => {}
            (Some(idx), _) => {
                if let Value::Object(existing) = &mut target[idx] {
                    merge_map(existing, patch_map, schema, items);
                }
            }
            (None, _) => target.push(strip_directives(patch_item)),
        }
    }
}

fn strip_directives_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !is_directive(key))
        .map(|(key, value)| (key.clone(), strip_directives(value)))
        .collect()
}

fn strip_directives(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_directives_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(strip_directives).collect()),
        other => other.clone(),
    }
}
