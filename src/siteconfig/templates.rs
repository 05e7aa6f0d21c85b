// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, ZtpError};
use crate::types::clusterinstance::TemplateRef;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(-\s)?\s*(.*?)\s*(\s-)?\}\}").expect("valid template action pattern"));

/// Parse a comma separated list of `namespace/name` template references
pub fn parse_template_refs(refs: &str) -> Result<Vec<TemplateRef>> {
    let mut parsed = Vec::new();
    for entry in refs.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split('/').collect();
        if parts.len() != 2 {
            return Err(ZtpError::InvalidConfig(format!(
                "invalid template reference format '{}', expected 'namespace/name'",
                entry
            )));
        }

        let namespace = parts[0].trim();
        let name = parts[1].trim();
        if namespace.is_empty() || name.is_empty() {
            return Err(ZtpError::InvalidConfig(format!(
                "invalid template reference format '{}', namespace and name cannot be empty",
                entry
            )));
        }

        parsed.push(TemplateRef {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
    }
    Ok(parsed)
}

/// Render an extra-manifest template for one node role.
///
/// Supported actions are `{{ .Role }}`, `{{ .Data }}` and field lookups such as
/// `{{ .Data.ClusterName }}` against the serialized cluster. `{{-` and `-}}`
/// trim the surrounding whitespace. Control structures (`if`, `range`, `with`),
/// functions such as `eq` and `{{/* */}}` comments are not supported; a
/// template using them fails with a render error naming the template.
pub fn render_template(name: &str, text: &str, role: &str, data: &Value) -> Result<String> {
    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;
    let mut trim_next = false;

    for caps in ACTION.captures_iter(text) {
        let Some(action) = caps.get(0) else {
            continue;
        };
        let mut literal = &text[last..action.start()];
        if trim_next {
            literal = literal.trim_start();
        }
        if caps.get(1).is_some() {
            literal = literal.trim_end();
        }
        rendered.push_str(literal);

        let expression = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        rendered.push_str(&evaluate(name, expression, role, data)?);

        trim_next = caps.get(3).is_some();
        last = action.end();
    }

    let tail = &text[last..];
    rendered.push_str(if trim_next { tail.trim_start() } else { tail });
    Ok(rendered)
}

fn evaluate(name: &str, expression: &str, role: &str, data: &Value) -> Result<String> {
    if expression == ".Role" {
        return Ok(role.to_string());
    }
    if expression == ".Data" {
        return Ok(to_text(data));
    }

    let Some(fields) = expression.strip_prefix(".Data.") else {
        return Err(ZtpError::Render(format!(
            "template {}: unsupported action {{{{ {} }}}}",
            name, expression
        )));
    };

    let mut current = data;
    for field in fields.split('.') {
        current = lookup(current, field).ok_or_else(|| {
            ZtpError::Render(format!(
                "template {}: can't evaluate field {} in {}",
                name, field, expression
            ))
        })?;
    }
    Ok(to_text(current))
}

/// Exported field names map to the lower camel case YAML keys
fn lookup<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    map.get(field).or_else(|| {
        let mut chars = field.chars();
        let first = chars.next()?;
        map.get(&format!("{}{}", first.to_lowercase(), chars.as_str()))
    })
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
