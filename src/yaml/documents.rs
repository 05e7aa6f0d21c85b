// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{Result, ZtpError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DOCUMENT_SEPARATOR: &str = "---\n";

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ZtpError::io(path, e))
}

/// Every non-null document of a YAML stream
pub fn parse_documents(text: &str, path: &Path) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document).map_err(|e| ZtpError::parse(path, e))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// First document of a YAML stream, `Null` when the stream is empty
pub fn first_document(text: &str, path: &Path) -> Result<Value> {
    match serde_yaml::Deserializer::from_str(text).next() {
        Some(document) => Value::deserialize(document).map_err(|e| ZtpError::parse(path, e)),
        None => Ok(Value::Null),
    }
}

/// Kind of the first document in a file, empty when it has none
pub fn peek_kind(path: &Path) -> Result<String> {
    let document = first_document(&read_file(path)?, path)?;
    Ok(document
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// `metadata.annotations` of the first document in a file, scalars rendered as strings
pub fn peek_annotations(path: &Path) -> Result<BTreeMap<String, String>> {
    let document = first_document(&read_file(path)?, path)?;
    let annotations = document
        .pointer("/metadata/annotations")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default();
    Ok(annotations)
}

/// Load every document of a manifest file; each must be a mapping
pub fn load_manifests(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let text = read_file(path)?;
    parse_manifests(&text, path)
}

pub fn parse_manifests(text: &str, path: &Path) -> Result<Vec<Map<String, Value>>> {
    parse_documents(text, path)?
        .into_iter()
        .map(|document| match document {
            Value::Object(map) => Ok(map),
            _ => Err(ZtpError::parse(
                path,
                "the input manifests must be in the format of YAML objects",
            )),
        })
        .collect()
}

/// Serialize a single document with a leading separator
pub fn dump_document<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{}{}", DOCUMENT_SEPARATOR, serde_yaml::to_string(value)?))
}

/// Serialize a stream of documents, each with a leading separator
pub fn dump_documents<T: Serialize>(values: &[T]) -> Result<String> {
    let mut out = String::new();
    for value in values {
        out.push_str(&dump_document(value)?);
    }
    Ok(out)
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
