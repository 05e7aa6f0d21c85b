// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! YAML loading, dumping and comment scanning.

pub mod comments;
pub mod documents;

pub use comments::{scan, ScannedYaml};
pub use documents::{
    dump_document, dump_documents, first_document, load_manifests, parse_documents, parse_manifests, peek_annotations,
    peek_kind, read_file,
};
