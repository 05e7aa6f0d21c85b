// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::pgt;
use crate::error::{Result, ZtpError};
use crate::fsutil;
use crate::types::ManagedClusterSetBinding;
use crate::yaml::{dump_document, read_file};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Seed the namespace file into the output tree and bind the global cluster
/// set into every policy namespace
pub fn seed_namespace_file(
    namespace_file: &Path,
    input_dir: &Path,
    output_dir: &Path,
    namespaces: &BTreeSet<String>,
    skip_bindings: bool,
) -> Result<()> {
    let target = output_dir.join(namespace_file);
    if !target.exists() {
        let source = input_dir.join(namespace_file);
        if !source.is_file() {
            warn!(
                "Namespace file {} not found, skipping placement bindings",
                source.display()
            );
            return Ok(());
        }
        fsutil::write_file(&target, &read_file(&source)?)?;
    }

    if skip_bindings {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(&target)
        .map_err(|e| ZtpError::io(&target, e))?;
    for namespace in namespaces {
        let binding = ManagedClusterSetBinding::for_namespace(pgt::GLOBAL_CLUSTER_SET, namespace);
        let block = format!("\n{}", dump_document(&binding)?);
        file.write_all(block.as_bytes())
            .map_err(|e| ZtpError::io(&target, e))?;
        info!(
            "Added default placement binding for namespace: {} to: {}",
            namespace,
            target.display()
        );
    }
    Ok(())
}
