// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Placement files for the Placement API workaround.

use crate::constants::pgt;
use crate::error::Result;
use crate::fsutil;
use crate::types::placement::{ClusterSelector, Placement, PlacementSpec, Predicate, Toleration};
use crate::yaml::dump_document;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::path::Path;
use tracing::info;

pub fn build_placement(policy_name: &str, namespace: &str, selector: LabelSelector) -> Placement {
    let spec = PlacementSpec {
        predicates: vec![Predicate {
            required_cluster_selector: ClusterSelector {
                label_selector: selector,
            },
        }],
        tolerations: vec![Toleration {
            key: pgt::UNREACHABLE_TOLERATION_KEY.to_string(),
            operator: "Exists".to_string(),
        }],
    };

    let mut placement = Placement::new(&format!("placement-{}", policy_name), spec);
    placement.metadata.namespace = Some(namespace.to_string());
    placement
}

/// Write `<policy>-placement.yaml` into `template_dir` and return its file name
pub fn write_placement_file(
    policy_name: &str,
    namespace: &str,
    template_dir: &Path,
    selector: LabelSelector,
) -> Result<String> {
    let placement = build_placement(policy_name, namespace, selector);
    let relative = format!("{}-placement.yaml", policy_name);
    let path = template_dir.join(&relative);

    fsutil::write_file(&path, &dump_document(&placement)?)?;
    info!("Wrote placement file: {}", path.display());
    Ok(relative)
}
