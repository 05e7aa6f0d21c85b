// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Carries comments of a SiteConfig over to the ClusterInstance built from it.
//!
//! Comments on fields with a ClusterInstance counterpart are placed above that
//! field. Everything else that belongs to the cluster ends up in a header block.

use crate::yaml::comments::LINE_SUFFIX;
use crate::yaml::{scan, ScannedYaml};
use std::collections::BTreeMap;

const HEADER: &str = "# Comments from original SiteConfig:";

const SPEC_FIELDS: [(&str, &str); 4] = [
    ("spec.baseDomain", "spec.baseDomain"),
    ("spec.pullSecretRef", "spec.pullSecretRef"),
    ("spec.clusterImageSetNameRef", "spec.clusterImageSetNameRef"),
    ("spec.sshPublicKey", "spec.sshPublicKey"),
];

const CLUSTER_FIELDS: [(&str, &str); 17] = [
    ("clusterName", "clusterName"),
    ("networkType", "networkType"),
    ("clusterNetwork", "clusterNetwork"),
    ("machineNetwork", "machineNetwork"),
    ("serviceNetwork", "serviceNetwork"),
    ("additionalNTPSources", "additionalNTPSources"),
    ("apiVIP", "apiVIPs"),
    ("ingressVIP", "ingressVIPs"),
    ("apiVIPs", "apiVIPs"),
    ("ingressVIPs", "ingressVIPs"),
    ("holdInstallation", "holdInstallation"),
    ("installConfigOverrides", "installConfigOverrides"),
    ("ignitionConfigOverride", "ignitionConfigOverride"),
    ("diskEncryption", "diskEncryption"),
    ("proxy", "proxy"),
    ("cpuPartitioningMode", "cpuPartitioningMode"),
    ("nodes", "nodes"),
];

const NODE_FIELDS: [&str; 12] = [
    "hostName",
    "bmcAddress",
    "bmcCredentialsName",
    "bootMACAddress",
    "bootMode",
    "role",
    "nodeLabels",
    "nodeNetwork",
    "ignitionConfigOverride",
    "installerArgs",
    "ironicInspect",
    "templateRefs",
];

/// SiteConfig path to ClusterInstance path for one cluster
fn field_mapping(cluster_index: usize, node_count: usize) -> Vec<(String, String)> {
    let cluster = format!("spec.clusters[{}]", cluster_index);
    let mut mapping: Vec<(String, String)> = SPEC_FIELDS
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    mapping.extend(
        CLUSTER_FIELDS
            .iter()
            .map(|(from, to)| (format!("{}.{}", cluster, from), format!("spec.{}", to))),
    );

    for node in 0..node_count {
        mapping.extend(NODE_FIELDS.iter().map(|field| {
            (
                format!("{}.nodes[{}].{}", cluster, node, field),
                format!("spec.nodes[{}].{}", node, field),
            )
        }));
    }
    mapping
}

/// Insert the comments of cluster `cluster_index` into the serialized ClusterInstance
/// `body`. Returns the header block of unplaced comments and the annotated body.
pub fn propagate(
    source: &ScannedYaml,
    body: &str,
    cluster_index: usize,
    node_count: usize,
) -> (String, String) {
    let mapping = field_mapping(cluster_index, node_count);
    (
        header_block(source, &mapping, cluster_index),
        annotate_fields(source, body, &mapping),
    )
}

fn header_block(source: &ScannedYaml, mapping: &[(String, String)], cluster_index: usize) -> String {
    let own_cluster = format!("spec.clusters[{}]", cluster_index);

    let mut lines = Vec::new();
    for comment in &source.comments {
        let path = comment.path.strip_suffix(LINE_SUFFIX).unwrap_or(&comment.path);
        if path.contains("nodes[") || belongs_to_other_cluster(path, &own_cluster) {
            continue;
        }
        if mapping.iter().any(|(from, _)| from == path) {
            continue;
        }
        lines.extend(comment_lines(&comment.text));
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut block = format!("{}\n", HEADER);
    for line in lines {
        block.push_str("# ");
        block.push_str(&line);
        block.push('\n');
    }
    block.push_str("#\n");
    block
}

fn belongs_to_other_cluster(path: &str, own_cluster: &str) -> bool {
    path.starts_with("spec.clusters[") && !path.starts_with(own_cluster)
}

fn annotate_fields(source: &ScannedYaml, body: &str, mapping: &[(String, String)]) -> String {
    let target = scan(body);
    let lines: Vec<&str> = body.split('\n').collect();

    let mut inserts: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (from, to) in mapping {
        let Some(text) = source
            .comment(from)
            .or_else(|| source.comment(&format!("{}{}", from, LINE_SUFFIX)))
        else {
            continue;
        };
        let Some(index) = target.line_of(to) else {
            continue;
        };
        let indent = indentation(lines.get(index).copied().unwrap_or_default());
        inserts
            .entry(index)
            .or_default()
            .extend(comment_lines(text).into_iter().map(|line| format!("{}# {}", indent, line)));
    }

    let mut annotated = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        if let Some(comments) = inserts.get(&index) {
            annotated.extend(comments.iter().cloned());
        }
        annotated.push(line.to_string());
    }
    annotated.join("\n")
}

fn comment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches('#').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = r#"# Managed by the RAN team
apiVersion: ran.openshift.io/v1
kind: SiteConfig
spec:
  # Lab domain
  baseDomain: example.com
  clusters:
  - clusterName: "sno1" # first cluster
    # VIP used by the old installer
    apiVIP: 10.0.0.1
    # Not carried over
    extraManifestPath: extra/
    nodes:
      # The only node
      - hostName: node1
        role: master # control plane
  - clusterName: "sno2" # second cluster
"#;

    const BODY: &str = "apiVersion: siteconfig.open-cluster-management.io/v1alpha1
kind: ClusterInstance
spec:
  clusterName: sno1
  baseDomain: example.com
  apiVIPs:
  - 10.0.0.1
  nodes:
  - hostName: node1
    role: master
";

    #[test]
    fn test_field_comments_placed_above_target() {
        let (_, body) = propagate(&scan(SITE), BODY, 0, 1);
        assert!(body.contains("  # Lab domain\n  baseDomain: example.com\n"));
        assert!(body.contains("  # first cluster\n  clusterName: sno1\n"));
        assert!(body.contains("  # VIP used by the old installer\n  apiVIPs:\n"));
        assert!(body.contains("  # The only node\n  - hostName: node1\n"));
        assert!(body.contains("    # control plane\n    role: master\n"));
    }

    #[test]
    fn test_unmapped_comments_go_to_header() {
        let (header, _) = propagate(&scan(SITE), BODY, 0, 1);
        assert_eq!(
            header,
            "# Comments from original SiteConfig:\n# Managed by the RAN team\n# Not carried over\n#\n"
        );
    }

    #[test]
    fn test_other_cluster_comments_excluded() {
        let (header, body) = propagate(&scan(SITE), BODY, 0, 1);
        assert!(!header.contains("second cluster"));
        assert!(!body.contains("second cluster"));

        let (_, second) = propagate(&scan(SITE), "spec:\n  clusterName: sno2\n", 1, 0);
        assert_eq!(second, "spec:\n  # second cluster\n  clusterName: sno2\n");
    }

    #[test]
    fn test_no_comments_leaves_body_unchanged() {
        let (header, body) = propagate(&scan("spec:\n  baseDomain: x\n"), BODY, 0, 1);
        assert!(header.is_empty());
        assert_eq!(body, BODY);
    }
}
