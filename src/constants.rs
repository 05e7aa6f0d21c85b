// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys read or written by the translators
pub mod annotations {
    /// Relative ordering of policies, read from source CRs
    pub const ZTP_DEPLOY_WAVE: &str = "ran.openshift.io/ztp-deploy-wave";
    /// Marks manifests rendered from SiteConfig extra manifests
    pub const ZTP_GITOPS_GENERATED: &str = "ran.openshift.io/ztp-gitops-generated";
    pub const ZTP_GITOPS_GENERATED_VALUE: &str = "{}";
    /// Conversion provenance on every ClusterInstance
    pub const SITECONFIG_CONVERTER: &str = "siteconfig-converter";
}

/// Kinds and API versions of the documents the tools read and emit
pub mod kinds {
    pub const POLICY_GEN_TEMPLATE: &str = "PolicyGenTemplate";
    pub const SITE_CONFIG: &str = "SiteConfig";
    pub const POLICY_GENERATOR: &str = "PolicyGenerator";
    pub const POLICY_GENERATOR_API_VERSION: &str = "policy.open-cluster-management.io/v1";
    pub const KUSTOMIZATION_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
}

/// PolicyGenTemplate translation constants
pub mod pgt {
    pub const ACM_PREFIX: &str = "acm-";
    pub const SOURCE_CRS_DIR: &str = "source-crs";
    pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
    pub const NAMESPACE_FILE: &str = "ns.yaml";
    pub const MCP_TOKEN: &str = "$mcp";
    pub const PGT_RENDERED_FILE: &str = "pgt-out.yaml";
    pub const ACMPG_RENDERED_FILE: &str = "acmpg-out.yaml";
    pub const UNREACHABLE_TOLERATION_KEY: &str = "cluster.open-cluster-management.io/unreachable";
    pub const GLOBAL_CLUSTER_SET: &str = "global";

    pub const DEFAULT_REMEDIATION_ACTION: &str = "inform";
    pub const DEFAULT_COMPLIANCE_TYPE: &str = "musthave";
    pub const DEFAULT_COMPLIANT_INTERVAL: &str = "10m";
    pub const DEFAULT_NONCOMPLIANT_INTERVAL: &str = "10s";
    pub const DEFAULT_SEVERITY: &str = "low";
}

/// SiteConfig conversion constants
pub mod siteconfig {
    pub const DEFAULT_CLUSTER_TEMPLATES: &str = "open-cluster-management/ai-cluster-templates-v1";
    pub const DEFAULT_NODE_TEMPLATES: &str = "open-cluster-management/ai-node-templates-v1";
    pub const SNIPPET_FILE: &str = "kustomization-configMapGenerator-snippet.yaml";
    pub const EXTRA_MANIFESTS_OUTPUT_DIR: &str = "extra-manifests";
    pub const DEFAULT_EXTRA_MANIFEST_DIR: &str = "extra-manifest";
    pub const CLUSTER_TYPE_SNO: &str = "SNO";
    pub const CLUSTER_TYPE_HA: &str = "HighlyAvailable";
    pub const IRONIC_INSPECT_ENABLED: &str = "enabled";

    /// Workload partitioning inputs, relative to an extra-manifest search path
    pub mod workload {
        pub const DIR: &str = "workload";
        pub const MACHINE_CONFIG: &str = "03-workload-partitioning.yaml";
        pub const CRIO_CONF: &str = "crio.conf";
        pub const KUBELET_CONF: &str = "kubelet.conf";
        pub const CPUSET_TOKEN: &str = "$cpuset";
        pub const CRIO_TOKEN: &str = "$crio";
        pub const KUBELET_TOKEN: &str = "$k8s";
    }
}
