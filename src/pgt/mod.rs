// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! PolicyGenTemplate to PolicyGenerator translation of a whole template tree.

pub mod convert;
pub mod kustomization;
pub mod mcp;
pub mod namespace;
pub mod patches;

pub use convert::{Converted, PgtConverter};

use crate::config::PgtConfig;
use crate::constants::{kinds, pgt};
use crate::error::Result;
use crate::fsutil;
use crate::render::render_tree_to_file;
use crate::yaml::peek_kind;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Translate every PolicyGenTemplate below `config.input` into the output tree
#[instrument(skip(config), fields(input = %config.input.display(), output = %config.output_dir.display()))]
pub fn translate_tree(config: &PgtConfig) -> Result<BTreeSet<String>> {
    let files = fsutil::yaml_files_in(&config.input)?;
    info!("Found {} YAML files in {}", files.len(), config.input.display());

    let pgt_files = policy_gen_templates(&files)?;

    if !config.source_crs.is_empty() {
        stage_source_crs(&pgt_files, config, &config.output_dir)?;
        stage_source_crs(&pgt_files, config, config.base_dir())?;
        info!("Added source-crs for all template directories");
    }

    let converter = PgtConverter::new(config);
    let mut namespaces = BTreeSet::new();
    for file in &pgt_files {
        let converted = converter.convert_file(file)?;
        if !converted.namespace.is_empty() {
            namespaces.insert(converted.namespace);
        }
    }
    info!("Converted {} PGT files, found namespaces: {:?}", pgt_files.len(), namespaces);

    kustomization::propagate_kustomizations(&config.input, &config.output_dir)?;

    if let Some(namespace_file) = &config.namespace_file {
        namespace::seed_namespace_file(
            namespace_file,
            config.base_dir(),
            &config.output_dir,
            &namespaces,
            config.skip_placement_bindings,
        )?;
    }

    if config.render_policies {
        render_tree_to_file(
            &config.output_dir,
            &config.render_dir.join(pgt::ACMPG_RENDERED_FILE),
            &config.kustomize_bin,
        )?;
        render_tree_to_file(
            &config.input,
            &config.render_dir.join(pgt::PGT_RENDERED_FILE),
            &config.kustomize_bin,
        )?;
    }

    Ok(namespaces)
}

fn policy_gen_templates(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut pgt_files = Vec::new();
    for file in files {
        if peek_kind(file)? == kinds::POLICY_GEN_TEMPLATE {
            pgt_files.push(file.clone());
        }
    }
    Ok(pgt_files)
}

/// Copy every source CR directory into `<target>/<template dir>/source-crs`.
/// Existing files win, so the first listed directory takes precedence.
fn stage_source_crs(pgt_files: &[PathBuf], config: &PgtConfig, target: &Path) -> Result<()> {
    let template_dirs: BTreeSet<&Path> = pgt_files
        .iter()
        .map(|file| file.parent().unwrap_or_else(|| Path::new(".")))
        .collect();

    for dir in template_dirs {
        let relative = fsutil::relative_to(config.base_dir(), dir)?;
        let destination = fsutil::clean(&target.join(relative).join(pgt::SOURCE_CRS_DIR));
        for source in &config.source_crs {
            fsutil::copy_dir(source, &destination)?;
            info!(
                "Copied source-crs at {} to {}",
                source.display(),
                destination.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZtpError;
    use crate::test_utils::TestDir;

    const PGT: &str = r#"apiVersion: ran.openshift.io/v1
kind: PolicyGenTemplate
metadata:
  name: common
  namespace: ztp-common
spec:
  bindingRules:
    common: "true"
  sourceFiles:
    - fileName: ClusterLogForwarder.yaml
      policyName: config-policy
      spec:
        outputs: []
"#;

    const CLF: &str = r#"apiVersion: logging.openshift.io/v1
kind: ClusterLogForwarder
metadata:
  name: instance
  namespace: openshift-logging
  annotations:
    ran.openshift.io/ztp-deploy-wave: "10"
spec:
  outputs:
    - name: kafka
"#;

    fn make_config(input: &TestDir, output: &TestDir, reference: &TestDir) -> PgtConfig {
        PgtConfig {
            input: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            schema: None,
            pre_render_kinds: Vec::new(),
            render_policies: false,
            namespace_file: Some(PathBuf::from("ns.yaml")),
            skip_placement_bindings: false,
            source_crs: vec![reference.path().to_path_buf()],
            placement_api: false,
            force_wave: None,
            kustomize_bin: "kustomize".to_string(),
            render_dir: PathBuf::from("."),
        }
    }

    fn make_tree() -> (TestDir, TestDir, TestDir) {
        let input = TestDir::new();
        let output = TestDir::new();
        let reference = TestDir::new();
        input.write("common-ranGen.yaml", PGT);
        input.write("ns.yaml", "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: ztp-common\n");
        input.write(
            "kustomization.yaml",
            "generators:\n- common-ranGen.yaml\nresources:\n- ns.yaml\n",
        );
        reference.write("ClusterLogForwarder.yaml", CLF);
        (input, output, reference)
    }

    #[test]
    fn test_translate_tree_end_to_end() {
        let (input, output, reference) = make_tree();
        let config = make_config(&input, &output, &reference);

        let namespaces = translate_tree(&config).unwrap();
        assert_eq!(namespaces, BTreeSet::from(["ztp-common".to_string()]));

        assert!(input.exists("source-crs/ClusterLogForwarder.yaml"));
        assert!(output.exists("source-crs/ClusterLogForwarder.yaml"));

        let generator: serde_json::Value = serde_yaml::from_str(&output.read("acm-common-ranGen.yaml")).unwrap();
        let policy = &generator["policies"][0];
        assert_eq!(policy["name"], "common-config-policy");
        assert_eq!(policy["policyAnnotations"]["ran.openshift.io/ztp-deploy-wave"], "10");
        assert_eq!(policy["manifests"][0]["path"], "source-crs/ClusterLogForwarder.yaml");

        assert!(output.read("kustomization.yaml").contains("acm-common-ranGen.yaml"));
        let ns = output.read("ns.yaml");
        assert!(ns.contains("kind: ManagedClusterSetBinding"));
        assert!(ns.contains("  namespace: ztp-common\nspec:\n  clusterSet: global\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_policies_writes_both_trees() {
        let (input, output, reference) = make_tree();
        let tools = TestDir::new();
        let bin = tools.write_script("kustomize", "echo \"---\"\necho \"root: $5\"\n");

        let mut config = make_config(&input, &output, &reference);
        config.render_policies = true;
        config.kustomize_bin = bin.to_string_lossy().into_owned();
        config.render_dir = tools.path().to_path_buf();
        translate_tree(&config).unwrap();

        assert_eq!(
            tools.read("acmpg-out.yaml"),
            format!("---\nroot: {}\n", output.path().display())
        );
        assert_eq!(
            tools.read("pgt-out.yaml"),
            format!("---\nroot: {}\n", input.path().display())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_render_policies_failure_is_reported() {
        let (input, output, reference) = make_tree();
        let tools = TestDir::new();
        let bin = tools.write_script("kustomize", "echo \"plugin not found\" >&2\nexit 1\n");

        let mut config = make_config(&input, &output, &reference);
        config.render_policies = true;
        config.kustomize_bin = bin.to_string_lossy().into_owned();
        config.render_dir = tools.path().to_path_buf();

        let err = translate_tree(&config).unwrap_err();
        assert!(matches!(err, ZtpError::Render(_)));
        assert!(err.to_string().contains("plugin not found"));
        assert!(!tools.exists("acmpg-out.yaml"));
        assert!(output.exists("acm-common-ranGen.yaml"));
    }

    #[test]
    fn test_translate_tree_is_deterministic() {
        let (input, output, reference) = make_tree();
        let config = make_config(&input, &output, &reference);
        translate_tree(&config).unwrap();
        let first = output.read("acm-common-ranGen.yaml");

        let second_output = TestDir::new();
        let config = make_config(&input, &second_output, &reference);
        translate_tree(&config).unwrap();
        assert_eq!(first, second_output.read("acm-common-ranGen.yaml"));
    }

    #[test]
    fn test_non_pgt_files_ignored() {
        let (input, output, reference) = make_tree();
        input.write("other/cm.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\n");
        let config = make_config(&input, &output, &reference);
        translate_tree(&config).unwrap();
        assert!(!output.exists("other/acm-cm.yaml"));
    }
}
