// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Conversion of a single PolicyGenTemplate into a PolicyGenerator.

use super::mcp::render_mcp_lines;
use super::patches::ManifestPatcher;
use crate::config::PgtConfig;
use crate::constants::{annotations, pgt};
use crate::error::{Result, ZtpError};
use crate::fsutil;
use crate::labels::{label_selector, selector_value};
use crate::placement::write_placement_file;
use crate::types::policygenerator::{EvaluationInterval, Manifest, PlacementConfig, PolicyConfig};
use crate::types::{PolicyGenTemplate, PolicyGenerator};
use crate::yaml::{dump_document, first_document, load_manifests, peek_annotations, read_file};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Result of converting one PolicyGenTemplate
#[derive(Debug, Clone)]
pub struct Converted {
    pub generator: PolicyGenerator,
    pub namespace: String,
    pub output_file: PathBuf,
}

pub struct PgtConverter<'a> {
    config: &'a PgtConfig,
}

impl<'a> PgtConverter<'a> {
    pub fn new(config: &'a PgtConfig) -> Self {
        Self { config }
    }

    /// Convert the PGT at `pgt_path` and write `acm-<name>.yaml` into the output tree
    #[instrument(skip(self), fields(pgt = %pgt_path.display()))]
    pub fn convert_file(&self, pgt_path: &Path) -> Result<Converted> {
        let pgt = load_pgt(pgt_path)?;
        let namespace = pgt.metadata.namespace.clone().unwrap_or_default();
        let generator = self.convert(&pgt, pgt_path)?;

        let relative = fsutil::relative_to(self.config.base_dir(), pgt_path)?;
        let output_file = self
            .config
            .output_dir
            .join(fsutil::prefix_last_component(&relative, pgt::ACM_PREFIX));
        let content = dump_document(&generator)?.replace(pgt::MCP_TOKEN, &pgt.spec.mcp);
        fsutil::write_file(&output_file, &content)?;
        info!("Wrote converted ACM template: {}", output_file.display());

        Ok(Converted {
            generator,
            namespace,
            output_file,
        })
    }

    pub fn convert(&self, pgt: &PolicyGenTemplate, pgt_path: &Path) -> Result<PolicyGenerator> {
        validate_source_files(pgt, pgt_path)?;

        let root_name = pgt.metadata.name.clone().unwrap_or_default();
        let namespace = pgt.metadata.namespace.clone().unwrap_or_default();
        let template_dir = self.template_dir(pgt_path)?;

        let mut generator = PolicyGenerator::new(&root_name);
        generator.policy_defaults.namespace = namespace.clone();
        generator.policy_defaults.evaluation_interval = EvaluationInterval {
            compliant: Some(pgt.spec.evaluation_interval.compliant.clone()),
            noncompliant: Some(pgt.spec.evaluation_interval.noncompliant.clone()),
        };

        let selector = label_selector(&pgt.spec.binding_rules, &pgt.spec.binding_excluded_rules);
        if !self.config.placement_api {
            generator.policy_defaults.placement = selector_value(&selector)?.map(|value| PlacementConfig {
                label_selector: Some(value),
                placement_path: None,
            });
        }

        for policy_name in pgt.policy_names() {
            let mut policy = self.build_policy(pgt, pgt_path, &root_name, policy_name, &template_dir)?;

            if self.config.placement_api {
                let placement_path =
                    write_placement_file(&policy.name, &namespace, &template_dir, selector.clone())?;
                let placement = PlacementConfig {
                    label_selector: None,
                    placement_path: Some(placement_path),
                };
                if generator.policy_defaults.placement.is_none() {
                    generator.policy_defaults.placement = Some(placement.clone());
                }
                policy.placement = Some(placement);
            }

            for manifest in &mut policy.manifests {
                self.render_manifest(manifest, &pgt.spec.mcp, &template_dir)?;
            }
            generator.policies.push(policy);
        }

        Ok(generator)
    }

    /// Output directory the PGT's manifests are resolved against
    fn template_dir(&self, pgt_path: &Path) -> Result<PathBuf> {
        let pgt_dir = pgt_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let relative = fsutil::relative_to(self.config.base_dir(), pgt_dir)?;
        Ok(fsutil::clean(&self.config.output_dir.join(relative)))
    }

    fn build_policy(
        &self,
        pgt: &PolicyGenTemplate,
        pgt_path: &Path,
        root_name: &str,
        policy_name: &str,
        template_dir: &Path,
    ) -> Result<PolicyConfig> {
        let mut policy = PolicyConfig {
            name: format!("{}-{}", root_name, policy_name),
            ..Default::default()
        };

        for source in pgt.source_files_for(policy_name) {
            let manifest = Manifest {
                path: manifest_path(&source.file_name),
                compliance_type: source.compliance_type.clone(),
                patches: source.patch().into_iter().collect(),
            };

            if let Some(compliant) = &source.evaluation_interval.compliant {
                policy.evaluation_interval.compliant = Some(compliant.clone());
            }
            if let Some(noncompliant) = &source.evaluation_interval.noncompliant {
                policy.evaluation_interval.noncompliant = Some(noncompliant.clone());
            }
            if let Some(action) = &source.remediation_action {
                policy.remediation_action = Some(action.clone());
            }

            let wave = self.wave_for(&manifest, template_dir).map_err(|e| {
                ZtpError::reference(
                    pgt_path,
                    format!(
                        "could not get annotations from manifest:{} in PGT ns: {} name: {}, err: {}",
                        source.file_name,
                        pgt.metadata.namespace.as_deref().unwrap_or_default(),
                        root_name,
                        e
                    ),
                )
            })?;
            policy
                .policy_annotations
                .insert(annotations::ZTP_DEPLOY_WAVE.to_string(), wave);

            policy.manifests.push(manifest);
        }

        Ok(policy)
    }

    /// Forced wave if configured, otherwise the numeric wave annotation of the source CR
    fn wave_for(&self, manifest: &Manifest, template_dir: &Path) -> Result<String> {
        if let Some(wave) = self.config.force_wave.as_deref().filter(|w| !w.is_empty()) {
            return Ok(wave.to_string());
        }

        let source = template_dir.join(&manifest.path);
        let wave = peek_annotations(&source)?
            .remove(annotations::ZTP_DEPLOY_WAVE)
            .filter(|wave| wave.parse::<i64>().is_ok())
            .unwrap_or_default();
        Ok(wave)
    }

    /// Substitute `$mcp` in the manifest's source CR and, for the requested
    /// kinds, replace its patches with the pre-rendered result
    fn render_manifest(&self, manifest: &mut Manifest, mcp: &str, template_dir: &Path) -> Result<()> {
        let source = template_dir.join(&manifest.path);
        let rendered = render_mcp_lines(&source, mcp)?;
        manifest.path = fsutil::relative_to(&template_dir, &rendered)?
            .to_string_lossy()
            .into_owned();

        let objects = load_manifests(&rendered)?;
        let Some(first) = objects.first() else {
            return Err(ZtpError::parse(&rendered, "found empty YAML in the manifest"));
        };

        let kind = first.get("kind").and_then(Value::as_str).unwrap_or_default();
        if !self.config.pre_render_kinds.iter().any(|k| k.trim() == kind) {
            return Ok(());
        }
        let Some(schema) = &self.config.schema else {
            return Ok(());
        };
        if manifest.patches.is_empty() {
            return Ok(());
        }

        debug!("Pre-rendering patches of {} ({})", manifest.path, kind);
        let mut patcher = ManifestPatcher::new(&rendered, objects, manifest.patches.clone());
        patcher.validate()?;
        let mut patched = patcher.apply(schema)?;
        if let Some(first) = patched.first_mut() {
            first.shift_remove("apiVersion");
            first.shift_remove("kind");
        }
        manifest.patches = patched;
        Ok(())
    }
}

fn load_pgt(path: &Path) -> Result<PolicyGenTemplate> {
    let document = first_document(&read_file(path)?, path)?;
    serde_json::from_value(document).map_err(|e| ZtpError::parse(path, e))
}

fn validate_source_files(pgt: &PolicyGenTemplate, pgt_path: &Path) -> Result<()> {
    let namespace = pgt.metadata.namespace.as_deref().unwrap_or_default();
    let name = pgt.metadata.name.as_deref().unwrap_or_default();
    for source in &pgt.spec.source_files {
        if source.file_name.is_empty() {
            return Err(ZtpError::parse(
                pgt_path,
                format!(
                    "malformed PGT, could not parse manifest filename in PGT ns: {} name: {}",
                    namespace, name
                ),
            ));
        }
        if source.policy_name.is_empty() {
            return Err(ZtpError::parse(
                pgt_path,
                format!(
                    "malformed PGT, source file {} has no policyName in PGT ns: {} name: {}",
                    source.file_name, namespace, name
                ),
            ));
        }
    }
    Ok(())
}

/// Manifests live under `source-crs/` unless the file name already says so
fn manifest_path(file_name: &str) -> String {
    if file_name.starts_with(pgt::SOURCE_CRS_DIR) {
        file_name.to_string()
    } else {
        fsutil::clean(&Path::new(pgt::SOURCE_CRS_DIR).join(file_name))
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::schema::tests::PTP_SCHEMA;
    use crate::test_utils::TestDir;

    const PGT: &str = r#"apiVersion: ran.openshift.io/v1
kind: PolicyGenTemplate
metadata:
  name: group-du-sno
  namespace: ztp-group
spec:
  bindingRules:
    group-du-sno: ""
  mcp: master
  sourceFiles:
    - fileName: PtpOperatorConfig.yaml
      policyName: config-policy
    - fileName: PtpConfigSlave.yaml
      policyName: config-policy
      metadata:
        name: du-ptp-slave
      spec:
        profile:
          - name: slave
            interface: ens5f0
    - fileName: MachineConfigPool.yaml
      policyName: a-policy
      evaluationInterval:
        compliant: never
"#;

    const PTP_OPERATOR_CONFIG: &str = r#"apiVersion: ptp.openshift.io/v1
kind: PtpOperatorConfig
metadata:
  name: default
  namespace: openshift-ptp
  annotations:
    ran.openshift.io/ztp-deploy-wave: "10"
spec: {}
"#;

    const PTP_CONFIG_SLAVE: &str = r#"apiVersion: ptp.openshift.io/v1
kind: PtpConfig
metadata:
  name: slave
  namespace: openshift-ptp
  annotations:
    ran.openshift.io/ztp-deploy-wave: "ten"
spec:
  profile:
    - name: slave
      interface: $interface
      ptp4lOpts: "-2 -s"
"#;

    const MCP: &str = r#"apiVersion: machineconfiguration.openshift.io/v1
kind: MachineConfigPool
metadata:
  name: $mcp
spec: {}
"#;

    struct Fixture {
        input: TestDir,
        output: TestDir,
        pgt_path: PathBuf,
    }

    fn make_fixture() -> Fixture {
        let input = TestDir::new();
        let output = TestDir::new();
        let pgt_path = input.write("site/group-du-sno.yaml", PGT);
        output.write("site/source-crs/PtpOperatorConfig.yaml", PTP_OPERATOR_CONFIG);
        output.write("site/source-crs/PtpConfigSlave.yaml", PTP_CONFIG_SLAVE);
        output.write("site/source-crs/MachineConfigPool.yaml", MCP);
        Fixture {
            input,
            output,
            pgt_path,
        }
    }

    fn make_config(fixture: &Fixture) -> PgtConfig {
        PgtConfig {
            input: fixture.input.path().to_path_buf(),
            output_dir: fixture.output.path().to_path_buf(),
            schema: None,
            pre_render_kinds: Vec::new(),
            render_policies: false,
            namespace_file: None,
            skip_placement_bindings: false,
            source_crs: Vec::new(),
            placement_api: false,
            force_wave: None,
            kustomize_bin: "kustomize".to_string(),
            render_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_policies_sorted_and_manifests_ordered() {
        let fixture = make_fixture();
        let config = make_config(&fixture);
        let converted = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap();
        let generator = &converted.generator;

        let names: Vec<&str> = generator.policies.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["group-du-sno-a-policy", "group-du-sno-config-policy"]);

        let config_policy = &generator.policies[1];
        let paths: Vec<&str> = config_policy.manifests.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["source-crs/PtpOperatorConfig.yaml", "source-crs/PtpConfigSlave.yaml"]
        );
        assert!(config_policy.manifests[0].patches.is_empty());
        assert_eq!(
            Value::Object(config_policy.manifests[1].patches[0].clone()),
            serde_json::json!({
                "metadata": {"name": "du-ptp-slave"},
                "spec": {"profile": [{"name": "slave", "interface": "ens5f0"}]}
            })
        );
        assert_eq!(converted.namespace, "ztp-group");
        assert_eq!(generator.policy_defaults.namespace, "ztp-group");
    }

    #[test]
    fn test_inline_label_selector() {
        let fixture = make_fixture();
        let config = make_config(&fixture);
        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;
        let placement = generator.policy_defaults.placement.unwrap();
        assert_eq!(
            placement.label_selector.unwrap(),
            serde_json::json!({"matchExpressions": [{"key": "group-du-sno", "operator": "Exists"}]})
        );
        assert!(placement.placement_path.is_none());
    }

    #[test]
    fn test_wave_last_source_file_wins() {
        let fixture = make_fixture();
        let config = make_config(&fixture);
        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;
        // PtpConfigSlave comes last in config-policy and carries a non-numeric wave
        assert_eq!(
            generator.policies[1].policy_annotations[annotations::ZTP_DEPLOY_WAVE],
            ""
        );
        assert_eq!(
            generator.policies[0].policy_annotations[annotations::ZTP_DEPLOY_WAVE],
            ""
        );
    }

    #[test]
    fn test_numeric_wave_read_from_source() {
        let fixture = make_fixture();
        fixture.input.write(
            "site/group-du-sno.yaml",
            "apiVersion: ran.openshift.io/v1\nkind: PolicyGenTemplate\nmetadata:\n  name: g\n  namespace: n\nspec:\n  sourceFiles:\n    - fileName: PtpOperatorConfig.yaml\n      policyName: p\n",
        );
        let config = make_config(&fixture);
        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;
        assert_eq!(generator.policies[0].policy_annotations[annotations::ZTP_DEPLOY_WAVE], "10");
    }

    #[test]
    fn test_forced_wave_wins() {
        let fixture = make_fixture();
        let mut config = make_config(&fixture);
        config.force_wave = Some("100".to_string());
        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;
        for policy in &generator.policies {
            assert_eq!(policy.policy_annotations[annotations::ZTP_DEPLOY_WAVE], "100");
        }
    }

    #[test]
    fn test_mcp_manifest_renamed_and_output_written() {
        let fixture = make_fixture();
        let config = make_config(&fixture);
        let converted = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap();

        assert_eq!(
            converted.generator.policies[0].manifests[0].path,
            "source-crs/MachineConfigPool-MCP-master.yaml"
        );
        assert_eq!(converted.generator.policies[0].evaluation_interval.compliant.as_deref(), Some("never"));
        assert!(fixture
            .output
            .read("site/source-crs/MachineConfigPool-MCP-master.yaml")
            .contains("name: master"));
        assert!(fixture
            .output
            .read("site/source-crs/PtpConfigSlave.yaml")
            .contains("#       interface: $interface"));

        assert_eq!(converted.output_file, fixture.output.join("site/acm-group-du-sno.yaml"));
        let content = fixture.output.read("site/acm-group-du-sno.yaml");
        assert!(content.starts_with("---\napiVersion: policy.open-cluster-management.io/v1\nkind: PolicyGenerator\n"));
        assert!(!content.contains("$mcp"));
    }

    #[test]
    fn test_placement_files_written() {
        let fixture = make_fixture();
        let mut config = make_config(&fixture);
        config.placement_api = true;
        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;

        assert_eq!(
            generator.policy_defaults.placement.as_ref().unwrap().placement_path.as_deref(),
            Some("group-du-sno-a-policy-placement.yaml")
        );
        assert_eq!(
            generator.policies[1].placement.as_ref().unwrap().placement_path.as_deref(),
            Some("group-du-sno-config-policy-placement.yaml")
        );
        assert!(fixture.output.exists("site/group-du-sno-a-policy-placement.yaml"));
        assert!(fixture.output.exists("site/group-du-sno-config-policy-placement.yaml"));
    }

    #[test]
    fn test_patches_pre_rendered_for_requested_kind() {
        let fixture = make_fixture();
        let schema = fixture.input.write("schema.json", PTP_SCHEMA);
        let mut config = make_config(&fixture);
        config.schema = Some(schema);
        config.pre_render_kinds = vec!["PtpConfig".to_string()];

        let generator = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap().generator;
        let patch = Value::Object(generator.policies[1].manifests[1].patches[0].clone());
        assert!(patch.get("apiVersion").is_none());
        assert!(patch.get("kind").is_none());
        assert_eq!(patch["metadata"]["name"], "du-ptp-slave");
        assert_eq!(patch["metadata"]["namespace"], "openshift-ptp");
        assert_eq!(
            patch["spec"]["profile"],
            serde_json::json!([{"name": "slave", "interface": "ens5f0", "ptp4lOpts": "-2 -s"}])
        );
    }

    #[test]
    fn test_missing_source_cr_aborts() {
        let fixture = make_fixture();
        std::fs::remove_file(fixture.output.join("site/source-crs/PtpOperatorConfig.yaml")).unwrap();
        let config = make_config(&fixture);
        let err = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap_err();
        assert!(err
            .to_string()
            .contains("could not get annotations from manifest:PtpOperatorConfig.yaml"));
    }

    #[test]
    fn test_missing_file_name_rejected() {
        let fixture = make_fixture();
        fixture.input.write(
            "site/group-du-sno.yaml",
            "apiVersion: ran.openshift.io/v1\nkind: PolicyGenTemplate\nmetadata:\n  name: g\n  namespace: n\nspec:\n  sourceFiles:\n    - policyName: p\n",
        );
        let config = make_config(&fixture);
        let err = PgtConverter::new(&config).convert_file(&fixture.pgt_path).unwrap_err();
        assert!(err
            .to_string()
            .contains("malformed PGT, could not parse manifest filename in PGT ns: n name: g"));
    }

    #[test]
    fn test_manifest_path_prefix() {
        assert_eq!(manifest_path("Ptp.yaml"), "source-crs/Ptp.yaml");
        assert_eq!(manifest_path("source-crs/Ptp.yaml"), "source-crs/Ptp.yaml");
        assert_eq!(manifest_path("extra/Ptp.yaml"), "source-crs/extra/Ptp.yaml");
    }
}
