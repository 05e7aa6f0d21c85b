// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::pgt;
use crate::error::{Result, ZtpError};
use crate::fsutil;
use crate::yaml::{first_document, read_file};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Mirror every `kustomization.yaml` of `input_dir` into `output_dir`,
/// pointing generators at the converted `acm-` files
pub fn propagate_kustomizations(input_dir: &Path, output_dir: &Path) -> Result<()> {
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ZtpError::io(input_dir, e.into()))?;
        if entry.file_type().is_dir() || entry.file_name() != pgt::KUSTOMIZATION_FILE {
            continue;
        }
        let relative = fsutil::relative_to(input_dir, entry.path())?;
        rewrite_kustomization(&relative, input_dir, output_dir)?;
    }
    Ok(())
}

fn rewrite_kustomization(relative: &Path, input_dir: &Path, output_dir: &Path) -> Result<()> {
    let source = input_dir.join(relative);
    let mut kustomization = match first_document(&read_file(&source)?, &source)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(ZtpError::parse(&source, "kustomization is not a mapping")),
    };

    if let Some(Value::Array(generators)) = kustomization.get_mut("generators") {
        for generator in generators.iter_mut() {
            if let Value::String(name) = generator {
                *name = fsutil::prefix_last_component(Path::new(name.as_str()), pgt::ACM_PREFIX)
                    .to_string_lossy()
                    .into_owned();
            }
        }
    }

    let relative_dir = relative.parent().unwrap_or_else(|| Path::new(""));
    if let Some(Value::Array(resources)) = kustomization.get("resources") {
        for resource in resources.iter().filter_map(Value::as_str) {
            let from = input_dir.join(relative_dir).join(resource);
            if from.is_dir() {
                debug!("Skipping directory resource {}", from.display());
                continue;
            }
            let to = output_dir.join(relative_dir).join(resource);
            fsutil::copy_file(&from, &to).map_err(|e| match e {
                ZtpError::Io { source, .. } => ZtpError::reference(
                    relative,
                    format!("could not copy resource {}: {}", from.display(), source),
                ),
                other => other,
            })?;
            info!("Wrote Kustomization resource: {}", to.display());
        }
    }

    let target = output_dir.join(relative);
    fsutil::write_file(&target, &serde_yaml::to_string(&kustomization)?)?;
    info!("Wrote updated Kustomization file: {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDir;

    #[test]
    fn test_generators_prefixed_resources_copied() {
        let input = TestDir::new();
        let output = TestDir::new();
        input.write(
            "site/kustomization.yaml",
            "generators:\n- common-ranGen.yaml\n- sub/group-du-sno.yaml\nresources:\n- ns.yaml\nbases:\n- ../base\ncommonLabels:\n  a: b\n",
        );
        input.write("site/ns.yaml", "apiVersion: v1\nkind: Namespace\n");

        propagate_kustomizations(input.path(), output.path()).unwrap();

        let written: Value = serde_yaml::from_str(&output.read("site/kustomization.yaml")).unwrap();
        assert_eq!(
            written["generators"],
            serde_json::json!(["acm-common-ranGen.yaml", "sub/acm-group-du-sno.yaml"])
        );
        assert_eq!(written["resources"], serde_json::json!(["ns.yaml"]));
        assert_eq!(written["bases"], serde_json::json!(["../base"]));
        assert_eq!(written["commonLabels"]["a"], "b");
        assert_eq!(output.read("site/ns.yaml"), "apiVersion: v1\nkind: Namespace\n");
    }

    #[test]
    fn test_directory_resources_skipped() {
        let input = TestDir::new();
        let output = TestDir::new();
        input.write("kustomization.yaml", "resources:\n- nested\n");
        input.write("nested/kustomization.yaml", "generators:\n- pgt.yaml\n");

        propagate_kustomizations(input.path(), output.path()).unwrap();
        assert!(output.exists("kustomization.yaml"));
        assert!(output.read("nested/kustomization.yaml").contains("acm-pgt.yaml"));
    }

    #[test]
    fn test_missing_resource_is_error() {
        let input = TestDir::new();
        let output = TestDir::new();
        input.write("kustomization.yaml", "resources:\n- missing.yaml\n");

        let err = propagate_kustomizations(input.path(), output.path()).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
