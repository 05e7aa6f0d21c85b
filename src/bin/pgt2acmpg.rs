// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ztp_translate::config::{PgtArgs, PgtConfig};
use ztp_translate::pgt::translate_tree;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = PgtConfig::from_args(PgtArgs::parse())?;
    info!(
        "Translating PolicyGenTemplates from {} to {}",
        config.input.display(),
        config.output_dir.display()
    );

    let namespaces = translate_tree(&config)
        .with_context(|| format!("failed to translate {}", config.input.display()))?;
    info!("Translation complete, {} policy namespaces", namespaces.len());
    Ok(())
}
