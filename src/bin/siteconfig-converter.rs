// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ztp_translate::config::{ConverterArgs, ConverterConfig};
use ztp_translate::siteconfig::convert_file;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ConverterConfig::from_args(ConverterArgs::parse())?;
    let conversion =
        convert_file(&config).with_context(|| format!("failed to convert {}", config.input.display()))?;

    for line in conversion.pending_warnings() {
        println!("{}", line);
    }
    info!(
        "Converted {} clusters into {}",
        conversion.clusters.len(),
        config.output_dir.display()
    );
    Ok(())
}
