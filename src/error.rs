// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZtpError {
    #[error("failed to parse {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("invalid reference in {}: {detail}", .path.display())]
    Reference { path: PathBuf, detail: String },

    #[error("failed to process the manifest at \"{}\": {detail}", .path.display())]
    PatchValidation { path: PathBuf, detail: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZtpError {
    pub fn parse(path: impl AsRef<Path>, detail: impl ToString) -> Self {
        ZtpError::Parse {
            path: path.as_ref().to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub fn reference(path: impl AsRef<Path>, detail: impl ToString) -> Self {
        ZtpError::Reference {
            path: path.as_ref().to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub fn patch(path: impl AsRef<Path>, detail: impl ToString) -> Self {
        ZtpError::PatchValidation {
            path: path.as_ref().to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ZtpError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZtpError>;
