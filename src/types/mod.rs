// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types read and written by the translators.

pub mod clusterinstance;
pub mod placement;
pub mod policygenerator;
pub mod policygentemplate;
pub mod siteconfig;

pub use clusterinstance::{ClusterInstance, ClusterInstanceSpec};
pub use placement::{ManagedClusterSetBinding, Placement};
pub use policygenerator::PolicyGenerator;
pub use policygentemplate::{PolicyGenTemplate, SourceFile};
pub use siteconfig::SiteConfig;
