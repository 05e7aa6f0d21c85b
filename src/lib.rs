// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod fsutil;
pub mod labels;
pub mod pgt;
pub mod placement;
pub mod render;
pub mod siteconfig;
pub mod types;
pub mod yaml;

#[cfg(test)]
pub mod test_utils;
