// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration: environment first, CLI flags override.

use std::path::PathBuf;

use crate::store::{FolderGateway, WriteDurability};

pub const STORE_ENV: &str = "NOTEMAP_STORE";
pub const DURABLE_WRITES_ENV: &str = "NOTEMAP_DURABLE_WRITES";
pub const LOG_ENV: &str = "NOTEMAP_LOG";

pub const DEFAULT_STORE_DIR: &str = ".notemap";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub durability: WriteDurability,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            durability: WriteDurability::BestEffort,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(STORE_ENV) {
            config.store_dir = PathBuf::from(dir);
        }
        if get(DURABLE_WRITES_ENV).is_some_and(|value| is_truthy(&value)) {
            config.durability = WriteDurability::Durable;
        }
        if let Some(filter) = get(LOG_ENV) {
            config.log_filter = filter;
        }
        config
    }

    pub fn gateway(&self) -> FolderGateway {
        FolderGateway::new(&self.store_dir).with_durability(self.durability)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
