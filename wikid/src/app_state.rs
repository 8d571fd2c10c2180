// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::ValidatedConfig;
use crate::runtime_paths::RuntimePaths;
use crate::store::PageStore;
use crate::wiki::WikiService;

pub struct AppState {
    pub wiki: WikiService,
    pub runtime_paths: RuntimePaths,
}

impl AppState {
    pub fn new(runtime_paths: RuntimePaths, config: &ValidatedConfig) -> Self {
        let store = PageStore::new(runtime_paths.pages_dir.clone(), &config.storage.extension);
        Self {
            wiki: WikiService::new(store),
            runtime_paths,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn new_for_tests(root: &std::path::Path) -> Self {
        let runtime_paths =
            RuntimePaths::from_root(root).expect("test runtime paths");
        let config = crate::config::Config::default()
            .validate()
            .expect("test config");
        Self::new(runtime_paths, &config)
    }
}
