// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::store::{PageStore, StoreError};
use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

static TAG_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"#\w+"));

/// Extracts the distinct hashtag tokens from a page body.
///
/// A tag is `#` followed by one or more word characters, kept verbatim
/// including the `#` and matched case-sensitively. A bare `#` is not a tag.
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    let regex = match TAG_REGEX.as_ref() {
        Ok(regex) => regex,
        Err(err) => {
            error!("🚨 CRITICAL: tag pattern failed to compile: {}", err);
            return BTreeSet::new();
        }
    };
    regex
        .find_iter(text)
        .map(|tag| tag.as_str().to_string())
        .collect()
}

#[derive(Debug)]
pub enum IndexError {
    Scan(StoreError),
    LockPoisoned,
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Scan(err) => write!(f, "tag index scan failed: {}", err),
            IndexError::LockPoisoned => write!(f, "tag index lock poisoned"),
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Debug, Default)]
struct IndexData {
    page_tags: HashMap<String, BTreeSet<String>>,
    tag_pages: HashMap<String, HashSet<String>>,
}

impl IndexData {
    fn insert_page(&mut self, slug: &str, tags: BTreeSet<String>) {
        for tag in &tags {
            self.tag_pages
                .entry(tag.clone())
                .or_default()
                .insert(slug.to_string());
        }
        self.page_tags.insert(slug.to_string(), tags);
    }

    fn remove_page(&mut self, slug: &str) {
        let Some(old_tags) = self.page_tags.remove(slug) else {
            return;
        };
        for tag in old_tags {
            let remove_entry = match self.tag_pages.get_mut(&tag) {
                Some(pages) => {
                    pages.remove(slug);
                    pages.is_empty()
                }
                None => false,
            };
            if remove_entry {
                self.tag_pages.remove(&tag);
            }
        }
    }
}

/// Inverted hashtag index over the page corpus.
///
/// Kept consistent with the store by a full scan at startup plus an atomic
/// per-page swap on every write: the old memberships of a page leave and the
/// new ones enter under one write lock, so a query never sees a torn mix of
/// a page's previous and current tag sets.
#[derive(Clone)]
pub struct TagIndex {
    data: Arc<RwLock<IndexData>>,
}

impl Default for TagIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TagIndex {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(IndexData::default())),
        }
    }

    /// Rebuilds the whole index from the current corpus.
    pub fn rebuild(&self, store: &PageStore) -> Result<usize, IndexError> {
        let mut fresh = IndexData::default();
        let slugs = store.list_slugs().map_err(IndexError::Scan)?;
        let page_count = slugs.len();
        for slug in slugs {
            match store.read(&slug) {
                Ok(body) => fresh.insert_page(&slug, extract_tags(&body)),
                // A page deleted between enumeration and read is not an
                // index error; it simply has no memberships.
                Err(StoreError::NotFound) => continue,
                Err(err) => return Err(IndexError::Scan(err)),
            }
        }

        let mut data = match self.data.write() {
            Ok(data) => data,
            Err(_) => {
                error!("🚨 CRITICAL: TagIndex write lock poisoned during rebuild");
                return Err(IndexError::LockPoisoned);
            }
        };
        *data = fresh;
        Ok(page_count)
    }

    /// Replaces a single page's memberships after a completed store write.
    pub fn apply_write(&self, slug: &str, body: &str) {
        let tags = extract_tags(body);
        let mut data = match self.data.write() {
            Ok(data) => data,
            Err(_) => {
                error!("🚨 CRITICAL: TagIndex write lock poisoned in apply_write");
                return;
            }
        };
        data.remove_page(slug);
        data.insert_page(slug, tags);
    }

    pub fn all_tags(&self) -> Vec<String> {
        let data = match self.data.read() {
            Ok(data) => data,
            Err(_) => {
                error!("🚨 CRITICAL: TagIndex read lock poisoned in all_tags");
                return Vec::new();
            }
        };
        let mut tags: Vec<String> = data.tag_pages.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn pages_with_tag(&self, tag: &str) -> Vec<String> {
        let data = match self.data.read() {
            Ok(data) => data,
            Err(_) => {
                error!("🚨 CRITICAL: TagIndex read lock poisoned in pages_with_tag");
                return Vec::new();
            }
        };
        let mut pages: Vec<String> = data
            .tag_pages
            .get(tag)
            .map(|pages| pages.iter().cloned().collect())
            .unwrap_or_default();
        pages.sort();
        pages
    }
}
