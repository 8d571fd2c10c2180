// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::store::{PageStore, SlugError, StoreError};
use crate::tags::{IndexError, TagIndex};
use std::fmt;

#[derive(Debug)]
pub enum WikiError {
    PageNotFound,
    InvalidSlug(SlugError),
    InvalidTag,
    WriteFailed(std::io::Error),
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::PageNotFound => write!(f, "page does not exist"),
            WikiError::InvalidSlug(err) => write!(f, "invalid page name: {}", err),
            WikiError::InvalidTag => write!(f, "tag must not be empty"),
            WikiError::WriteFailed(err) => write!(f, "could not write page: {}", err),
        }
    }
}

impl std::error::Error for WikiError {}

impl From<StoreError> for WikiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WikiError::PageNotFound,
            StoreError::InvalidSlug(err) => WikiError::InvalidSlug(err),
            StoreError::Io(err) => WikiError::WriteFailed(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub slug: String,
    pub body: String,
}

/// Validated wiki operations over the page store and the tag index.
///
/// Every write goes through the store first and only then updates the index,
/// so an index entry never points at a page body that was not durably
/// written. The very next tag query after a successful `put_page` reflects
/// the new body.
#[derive(Clone)]
pub struct WikiService {
    store: PageStore,
    index: TagIndex,
}

impl WikiService {
    pub fn new(store: PageStore) -> Self {
        Self {
            store,
            index: TagIndex::new(),
        }
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Warms the tag index from the on-disk corpus.
    pub fn warm_index(&self) -> Result<usize, IndexError> {
        self.index.rebuild(&self.store)
    }

    pub fn get_page(&self, slug: &str) -> Result<Page, WikiError> {
        let body = self.store.read(slug)?;
        Ok(Page {
            slug: slug.trim().to_string(),
            body,
        })
    }

    pub fn put_page(&self, slug: &str, body: &str) -> Result<Page, WikiError> {
        self.store.write(slug, body)?;
        let slug = slug.trim().to_string();
        self.index.apply_write(&slug, body);
        Ok(Page {
            slug,
            body: body.to_string(),
        })
    }

    pub fn list_pages(&self) -> Result<Vec<String>, WikiError> {
        let mut slugs = self.store.list_slugs()?;
        slugs.sort();
        Ok(slugs)
    }

    pub fn list_tags(&self) -> Vec<String> {
        self.index.all_tags()
    }

    /// Pages whose body contains the given tag.
    ///
    /// The tag may arrive with or without its leading `#` (URL path segments
    /// usually drop it); lookup is against the `#`-prefixed form.
    pub fn list_pages_for_tag(&self, tag: &str) -> Result<Vec<String>, WikiError> {
        let tag = normalize_tag(tag).ok_or(WikiError::InvalidTag)?;
        Ok(self.index.pages_with_tag(&tag))
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let bare = raw.trim().trim_start_matches('#');
    if bare.is_empty() {
        return None;
    }
    Some(format!("#{}", bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn test_service(prefix: &str) -> (TestFixtureRoot, WikiService) {
        let fixture = TestFixtureRoot::new_unique(prefix).unwrap();
        let store = PageStore::new(fixture.pages_dir(), "md");
        (fixture, WikiService::new(store))
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_fixture, wiki) = test_service("wiki-roundtrip");
        let written = wiki.put_page("alpha", "hello #demo").unwrap();
        assert_eq!(written.slug, "alpha");
        assert_eq!(written.body, "hello #demo");

        let page = wiki.get_page("alpha").unwrap();
        assert_eq!(page.body, "hello #demo");
    }

    #[test]
    fn get_missing_page_is_page_not_found() {
        let (_fixture, wiki) = test_service("wiki-missing");
        assert!(matches!(wiki.get_page("ghost"), Err(WikiError::PageNotFound)));
    }

    #[test]
    fn traversal_slug_is_invalid_input() {
        let (_fixture, wiki) = test_service("wiki-traversal");
        assert!(matches!(
            wiki.put_page("../escape", "evil"),
            Err(WikiError::InvalidSlug(_))
        ));
        assert!(matches!(
            wiki.get_page("../../etc/passwd"),
            Err(WikiError::InvalidSlug(_))
        ));
    }

    #[test]
    fn list_pages_returns_bare_sorted_slugs() {
        let (_fixture, wiki) = test_service("wiki-list");
        wiki.put_page("c", "three").unwrap();
        wiki.put_page("a", "one").unwrap();
        wiki.put_page("b", "two").unwrap();
        assert_eq!(wiki.list_pages().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn tag_queries_reflect_writes_immediately() {
        let (_fixture, wiki) = test_service("wiki-tags");
        wiki.put_page("alpha", "hello #demo").unwrap();
        wiki.put_page("beta", "no tags").unwrap();

        assert!(wiki.list_tags().contains(&"#demo".to_string()));
        assert_eq!(wiki.list_pages_for_tag("#demo").unwrap(), vec!["alpha"]);
        assert_eq!(wiki.list_pages_for_tag("demo").unwrap(), vec!["alpha"]);
        assert!(wiki.list_pages_for_tag("#missing").unwrap().is_empty());
    }

    #[test]
    fn overwrite_removes_stale_tag_membership() {
        let (_fixture, wiki) = test_service("wiki-overwrite");
        wiki.put_page("alpha", "hello #demo").unwrap();
        wiki.put_page("alpha", "goodbye").unwrap();

        assert!(wiki.list_pages_for_tag("#demo").unwrap().is_empty());
        assert!(wiki.list_tags().is_empty());
    }

    #[test]
    fn empty_tag_is_invalid() {
        let (_fixture, wiki) = test_service("wiki-empty-tag");
        assert!(matches!(
            wiki.list_pages_for_tag(""),
            Err(WikiError::InvalidTag)
        ));
        assert!(matches!(
            wiki.list_pages_for_tag("#"),
            Err(WikiError::InvalidTag)
        ));
    }

    #[test]
    fn warm_index_picks_up_pages_written_out_of_band() {
        let fixture = TestFixtureRoot::new_unique("wiki-warm").unwrap();
        let store = PageStore::new(fixture.pages_dir(), "md");
        store.write("alpha", "offline #note").unwrap();

        let wiki = WikiService::new(store);
        assert!(wiki.list_tags().is_empty());
        assert_eq!(wiki.warm_index().unwrap(), 1);
        assert_eq!(wiki.list_pages_for_tag("#note").unwrap(), vec!["alpha"]);
    }

    #[test]
    fn concurrent_puts_to_distinct_slugs_both_land() {
        let (_fixture, wiki) = test_service("wiki-concurrent");
        let wiki_a = wiki.clone();
        let wiki_b = wiki.clone();
        let a = std::thread::spawn(move || {
            for i in 0..25 {
                wiki_a.put_page("alpha", &format!("alpha body {} #a", i)).unwrap();
            }
        });
        let b = std::thread::spawn(move || {
            for i in 0..25 {
                wiki_b.put_page("beta", &format!("beta body {} #b", i)).unwrap();
            }
        });
        a.join().unwrap();
        b.join().unwrap();

        assert_eq!(wiki.get_page("alpha").unwrap().body, "alpha body 24 #a");
        assert_eq!(wiki.get_page("beta").unwrap().body, "beta body 24 #b");
        assert_eq!(wiki.list_pages_for_tag("#a").unwrap(), vec!["alpha"]);
        assert_eq!(wiki.list_pages_for_tag("#b").unwrap(), vec!["beta"]);
    }
}
