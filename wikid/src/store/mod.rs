// This file is part of the product Wikid.
// SPDX-FileCopyrightText: 2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugError {
    Empty,
    ContainsControl,
    ContainsSlash,
    ContainsBackslash,
    DotSegment,
    ContainsInvalidCharacter,
}

impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugError::Empty => write!(f, "slug must not be empty"),
            SlugError::ContainsControl => write!(f, "slug contains control characters"),
            SlugError::ContainsSlash => write!(f, "slug contains '/'"),
            SlugError::ContainsBackslash => write!(f, "slug contains backslash"),
            SlugError::DotSegment => write!(f, "slug is a '.' or '..' path segment"),
            SlugError::ContainsInvalidCharacter => {
                write!(f, "slug contains invalid characters")
            }
        }
    }
}

impl std::error::Error for SlugError {}

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    InvalidSlug(SlugError),
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "page does not exist"),
            StoreError::InvalidSlug(err) => write!(f, "invalid slug: {}", err),
            StoreError::Io(err) => write!(f, "page storage I/O failed: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Io(err)
        }
    }
}

impl From<SlugError> for StoreError {
    fn from(err: SlugError) -> Self {
        StoreError::InvalidSlug(err)
    }
}

/// Validates a page slug as a single path segment and returns it trimmed.
///
/// A slug never reaches the filesystem unvalidated; everything that could
/// escape the pages directory (separators, dot segments, control characters)
/// is rejected with a typed error.
pub fn canonicalize_slug(raw: &str) -> Result<String, SlugError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SlugError::Empty);
    }
    if trimmed.chars().any(|ch| ch.is_control()) {
        return Err(SlugError::ContainsControl);
    }
    if trimmed.contains('/') {
        return Err(SlugError::ContainsSlash);
    }
    if trimmed.contains('\\') {
        return Err(SlugError::ContainsBackslash);
    }
    if trimmed.chars().all(|ch| ch == '.') {
        return Err(SlugError::DotSegment);
    }
    if !trimmed.chars().all(is_slug_char) {
        return Err(SlugError::ContainsInvalidCharacter);
    }
    Ok(trimmed.to_string())
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '~')
}

/// Durable slug -> body storage, one `<slug>.<ext>` file per page under a
/// fixed directory.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages_dir: PathBuf,
    extension: String,
}

impl PageStore {
    pub fn new(pages_dir: PathBuf, extension: &str) -> Self {
        Self {
            pages_dir,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    fn page_path(&self, slug: &str) -> Result<PathBuf, SlugError> {
        let slug = canonicalize_slug(slug)?;
        Ok(self
            .pages_dir
            .join(format!("{}.{}", slug, self.extension)))
    }

    pub fn exists(&self, slug: &str) -> Result<bool, SlugError> {
        Ok(self.page_path(slug)?.is_file())
    }

    pub fn read(&self, slug: &str) -> Result<String, StoreError> {
        let path = self.page_path(slug)?;
        Ok(fs::read_to_string(path)?)
    }

    /// Creates or fully replaces a page body.
    ///
    /// The body is staged in a uniquely named sibling file and moved into
    /// place with `rename`, so a concurrent reader observes either the old
    /// body or the new one, never a partial write. The unique staging name
    /// also keeps two concurrent writers to the same slug from truncating
    /// each other's temp file; the last `rename` wins.
    pub fn write(&self, slug: &str, body: &str) -> Result<(), StoreError> {
        let path = self.page_path(slug)?;
        fs::create_dir_all(&self.pages_dir).map_err(StoreError::Io)?;

        let temp_name = match path.file_name() {
            Some(name) => format!("{}.{}.tmp", name.to_string_lossy(), Uuid::new_v4()),
            None => format!("{}.tmp", Uuid::new_v4()),
        };
        let mut temp_path = path.clone();
        temp_path.set_file_name(temp_name);

        if let Err(err) = fs::write(&temp_path, body) {
            return Err(StoreError::Io(err));
        }
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io(err));
        }
        Ok(())
    }

    /// Enumerates the bare slugs of all stored pages.
    ///
    /// Only completed writes appear: staging files carry a `.tmp` suffix and
    /// never match the page extension.
    pub fn list_slugs(&self) -> Result<Vec<String>, StoreError> {
        let mut slugs = Vec::new();
        let entries = match fs::read_dir(&self.pages_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(slugs),
            Err(err) => return Err(StoreError::Io(err)),
        };

        for entry in entries {
            let entry = entry.map_err(StoreError::Io)?;
            if !entry.file_type().map_err(StoreError::Io)?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(slug) = name.strip_suffix(&format!(".{}", self.extension)) else {
                continue;
            };
            if canonicalize_slug(slug).is_ok() {
                slugs.push(slug.to_string());
            }
        }
        Ok(slugs)
    }
}
