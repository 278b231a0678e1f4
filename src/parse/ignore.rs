//! Ignore-list loading for structured-document parsing.
//!
//! A plain-text file at a well-known relative path lists resource paths
//! whose execution should be suppressed while a document is constructed:
//! one entry per line, surrounding whitespace trimmed, a single trailing
//! `/` stripped, blank lines dropped, duplicates collapsed. A missing file
//! is normal and yields an empty set.
//!
//! The set is loaded fresh for every document parse — callers accept the
//! cost of one file read per document; nothing is cached across parses.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Well-known ignore file name, resolved against the working directory.
pub const IGNORE_FILE: &str = ".probeignore";

/// A set of resource paths suppressed during document construction.
///
/// Matching is by exact entry or by ancestor directory: the entry `vendor`
/// (written `vendor/` or `vendor`) suppresses `vendor/jquery.js` and
/// `vendor/a/b.js` alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    entries: HashSet<String>,
}

impl IgnoreSet {
    /// An empty set: nothing is suppressed.
    pub fn empty() -> Self {
        IgnoreSet::default()
    }

    /// Load the set from [`IGNORE_FILE`] in the working directory.
    ///
    /// # Panics
    ///
    /// Panics on filesystem faults other than the file being absent; those
    /// are environment failures, not parse errors.
    pub fn load() -> Self {
        Self::load_from(Path::new(IGNORE_FILE))
    }

    /// Load the set from an explicit path.
    ///
    /// An absent file yields an empty set.
    ///
    /// # Panics
    ///
    /// Panics on filesystem faults other than the file being absent.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(error) if error.kind() == ErrorKind::NotFound => IgnoreSet::empty(),
            Err(error) => panic!("failed to read ignore file {}: {error}", path.display()),
        }
    }

    /// Parse ignore entries from file contents.
    ///
    /// ```
    /// use probe_http::parse::IgnoreSet;
    ///
    /// let set = IgnoreSet::parse("vendor/\n\nfonts\n");
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains("vendor"));
    /// assert!(set.contains("fonts"));
    /// ```
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(|line| {
                let entry = line.trim();
                entry.strip_suffix('/').unwrap_or(entry)
            })
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        IgnoreSet { entries }
    }

    /// Whether `entry` is a member, verbatim.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// Whether `resource` should be suppressed.
    ///
    /// True when the normalized resource path is itself an entry, or when
    /// any of its ancestor directories is.
    pub fn matches(&self, resource: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let normalized = resource
            .trim_start_matches("./")
            .trim_start_matches('/');

        if self.entries.contains(normalized) {
            return true;
        }

        normalized
            .match_indices('/')
            .any(|(index, _)| self.entries.contains(&normalized[..index]))
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
