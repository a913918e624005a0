//! Sorted string sets for field flags and required names.

use std::fmt;

/// Flag marking a field as mandatory.
pub const REQUIRED_FLAG: &str = "required";

/// Placeholder flag with no meaning to the binder.
pub const BLANK_FLAG: &str = "_";

/// An ordered set of strings.
///
/// Entries are kept sorted and unique, so membership is a binary search and
/// the first entry is always the lexicographically smallest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FlagSet {
    items: Vec<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, keeping the set sorted. Returns false if it was
    /// already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.items.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, value);
                true
            }
        }
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.items
            .binary_search_by(|probe| probe.as_str().cmp(value))
            .ok()
    }

    pub fn has(&self, value: &str) -> bool {
        self.index_of(value).is_some()
    }

    /// Whether any entry satisfies `predicate`.
    pub fn find(&self, predicate: impl FnMut(&str) -> bool) -> bool {
        let mut predicate = predicate;
        self.items.iter().any(|item| predicate(item))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn remove(&mut self, value: &str) -> bool {
        match self.index_of(value) {
            Some(index) => self.remove_index(index).is_some(),
            None => false,
        }
    }

    pub fn remove_index(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl<S: Into<String>> FromIterator<S> for FlagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FlagSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for FlagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&String) -> &str>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().map(String::as_str)
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(","))
    }
}
