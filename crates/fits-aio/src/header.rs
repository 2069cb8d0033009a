//! Keyword/value header container with case-insensitive lookup.

use std::str::FromStr;

use crate::error::{Error, Result};

/// An insertion-ordered multimap of header keywords to string values.
///
/// Lookups are ASCII case-insensitive. Duplicate keywords are preserved in
/// insertion order, matching the on-disk record sequence, so the stored
/// count always equals the number of records written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    records: Vec<(String, String)>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a keyword/value pair.
    pub fn insert(&mut self, keyword: impl Into<String>, value: impl Into<String>) {
        self.records.push((keyword.into(), value.into()));
    }

    /// Returns the value of the first record matching `keyword`.
    ///
    /// Fails with [`Error::NotFound`] if no record matches.
    pub fn get(&self, keyword: &str) -> Result<&str> {
        self.get_opt(keyword)
            .ok_or_else(|| Error::NotFound(keyword.to_string()))
    }

    /// Returns the value of the first record matching `keyword`, or `None`.
    pub fn get_opt(&self, keyword: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(keyword))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the values of every record matching `keyword`.
    pub fn get_all<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a str> {
        self.records
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(keyword))
            .map(|(_, v)| v.as_str())
    }

    /// Looks up `keyword` and converts its value to `T`.
    ///
    /// Fails with [`Error::NotFound`] if the keyword is absent and with
    /// [`Error::Parse`] if the stored string does not convert.
    pub fn value_as<T: FromStr>(&self, keyword: &str) -> Result<T> {
        self.get(keyword)?
            .parse()
            .map_err(|_| Error::Parse(keyword.to_string()))
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
