use std::collections::BTreeMap;

use nimbus_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// One label or annotation row attached to a resource.
///
/// Keys may carry a DNS-style prefix, presented as `prefix/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    key_prefix: Option<String>,
    key_name: NonEmptyString,
    value: String,
}

impl MetadataEntry {
    /// Creates a validated metadata entry.
    pub fn new(
        key_prefix: Option<String>,
        key_name: impl Into<String>,
        value: impl Into<String>,
    ) -> AppResult<Self> {
        let key_prefix = key_prefix.and_then(|prefix| {
            let trimmed = prefix.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
        if key_prefix
            .as_deref()
            .is_some_and(|prefix| prefix.contains('/'))
        {
            return Err(AppError::Validation(
                "metadata key prefix must not contain '/'".to_owned(),
            ));
        }

        let key_name: String = key_name.into();
        let key_name = NonEmptyString::new(key_name.trim())?;
        if key_name.as_str().contains('/') {
            return Err(AppError::Validation(
                "metadata key name must not contain '/'".to_owned(),
            ));
        }

        Ok(Self {
            key_prefix,
            key_name,
            value: value.into(),
        })
    }

    /// Parses a presented key (`prefix/name` or `name`) and value.
    pub fn from_key(key: &str, value: impl Into<String>) -> AppResult<Self> {
        match key.split_once('/') {
            Some((prefix, name)) => Self::new(Some(prefix.to_owned()), name, value),
            None => Self::new(None, key, value),
        }
    }

    /// Returns the optional key prefix.
    #[must_use]
    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }

    /// Returns the key name without prefix.
    #[must_use]
    pub fn key_name(&self) -> &str {
        self.key_name.as_str()
    }

    /// Returns the presented key.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}/{}", self.key_name),
            None => self.key_name.as_str().to_owned(),
        }
    }

    /// Returns the entry value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Flattens key/value records into a key-sorted map.
///
/// When two records produce the same key, the later record wins.
pub fn hashify<T, F>(records: impl IntoIterator<Item = T>, extract: F) -> BTreeMap<String, String>
where
    F: FnMut(T) -> (String, String),
{
    records.into_iter().map(extract).collect()
}

/// Converts metadata entries into their presented map.
#[must_use]
pub fn hashify_entries(entries: &[MetadataEntry]) -> BTreeMap<String, String> {
    hashify(entries, |entry| (entry.key(), entry.value().to_owned()))
}
