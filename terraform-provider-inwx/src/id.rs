//! Composite resource IDs.
//!
//! The registrar has no lookup by a single synthetic key for zones, records,
//! glue records or DNSSEC keys, so their Terraform IDs join two natural keys:
//! `domain:roId`, `domain:recordId`, `hostname:roId`. DNSSEC keys import with
//! `domain/digest`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderError, ProviderResult};

/// Two natural keys joined by `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub first: String,
    pub second: String,
}

impl CompositeId {
    pub fn new(first: impl Into<String>, second: impl fmt::Display) -> Self {
        Self {
            first: first.into(),
            second: second.to_string(),
        }
    }

    /// Exactly two non-empty parts separated by a single `:`.
    pub fn parse(id: &str) -> ProviderResult<Self> {
        split_pair(id, ':', "attribute1:attribute2").map(|(first, second)| Self { first, second })
    }

    /// Second part as a number (record IDs, roIds).
    pub fn second_as_int(&self) -> ProviderResult<i64> {
        self.second
            .parse()
            .map_err(|_| ProviderError::InvalidId {
                id: self.to_string(),
                expected: "a numeric second part".to_string(),
            })
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

impl FromStr for CompositeId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Import specifier of a DNSSEC key: `domain/digest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnssecImportId {
    pub domain: String,
    pub digest: String,
}

impl DnssecImportId {
    pub fn parse(id: &str) -> ProviderResult<Self> {
        split_pair(id, '/', "domain/digest").map(|(domain, digest)| Self { domain, digest })
    }
}

fn split_pair(id: &str, separator: char, expected: &str) -> ProviderResult<(String, String)> {
    let mut parts = id.split(separator);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(ProviderError::InvalidId {
            id: id.to_string(),
            expected: expected.to_string(),
        }),
    }
}
