//! Attribute validators.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ProviderError, ProviderResult};

pub const RENEWAL_MODES: &[&str] = &["AUTORENEW", "AUTODELETE", "AUTOEXPIRE"];

pub const CONTACT_TYPES: &[&str] = &["ORG", "PERSON", "ROLE"];

pub const NAMESERVER_TYPES: &[&str] = &["MASTER", "SLAVE"];

pub const URL_REDIRECT_TYPES: &[&str] = &["HEADER301", "HEADER302", "FRAME"];

pub const RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "AFSDB", "ALIAS", "CAA", "CERT", "CNAME", "HINFO", "KEY", "LOC", "MX", "NAPTR",
    "NS", "OPENPGPKEY", "PTR", "RP", "SMIMEA", "SOA", "SRV", "SSHFP", "TLSA", "TXT", "URI", "URL",
];

static FQDN_LABEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?$").ok());

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// `value` must be one of `allowed`.
pub fn one_of(attribute: &str, value: &str, allowed: &[&str]) -> ProviderResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ProviderError::validation(
            attribute,
            format!("Invalid {attribute}"),
            format!("Must be one of: {}", allowed.join(", ")),
        ))
    }
}

/// Like [`one_of`], for optional attributes.
pub fn opt_one_of(attribute: &str, value: Option<&str>, allowed: &[&str]) -> ProviderResult<()> {
    value.map_or(Ok(()), |v| one_of(attribute, v, allowed))
}

/// Exactly two characters.
pub fn country_code(attribute: &str, value: &str) -> ProviderResult<()> {
    let len = value.chars().count();
    if len == 2 {
        Ok(())
    } else {
        Err(ProviderError::validation(
            attribute,
            "Could not validate country code",
            format!("Expected a two digit country code, got '{value}' with ({len}) digits"),
        ))
    }
}

/// Character count within `min..=max`.
pub fn length_between(attribute: &str, value: &str, min: usize, max: usize) -> ProviderResult<()> {
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(ProviderError::validation(
            attribute,
            format!("Invalid {attribute}"),
            format!("Length must be between {min} and {max} characters, got {len}"),
        ))
    }
}

/// Fully qualified domain name, one trailing dot allowed.
pub fn fqdn(value: &str) -> Result<(), String> {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.len() > 255 {
        return Err(format!("FQDN '{name}' is too long (max 255 characters)"));
    }
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err(format!(
            "FQDN '{name}' must have at least two parts separated by dots"
        ));
    }
    for label in labels {
        if label.is_empty() || label.len() > 63 {
            return Err(format!(
                "FQDN label '{label}' must be between 1 and 63 characters"
            ));
        }
        if !matches(&FQDN_LABEL, label) {
            return Err(format!("FQDN label '{label}' contains invalid characters"));
        }
    }
    Ok(())
}

/// Plausible e-mail address.
pub fn email(value: &str) -> Result<(), String> {
    if matches(&EMAIL, value) {
        Ok(())
    } else {
        Err(format!("invalid email address '{value}'"))
    }
}
