//! Utility modules.

/// Lenient Serde helpers for the loosely typed `resData` payloads.
pub mod lenient;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
