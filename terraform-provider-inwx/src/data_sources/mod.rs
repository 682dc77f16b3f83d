//! Read-only data sources

pub mod domain_contact;

pub use domain_contact::DomainContactDataSource;
