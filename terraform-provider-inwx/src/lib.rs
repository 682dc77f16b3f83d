//! Terraform provider for the INWX registrar
//!
//! Resource handlers for domains, contacts, nameserver zones and records, glue
//! hosts and DNSSEC, built on the [`inwx_domrobot`] client.
//!
//! - [`config`] resolves the provider block against `INWX_*` environment variables
//! - [`InwxProvider`] logs in and owns the registry of handlers
//! - [`framework`] defines the lifecycle traits and the type-erased JSON surface
//!   a plugin host drives
//!
//! Every handler shares one session. The client serializes registrar traffic,
//! so handlers may be driven concurrently.

pub mod config;
pub mod data_sources;
pub mod error;
pub mod framework;
pub mod id;
pub mod provider;
pub mod resources;
pub mod validation;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{ProviderBlock, ProviderConfig};
pub use error::{ProviderError, ProviderResult};
pub use framework::{
    DataSource, Diagnostic, Diagnostics, DynDataSource, DynResource, Registry, Resource, Severity,
};
pub use id::{CompositeId, DnssecImportId};
pub use provider::InwxProvider;
