//! Resource lifecycle abstraction: diagnostics, resource and data source traits,
//! and the type-erased registry a plugin host drives.

mod data_source;
mod diagnostics;
mod registry;
mod resource;

pub use data_source::{DataSource, DynDataSource};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use registry::Registry;
pub use resource::{DynResource, Resource};
