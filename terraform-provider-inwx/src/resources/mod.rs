//! Resource handlers, one per Terraform resource type
//!
//! Every handler owns an `Arc<dyn RpcTransport>` shared with the provider and
//! translates between its attribute model and the DomRobot parameter names.

pub mod automated_dnssec;
pub(crate) mod common;
pub mod dnssec_key;
pub mod domain;
pub mod domain_contact;
pub mod glue_record;
pub mod nameserver;
pub mod nameserver_record;

pub use automated_dnssec::{AutomatedDnssecModel, AutomatedDnssecResource};
pub use dnssec_key::{DnssecKeyModel, DnssecKeyResource};
pub use domain::{DomainContacts, DomainModel, DomainResource};
pub use domain_contact::{ContactModel, DomainContactResource};
pub use glue_record::{GlueRecordModel, GlueRecordResource};
pub use nameserver::{NameserverModel, NameserverResource};
pub use nameserver_record::{NameserverRecordModel, NameserverRecordResource};
