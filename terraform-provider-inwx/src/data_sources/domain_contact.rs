//! Data source `inwx_domain_contact`: look up an existing contact by ID

use std::sync::Arc;

use async_trait::async_trait;

use inwx_domrobot::RpcTransport;

use crate::error::{ProviderError, ProviderResult};
use crate::framework::DataSource;
use crate::resources::domain_contact::{fetch_contact, parse_contact_id, ContactModel};

pub const TYPE_NAME: &str = "inwx_domain_contact";

/// `inwx_domain_contact` data source
pub struct DomainContactDataSource {
    client: Arc<dyn RpcTransport>,
}

impl DomainContactDataSource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for DomainContactDataSource {
    type Model = ContactModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn read(&self, config: ContactModel) -> ProviderResult<ContactModel> {
        let id = config.id.clone().unwrap_or_default();
        if id.trim().is_empty() {
            return Err(ProviderError::validation(
                "id",
                "Missing id",
                "the contact id is required",
            ));
        }
        let numeric = parse_contact_id(&id)?;

        let info = fetch_contact(self.client.as_ref(), numeric)
            .await?
            .ok_or_else(|| ProviderError::NotFound {
                summary: "Could not get contact info".to_string(),
                id: id.clone(),
            })?;
        Ok(info.into_model(id, config.whois_protection))
    }
}
