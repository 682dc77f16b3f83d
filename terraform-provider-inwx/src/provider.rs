//! The `inwx` provider: configuration, login and the resource registry

use std::sync::Arc;

use inwx_domrobot::{session, Client, Credentials, LoginOutcome, RpcTransport};

use crate::config::ProviderConfig;
use crate::data_sources::DomainContactDataSource;
use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::{DynDataSource, DynResource, Registry};
use crate::resources::{
    AutomatedDnssecResource, DnssecKeyResource, DomainContactResource, DomainResource,
    GlueRecordResource, NameserverRecordResource, NameserverResource,
};

pub const TYPE_NAME: &str = "inwx";

const CONFIGURE_SUMMARY: &str = "Could not configure provider";

/// Configured provider
///
/// Holds one logged-in DomRobot session shared by every handler.
pub struct InwxProvider {
    transport: Arc<dyn RpcTransport>,
    registry: Registry,
}

impl InwxProvider {
    /// Build the HTTP client from `config` and log in.
    pub async fn configure(config: ProviderConfig) -> ProviderResult<Self> {
        config.validate()?;
        log::debug!("[{TYPE_NAME}] configuring with {config:?}");

        let mut builder = Client::builder()
            .api_url(config.api_url.as_str())
            .debug(config.debug);
        if let Some(path) = &config.cookie_file {
            builder = builder.cookie_file(path);
        }
        let client = builder.build().context(CONFIGURE_SUMMARY)?;
        Self::connect(Arc::new(client), &config.credentials()).await
    }

    /// Log in over an existing transport.
    pub async fn connect(
        transport: Arc<dyn RpcTransport>,
        credentials: &Credentials,
    ) -> ProviderResult<Self> {
        let outcome = session::login(transport.as_ref(), credentials)
            .await
            .context(CONFIGURE_SUMMARY)?;
        match outcome {
            LoginOutcome::LoggedIn => {
                log::info!("[{TYPE_NAME}] logged in as {}", credentials.username);
            }
            LoginOutcome::Unlocked => {
                log::info!(
                    "[{TYPE_NAME}] logged in as {} (unlocked with TAN)",
                    credentials.username
                );
            }
        }
        Ok(Self::with_transport(transport))
    }

    /// Provider over an already authenticated transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn RpcTransport>) -> Self {
        let mut registry = Registry::new();
        registry.register_resource(Arc::new(DomainResource::new(transport.clone())));
        registry.register_resource(Arc::new(DomainContactResource::new(transport.clone())));
        registry.register_resource(Arc::new(NameserverResource::new(transport.clone())));
        registry.register_resource(Arc::new(NameserverRecordResource::new(transport.clone())));
        registry.register_resource(Arc::new(GlueRecordResource::new(transport.clone())));
        registry.register_resource(Arc::new(DnssecKeyResource::new(transport.clone())));
        registry.register_resource(Arc::new(AutomatedDnssecResource::new(transport.clone())));
        registry.register_data_source(Arc::new(DomainContactDataSource::new(transport.clone())));

        Self {
            transport,
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resource handler by Terraform type name
    pub fn resource(&self, type_name: &str) -> ProviderResult<Arc<dyn DynResource>> {
        self.registry
            .resource(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    /// Data source by Terraform type name
    pub fn data_source(&self, type_name: &str) -> ProviderResult<Arc<dyn DynDataSource>> {
        self.registry
            .data_source(type_name)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    /// End the registrar session.
    pub async fn shutdown(&self) -> ProviderResult<()> {
        session::logout(self.transport.as_ref())
            .await
            .context("Could not log out")?;
        log::info!("[{TYPE_NAME}] logged out");
        Ok(())
    }
}
