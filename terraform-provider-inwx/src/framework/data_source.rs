//! Data source Trait

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};
use crate::framework::Diagnostics;

/// Read-only data source Trait
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Terraform type name, e.g. `inwx_domain_contact`
    fn type_name(&self) -> &'static str;

    /// Fill the computed attributes of `config`
    async fn read(&self, config: Self::Model) -> ProviderResult<Self::Model>;
}

/// Type-erased data source, driven with JSON objects
#[async_trait]
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    async fn read_json(&self, config: Value) -> Result<Value, Diagnostics>;
}

#[async_trait]
impl<D> DynDataSource for D
where
    D: DataSource,
{
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    async fn read_json(&self, config: Value) -> Result<Value, Diagnostics> {
        let name = DataSource::type_name(self);
        let result = async {
            let config: D::Model =
                serde_json::from_value(config).map_err(|e| ProviderError::Model {
                    type_name: name.to_string(),
                    detail: e.to_string(),
                })?;
            let model = DataSource::read(self, config).await?;
            serde_json::to_value(&model).map_err(|e| ProviderError::Model {
                type_name: name.to_string(),
                detail: e.to_string(),
            })
        }
        .await;
        result.map_err(|e| {
            log::warn!("[{name}] read failed: {e}");
            e.into()
        })
    }
}
