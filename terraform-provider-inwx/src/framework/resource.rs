//! Resource lifecycle Trait

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};
use crate::framework::Diagnostics;

/// Managed resource Trait
///
/// One implementation per Terraform resource type. `Model` is the resource's
/// attribute set; serde defaults on it play the role of schema defaults.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Attribute set of the resource, as found in plan and state
    type Model: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static;

    /// Terraform type name, e.g. `inwx_domain`
    fn type_name(&self) -> &'static str;

    /// Attributes whose change forces replacement instead of update
    fn requires_replace(&self) -> &'static [&'static str] {
        &[]
    }

    /// Check a planned model before any RPC is made
    fn validate(&self, _model: &Self::Model) -> ProviderResult<()> {
        Ok(())
    }

    /// Create the remote object and return the new state
    async fn create(&self, plan: Self::Model) -> ProviderResult<Self::Model>;

    /// Refresh state; `None` means the remote object is gone
    async fn read(&self, state: Self::Model) -> ProviderResult<Option<Self::Model>>;

    /// Apply `plan` over `prior`, sending only the changed attributes
    async fn update(&self, plan: Self::Model, prior: Self::Model) -> ProviderResult<Self::Model>;

    /// Delete the remote object
    async fn delete(&self, state: Self::Model) -> ProviderResult<()>;

    /// Turn an import ID into the partial model `read` starts from
    fn import_seed(&self, id: &str) -> ProviderResult<Self::Model>;

    /// Import by ID: seed, then read
    async fn import(&self, id: &str) -> ProviderResult<Option<Self::Model>> {
        let seed = self.import_seed(id)?;
        self.read(seed).await
    }
}

/// Type-erased resource, driven with JSON plan/state objects
///
/// Implemented for every [`Resource`]; this is the surface a plugin host talks to.
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Attributes in `requires_replace` whose planned value differs from the prior state
    fn replace_triggers(&self, plan: &Value, prior: &Value) -> Vec<String>;

    async fn create_json(&self, plan: Value) -> Result<Value, Diagnostics>;

    async fn read_json(&self, state: Value) -> Result<Option<Value>, Diagnostics>;

    async fn update_json(&self, plan: Value, prior: Value) -> Result<Value, Diagnostics>;

    async fn delete_json(&self, state: Value) -> Result<(), Diagnostics>;

    async fn import_json(&self, id: &str) -> Result<Value, Diagnostics>;
}

fn decode<M: DeserializeOwned>(type_name: &str, value: Value) -> ProviderResult<M> {
    serde_json::from_value(value).map_err(|e| ProviderError::Model {
        type_name: type_name.to_string(),
        detail: e.to_string(),
    })
}

fn encode<M: Serialize>(type_name: &str, model: &M) -> ProviderResult<Value> {
    serde_json::to_value(model).map_err(|e| ProviderError::Model {
        type_name: type_name.to_string(),
        detail: e.to_string(),
    })
}

fn report(type_name: &str, operation: &str, err: ProviderError) -> Diagnostics {
    if err.is_expected() {
        log::warn!("[{type_name}] {operation} rejected: {err}");
    } else {
        log::error!("[{type_name}] {operation} failed: {err}");
    }
    err.into()
}

#[async_trait]
impl<R> DynResource for R
where
    R: Resource,
{
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn replace_triggers(&self, plan: &Value, prior: &Value) -> Vec<String> {
        self.requires_replace()
            .iter()
            .filter(|attr| plan.get(**attr) != prior.get(**attr))
            .map(|attr| (*attr).to_string())
            .collect()
    }

    async fn create_json(&self, plan: Value) -> Result<Value, Diagnostics> {
        let name = Resource::type_name(self);
        let result = async {
            let plan: R::Model = decode(name, plan)?;
            self.validate(&plan)?;
            let state = Resource::create(self, plan).await?;
            encode(name, &state)
        }
        .await;
        result.map_err(|e| report(name, "create", e))
    }

    async fn read_json(&self, state: Value) -> Result<Option<Value>, Diagnostics> {
        let name = Resource::type_name(self);
        let result = async {
            let state: R::Model = decode(name, state)?;
            match Resource::read(self, state).await? {
                Some(state) => encode(name, &state).map(Some),
                None => {
                    log::info!("[{name}] remote object gone, removing from state");
                    Ok(None)
                }
            }
        }
        .await;
        result.map_err(|e| report(name, "read", e))
    }

    async fn update_json(&self, plan: Value, prior: Value) -> Result<Value, Diagnostics> {
        let name = Resource::type_name(self);
        let result = async {
            let plan: R::Model = decode(name, plan)?;
            let prior: R::Model = decode(name, prior)?;
            self.validate(&plan)?;
            let state = Resource::update(self, plan, prior).await?;
            encode(name, &state)
        }
        .await;
        result.map_err(|e| report(name, "update", e))
    }

    async fn delete_json(&self, state: Value) -> Result<(), Diagnostics> {
        let name = Resource::type_name(self);
        let result = async {
            let state: R::Model = decode(name, state)?;
            Resource::delete(self, state).await
        }
        .await;
        result.map_err(|e| report(name, "delete", e))
    }

    async fn import_json(&self, id: &str) -> Result<Value, Diagnostics> {
        let name = Resource::type_name(self);
        let result = async {
            match Resource::import(self, id).await? {
                Some(state) => encode(name, &state),
                None => Err(ProviderError::NotFound {
                    summary: "Cannot import non-existent remote object".to_string(),
                    id: id.to_string(),
                }),
            }
        }
        .await;
        result.map_err(|e| report(name, "import", e))
    }
}
