//! `inwx_automated_dnssec`: registrar-managed DNSSEC for a domain

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::resources::common::{call_completed, call_success, ParamsBuilder};

pub const TYPE_NAME: &str = "inwx_automated_dnssec";

const AUTO: &str = "AUTO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomatedDnssecModel {
    #[serde(default)]
    pub id: Option<String>,
    pub domain: String,
}

#[derive(Debug, Deserialize)]
struct DnssecInfo {
    #[serde(default, alias = "record", deserialize_with = "lenient::one_or_many")]
    data: Vec<DomainDnssec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainDnssec {
    #[serde(deserialize_with = "lenient::string")]
    domain: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    dnssec_status: Option<String>,
}

/// `inwx_automated_dnssec` resource
pub struct AutomatedDnssecResource {
    client: Arc<dyn RpcTransport>,
}

impl AutomatedDnssecResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for AutomatedDnssecResource {
    type Model = AutomatedDnssecModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["domain"]
    }

    fn validate(&self, model: &AutomatedDnssecModel) -> ProviderResult<()> {
        if model.domain.trim().is_empty() {
            return Err(ProviderError::validation(
                "domain",
                "Missing domain",
                "domain must not be empty",
            ));
        }
        Ok(())
    }

    async fn create(&self, plan: AutomatedDnssecModel) -> ProviderResult<AutomatedDnssecModel> {
        let params = ParamsBuilder::new()
            .set("domainName", plan.domain.as_str())
            .build();
        call_success(
            self.client.as_ref(),
            "dnssec.enablednssec",
            params,
            "Could not enable automated DNSSEC",
        )
        .await?;
        log::info!("[{TYPE_NAME}] enabled automated DNSSEC for {}", plan.domain);

        Ok(AutomatedDnssecModel {
            id: Some(plan.domain.clone()),
            ..plan
        })
    }

    async fn read(
        &self,
        state: AutomatedDnssecModel,
    ) -> ProviderResult<Option<AutomatedDnssecModel>> {
        const SUMMARY: &str = "Could not get DNSSEC info";

        let params = ParamsBuilder::new()
            .set("domains", vec![state.domain.clone()])
            .build();
        let response =
            call_completed(self.client.as_ref(), "dnssec.info", params, SUMMARY).await?;
        let entries = response
            .res_data_opt::<DnssecInfo>()
            .context(SUMMARY)?
            .map(|info| info.data)
            .unwrap_or_default();

        let automated = entries
            .into_iter()
            .find(|e| e.domain == state.domain && e.dnssec_status.as_deref() == Some(AUTO));
        match automated {
            Some(entry) => Ok(Some(AutomatedDnssecModel {
                id: Some(entry.domain.clone()),
                domain: entry.domain,
            })),
            None => {
                log::warn!("[{TYPE_NAME}] DNSSEC for {} is not automated", state.domain);
                Ok(None)
            }
        }
    }

    /// Only `domain` is configurable and it forces replacement.
    async fn update(
        &self,
        plan: AutomatedDnssecModel,
        prior: AutomatedDnssecModel,
    ) -> ProviderResult<AutomatedDnssecModel> {
        Ok(AutomatedDnssecModel {
            id: prior.id,
            ..plan
        })
    }

    async fn delete(&self, state: AutomatedDnssecModel) -> ProviderResult<()> {
        let params = ParamsBuilder::new()
            .set("domainName", state.domain.as_str())
            .build();
        call_success(
            self.client.as_ref(),
            "dnssec.disablednssec",
            params,
            "Could not disable automated DNSSEC",
        )
        .await?;
        log::info!("[{TYPE_NAME}] disabled automated DNSSEC for {}", state.domain);
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<AutomatedDnssecModel> {
        Ok(AutomatedDnssecModel {
            id: Some(id.to_string()),
            domain: id.to_string(),
        })
    }
}
