//! `inwx_glue_record`: glue hosts for in-bailiwick nameservers

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::id::CompositeId;
use crate::resources::common::{call_lookup, call_no_body, call_success, ParamsBuilder};
use crate::validation;

pub const TYPE_NAME: &str = "inwx_glue_record";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlueRecordModel {
    /// `hostname:roId`
    #[serde(default)]
    pub id: Option<String>,
    pub hostname: String,
    #[serde(default)]
    pub ro_id: Option<i64>,
    pub ip: Vec<String>,
    #[serde(default)]
    pub testing: Option<bool>,
    /// Registry status of the host
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostRecord {
    #[serde(deserialize_with = "lenient::int")]
    ro_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::one_or_many")]
    ip: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    status: Option<String>,
}

/// `host.info` returns either the host itself or a `record` list.
///
/// A payload without `roId` or `record` (e.g. `{}`) is an empty list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostInfo {
    Single(HostRecord),
    Listed {
        #[serde(default, deserialize_with = "lenient::one_or_many")]
        record: Vec<HostRecord>,
    },
}

impl HostInfo {
    fn into_records(self) -> Vec<HostRecord> {
        match self {
            Self::Listed { record } => record,
            Self::Single(host) => vec![host],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedHost {
    #[serde(deserialize_with = "lenient::int")]
    ro_id: i64,
}

/// `inwx_glue_record` resource
pub struct GlueRecordResource {
    client: Arc<dyn RpcTransport>,
}

impl GlueRecordResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }

    fn ro_id(state: &GlueRecordModel) -> ProviderResult<i64> {
        CompositeId::parse(state.id.as_deref().unwrap_or_default())?.second_as_int()
    }
}

#[async_trait]
impl Resource for GlueRecordResource {
    type Model = GlueRecordModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn validate(&self, model: &GlueRecordModel) -> ProviderResult<()> {
        validation::length_between("hostname", &model.hostname, 1, 255)?;
        if model.ip.is_empty() {
            return Err(ProviderError::validation(
                "ip",
                "Missing ip",
                "A glue record needs at least one IP address",
            ));
        }
        Ok(())
    }

    async fn create(&self, plan: GlueRecordModel) -> ProviderResult<GlueRecordModel> {
        const SUMMARY: &str = "Could not create glue host";

        let params = ParamsBuilder::new()
            .set("hostname", plan.hostname.as_str())
            .set("ip", plan.ip.clone())
            .set_opt("testing", plan.testing)
            .build();
        let response = call_success(self.client.as_ref(), "host.create", params, SUMMARY).await?;
        let created: CreatedHost = response.res_data().context(SUMMARY)?;

        let id = CompositeId::new(plan.hostname.as_str(), created.ro_id);
        log::info!("[{TYPE_NAME}] created glue host {id}");
        Ok(GlueRecordModel {
            id: Some(id.to_string()),
            ro_id: Some(created.ro_id),
            ..plan
        })
    }

    async fn read(&self, state: GlueRecordModel) -> ProviderResult<Option<GlueRecordModel>> {
        const SUMMARY: &str = "Could not get glue record info";

        let wanted = state.id.clone().unwrap_or_default();
        let params = ParamsBuilder::new()
            .set("hostname", state.hostname.as_str())
            .build();
        let Some(response) =
            call_lookup(self.client.as_ref(), "host.info", params, SUMMARY).await?
        else {
            log::warn!("[{TYPE_NAME}] host {} no longer exists", state.hostname);
            return Ok(None);
        };

        let records = response
            .res_data_opt::<HostInfo>()
            .context(SUMMARY)?
            .map(HostInfo::into_records)
            .unwrap_or_default();
        let found = records
            .into_iter()
            .find(|h| CompositeId::new(state.hostname.as_str(), h.ro_id).to_string() == wanted);

        let Some(host) = found else {
            log::warn!("[{TYPE_NAME}] glue host {wanted} no longer exists");
            return Ok(None);
        };
        Ok(Some(GlueRecordModel {
            hostname: host.hostname.unwrap_or(state.hostname),
            ro_id: Some(host.ro_id),
            ip: host.ip,
            status: host.status.or(state.status),
            ..state
        }))
    }

    async fn update(
        &self,
        plan: GlueRecordModel,
        prior: GlueRecordModel,
    ) -> ProviderResult<GlueRecordModel> {
        let ro_id = Self::ro_id(&prior)?;

        let params = ParamsBuilder::new()
            .set("roId", ro_id)
            .set("ip", plan.ip.clone())
            .set_changed("hostname", &plan.hostname, &prior.hostname)
            .set_changed_opt("testing", plan.testing.as_ref(), prior.testing.as_ref())
            .build();
        call_no_body(
            self.client.as_ref(),
            "host.update",
            params,
            "Could not update glue record",
        )
        .await?;

        Ok(GlueRecordModel {
            id: Some(CompositeId::new(plan.hostname.as_str(), ro_id).to_string()),
            ro_id: Some(ro_id),
            status: prior.status,
            ..plan
        })
    }

    async fn delete(&self, state: GlueRecordModel) -> ProviderResult<()> {
        let ro_id = Self::ro_id(&state)?;
        let params = ParamsBuilder::new()
            .set("roId", ro_id)
            .set_opt("testing", state.testing)
            .build();
        call_no_body(
            self.client.as_ref(),
            "host.delete",
            params,
            "Could not delete glue record",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted glue host {}", state.hostname);
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<GlueRecordModel> {
        let parsed = CompositeId::parse(id)?;
        let ro_id = parsed.second_as_int()?;
        Ok(GlueRecordModel {
            id: Some(parsed.to_string()),
            hostname: parsed.first,
            ro_id: Some(ro_id),
            ..GlueRecordModel::default()
        })
    }
}
