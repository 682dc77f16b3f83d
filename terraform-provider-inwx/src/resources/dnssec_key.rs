//! `inwx_dnssec_key`: manually managed DNSKEY records
//!
//! Keys cannot be changed in place; every input attribute forces replacement.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use inwx_domrobot::{lenient, ApiError, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::id::DnssecImportId;
use crate::resources::common::{call_completed, call_success, ParamsBuilder};

pub const TYPE_NAME: &str = "inwx_dnssec_key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnssecKeyModel {
    /// Key ID assigned by the registrar
    #[serde(default)]
    pub id: Option<String>,
    pub domain: String,
    pub public_key: String,
    /// DNSSEC algorithm number, e.g. 13 for ECDSAP256SHA256
    pub algorithm: i64,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub digest_type: Option<i64>,
    #[serde(default)]
    pub flag: Option<i64>,
    #[serde(default)]
    pub key_tag: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddedKey {
    #[serde(deserialize_with = "lenient::string")]
    ds: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyInfo {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    owner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    public_key: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    digest: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    algorithm_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    digest_type_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    flag_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    key_tag: Option<i64>,
}

/// Zone-file form of a KSK as `dnssec.adddnskey` expects it.
fn dnskey_record(model: &DnssecKeyModel) -> String {
    format!(
        "{}. IN DNSKEY 257 3 {} {}",
        model.domain, model.algorithm, model.public_key
    )
}

/// Digest out of a DS record `<key tag> <algorithm> <digest type> <digest>`.
fn ds_digest(ds: &str) -> ProviderResult<String> {
    let parts: Vec<&str> = ds.split(' ').collect();
    match parts.as_slice() {
        [_, _, _, digest] => Ok((*digest).to_string()),
        _ => Err(ProviderError::Api {
            summary: "Could not parse returned DS".to_string(),
            source: ApiError::Decode {
                method: "dnssec.adddnskey".to_string(),
                detail: format!("API response not in expected format. Got response: {ds}"),
            },
        }),
    }
}

/// `inwx_dnssec_key` resource
pub struct DnssecKeyResource {
    client: Arc<dyn RpcTransport>,
}

impl DnssecKeyResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for DnssecKeyResource {
    type Model = DnssecKeyModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["domain", "public_key", "algorithm"]
    }

    fn validate(&self, model: &DnssecKeyModel) -> ProviderResult<()> {
        if model.public_key.trim().is_empty() {
            return Err(ProviderError::validation(
                "public_key",
                "Missing public_key",
                "public_key must not be empty",
            ));
        }
        if model.algorithm <= 0 {
            return Err(ProviderError::validation(
                "algorithm",
                "Invalid algorithm",
                format!("expected a DNSSEC algorithm number, got {}", model.algorithm),
            ));
        }
        Ok(())
    }

    async fn create(&self, plan: DnssecKeyModel) -> ProviderResult<DnssecKeyModel> {
        const SUMMARY: &str = "Could not add DNSKEY";

        let params = ParamsBuilder::new()
            .set("domainName", plan.domain.as_str())
            .set("dnskey", dnskey_record(&plan))
            .set("calculateDigest", true)
            .build();
        let response =
            call_success(self.client.as_ref(), "dnssec.adddnskey", params, SUMMARY).await?;
        let added: AddedKey = response.res_data().context(SUMMARY)?;
        let digest = ds_digest(&added.ds)?;
        log::info!("[{TYPE_NAME}] added DNSKEY for {} ({digest})", plan.domain);

        let state = DnssecKeyModel {
            digest: Some(digest.clone()),
            ..plan
        };
        self.read(state).await?.ok_or(ProviderError::NotFound {
            summary: SUMMARY.to_string(),
            id: digest,
        })
    }

    async fn read(&self, state: DnssecKeyModel) -> ProviderResult<Option<DnssecKeyModel>> {
        const SUMMARY: &str = "Could not get DNSSEC keys";

        let params = ParamsBuilder::new()
            .set("domainName", state.domain.as_str())
            .set("digest", state.digest.clone().unwrap_or_default())
            .set("active", 1)
            .build();
        let response =
            call_completed(self.client.as_ref(), "dnssec.listkeys", params, SUMMARY).await?;

        // 只有非空数组才算找到密钥，`{}` 或缺失都视为已删除
        let listed = matches!(
            response.res_data_opt::<Value>().context(SUMMARY)?,
            Some(Value::Array(keys)) if !keys.is_empty()
        );
        let keys: Vec<KeyInfo> = if listed {
            response.res_data().context(SUMMARY)?
        } else {
            Vec::new()
        };
        let Some(key) = keys.into_iter().next() else {
            log::warn!(
                "[{TYPE_NAME}] no active key with digest {} for {}",
                state.digest.as_deref().unwrap_or_default(),
                state.domain
            );
            return Ok(None);
        };

        Ok(Some(DnssecKeyModel {
            id: Some(key.id),
            domain: key.owner_name.unwrap_or(state.domain),
            public_key: key.public_key.unwrap_or(state.public_key),
            algorithm: key.algorithm_id.unwrap_or(state.algorithm),
            digest: key.digest.or(state.digest),
            digest_type: key.digest_type_id,
            flag: key.flag_id,
            key_tag: key.key_tag,
            status: key.status,
        }))
    }

    async fn update(
        &self,
        _plan: DnssecKeyModel,
        _prior: DnssecKeyModel,
    ) -> ProviderResult<DnssecKeyModel> {
        Err(ProviderError::Unsupported {
            summary: "DNSSEC keys cannot be updated".to_string(),
            detail: "change domain, public_key or algorithm to replace the key".to_string(),
        })
    }

    async fn delete(&self, state: DnssecKeyModel) -> ProviderResult<()> {
        let id = state.id.clone().unwrap_or_default();
        let params = ParamsBuilder::new().set("key", id.as_str()).build();
        call_success(
            self.client.as_ref(),
            "dnssec.deletednskey",
            params,
            "Could not delete DNSKEY",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted key {id} of {}", state.domain);
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<DnssecKeyModel> {
        let parsed = DnssecImportId::parse(id)?;
        Ok(DnssecKeyModel {
            domain: parsed.domain,
            digest: Some(parsed.digest),
            ..DnssecKeyModel::default()
        })
    }
}
