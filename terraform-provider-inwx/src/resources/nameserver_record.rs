//! `inwx_nameserver_record`: single records inside a nameserver zone

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::id::CompositeId;
use crate::resources::common::{call_completed, call_lookup, call_success, ParamsBuilder};
use crate::validation::{self, RECORD_TYPES, URL_REDIRECT_TYPES};

pub const TYPE_NAME: &str = "inwx_nameserver_record";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameserverRecordModel {
    /// `domain:recordId`
    #[serde(default)]
    pub id: Option<String>,
    pub domain: String,
    /// Zone roId; the registrar resolves the zone from `domain` when unset
    #[serde(default)]
    pub ro_id: Option<i64>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_ttl")]
    pub ttl: i64,
    #[serde(default)]
    pub prio: i64,
    #[serde(default)]
    pub url_redirect_type: Option<String>,
    #[serde(default)]
    pub url_redirect_title: Option<String>,
    #[serde(default)]
    pub url_redirect_description: Option<String>,
    #[serde(default)]
    pub url_redirect_fav_icon: Option<String>,
    #[serde(default)]
    pub url_redirect_keywords: Option<String>,
    #[serde(default)]
    pub url_append: Option<bool>,
    #[serde(default)]
    pub testing: Option<bool>,
}

fn default_ttl() -> i64 {
    3600
}

impl Default for NameserverRecordModel {
    fn default() -> Self {
        Self {
            id: None,
            domain: String::new(),
            ro_id: None,
            record_type: String::new(),
            content: String::new(),
            name: None,
            ttl: default_ttl(),
            prio: 0,
            url_redirect_type: None,
            url_redirect_title: None,
            url_redirect_description: None,
            url_redirect_fav_icon: None,
            url_redirect_keywords: None,
            url_append: None,
            testing: None,
        }
    }
}

// ===== nameserver.info 响应 =====

#[derive(Debug, Deserialize)]
struct ZoneRecords {
    #[serde(default, deserialize_with = "lenient::one_or_many")]
    record: Vec<RecordInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordInfo {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    name: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    record_type: String,
    #[serde(deserialize_with = "lenient::string")]
    content: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    ttl: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    prio: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    url_redirect_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    url_redirect_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    url_redirect_description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    url_redirect_fav_icon: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    url_redirect_keywords: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_boolean")]
    url_append: Option<bool>,
}

impl RecordInfo {
    fn apply(self, state: NameserverRecordModel) -> NameserverRecordModel {
        NameserverRecordModel {
            record_type: self.record_type,
            content: self.content,
            name: self.name.or(state.name),
            ttl: self.ttl.unwrap_or(state.ttl),
            prio: self.prio.unwrap_or(state.prio),
            url_redirect_type: self.url_redirect_type.or(state.url_redirect_type),
            url_redirect_title: self.url_redirect_title.or(state.url_redirect_title),
            url_redirect_description: self
                .url_redirect_description
                .or(state.url_redirect_description),
            url_redirect_fav_icon: self.url_redirect_fav_icon.or(state.url_redirect_fav_icon),
            url_redirect_keywords: self.url_redirect_keywords.or(state.url_redirect_keywords),
            url_append: self.url_append.or(state.url_append),
            ..state
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
}

/// `inwx_nameserver_record` resource
pub struct NameserverRecordResource {
    client: Arc<dyn RpcTransport>,
}

impl NameserverRecordResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }

    fn record_id(state: &NameserverRecordModel) -> ProviderResult<(CompositeId, i64)> {
        let id = CompositeId::parse(state.id.as_deref().unwrap_or_default())?;
        let record = id.second_as_int()?;
        Ok((id, record))
    }
}

#[async_trait]
impl Resource for NameserverRecordResource {
    type Model = NameserverRecordModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn validate(&self, model: &NameserverRecordModel) -> ProviderResult<()> {
        validation::one_of("type", &model.record_type, RECORD_TYPES)?;
        validation::opt_one_of(
            "url_redirect_type",
            model.url_redirect_type.as_deref(),
            URL_REDIRECT_TYPES,
        )
    }

    async fn create(&self, plan: NameserverRecordModel) -> ProviderResult<NameserverRecordModel> {
        const SUMMARY: &str = "Could not add nameserver record";

        let params = ParamsBuilder::new()
            .set("domain", plan.domain.as_str())
            .set("type", plan.record_type.as_str())
            .set("content", plan.content.as_str())
            .set_opt("roId", plan.ro_id)
            .set_opt("name", plan.name.as_deref())
            .set("ttl", plan.ttl)
            .set_opt("prio", (plan.prio != 0).then_some(plan.prio))
            .set_opt("urlRedirectType", plan.url_redirect_type.as_deref())
            .set_opt("urlRedirectTitle", plan.url_redirect_title.as_deref())
            .set_opt(
                "urlRedirectDescription",
                plan.url_redirect_description.as_deref(),
            )
            .set_opt("urlRedirectFavIcon", plan.url_redirect_fav_icon.as_deref())
            .set_opt("urlRedirectKeywords", plan.url_redirect_keywords.as_deref())
            .set_opt("urlAppend", plan.url_append)
            .set_opt("testing", plan.testing)
            .build();

        let response = call_success(
            self.client.as_ref(),
            "nameserver.createRecord",
            params,
            SUMMARY,
        )
        .await?;
        let created: CreatedRecord = response.res_data().context(SUMMARY)?;
        let id = CompositeId::new(plan.domain.as_str(), &created.id).to_string();
        log::info!("[{TYPE_NAME}] created record {id}");

        let state = NameserverRecordModel {
            id: Some(id.clone()),
            ..plan
        };
        self.read(state).await?.ok_or(ProviderError::NotFound {
            summary: SUMMARY.to_string(),
            id,
        })
    }

    async fn read(
        &self,
        state: NameserverRecordModel,
    ) -> ProviderResult<Option<NameserverRecordModel>> {
        const SUMMARY: &str = "Could not get nameserver info";

        let wanted = state.id.clone().unwrap_or_default();
        let params = ParamsBuilder::new()
            .set("domain", state.domain.as_str())
            .build();
        let Some(response) =
            call_lookup(self.client.as_ref(), "nameserver.info", params, SUMMARY).await?
        else {
            log::warn!("[{TYPE_NAME}] zone {} no longer exists", state.domain);
            return Ok(None);
        };

        let zone = response
            .res_data_opt::<ZoneRecords>()
            .context(SUMMARY)?
            .map(|z| z.record)
            .unwrap_or_default();
        let found = zone
            .into_iter()
            .find(|r| CompositeId::new(state.domain.as_str(), &r.id).to_string() == wanted);

        match found {
            Some(record) => Ok(Some(record.apply(state))),
            None => {
                log::warn!("[{TYPE_NAME}] record {wanted} no longer exists");
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        plan: NameserverRecordModel,
        prior: NameserverRecordModel,
    ) -> ProviderResult<NameserverRecordModel> {
        let (id, record) = Self::record_id(&prior)?;

        let params = ParamsBuilder::new()
            .set("id", record)
            .set_changed("type", &plan.record_type, &prior.record_type)
            .set_changed("content", &plan.content, &prior.content)
            .set_changed_opt("name", plan.name.as_ref(), prior.name.as_ref())
            .set_changed("ttl", &plan.ttl, &prior.ttl)
            .set_changed("prio", &plan.prio, &prior.prio)
            .set_changed_opt(
                "urlRedirectType",
                plan.url_redirect_type.as_ref(),
                prior.url_redirect_type.as_ref(),
            )
            .set_changed_opt(
                "urlRedirectTitle",
                plan.url_redirect_title.as_ref(),
                prior.url_redirect_title.as_ref(),
            )
            .set_changed_opt(
                "urlRedirectDescription",
                plan.url_redirect_description.as_ref(),
                prior.url_redirect_description.as_ref(),
            )
            .set_changed_opt(
                "urlRedirectFavIcon",
                plan.url_redirect_fav_icon.as_ref(),
                prior.url_redirect_fav_icon.as_ref(),
            )
            .set_changed_opt(
                "urlRedirectKeywords",
                plan.url_redirect_keywords.as_ref(),
                prior.url_redirect_keywords.as_ref(),
            )
            .set_changed_opt("urlAppend", plan.url_append.as_ref(), prior.url_append.as_ref())
            .set_changed_opt("testing", plan.testing.as_ref(), prior.testing.as_ref())
            .build();

        call_completed(
            self.client.as_ref(),
            "nameserver.updateRecord",
            params,
            "Could not update nameserver record",
        )
        .await?;

        Ok(NameserverRecordModel {
            id: Some(id.to_string()),
            ..plan
        })
    }

    async fn delete(&self, state: NameserverRecordModel) -> ProviderResult<()> {
        let (id, record) = Self::record_id(&state)?;
        let params = ParamsBuilder::new()
            .set("id", record)
            .set_opt("testing", state.testing)
            .build();
        call_success(
            self.client.as_ref(),
            "nameserver.deleteRecord",
            params,
            "Could not delete nameserver record",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted record {id}");
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<NameserverRecordModel> {
        let parsed = CompositeId::parse(id)?;
        parsed.second_as_int()?;
        Ok(NameserverRecordModel {
            id: Some(parsed.to_string()),
            domain: parsed.first,
            ..NameserverRecordModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{failure, ok, ok_empty, MockTransport};
    use serde_json::json;

    fn plan() -> NameserverRecordModel {
        NameserverRecordModel {
            domain: "example.com".to_string(),
            record_type: "A".to_string(),
            content: "192.0.2.10".to_string(),
            name: Some("www.example.com".to_string()),
            ..NameserverRecordModel::default()
        }
    }

    fn zone(records: serde_json::Value) -> serde_json::Value {
        ok(json!({"domain": "example.com", "type": "MASTER", "count": 2, "record": records}))
    }

    #[tokio::test]
    async fn create_then_read_round_trip() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.createRecord", ok(json!({"id": 55501.0})))
            .await;
        mock.respond(
            "nameserver.info",
            zone(json!([
                {"id": 55500, "name": "example.com", "type": "SOA", "content": "ns.inwx.de hostmaster@example.com 2024010101", "ttl": 86400, "prio": 0},
                {"id": "55501", "name": "www.example.com", "type": "A", "content": "192.0.2.10", "ttl": "3600", "prio": "0"}
            ])),
        )
        .await;
        let resource = NameserverRecordResource::new(mock.clone());

        let state = resource.create(plan()).await.unwrap();
        assert_eq!(state.id.as_deref(), Some("example.com:55501"));
        assert_eq!(
            state,
            NameserverRecordModel {
                id: Some("example.com:55501".to_string()),
                ..plan()
            }
        );

        assert_eq!(
            mock.params_of("nameserver.createRecord").await,
            vec![json!({
                "domain": "example.com",
                "type": "A",
                "content": "192.0.2.10",
                "name": "www.example.com",
                "ttl": 3600
            })]
        );
    }

    #[tokio::test]
    async fn read_without_matching_record_is_gone() {
        let mock = MockTransport::shared();
        mock.respond(
            "nameserver.info",
            zone(json!([{"id": 1, "type": "NS", "content": "ns.inwx.de"}])),
        )
        .await;
        let resource = NameserverRecordResource::new(mock);

        let state = NameserverRecordModel {
            id: Some("example.com:55501".to_string()),
            ..plan()
        };
        assert!(resource.read(state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_of_empty_zone_is_gone() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.info", ok(json!({"domain": "example.com"})))
            .await;
        let resource = NameserverRecordResource::new(mock);

        let state = NameserverRecordModel {
            id: Some("example.com:1".to_string()),
            ..plan()
        };
        assert!(resource.read(state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_requires_completed_status() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.info", failure(1001, "pending")).await;
        let resource = NameserverRecordResource::new(mock);

        let state = NameserverRecordModel {
            id: Some("example.com:1".to_string()),
            ..plan()
        };
        let err = resource.read(state).await.unwrap_err();
        assert!(err.to_string().starts_with("Could not get nameserver info"));
    }

    #[tokio::test]
    async fn update_sends_record_id_and_changes() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.updateRecord", ok_empty()).await;
        let resource = NameserverRecordResource::new(mock.clone());

        let prior = NameserverRecordModel {
            id: Some("example.com:55501".to_string()),
            ..plan()
        };
        let next = NameserverRecordModel {
            content: "192.0.2.20".to_string(),
            ttl: 300,
            ..prior.clone()
        };
        let state = resource.update(next, prior).await.unwrap();
        assert_eq!(state.content, "192.0.2.20");
        assert_eq!(
            mock.params_of("nameserver.updateRecord").await,
            vec![json!({"id": 55501, "content": "192.0.2.20", "ttl": 300})]
        );
    }

    #[tokio::test]
    async fn update_rejects_pending() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.updateRecord", failure(1001, "pending"))
            .await;
        let resource = NameserverRecordResource::new(mock);

        let prior = NameserverRecordModel {
            id: Some("example.com:55501".to_string()),
            ..plan()
        };
        let next = NameserverRecordModel {
            prio: 10,
            ..prior.clone()
        };
        assert!(resource.update(next, prior).await.is_err());
    }

    #[tokio::test]
    async fn delete_by_record_id() {
        let mock = MockTransport::shared();
        mock.respond("nameserver.deleteRecord", ok_empty()).await;
        let resource = NameserverRecordResource::new(mock.clone());

        let state = NameserverRecordModel {
            id: Some("example.com:55501".to_string()),
            testing: Some(true),
            ..plan()
        };
        resource.delete(state).await.unwrap();
        assert_eq!(
            mock.params_of("nameserver.deleteRecord").await,
            vec![json!({"id": 55501, "testing": true})]
        );
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let mock = MockTransport::shared();
        let resource = NameserverRecordResource::new(mock.clone());

        for id in ["example.com", "example.com:", ":1", "a:b:c", "example.com:www"] {
            assert!(resource.import_seed(id).is_err(), "{id} should be rejected");
        }
        let state = NameserverRecordModel {
            id: Some("55501".to_string()),
            ..plan()
        };
        let err = resource.delete(state).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("expected attribute1:attribute2"));
        assert!(mock.calls().await.is_empty());
    }

    #[tokio::test]
    async fn import_finds_record_in_zone() {
        let mock = MockTransport::shared();
        mock.respond(
            "nameserver.info",
            zone(json!({"id": 7.0, "name": "mail.example.com", "type": "MX", "content": "mx.example.com", "ttl": 600.0, "prio": 10.0})),
        )
        .await;
        let resource = NameserverRecordResource::new(mock);

        let state = resource.import("example.com:7").await.unwrap().unwrap();
        assert_eq!(state.record_type, "MX");
        assert_eq!(state.prio, 10);
        assert_eq!(state.ttl, 600);
        assert_eq!(state.name.as_deref(), Some("mail.example.com"));
    }

    #[test]
    fn validate_record_type() {
        let resource = NameserverRecordResource::new(MockTransport::shared());
        assert!(resource.validate(&plan()).is_ok());
        let bad = NameserverRecordModel {
            record_type: "SPF".to_string(),
            ..plan()
        };
        assert!(resource.validate(&bad).is_err());
    }
}
