//! `inwx_domain`: domain registrations

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::resources::common::{call_lookup, call_success, string_map, ParamsBuilder};
use crate::validation::{self, RENEWAL_MODES};

pub const TYPE_NAME: &str = "inwx_domain";

/// The four contact handles every registration needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContacts {
    pub registrant: i64,
    pub admin: i64,
    pub tech: i64,
    pub billing: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainModel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Unordered set: duplicates collapse and order is not significant, so
    /// reordering the configured list is not a change.
    #[serde(default)]
    pub nameservers: BTreeSet<String>,
    pub period: String,
    #[serde(default = "default_renewal_mode")]
    pub renewal_mode: String,
    #[serde(default = "default_transfer_lock")]
    pub transfer_lock: bool,
    pub contacts: DomainContacts,
    /// Registry specific data, needed for some jurisdictions
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

fn default_renewal_mode() -> String {
    "AUTORENEW".to_string()
}

fn default_transfer_lock() -> bool {
    true
}

impl Default for DomainModel {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            nameservers: BTreeSet::new(),
            period: String::new(),
            renewal_mode: default_renewal_mode(),
            transfer_lock: default_transfer_lock(),
            contacts: DomainContacts::default(),
            extra_data: BTreeMap::new(),
        }
    }
}

// ===== domain.info 响应 =====

/// A contact handle, either bare or as a detailed contact object (`wide: 2`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContactRef {
    Detailed {
        #[serde(deserialize_with = "lenient::int")]
        id: i64,
    },
    Id(#[serde(deserialize_with = "lenient::int")] i64),
}

impl ContactRef {
    fn id(&self) -> i64 {
        match self {
            Self::Detailed { id } | Self::Id(id) => *id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ContactRefs {
    #[serde(default)]
    registrant: Option<ContactRef>,
    #[serde(default)]
    admin: Option<ContactRef>,
    #[serde(default)]
    tech: Option<ContactRef>,
    #[serde(default)]
    billing: Option<ContactRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainInfo {
    #[serde(deserialize_with = "lenient::string")]
    domain: String,
    #[serde(default, deserialize_with = "lenient::one_or_many")]
    ns: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    period: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    renewal_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_boolean")]
    transfer_lock: Option<bool>,
    /// Handles at top level
    #[serde(flatten)]
    flat: ContactRefs,
    /// Handles nested under `contacts`
    #[serde(default, alias = "contact")]
    contacts: Option<ContactRefs>,
    #[serde(default, deserialize_with = "lenient::string_map")]
    ext_data: BTreeMap<String, String>,
}

impl DomainInfo {
    /// Flat handles win over nested ones; a role the response omits keeps `fallback`.
    fn contacts(&self, fallback: DomainContacts) -> DomainContacts {
        let nested = self.contacts.as_ref();
        let pick = |flat: Option<&ContactRef>, nested: Option<&ContactRef>, current: i64| {
            flat.or(nested).map_or(current, ContactRef::id)
        };
        DomainContacts {
            registrant: pick(
                self.flat.registrant.as_ref(),
                nested.and_then(|c| c.registrant.as_ref()),
                fallback.registrant,
            ),
            admin: pick(
                self.flat.admin.as_ref(),
                nested.and_then(|c| c.admin.as_ref()),
                fallback.admin,
            ),
            tech: pick(
                self.flat.tech.as_ref(),
                nested.and_then(|c| c.tech.as_ref()),
                fallback.tech,
            ),
            billing: pick(
                self.flat.billing.as_ref(),
                nested.and_then(|c| c.billing.as_ref()),
                fallback.billing,
            ),
        }
    }
}

fn ns_list(nameservers: &BTreeSet<String>) -> Vec<String> {
    nameservers.iter().cloned().collect()
}

/// `inwx_domain` resource
pub struct DomainResource {
    client: Arc<dyn RpcTransport>,
}

impl DomainResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for DomainResource {
    type Model = DomainModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn validate(&self, model: &DomainModel) -> ProviderResult<()> {
        if model.name.trim().is_empty() {
            return Err(ProviderError::validation(
                "name",
                "Invalid name",
                "Name of the domain must not be empty",
            ));
        }
        validation::one_of("renewal_mode", &model.renewal_mode, RENEWAL_MODES)
    }

    async fn create(&self, plan: DomainModel) -> ProviderResult<DomainModel> {
        let params = ParamsBuilder::new()
            .set("domain", plan.name.as_str())
            .set("ns", ns_list(&plan.nameservers))
            .set("period", plan.period.as_str())
            .set("registrant", plan.contacts.registrant)
            .set("admin", plan.contacts.admin)
            .set("tech", plan.contacts.tech)
            .set("billing", plan.contacts.billing)
            .set("transferLock", plan.transfer_lock)
            .set("renewalMode", plan.renewal_mode.as_str())
            .set_opt(
                "extData",
                (!plan.extra_data.is_empty()).then(|| string_map(&plan.extra_data)),
            )
            .build();

        call_success(
            self.client.as_ref(),
            "domain.create",
            params,
            "Could not create domain",
        )
        .await?;
        log::info!("[{TYPE_NAME}] created {}", plan.name);

        Ok(DomainModel {
            id: Some(plan.name.clone()),
            ..plan
        })
    }

    async fn read(&self, state: DomainModel) -> ProviderResult<Option<DomainModel>> {
        const SUMMARY: &str = "Could not get domain info";

        let domain = state.id.clone().unwrap_or_else(|| state.name.clone());
        let params = ParamsBuilder::new()
            .set("domain", domain.as_str())
            .set("wide", 2)
            .build();

        let Some(response) =
            call_lookup(self.client.as_ref(), "domain.info", params, SUMMARY).await?
        else {
            log::warn!("[{TYPE_NAME}] {domain} no longer exists");
            return Ok(None);
        };
        let info: DomainInfo = response.res_data().context(SUMMARY)?;

        Ok(Some(DomainModel {
            id: Some(info.domain.clone()),
            nameservers: info.ns.iter().cloned().collect(),
            period: info.period.clone().unwrap_or(state.period),
            renewal_mode: info.renewal_mode.clone().unwrap_or(state.renewal_mode),
            transfer_lock: info.transfer_lock.unwrap_or(state.transfer_lock),
            contacts: info.contacts(state.contacts),
            extra_data: info.ext_data,
            name: info.domain,
        }))
    }

    async fn update(&self, plan: DomainModel, prior: DomainModel) -> ProviderResult<DomainModel> {
        if plan.name != prior.name {
            return Err(ProviderError::Unsupported {
                summary: "domain 'name' cannot be updated".to_string(),
                detail: format!("{} -> {}", prior.name, plan.name),
            });
        }

        let mut params = ParamsBuilder::new().set("domain", plan.name.as_str());
        if plan.nameservers != prior.nameservers {
            params = params.set("ns", ns_list(&plan.nameservers));
        }
        params = params
            .set_changed("period", &plan.period, &prior.period)
            .set_changed("renewalMode", &plan.renewal_mode, &prior.renewal_mode)
            .set_changed("transferLock", &plan.transfer_lock, &prior.transfer_lock);
        // 联系人总是四个一起提交
        if plan.contacts != prior.contacts {
            params = params
                .set("registrant", plan.contacts.registrant)
                .set("admin", plan.contacts.admin)
                .set("tech", plan.contacts.tech)
                .set("billing", plan.contacts.billing);
        }
        if plan.extra_data != prior.extra_data {
            params = params.set("extData", string_map(&plan.extra_data));
        }

        let id = prior.id.or_else(|| Some(plan.name.clone()));
        if params.len() == 1 {
            log::debug!("[{TYPE_NAME}] {} unchanged, skipping domain.update", plan.name);
            return Ok(DomainModel { id, ..plan });
        }

        call_success(
            self.client.as_ref(),
            "domain.update",
            params.build(),
            "Could not update domain",
        )
        .await?;

        Ok(DomainModel { id, ..plan })
    }

    async fn delete(&self, state: DomainModel) -> ProviderResult<()> {
        let params = ParamsBuilder::new()
            .set("domain", state.name.as_str())
            .build();
        call_success(
            self.client.as_ref(),
            "domain.delete",
            params,
            "Could not delete domain",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted {}", state.name);
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<DomainModel> {
        Ok(DomainModel {
            id: Some(id.to_string()),
            name: id.to_string(),
            ..DomainModel::default()
        })
    }
}
