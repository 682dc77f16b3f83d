//! `inwx_nameserver`: zones on the registrar's anycast nameservers

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::id::CompositeId;
use crate::resources::common::{call_lookup, call_no_body, call_success, ParamsBuilder};
use crate::validation::{self, NAMESERVER_TYPES, URL_REDIRECT_TYPES};

pub const TYPE_NAME: &str = "inwx_nameserver";

/// Comma separated nameservers used when importing a zone
pub const ENV_NAMESERVERS: &str = "INWX_NAMESERVERS";
/// SOA mail address used when importing a zone
pub const ENV_SOA_MAIL: &str = "INWX_SOA_MAIL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameserverModel {
    /// `domain:roId`
    #[serde(default)]
    pub id: Option<String>,
    pub domain: String,
    /// MASTER or SLAVE
    #[serde(rename = "type")]
    pub zone_type: String,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub master_ip: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub soa_mail: Option<String>,
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
    pub testing: Option<bool>,
    #[serde(default)]
    pub ignore_existing: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    domain: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    zone_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    master_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedZone {
    #[serde(deserialize_with = "lenient::string")]
    ro_id: String,
}

/// Parameters shared by `nameserver.create` and `nameserver.update`.
///
/// Without `prior` every set attribute is sent. With `prior` only the changed
/// ones are, and a removed optional attribute is sent as `""`.
fn zone_params(plan: &NameserverModel, prior: Option<&NameserverModel>) -> ParamsBuilder {
    let params = ParamsBuilder::new().set("domain", plan.domain.as_str());

    let optional = [
        ("masterIp", &plan.master_ip, prior.map(|p| &p.master_ip)),
        ("web", &plan.web, prior.map(|p| &p.web)),
        ("mail", &plan.mail, prior.map(|p| &p.mail)),
        ("soaEmail", &plan.soa_mail, prior.map(|p| &p.soa_mail)),
        (
            "urlRedirectType",
            &plan.url_redirect_type,
            prior.map(|p| &p.url_redirect_type),
        ),
        (
            "urlRedirectTitle",
            &plan.url_redirect_title,
            prior.map(|p| &p.url_redirect_title),
        ),
        (
            "urlRedirectDescription",
            &plan.url_redirect_description,
            prior.map(|p| &p.url_redirect_description),
        ),
        (
            "urlRedirectFavIcon",
            &plan.url_redirect_fav_icon,
            prior.map(|p| &p.url_redirect_fav_icon),
        ),
        (
            "urlRedirectKeywords",
            &plan.url_redirect_keywords,
            prior.map(|p| &p.url_redirect_keywords),
        ),
    ];

    let params = match prior {
        None => {
            let params = params
                .set("type", plan.zone_type.as_str())
                .set("ns", plan.nameservers.clone());
            optional.into_iter().fold(params, |params, (key, value, _)| {
                params.set_opt(key, value.as_deref())
            })
        }
        Some(prior) => {
            let params = params
                .set_changed("type", &plan.zone_type, &prior.zone_type)
                .set_changed("ns", &plan.nameservers, &prior.nameservers);
            optional
                .into_iter()
                .fold(params, |params, (key, value, previous)| {
                    params.set_changed_str(
                        key,
                        value.as_deref(),
                        previous.and_then(Option::as_deref),
                    )
                })
        }
    };

    params.set_opt("testing", plan.testing)
}

/// Import seed for `domain:roId`, with nameservers and SOA mail taken from `env`
/// because `nameserver.info` does not return them.
fn seed_from<F>(id: &str, env: F) -> ProviderResult<NameserverModel>
where
    F: Fn(&str) -> Option<String>,
{
    let parsed = CompositeId::parse(id)?;
    let mut seed = NameserverModel {
        id: Some(parsed.to_string()),
        domain: parsed.first,
        ..NameserverModel::default()
    };

    if let Some(list) = env(ENV_NAMESERVERS).filter(|v| !v.is_empty()) {
        for ns in list.split(',').map(str::trim) {
            validation::fqdn(ns).map_err(|detail| {
                ProviderError::validation(
                    "nameservers",
                    format!("invalid nameserver '{ns}'"),
                    detail,
                )
            })?;
            seed.nameservers.push(ns.to_string());
        }
    }

    if let Some(mail) = env(ENV_SOA_MAIL).filter(|v| !v.trim().is_empty()) {
        let mail = mail.trim();
        validation::email(mail).map_err(|detail| {
            ProviderError::validation("soa_mail", "invalid SOA mail", detail)
        })?;
        seed.soa_mail = Some(mail.to_string());
    }

    Ok(seed)
}

/// `inwx_nameserver` resource
pub struct NameserverResource {
    client: Arc<dyn RpcTransport>,
}

impl NameserverResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for NameserverResource {
    type Model = NameserverModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn validate(&self, model: &NameserverModel) -> ProviderResult<()> {
        validation::one_of("type", &model.zone_type, NAMESERVER_TYPES)?;
        validation::opt_one_of(
            "url_redirect_type",
            model.url_redirect_type.as_deref(),
            URL_REDIRECT_TYPES,
        )
    }

    async fn create(&self, plan: NameserverModel) -> ProviderResult<NameserverModel> {
        const SUMMARY: &str = "Could not add nameserver zone";

        let params = zone_params(&plan, None)
            .set_opt("ignoreExisting", plan.ignore_existing)
            .build();
        let response =
            call_success(self.client.as_ref(), "nameserver.create", params, SUMMARY).await?;
        let created: CreatedZone = response.res_data().context(SUMMARY)?;

        let id = CompositeId::new(plan.domain.as_str(), &created.ro_id);
        log::info!("[{TYPE_NAME}] created zone {id}");
        Ok(NameserverModel {
            id: Some(id.to_string()),
            ..plan
        })
    }

    async fn read(&self, state: NameserverModel) -> ProviderResult<Option<NameserverModel>> {
        const SUMMARY: &str = "Could not read nameserver zone";

        let params = ParamsBuilder::new()
            .set("domain", state.domain.as_str())
            .build();
        let Some(response) =
            call_lookup(self.client.as_ref(), "nameserver.info", params, SUMMARY).await?
        else {
            log::warn!("[{TYPE_NAME}] zone {} no longer exists", state.domain);
            return Ok(None);
        };

        let Some(info) = response.res_data_opt::<ZoneInfo>().context(SUMMARY)? else {
            return Ok(Some(state));
        };
        Ok(Some(NameserverModel {
            domain: info.domain.unwrap_or(state.domain),
            zone_type: info.zone_type.unwrap_or(state.zone_type),
            master_ip: info.master_ip.filter(|ip| !ip.is_empty()).or(state.master_ip),
            ..state
        }))
    }

    async fn update(
        &self,
        plan: NameserverModel,
        prior: NameserverModel,
    ) -> ProviderResult<NameserverModel> {
        const SUMMARY: &str = "Could not update nameserver zone";

        let params = zone_params(&plan, Some(&prior)).build();
        call_success(self.client.as_ref(), "nameserver.update", params, SUMMARY).await?;

        let updated = NameserverModel {
            id: prior.id.clone(),
            ..plan
        };
        let id = updated.id.clone().unwrap_or_default();
        self.read(updated).await?.ok_or(ProviderError::NotFound {
            summary: SUMMARY.to_string(),
            id,
        })
    }

    async fn delete(&self, state: NameserverModel) -> ProviderResult<()> {
        let params = ParamsBuilder::new()
            .set("domain", state.domain.as_str())
            .set_opt("testing", state.testing)
            .build();
        call_no_body(
            self.client.as_ref(),
            "nameserver.delete",
            params,
            "Could not delete nameserver zone",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted zone {}", state.domain);
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<NameserverModel> {
        seed_from(id, |name| std::env::var(name).ok())
    }
}
