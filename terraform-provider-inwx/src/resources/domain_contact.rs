//! `inwx_domain_contact`: registrant/admin/tech/billing contacts

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inwx_domrobot::{lenient, RpcTransport};

use crate::error::{ApiResultExt, ProviderError, ProviderResult};
use crate::framework::Resource;
use crate::resources::common::{call_lookup, call_success, ParamsBuilder};
use crate::validation::{self, CONTACT_TYPES};

pub const TYPE_NAME: &str = "inwx_domain_contact";

const READ_SUMMARY: &str = "Could not get contact info";

/// Contact attributes. Also the model of the `inwx_domain_contact` data source,
/// which only needs `id` and fills in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactModel {
    #[serde(default)]
    pub id: Option<String>,
    /// ORG, PERSON or ROLE
    #[serde(rename = "type", default)]
    pub contact_type: String,
    #[serde(default)]
    pub name: String,
    /// Legal name of the organization, required for types other than PERSON
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub state_province: Option<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub fax: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Registry-side whois privacy for the contact, not the domain
    #[serde(default = "default_whois_protection")]
    pub whois_protection: bool,
}

fn default_whois_protection() -> bool {
    true
}

impl Default for ContactModel {
    fn default() -> Self {
        Self {
            id: None,
            contact_type: String::new(),
            name: String::new(),
            organization: None,
            street_address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            state_province: None,
            country_code: String::new(),
            phone_number: String::new(),
            fax: None,
            email: String::new(),
            remarks: None,
            whois_protection: default_whois_protection(),
        }
    }
}

// ===== contact.info 响应 =====

#[derive(Debug, Deserialize)]
struct ContactInfoData {
    contact: ContactInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactInfo {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    contact_type: String,
    #[serde(deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    org: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pc: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    sp: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    cc: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    voice: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    fax: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_boolean")]
    protection: Option<bool>,
}

/// Empty strings mean "not set".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ContactInfo {
    /// State for contact `id`. `whois_protection` keeps `current` if the response omits it.
    pub(crate) fn into_model(self, id: String, current_protection: bool) -> ContactModel {
        ContactModel {
            id: Some(id),
            contact_type: self.contact_type,
            name: self.name,
            organization: non_empty(self.org),
            street_address: self.street.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            postal_code: self.pc.unwrap_or_default(),
            state_province: non_empty(self.sp),
            country_code: self.cc.unwrap_or_default(),
            phone_number: self.voice.unwrap_or_default(),
            fax: non_empty(self.fax),
            email: self.email.unwrap_or_default(),
            remarks: non_empty(self.remarks),
            whois_protection: self.protection.unwrap_or(current_protection),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedContact {
    #[serde(deserialize_with = "lenient::string")]
    id: String,
}

/// Contact IDs are numeric on the wire.
pub(crate) fn parse_contact_id(id: &str) -> ProviderResult<i64> {
    id.trim().parse().map_err(|_| ProviderError::InvalidId {
        id: id.to_string(),
        expected: "a numerical contact id".to_string(),
    })
}

/// `contact.info` for one contact; `None` if the registrar no longer knows it.
pub(crate) async fn fetch_contact(
    client: &dyn RpcTransport,
    id: i64,
) -> ProviderResult<Option<ContactInfo>> {
    let params = ParamsBuilder::new().set("id", id).set("wide", 2).build();
    let Some(response) = call_lookup(client, "contact.info", params, READ_SUMMARY).await? else {
        return Ok(None);
    };
    let data: ContactInfoData = response.res_data().context(READ_SUMMARY)?;
    Ok(Some(data.contact))
}

fn required(attribute: &str, value: &str) -> ProviderResult<()> {
    if value.trim().is_empty() {
        Err(ProviderError::validation(
            attribute,
            format!("Missing {attribute}"),
            format!("{attribute} is required"),
        ))
    } else {
        Ok(())
    }
}

/// `inwx_domain_contact` resource
pub struct DomainContactResource {
    client: Arc<dyn RpcTransport>,
}

impl DomainContactResource {
    #[must_use]
    pub fn new(client: Arc<dyn RpcTransport>) -> Self {
        Self { client }
    }

    fn state_id(state: &ContactModel) -> ProviderResult<(String, i64)> {
        let id = state.id.clone().unwrap_or_default();
        let numeric = parse_contact_id(&id)?;
        Ok((id, numeric))
    }
}

#[async_trait]
impl Resource for DomainContactResource {
    type Model = ContactModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn validate(&self, model: &ContactModel) -> ProviderResult<()> {
        validation::one_of("type", &model.contact_type, CONTACT_TYPES)?;
        required("name", &model.name)?;
        required("street_address", &model.street_address)?;
        required("city", &model.city)?;
        required("postal_code", &model.postal_code)?;
        required("phone_number", &model.phone_number)?;
        required("email", &model.email)?;
        validation::country_code("country_code", &model.country_code)?;
        if let Some(remarks) = &model.remarks {
            validation::length_between("remarks", remarks, 0, 255)?;
        }
        Ok(())
    }

    async fn create(&self, plan: ContactModel) -> ProviderResult<ContactModel> {
        const SUMMARY: &str = "Could not create contact";

        let params = ParamsBuilder::new()
            .set("type", plan.contact_type.as_str())
            .set("name", plan.name.as_str())
            .set("street", plan.street_address.as_str())
            .set("city", plan.city.as_str())
            .set("pc", plan.postal_code.as_str())
            .set("cc", plan.country_code.as_str())
            .set("voice", plan.phone_number.as_str())
            .set("email", plan.email.as_str())
            .set("protection", plan.whois_protection)
            .set_opt("org", plan.organization.as_deref().filter(|v| !v.is_empty()))
            .set_opt("sp", plan.state_province.as_deref().filter(|v| !v.is_empty()))
            .set_opt("fax", plan.fax.as_deref().filter(|v| !v.is_empty()))
            .set_opt("remarks", plan.remarks.as_deref().filter(|v| !v.is_empty()))
            .build();

        let response =
            call_success(self.client.as_ref(), "contact.create", params, SUMMARY).await?;
        let created: CreatedContact = response.res_data().context(SUMMARY)?;
        log::info!("[{TYPE_NAME}] created contact {}", created.id);

        Ok(ContactModel {
            id: Some(created.id),
            ..plan
        })
    }

    async fn read(&self, state: ContactModel) -> ProviderResult<Option<ContactModel>> {
        let (id, numeric) = Self::state_id(&state)?;
        match fetch_contact(self.client.as_ref(), numeric).await? {
            Some(info) => Ok(Some(info.into_model(id, state.whois_protection))),
            None => {
                log::warn!("[{TYPE_NAME}] contact {id} no longer exists");
                Ok(None)
            }
        }
    }

    async fn update(&self, plan: ContactModel, prior: ContactModel) -> ProviderResult<ContactModel> {
        if plan.contact_type != prior.contact_type {
            return Err(ProviderError::Unsupported {
                summary: "contact 'type' cannot be updated".to_string(),
                detail: format!("{} -> {}", prior.contact_type, plan.contact_type),
            });
        }
        let (id, numeric) = Self::state_id(&prior)?;

        let params = ParamsBuilder::new()
            .set("id", numeric)
            .set_changed("name", &plan.name, &prior.name)
            .set_changed_str(
                "org",
                plan.organization.as_deref(),
                prior.organization.as_deref(),
            )
            .set_changed("street", &plan.street_address, &prior.street_address)
            .set_changed("city", &plan.city, &prior.city)
            .set_changed("pc", &plan.postal_code, &prior.postal_code)
            .set_changed_str(
                "sp",
                plan.state_province.as_deref(),
                prior.state_province.as_deref(),
            )
            .set_changed("cc", &plan.country_code, &prior.country_code)
            .set_changed("voice", &plan.phone_number, &prior.phone_number)
            .set_changed_str("fax", plan.fax.as_deref(), prior.fax.as_deref())
            .set_changed("email", &plan.email, &prior.email)
            .set_changed_str("remarks", plan.remarks.as_deref(), prior.remarks.as_deref())
            .set_changed("protection", &plan.whois_protection, &prior.whois_protection);

        if params.len() > 1 {
            call_success(
                self.client.as_ref(),
                "contact.update",
                params.build(),
                "Could not update contact",
            )
            .await?;
        }

        Ok(ContactModel {
            id: Some(id),
            ..plan
        })
    }

    async fn delete(&self, state: ContactModel) -> ProviderResult<()> {
        let (id, numeric) = Self::state_id(&state)?;
        let params = ParamsBuilder::new().set("id", numeric).build();
        call_success(
            self.client.as_ref(),
            "contact.delete",
            params,
            "Could not delete contact",
        )
        .await?;
        log::info!("[{TYPE_NAME}] deleted contact {id}");
        Ok(())
    }

    fn import_seed(&self, id: &str) -> ProviderResult<ContactModel> {
        parse_contact_id(id)?;
        Ok(ContactModel {
            id: Some(id.to_string()),
            ..ContactModel::default()
        })
    }
}
