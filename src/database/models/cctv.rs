use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::contact::ContactWithCctvs;
use super::non_empty;
use crate::database::repository::Entity;
use crate::database::store::Collection;
use crate::filter::FieldSet;
use crate::types::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CctvStatus {
    Online,
    Offline,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cctv {
    pub cctv_id: String,
    pub name: String,
    pub contact_id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub status: CctvStatus,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Cctv {
    pub const FIELDS: FieldSet = FieldSet {
        sortable: &["cctv_id", "contact_id", "ip_address", "name", "created_at", "updated_at"],
        filterable: &[
            "cctv_id",
            "contact_id",
            "name",
            "location",
            "ip_address",
            "brand",
            "model",
            "status",
            "created_at",
            "updated_at",
        ],
    };

    pub fn apply(&mut self, update: UpdateCctv) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.contact_id {
            self.contact_id = v;
        }
        if let Some(v) = update.ip_address {
            self.ip_address = Some(v);
        }
        if let Some(v) = update.status {
            self.status = v;
        }
        if let Some(v) = update.brand {
            self.brand = Some(v);
        }
        if let Some(v) = update.model {
            self.model = Some(v);
        }
        if let Some(v) = update.location {
            self.location = Some(v);
        }
    }
}

impl Entity for Cctv {
    const COLLECTION: Collection = Collection::Cctvs;

    fn business_id(&self) -> &str {
        &self.cctv_id
    }
}

/// A CCTV with its owning contact. The contact's own `cctvs` list is left empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CctvWithContact {
    #[serde(flatten)]
    pub cctv: Cctv,
    pub contact: Option<ContactWithCctvs>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCctv {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "contact_id is required"))]
    pub contact_id: String,
    #[validate(ip(message = "ip_address must be a valid IP address"))]
    pub ip_address: Option<String>,
    #[validate(required(message = "status is required"))]
    pub status: Option<CctvStatus>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub location: Option<String>,
}

impl CreateCctv {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.ip_address = non_empty(self.ip_address);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateCctv {
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    pub contact_id: Option<String>,
    #[validate(ip(message = "ip_address must be a valid IP address"))]
    pub ip_address: Option<String>,
    pub status: Option<CctvStatus>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub location: Option<String>,
}

impl UpdateCctv {
    pub fn normalized(self) -> Self {
        Self {
            name: non_empty(self.name),
            contact_id: non_empty(self.contact_id),
            ip_address: non_empty(self.ip_address),
            status: self.status,
            brand: non_empty(self.brand),
            model: non_empty(self.model),
            location: non_empty(self.location),
        }
    }
}
