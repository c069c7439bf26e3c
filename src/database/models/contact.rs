use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::cctv::Cctv;
use super::non_empty;
use crate::database::repository::Entity;
use crate::database::store::Collection;
use crate::filter::FieldSet;
use crate::types::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub contact_id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub const FIELDS: FieldSet = FieldSet {
        sortable: &["first_name", "last_name", "email", "created_at", "updated_at"],
        filterable: &[
            "contact_id",
            "first_name",
            "last_name",
            "email",
            "phone",
            "address",
            "created_at",
            "updated_at",
        ],
    };

    pub fn apply(&mut self, update: UpdateContact) {
        if let Some(v) = update.first_name {
            self.first_name = v;
        }
        if let Some(v) = update.last_name {
            self.last_name = Some(v);
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if let Some(v) = update.phone {
            self.phone = Some(v);
        }
        if let Some(v) = update.address {
            self.address = v;
        }
    }
}

impl Entity for Contact {
    const COLLECTION: Collection = Collection::Contacts;

    fn business_id(&self) -> &str {
        &self.contact_id
    }
}

/// A contact together with every CCTV that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactWithCctvs {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default)]
    pub cctvs: Vec<Cctv>,
}

impl From<Contact> for ContactWithCctvs {
    fn from(contact: Contact) -> Self {
        Self { contact, cctvs: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateContact {
    #[validate(length(min = 2, max = 100, message = "first_name must be between 2 and 100 characters"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 2, message = "address must be at least 2 characters"))]
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateContact {
    #[validate(length(min = 2, max = 100, message = "first_name must be between 2 and 100 characters"))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 2, message = "address must be at least 2 characters"))]
    pub address: Option<String>,
}

impl UpdateContact {
    pub fn normalized(self) -> Self {
        Self {
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
            email: non_empty(self.email),
            phone: non_empty(self.phone),
            address: non_empty(self.address),
        }
    }
}
