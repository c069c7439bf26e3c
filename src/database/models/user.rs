use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::non_empty;
use crate::database::repository::Entity;
use crate::database::store::Collection;
use crate::filter::FieldSet;
use crate::types::timestamp;

/// Stored user document. Never serialized into a response directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    /// Argon2id PHC hash.
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub const FIELDS: FieldSet = FieldSet {
        sortable: &["first_name", "last_name", "email", "created_at", "updated_at"],
        filterable: &["user_id", "first_name", "last_name", "email", "phone", "created_at", "updated_at"],
    };

    /// Copy supplied, non-blank fields. The password is handled by the caller.
    pub fn apply(&mut self, update: UpdateUser) {
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
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;

    fn business_id(&self) -> &str {
        &self.user_id
    }
}

/// Response view of a user, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl PublicUser {
    pub fn without_tokens(mut self) -> Self {
        self.token = None;
        self.refresh_token = None;
        self
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            token: user.token,
            refresh_token: user.refresh_token,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "first_name must be between 1 and 100 characters"))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 100, message = "password must be between 2 and 100 characters"))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "first_name must be between 1 and 100 characters"))]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 2, max = 100, message = "password must be between 2 and 100 characters"))]
    pub password: Option<String>,
    pub phone: Option<String>,
}

impl UpdateUser {
    pub fn normalized(self) -> Self {
        Self {
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
            email: non_empty(self.email),
            password: non_empty(self.password),
            phone: non_empty(self.phone),
        }
    }
}
