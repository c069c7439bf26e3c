use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::auth::TokenPair;
use crate::config::FilterConfig;
use crate::database::models::{CreateUser, PublicUser, UpdateUser, User};
use crate::database::{DocumentStore, FindQuery, Repository};
use crate::filter::{Filter, Pagination};
use crate::services::listing::{list_page, ListQuery};
use crate::services::ServiceError;
use crate::types::{format_timestamp, now};

pub const ENTITY: &str = "User";
const EMAIL_TAKEN: &str = "Email already exists";

#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    filter_config: FilterConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, filter_config: FilterConfig) -> Self {
        Self { users: Repository::new(store), filter_config }
    }

    /// Users without password or session tokens.
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<PublicUser>, Pagination), ServiceError> {
        let (users, pagination) =
            list_page::<User, User>(&self.users, query, &User::FIELDS, &self.filter_config, None).await?;
        let users = users.into_iter().map(|u| PublicUser::from(u).without_tokens()).collect();
        Ok((users, pagination))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<PublicUser, ServiceError> {
        Ok(PublicUser::from(self.find_user(id).await?).without_tokens())
    }

    /// The full stored record, password hash and session included.
    pub async fn find_user(&self, id: &str) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users.find_one(FindQuery::new(Filter::eq("email", email))).await?)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(self.users.exists(&Filter::eq("email", email)).await?)
    }

    /// Sign-up: validate, hash the password, assign a fresh id.
    pub async fn create(&self, payload: CreateUser) -> Result<PublicUser, ServiceError> {
        payload.validate()?;
        if self.email_taken(&payload.email).await? {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let id = Uuid::new_v4();
        let timestamp = now();
        let user = User {
            user_id: id.to_string(),
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: hash_password(&payload.password)?,
            phone: payload.phone,
            token: None,
            refresh_token: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.users
            .insert(id, &user)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, EMAIL_TAKEN))?;

        info!("Created user {}", user.user_id);
        Ok(PublicUser::from(user))
    }

    pub async fn update_by_id(&self, id: &str, payload: UpdateUser) -> Result<PublicUser, ServiceError> {
        let mut payload = payload.normalized();
        payload.validate()?;
        let mut user = self.find_user(id).await?;

        if let Some(email) = payload.email.as_deref().filter(|e| *e != user.email) {
            if self.email_taken(email).await? {
                return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }
        if let Some(password) = payload.password.take() {
            user.password = hash_password(&password)?;
        }

        user.apply(payload);
        user.updated_at = now();
        self.users
            .replace(&user)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, EMAIL_TAKEN))?;
        Ok(PublicUser::from(user).without_tokens())
    }

    /// `caller_id` is the authenticated user; deleting oneself is refused.
    pub async fn delete_by_id(&self, id: &str, caller_id: &str) -> Result<(), ServiceError> {
        self.find_user(id).await?;
        if id == caller_id {
            return Err(ServiceError::Forbidden("Cannot delete your own account".to_string()));
        }
        self.users.delete(id).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    /// Overwrite the stored session pair, invalidating any earlier one.
    pub async fn store_session(&self, id: &str, tokens: &TokenPair) -> Result<(), ServiceError> {
        let mut fields = Map::new();
        fields.insert("token".to_string(), Value::String(tokens.token.clone()));
        fields.insert("refresh_token".to_string(), Value::String(tokens.refresh_token.clone()));
        fields.insert("updated_at".to_string(), Value::String(format_timestamp(&now())));

        let updated = self.users.merge(id, fields).await?;
        if updated == 0 {
            return Err(ServiceError::not_found(ENTITY, id));
        }
        Ok(())
    }
}
