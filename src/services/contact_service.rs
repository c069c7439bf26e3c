use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::config::FilterConfig;
use crate::database::models::{Cctv, Contact, ContactWithCctvs, CreateContact, UpdateContact};
use crate::database::{DocumentStore, FindQuery, Repository};
use crate::filter::{Filter, Pagination};
use crate::services::listing::{list_page, ListQuery};
use crate::services::relations::CONTACT_CCTVS;
use crate::services::ServiceError;
use crate::types::now;

pub const ENTITY: &str = "Contact";
const EMAIL_TAKEN: &str = "Email already exists";

#[derive(Clone)]
pub struct ContactService {
    contacts: Repository<Contact>,
    cctvs: Repository<Cctv>,
    filter_config: FilterConfig,
}

impl ContactService {
    pub fn new(store: Arc<dyn DocumentStore>, filter_config: FilterConfig) -> Self {
        Self {
            contacts: Repository::new(Arc::clone(&store)),
            cctvs: Repository::new(store),
            filter_config,
        }
    }

    /// Contacts with their CCTVs, joined in the same query.
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<ContactWithCctvs>, Pagination), ServiceError> {
        list_page(&self.contacts, query, &Contact::FIELDS, &self.filter_config, Some(CONTACT_CCTVS)).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<ContactWithCctvs, ServiceError> {
        let query = FindQuery::new(Repository::<Contact>::id_filter(id)).lookup(CONTACT_CCTVS);
        self.contacts
            .find_one(query)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    /// The bare contact record.
    pub async fn find_contact(&self, id: &str) -> Result<Contact, ServiceError> {
        self.contacts
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    pub async fn create(&self, payload: CreateContact) -> Result<Contact, ServiceError> {
        payload.validate()?;
        if self.contacts.exists(&Filter::eq("email", &payload.email)).await? {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let id = Uuid::new_v4();
        let timestamp = now();
        let contact = Contact {
            contact_id: id.to_string(),
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.contacts
            .insert(id, &contact)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, EMAIL_TAKEN))?;

        info!("Created contact {}", contact.contact_id);
        Ok(contact)
    }

    pub async fn update_by_id(&self, id: &str, payload: UpdateContact) -> Result<Contact, ServiceError> {
        let payload = payload.normalized();
        payload.validate()?;
        let mut contact = self.find_contact(id).await?;

        if let Some(email) = payload.email.as_deref().filter(|e| *e != contact.email) {
            if self.contacts.exists(&Filter::eq("email", email)).await? {
                return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }

        contact.apply(payload);
        contact.updated_at = now();
        self.contacts
            .replace(&contact)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, EMAIL_TAKEN))?;
        Ok(contact)
    }

    /// Refused while any CCTV still references the contact.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        self.find_contact(id).await?;

        let referencing = self.cctvs.count(&Filter::eq("contact_id", id)).await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Contact {} still has {} CCTV(s) assigned",
                id, referencing
            )));
        }

        self.contacts.delete(id).await?;
        info!("Deleted contact {}", id);
        Ok(())
    }
}
