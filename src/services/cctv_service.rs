use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::config::FilterConfig;
use crate::database::models::{Cctv, CctvWithContact, Contact, CreateCctv, UpdateCctv};
use crate::database::{DocumentStore, Repository};
use crate::filter::{Filter, Pagination};
use crate::services::contact_service::ContactService;
use crate::services::listing::{list_page, ListQuery};
use crate::services::relations::attach_contacts;
use crate::services::ServiceError;
use crate::types::now;

pub const ENTITY: &str = "Cctv";
const IP_TAKEN_ON_CREATE: &str = "Duplicate Ip Address";
const IP_TAKEN_ON_UPDATE: &str = "IP Address already exists";

#[derive(Clone)]
pub struct CctvService {
    cctvs: Repository<Cctv>,
    contacts: Repository<Contact>,
    contact_service: ContactService,
    filter_config: FilterConfig,
}

impl CctvService {
    pub fn new(store: Arc<dyn DocumentStore>, contact_service: ContactService, filter_config: FilterConfig) -> Self {
        Self {
            cctvs: Repository::new(Arc::clone(&store)),
            contacts: Repository::new(store),
            contact_service,
            filter_config,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<CctvWithContact>, Pagination), ServiceError> {
        let (cctvs, pagination) = list_page(&self.cctvs, query, &Cctv::FIELDS, &self.filter_config, None).await?;
        Ok((attach_contacts(&self.contacts, cctvs).await?, pagination))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<CctvWithContact, ServiceError> {
        let cctv = self.find_cctv(id).await?;
        let mut joined = attach_contacts(&self.contacts, vec![cctv]).await?;
        joined.pop().ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    async fn find_cctv(&self, id: &str) -> Result<Cctv, ServiceError> {
        self.cctvs
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    async fn ip_taken(&self, ip: &str) -> Result<bool, ServiceError> {
        Ok(self.cctvs.exists(&Filter::eq("ip_address", ip)).await?)
    }

    pub async fn create(&self, payload: CreateCctv) -> Result<Cctv, ServiceError> {
        let payload = payload.normalized();
        payload.validate()?;

        if let Some(ip) = payload.ip_address.as_deref() {
            if self.ip_taken(ip).await? {
                return Err(ServiceError::Conflict(IP_TAKEN_ON_CREATE.to_string()));
            }
        }
        self.contact_service.find_contact(&payload.contact_id).await?;

        let status = payload.status.ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("status", ValidationError::new("required"));
            ServiceError::Validation(errors)
        })?;
        let id = Uuid::new_v4();
        let timestamp = now();
        let cctv = Cctv {
            cctv_id: id.to_string(),
            name: payload.name,
            contact_id: payload.contact_id,
            ip_address: payload.ip_address,
            status,
            brand: payload.brand,
            model: payload.model,
            location: payload.location,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.cctvs
            .insert(id, &cctv)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, IP_TAKEN_ON_CREATE))?;

        info!("Created cctv {} for contact {}", cctv.cctv_id, cctv.contact_id);
        Ok(cctv)
    }

    pub async fn update_by_id(&self, id: &str, payload: UpdateCctv) -> Result<Cctv, ServiceError> {
        let payload = payload.normalized();
        payload.validate()?;
        let mut cctv = self.find_cctv(id).await?;

        if let Some(ip) = payload.ip_address.as_deref() {
            if cctv.ip_address.as_deref() != Some(ip) && self.ip_taken(ip).await? {
                return Err(ServiceError::Conflict(IP_TAKEN_ON_UPDATE.to_string()));
            }
        }

        cctv.apply(payload);
        self.contact_service.find_contact(&cctv.contact_id).await?;

        cctv.updated_at = now();
        self.cctvs
            .replace(&cctv)
            .await
            .map_err(|e| ServiceError::on_duplicate(e, IP_TAKEN_ON_UPDATE))?;
        Ok(cctv)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        self.find_cctv(id).await?;
        self.cctvs.delete(id).await?;
        info!("Deleted cctv {}", id);
        Ok(())
    }
}
