use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, DocumentStore, FindQuery};
use crate::filter::Filter;

/// A document type stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn business_id(&self) -> &str;
}

/// Typed access to one collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), _phantom: std::marker::PhantomData }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _phantom: std::marker::PhantomData }
    }

    /// Filter matching this entity's business id.
    pub fn id_filter(id: &str) -> Filter {
        Filter::eq(T::COLLECTION.id_field(), id)
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.count(T::COLLECTION, filter).await
    }

    /// Run a query and decode into `D`, which may be `T` or a joined view of it.
    pub async fn find<D: DeserializeOwned>(&self, query: &FindQuery) -> Result<Vec<D>, DatabaseError> {
        let docs = self.store.find(T::COLLECTION, query).await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn find_one<D: DeserializeOwned>(&self, query: FindQuery) -> Result<Option<D>, DatabaseError> {
        let query = FindQuery { limit: Some(1), ..query };
        Ok(self.find(&query).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        self.find_one(FindQuery::new(Self::id_filter(id))).await
    }

    pub async fn exists(&self, filter: &Filter) -> Result<bool, DatabaseError> {
        Ok(self.count(filter).await? > 0)
    }

    pub async fn insert(&self, id: Uuid, entity: &T) -> Result<(), DatabaseError> {
        let doc = serde_json::to_value(entity)?;
        self.store.insert_one(T::COLLECTION, id, doc).await
    }

    /// Replace the stored document with the same business id.
    pub async fn replace(&self, entity: &T) -> Result<u64, DatabaseError> {
        let doc = serde_json::to_value(entity)?;
        self.store
            .replace_one(T::COLLECTION, &Self::id_filter(entity.business_id()), doc)
            .await
    }

    pub async fn merge(&self, id: &str, fields: Map<String, Value>) -> Result<u64, DatabaseError> {
        self.store.merge_one(T::COLLECTION, &Self::id_filter(id), fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<u64, DatabaseError> {
        self.store.delete_one(T::COLLECTION, &Self::id_filter(id)).await
    }
}
