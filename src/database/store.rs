use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::Filter;

/// The three persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Contacts,
    Cctvs,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Contacts, Collection::Cctvs];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Contacts => "contacts",
            Collection::Cctvs => "cctvs",
        }
    }

    /// Document field holding the externally visible business id.
    pub fn id_field(&self) -> &'static str {
        match self {
            Collection::Users => "user_id",
            Collection::Contacts => "contact_id",
            Collection::Cctvs => "cctv_id",
        }
    }

    /// Fields backed by a unique index (business id included).
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["user_id", "email"],
            Collection::Contacts => &["contact_id", "email"],
            Collection::Cctvs => &["cctv_id", "ip_address"],
        }
    }
}

/// One-level join: attach every document of `from` whose `foreign_field`
/// equals this document's `local_field`, as an array under `as_field`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub from: Collection,
    pub local_field: &'static str,
    pub foreign_field: &'static str,
    pub as_field: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub skip: u64,
    pub limit: Option<u64>,
    pub lookup: Option<Lookup>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self { filter, ..Default::default() }
    }

    pub fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = Some(lookup);
        self
    }
}

/// Minimal document-store operations the repositories are written against.
///
/// Every write that would duplicate a value of [`Collection::unique_fields`]
/// fails with [`DatabaseError::Duplicate`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError>;

    /// Documents in filter order; unsorted results come back in insertion order.
    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>, DatabaseError>;

    async fn insert_one(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError>;

    /// Replace the whole document of the first match. Returns the number replaced.
    async fn replace_one(&self, collection: Collection, filter: &Filter, doc: Value) -> Result<u64, DatabaseError>;

    /// Overwrite the given top-level fields of the first match.
    async fn merge_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<u64, DatabaseError>;

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
