use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, DocumentStore, FindQuery};
use crate::filter::filter_where::field_text;
use crate::filter::Filter;

type Rows = Vec<(Uuid, Value)>;

/// Process-local store with the same observable semantics as the Postgres one.
///
/// Rows are kept in insertion order, which doubles as the stable tie-break.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage keys with their documents, in insertion order.
    #[cfg(test)]
    pub(crate) async fn rows(&self, collection: Collection) -> Rows {
        self.collections.read().await.get(&collection).cloned().unwrap_or_default()
    }
}

/// Reject `doc` if it repeats a unique value held by another row.
fn check_unique(collection: Collection, rows: &Rows, skip: Option<Uuid>, doc: &Value) -> Result<(), DatabaseError> {
    for field in collection.unique_fields() {
        let Some(value) = field_text(doc, field) else {
            continue;
        };
        let taken = rows
            .iter()
            .filter(|(id, _)| Some(*id) != skip)
            .any(|(_, other)| field_text(other, field).as_deref() == Some(value.as_str()));
        if taken {
            return Err(DatabaseError::Duplicate(field.to_string()));
        }
    }
    Ok(())
}

fn first_match(rows: &Rows, filter: &Filter) -> Option<usize> {
    rows.iter().position(|(_, doc)| filter.matches(doc))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let guard = self.collections.read().await;
        let count = guard
            .get(&collection)
            .map(|rows| rows.iter().filter(|(_, doc)| filter.matches(doc)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>, DatabaseError> {
        let guard = self.collections.read().await;
        let Some(rows) = guard.get(&collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<&Value> = rows.iter().map(|(_, doc)| doc).filter(|doc| query.filter.matches(doc)).collect();
        // sort_by is stable, so equal keys keep insertion order
        matched.sort_by(|a, b| query.filter.compare(a, b));

        let window = matched
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap_or(usize::MAX))
            .take(query.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX)));

        let Some(lookup) = &query.lookup else {
            return Ok(window.cloned().collect());
        };

        let foreign_rows: &[(Uuid, Value)] = guard.get(&lookup.from).map(Vec::as_slice).unwrap_or(&[]);
        let mut out = Vec::new();
        for doc in window {
            let key = field_text(doc, lookup.local_field);
            let joined: Vec<Value> = foreign_rows
                .iter()
                .filter(|(_, f)| key.is_some() && field_text(f, lookup.foreign_field) == key)
                .map(|(_, f)| f.clone())
                .collect();
            let mut doc = doc.clone();
            if let Value::Object(map) = &mut doc {
                map.insert(lookup.as_field.to_string(), Value::Array(joined));
            }
            out.push(doc);
        }
        Ok(out)
    }

    async fn insert_one(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError> {
        let mut guard = self.collections.write().await;
        let rows = guard.entry(collection).or_default();
        if rows.iter().any(|(existing, _)| *existing == id) {
            return Err(DatabaseError::Duplicate("id".to_string()));
        }
        check_unique(collection, rows, None, &doc)?;
        rows.push((id, doc));
        Ok(())
    }

    async fn replace_one(&self, collection: Collection, filter: &Filter, doc: Value) -> Result<u64, DatabaseError> {
        let mut guard = self.collections.write().await;
        let rows = guard.entry(collection).or_default();
        let Some(idx) = first_match(rows, filter) else {
            return Ok(0);
        };
        check_unique(collection, rows, Some(rows[idx].0), &doc)?;
        rows[idx].1 = doc;
        Ok(1)
    }

    async fn merge_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<u64, DatabaseError> {
        let mut guard = self.collections.write().await;
        let rows = guard.entry(collection).or_default();
        let Some(idx) = first_match(rows, filter) else {
            return Ok(0);
        };

        let mut merged = rows[idx].1.clone();
        if let Value::Object(map) = &mut merged {
            map.extend(fields);
        }
        check_unique(collection, rows, Some(rows[idx].0), &merged)?;
        rows[idx].1 = merged;
        Ok(1)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut guard = self.collections.write().await;
        let rows = guard.entry(collection).or_default();
        match first_match(rows, filter) {
            Some(idx) => {
                rows.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
