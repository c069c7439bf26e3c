use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Collection, DocumentStore, FindQuery, Lookup};
use crate::filter::{Filter, FilterError, SqlParam, SqlResult};

/// Stable order applied after any client sort.
const TIE_BREAK: [&str; 2] = ["t.doc->>'created_at' ASC", "t.id ASC"];

/// Each collection is a `(id UUID, doc JSONB)` table.
pub struct PgDocumentStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, DatabaseError>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| DatabaseError::Timeout(self.op_timeout))?
    }
}

fn count_sql(collection: Collection, filter: &Filter) -> Result<SqlResult, FilterError> {
    let where_sql = filter.to_where_sql("t.doc", 0)?;
    Ok(SqlResult {
        query: format!("SELECT COUNT(*) FROM \"{}\" t WHERE {}", collection.name(), where_sql.query),
        params: where_sql.params,
    })
}

fn select_sql(collection: Collection, query: &FindQuery) -> Result<SqlResult, FilterError> {
    let where_sql = query.filter.to_where_sql("t.doc", 0)?;
    let projection = match &query.lookup {
        Some(lookup) => lookup_projection(lookup),
        None => "t.doc".to_string(),
    };

    let mut sql = format!(
        "SELECT {} FROM \"{}\" t WHERE {} {}",
        projection,
        collection.name(),
        where_sql.query,
        query.filter.to_order_sql("t.doc", &TIE_BREAK)
    );
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if query.skip > 0 {
        sql.push_str(&format!(" OFFSET {}", query.skip));
    }
    Ok(SqlResult { query: sql, params: where_sql.params })
}

fn lookup_projection(lookup: &Lookup) -> String {
    format!(
        "t.doc || jsonb_build_object('{as_field}', COALESCE((SELECT jsonb_agg(f.doc ORDER BY f.doc->>'created_at', f.id) \
         FROM \"{from}\" f WHERE f.doc->>'{foreign}' = t.doc->>'{local}'), '[]'::jsonb))",
        as_field = lookup.as_field,
        from = lookup.from.name(),
        foreign = lookup.foreign_field,
        local = lookup.local_field,
    )
}

/// Targets the first matching row. `reserved` placeholders precede the filter's.
fn first_match_sql(
    collection: Collection,
    filter: &Filter,
    statement: &str,
    reserved: usize,
) -> Result<SqlResult, FilterError> {
    let where_sql = filter.to_where_sql("t.doc", reserved)?;
    let table = collection.name();
    Ok(SqlResult {
        query: format!(
            "{} WHERE id = (SELECT t.id FROM \"{}\" t WHERE {} ORDER BY t.id LIMIT 1)",
            statement, table, where_sql.query
        ),
        params: where_sql.params,
    })
}

fn bind_query<'q>(
    mut q: sqlx::query::Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.clone()),
            SqlParam::TextArray(values) => q.bind(values.clone()),
        };
    }
    q
}

fn bind_scalar<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryScalar<'q, Postgres, O, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Text(s) => q.bind(s.clone()),
            SqlParam::TextArray(values) => q.bind(values.clone()),
        };
    }
    q
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = count_sql(collection, filter)?;
        self.timed(async {
            let q = bind_scalar(sqlx::query_scalar::<_, i64>(&sql.query), &sql.params);
            let count = q.fetch_one(&self.pool).await?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>, DatabaseError> {
        let sql = select_sql(collection, query)?;
        tracing::debug!("find {}: {}", collection.name(), sql.query);
        self.timed(async {
            let q = bind_scalar(sqlx::query_scalar::<_, Value>(&sql.query), &sql.params);
            Ok(q.fetch_all(&self.pool).await?)
        })
        .await
    }

    async fn insert_one(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), DatabaseError> {
        let query = format!("INSERT INTO \"{}\" (id, doc) VALUES ($1, $2)", collection.name());
        self.timed(async {
            sqlx::query(&query).bind(id).bind(doc).execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn replace_one(&self, collection: Collection, filter: &Filter, doc: Value) -> Result<u64, DatabaseError> {
        let statement = format!("UPDATE \"{}\" SET doc = $1", collection.name());
        let sql = first_match_sql(collection, filter, &statement, 1)?;
        self.timed(async {
            let q = bind_query(sqlx::query(&sql.query).bind(doc), &sql.params);
            Ok(q.execute(&self.pool).await?.rows_affected())
        })
        .await
    }

    async fn merge_one(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<u64, DatabaseError> {
        let statement = format!("UPDATE \"{}\" SET doc = doc || $1::jsonb", collection.name());
        let sql = first_match_sql(collection, filter, &statement, 1)?;
        self.timed(async {
            let q = bind_query(sqlx::query(&sql.query).bind(Value::Object(fields)), &sql.params);
            Ok(q.execute(&self.pool).await?.rows_affected())
        })
        .await
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let statement = format!("DELETE FROM \"{}\"", collection.name());
        let sql = first_match_sql(collection, filter, &statement, 0)?;
        self.timed(async {
            let q = bind_query(sqlx::query(&sql.query), &sql.params);
            Ok(q.execute(&self.pool).await?.rows_affected())
        })
        .await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.timed(async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_windowed_select_with_tie_break() {
        let query = FindQuery::new(Filter::eq("contact_id", "c-1")).window(20, 10);
        let sql = select_sql(Collection::Cctvs, &query).unwrap();
        assert_eq!(
            sql.query,
            "SELECT t.doc FROM \"cctvs\" t WHERE t.doc->>'contact_id' = $1 \
             ORDER BY t.doc->>'created_at' ASC, t.id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![SqlParam::Text("c-1".into())]);
    }

    #[test]
    fn renders_lookup_projection() {
        let query = FindQuery::new(Filter::new()).lookup(Lookup {
            from: Collection::Cctvs,
            local_field: "contact_id",
            foreign_field: "contact_id",
            as_field: "cctvs",
        });
        let sql = select_sql(Collection::Contacts, &query).unwrap();
        assert!(sql.query.starts_with("SELECT t.doc || jsonb_build_object('cctvs'"));
        assert!(sql.query.contains("FROM \"cctvs\" f WHERE f.doc->>'contact_id' = t.doc->>'contact_id'"));
        assert!(sql.query.contains("WHERE 1=1"));
        assert!(!sql.query.contains("LIMIT"));
    }

    #[test]
    fn write_statements_reserve_first_parameter() {
        let filter = Filter::eq("user_id", "u-1");
        let sql = first_match_sql(Collection::Users, &filter, "UPDATE \"users\" SET doc = $1", 1).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"users\" SET doc = $1 WHERE id = (SELECT t.id FROM \"users\" t WHERE t.doc->>'user_id' = $2 ORDER BY t.id LIMIT 1)"
        );
    }

    #[test]
    fn count_uses_where_only() {
        let sql = count_sql(Collection::Contacts, &Filter::new()).unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) FROM \"contacts\" t WHERE 1=1");
        assert!(sql.params.is_empty());
    }
}
