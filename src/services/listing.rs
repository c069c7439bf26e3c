use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::config::FilterConfig;
use crate::database::{Entity, FindQuery, Lookup, Repository};
use crate::filter::{FieldSet, Filter, PageRequest, Pagination};
use crate::services::ServiceError;

/// Raw list parameters: filter keys plus `page`, `limit` and `order_by`.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filters: BTreeMap<String, Vec<String>>,
    pub order_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    /// Collect decoded query pairs. Repeated keys keep every value in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = ListQuery::default();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "page" => query.page = Some(value),
                "limit" => query.limit = Some(value),
                "order_by" => query.order_by = Some(value),
                _ => query.filters.entry(key).or_default().push(value),
            }
        }
        query
    }
}

/// Count, then fetch one page. Pages past the end come back empty without a find.
pub(crate) async fn list_page<T, D>(
    repo: &Repository<T>,
    query: &ListQuery,
    fields: &FieldSet,
    config: &FilterConfig,
    lookup: Option<Lookup>,
) -> Result<(Vec<D>, Pagination), ServiceError>
where
    T: Entity,
    D: DeserializeOwned,
{
    let filter = Filter::from_query(&query.filters, query.order_by.as_deref(), fields, config.field_policy())?;
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref(), config.max_limit);

    let total = repo.count(&filter).await?;
    let pagination = page.paginate(total);
    if total == 0 || page.is_beyond(total) {
        return Ok((Vec::new(), pagination));
    }

    let mut find = FindQuery::new(filter).window(page.skip(), page.limit);
    if let Some(lookup) = lookup {
        find = find.lookup(lookup);
    }
    let items = repo.find(&find).await?;
    Ok((items, pagination))
}
