use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FieldPolicy, FieldSet, FilterOrderInfo, FilterWhereInfo, SqlResult};

/// Structured filter + sort built from list query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw query parameters and an `order_by` expression.
    pub fn from_query(
        params: &BTreeMap<String, Vec<String>>,
        order_by: Option<&str>,
        fields: &FieldSet,
        policy: FieldPolicy,
    ) -> Result<Self, FilterError> {
        let where_data = FilterWhere::parse(params, fields, policy)?;
        let order_data = order_by.map(|o| FilterOrder::parse(o, fields)).unwrap_or_default();
        Ok(Self { where_data, order_data })
    }

    /// Equality on one field. Used internally, so no allow-list applies.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            where_data: vec![FilterWhereInfo::eq(field, value)],
            order_data: vec![],
        }
    }

    pub fn to_where_sql(&self, doc: &str, starting_param_index: usize) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.where_data, doc, starting_param_index)?;
        Ok(SqlResult { query, params })
    }

    /// ORDER BY clause. `tie_break` terms are appended so paging is stable.
    pub fn to_order_sql(&self, doc: &str, tie_break: &[&str]) -> String {
        let mut terms = FilterOrder::generate(&self.order_data, doc);
        terms.extend(tie_break.iter().map(|t| t.to_string()));
        if terms.is_empty() {
            String::new()
        } else {
            format!("ORDER BY {}", terms.join(", "))
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        FilterWhere::matches(&self.where_data, doc)
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        FilterOrder::compare(&self.order_data, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{FilterOp, SqlParam};
    use serde_json::json;

    const FIELDS: FieldSet = FieldSet {
        sortable: &["name", "created_at"],
        filterable: &["name", "contact_id"],
    };

    #[test]
    fn builds_from_query_parameters() {
        let mut params = BTreeMap::new();
        params.insert("name[$like]".to_string(), vec!["lobby".to_string()]);
        let filter = Filter::from_query(&params, Some("-created_at,secret"), &FIELDS, FieldPolicy::AllowList).unwrap();

        assert_eq!(filter.where_data.len(), 1);
        assert_eq!(filter.where_data[0].operator, FilterOp::Like);
        assert_eq!(filter.order_data.len(), 1);
        assert_eq!(filter.order_data[0].field, "created_at");
    }

    #[test]
    fn renders_where_and_order() {
        let mut params = BTreeMap::new();
        params.insert("contact_id".to_string(), vec!["abc".to_string()]);
        params.insert("name".to_string(), vec!["Lobby".to_string()]);
        let filter = Filter::from_query(&params, None, &FIELDS, FieldPolicy::AllowList).unwrap();
        let sql = filter.to_where_sql("doc", 0).unwrap();
        assert_eq!(sql.query, "doc->>'contact_id' = $1 AND doc->>'name' = $2");
        assert_eq!(sql.params[0], SqlParam::Text("abc".into()));

        assert_eq!(filter.to_order_sql("doc", &[]), "");
        assert_eq!(filter.to_order_sql("doc", &["id ASC"]), "ORDER BY id ASC");
    }

    #[test]
    fn matches_documents() {
        let filter = Filter::eq("contact_id", "abc");
        assert!(filter.matches(&json!({"contact_id": "abc"})));
        assert!(!filter.matches(&json!({"contact_id": "abd"})));
        assert!(Filter::new().matches(&json!({})));
    }
}
