use std::cmp::Ordering;

use serde_json::Value;

use super::filter_where::field_text;
use super::types::{FieldSet, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `order_by` such as `-created_at,name`.
    ///
    /// Fields outside the sortable allow-list are dropped without error.
    pub fn parse(expr: &str, fields: &FieldSet) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in expr.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (field, sort) = match trimmed.strip_prefix('-') {
                Some(field) => (field.trim(), SortDirection::Desc),
                None => (trimmed, SortDirection::Asc),
            };
            if fields.can_sort(field) {
                out.push(FilterOrderInfo { field: field.to_string(), sort });
            }
        }
        out
    }

    /// Render an ORDER BY body (without the keyword) against `doc`.
    pub fn generate(infos: &[FilterOrderInfo], doc: &str) -> Vec<String> {
        infos
            .iter()
            .map(|i| format!("{}->>'{}' {} NULLS LAST", doc, i.field, i.sort.to_sql()))
            .collect()
    }

    /// Compare two documents on the given order. Missing values sort last.
    pub fn compare(infos: &[FilterOrderInfo], a: &Value, b: &Value) -> Ordering {
        for info in infos {
            let ordering = match (field_text(a, &info.field), field_text(b, &info.field)) {
                (Some(x), Some(y)) => match info.sort {
                    SortDirection::Asc => x.cmp(&y),
                    SortDirection::Desc => y.cmp(&x),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
