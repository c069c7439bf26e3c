use std::collections::BTreeMap;

use serde_json::Value;

use super::error::FilterError;
use super::types::{FieldPolicy, FieldSet, FilterOp, FilterWhereInfo, SqlParam};

pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Parse `field`, `field[$eq]`, `field[$like]` and `field[$in]` query keys.
    ///
    /// Keys with no values are skipped. Every condition is AND-ed by the caller.
    pub fn parse(
        params: &BTreeMap<String, Vec<String>>,
        fields: &FieldSet,
        policy: FieldPolicy,
    ) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let mut conditions = Vec::new();
        for (key, values) in params {
            if values.is_empty() {
                continue;
            }
            let (field, operator) = Self::split_key(key)?;
            validate_field_name(field)?;
            if policy == FieldPolicy::AllowList && !fields.can_filter(field) {
                return Err(FilterError::FieldNotAllowed(field.to_string()));
            }

            let values = match operator {
                FilterOp::In => values.clone(),
                FilterOp::Eq | FilterOp::Like => vec![values[0].clone()],
            };
            conditions.push(FilterWhereInfo { field: field.to_string(), operator, values });
        }
        Ok(conditions)
    }

    fn split_key(key: &str) -> Result<(&str, FilterOp), FilterError> {
        for op in FilterOp::all() {
            if let Some(field) = key.strip_suffix(op.suffix()) {
                return Ok((field, op));
            }
        }
        if key.contains('[') || key.contains(']') {
            return Err(FilterError::UnsupportedOperator(key.to_string()));
        }
        Ok((key, FilterOp::Eq))
    }

    /// Render conditions against the JSONB column expression `doc`.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        doc: &str,
        starting_param_index: usize,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition, doc)?);
        }
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo, doc: &str) -> Result<String, FilterError> {
        validate_field_name(&condition.field)?;
        let column = format!("{}->>'{}'", doc, condition.field);
        let first = || {
            condition
                .values
                .first()
                .cloned()
                .ok_or_else(|| FilterError::MissingValue(condition.field.clone()))
        };

        Ok(match condition.operator {
            FilterOp::Eq => {
                let p = self.param(SqlParam::Text(first()?));
                format!("{} = {}", column, p)
            }
            FilterOp::Like => {
                let p = self.param(SqlParam::Text(first()?));
                format!("strpos(lower({}), lower({})) > 0", column, p)
            }
            FilterOp::In => {
                if condition.values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let p = self.param(SqlParam::TextArray(condition.values.clone()));
                format!("{} = ANY({})", column, p)
            }
        })
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Evaluate conditions against an in-process document.
    pub fn matches(conditions: &[FilterWhereInfo], doc: &Value) -> bool {
        conditions.iter().all(|condition| {
            let Some(actual) = field_text(doc, &condition.field) else {
                return false;
            };
            match condition.operator {
                FilterOp::Eq => condition.values.first().is_some_and(|v| *v == actual),
                FilterOp::Like => condition
                    .values
                    .first()
                    .is_some_and(|v| actual.to_lowercase().contains(&v.to_lowercase())),
                FilterOp::In => condition.values.iter().any(|v| *v == actual),
            }
        })
    }
}

/// Text form of a top-level document field, mirroring Postgres `->>`.
pub fn field_text(doc: &Value, field: &str) -> Option<String> {
    match doc.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn validate_field_name(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidField(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: FieldSet = FieldSet {
        sortable: &["name"],
        filterable: &["name", "status", "email"],
    };

    fn params(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn parses_operator_suffixes() {
        let p = params(&[
            ("name[$like]", &["cam"]),
            ("status[$in]", &["online", "offline"]),
            ("email[$eq]", &["a@x.com", "ignored"]),
        ]);
        let conditions = FilterWhere::parse(&p, &FIELDS, FieldPolicy::AllowList).unwrap();

        assert_eq!(conditions.len(), 3);
        assert!(conditions.contains(&FilterWhereInfo {
            field: "name".into(),
            operator: FilterOp::Like,
            values: vec!["cam".into()],
        }));
        assert!(conditions.contains(&FilterWhereInfo {
            field: "status".into(),
            operator: FilterOp::In,
            values: vec!["online".into(), "offline".into()],
        }));
        assert!(conditions.contains(&FilterWhereInfo::eq("email", "a@x.com")));
    }

    #[test]
    fn bare_key_is_equality_on_first_value() {
        let p = params(&[("name", &["front door", "back door"])]);
        let conditions = FilterWhere::parse(&p, &FIELDS, FieldPolicy::AllowList).unwrap();
        assert_eq!(conditions, vec![FilterWhereInfo::eq("name", "front door")]);
    }

    #[test]
    fn allow_list_rejects_unknown_fields() {
        let p = params(&[("password", &["x"])]);
        let err = FilterWhere::parse(&p, &FIELDS, FieldPolicy::AllowList).unwrap_err();
        assert_eq!(err, FilterError::FieldNotAllowed("password".into()));
    }

    #[test]
    fn permissive_policy_accepts_any_identifier() {
        let p = params(&[("password", &["x"])]);
        let conditions = FilterWhere::parse(&p, &FIELDS, FieldPolicy::Permissive).unwrap();
        assert_eq!(conditions, vec![FilterWhereInfo::eq("password", "x")]);
    }

    #[test]
    fn rejects_unknown_operator_and_bad_identifiers() {
        let p = params(&[("name[$gt]", &["1"])]);
        assert!(matches!(
            FilterWhere::parse(&p, &FIELDS, FieldPolicy::Permissive),
            Err(FilterError::UnsupportedOperator(_))
        ));

        let p = params(&[("name'; drop", &["1"])]);
        assert!(matches!(
            FilterWhere::parse(&p, &FIELDS, FieldPolicy::Permissive),
            Err(FilterError::InvalidField(_))
        ));
    }

    #[test]
    fn generates_parameterised_sql() {
        let conditions = vec![
            FilterWhereInfo::eq("email", "a@x.com"),
            FilterWhereInfo { field: "name".into(), operator: FilterOp::Like, values: vec!["Cam".into()] },
            FilterWhereInfo {
                field: "status".into(),
                operator: FilterOp::In,
                values: vec!["online".into(), "maintenance".into()],
            },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, "t.doc", 0).unwrap();

        assert_eq!(
            sql,
            "t.doc->>'email' = $1 AND strpos(lower(t.doc->>'name'), lower($2)) > 0 AND t.doc->>'status' = ANY($3)"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], SqlParam::TextArray(vec!["online".into(), "maintenance".into()]));
    }

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], "doc", 0).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
        assert!(FilterWhere::matches(&[], &json!({})));
    }

    #[test]
    fn evaluates_against_documents() {
        let doc = json!({"name": "Front Gate Camera", "status": "online", "port": 554});

        let like = FilterWhereInfo { field: "name".into(), operator: FilterOp::Like, values: vec!["gate".into()] };
        assert!(FilterWhere::matches(&[like], &doc));

        let within = FilterWhereInfo {
            field: "status".into(),
            operator: FilterOp::In,
            values: vec!["offline".into(), "online".into()],
        };
        assert!(FilterWhere::matches(&[within], &doc));

        assert!(FilterWhere::matches(&[FilterWhereInfo::eq("port", "554")], &doc));
        assert!(!FilterWhere::matches(&[FilterWhereInfo::eq("status", "Online")], &doc));
        assert!(!FilterWhere::matches(&[FilterWhereInfo::eq("missing", "x")], &doc));
    }
}
