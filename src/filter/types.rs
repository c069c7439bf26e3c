use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$like")] Like,
    #[serde(rename = "$in")] In,
}

impl FilterOp {
    /// Suffix used in query-parameter keys, e.g. `name[$like]`.
    pub fn suffix(&self) -> &'static str {
        match self {
            FilterOp::Eq => "[$eq]",
            FilterOp::Like => "[$like]",
            FilterOp::In => "[$in]",
        }
    }

    pub fn all() -> [FilterOp; 3] {
        [FilterOp::Like, FilterOp::Eq, FilterOp::In]
    }
}

/// One field predicate. `values` holds a single entry except for `$in`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
    pub values: Vec<String>,
}

impl FilterWhereInfo {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOp::Eq,
            values: vec![value.into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

/// Which fields a client may sort and filter on for a collection.
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    pub sortable: &'static [&'static str],
    pub filterable: &'static [&'static str],
}

impl FieldSet {
    pub fn can_sort(&self, field: &str) -> bool {
        self.sortable.contains(&field)
    }

    pub fn can_filter(&self, field: &str) -> bool {
        self.filterable.contains(&field)
    }
}

/// How unknown filter fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPolicy {
    /// Only fields in [`FieldSet::filterable`] are accepted.
    AllowList,
    /// Any identifier is accepted as a literal equality target.
    Permissive,
}

/// Bind parameter for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
