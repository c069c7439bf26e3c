use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Filtering by '{0}' is not allowed")]
    FieldNotAllowed(String),

    #[error("Unsupported filter operator in '{0}'")]
    UnsupportedOperator(String),

    #[error("Filter '{0}' requires a value")]
    MissingValue(String),
}
