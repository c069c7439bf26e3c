use crate::services::ListQuery;

/// Decode the raw query string, keeping repeated keys for `$in` filters.
pub fn list_query(raw: Option<String>) -> ListQuery {
    let raw = raw.unwrap_or_default();
    ListQuery::from_pairs(url::form_urlencoded::parse(raw.as_bytes()).into_owned())
}
