pub mod cctv;
pub mod contact;
pub mod user;

pub use cctv::{Cctv, CctvStatus, CctvWithContact, CreateCctv, UpdateCctv};
pub use contact::{Contact, ContactWithCctvs, CreateContact, UpdateContact};
pub use user::{CreateUser, PublicUser, UpdateUser, User};

/// Treat blank strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
