pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{Entity, Repository};
pub use store::{Collection, DocumentStore, FindQuery, Lookup};
