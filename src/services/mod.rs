pub mod auth_service;
pub mod cctv_service;
pub mod contact_service;
pub mod error;
pub mod listing;
pub mod relations;
pub mod user_service;

pub use auth_service::{AuthService, LoginRequest, LoginResponse};
pub use cctv_service::CctvService;
pub use contact_service::ContactService;
pub use error::ServiceError;
pub use listing::ListQuery;
pub use user_service::UserService;
