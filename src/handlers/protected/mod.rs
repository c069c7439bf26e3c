// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind jwt_auth_middleware, which injects AuthUser.

pub mod cctvs;
pub mod contacts;
pub mod users;
pub mod utils;
