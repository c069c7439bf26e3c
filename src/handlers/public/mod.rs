// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition plus liveness endpoints.

pub mod session;
pub mod system;
