pub mod auth;
pub mod response;
pub mod role_gate;

pub use auth::jwt_auth_middleware;
pub use response::{ApiResponse, ApiResult};
pub use role_gate::{role_gate_middleware, Access};
