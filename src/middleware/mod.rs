pub mod auth;
pub mod response;

pub use auth::{bearer_token, require_admin, AdminSession};
pub use response::{ApiResponse, ApiResult};
