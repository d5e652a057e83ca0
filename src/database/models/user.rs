use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `users` credentials table. The table is created by schema
/// setup; no endpoint reads or writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}
