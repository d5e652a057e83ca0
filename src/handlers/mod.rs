// handlers/mod.rs - HTTP endpoint handlers
//
// students: record CRUD (submission is public, the rest is the dashboard)
// auth:     admin password exchange and token verification
// system:   service description and health

pub mod auth;
pub mod students;
pub mod system;
