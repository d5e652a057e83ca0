pub mod auth;
pub mod server;
pub mod student;
