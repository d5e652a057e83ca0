pub mod student;
pub mod user;

pub use student::StudentRow;
pub use user::Credential;
