// schema/mod.rs - Student record shape and validation rules
//
// Single source of truth for field constraints. The API handlers validate
// request bodies with these functions and the CLI form validates before it
// ever sends a request, so both sides reject exactly the same input.

pub mod types;
pub mod validate;

pub use types::{ClassLevel, House, NewStudent, Section, Student, StudentPatch, NAME_MIN_LEN, PHONE_MIN_LEN};
pub use validate::{validate_for_create, validate_for_update, FieldError, ValidationErrors};
