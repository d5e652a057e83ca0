use async_trait::async_trait;
use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::schema::{NewStudent, Student, StudentPatch};

/// CRUD boundary between the API layer and the persistent store.
///
/// Every method is a single-row, single-statement operation; the backend's
/// own row atomicity is the only isolation relied upon.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All records, unfiltered. Order is unspecified.
    async fn list_students(&self) -> Result<Vec<Student>, DatabaseError>;

    async fn get_student(&self, id: i32) -> Result<Option<Student>, DatabaseError>;

    /// Assigns the identifier and creation timestamp
    async fn create_student(&self, student: NewStudent) -> Result<Student, DatabaseError>;

    /// Merges the present fields of `patch`. `DatabaseError::NotFound` when
    /// no row has this id.
    async fn update_student(&self, id: i32, patch: StudentPatch) -> Result<Student, DatabaseError>;

    /// `false` when no row matched
    async fn delete_student(&self, id: i32) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn StudentStore>;

pub(crate) fn student_not_found(id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("student {} not found", id))
}
