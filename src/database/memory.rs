use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{student_not_found, StudentStore};
use crate::schema::{NewStudent, Student, StudentPatch};

/// Process-local `StudentStore`, used when no DATABASE_URL is configured
/// and by the test-suite. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStudentStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i32,
    last_created_at: Option<DateTime<Utc>>,
    rows: BTreeMap<i32, Student>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn list_students(&self) -> Result<Vec<Student>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id).cloned())
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, DatabaseError> {
        let mut state = self.state.write().await;

        let id = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| DatabaseError::QueryError("student id sequence exhausted".to_string()))?;

        // Never hand out a timestamp earlier than the previous insert
        let now = Utc::now();
        let created_at = match state.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };

        let stored = student.into_student(id, created_at);
        state.last_id = id;
        state.last_created_at = Some(created_at);
        state.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_student(&self, id: i32, patch: StudentPatch) -> Result<Student, DatabaseError> {
        let mut state = self.state.write().await;
        let student = state.rows.get_mut(&id).ok_or_else(|| student_not_found(id))?;
        patch.apply_to(student);
        Ok(student.clone())
    }

    async fn delete_student(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
