use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::student::{StudentRow, STUDENT_COLUMNS};
use crate::database::store::{student_not_found, StudentStore};
use crate::schema::{NewStudent, Student, StudentPatch};

/// `StudentStore` backed by the Postgres `students` table
#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list_students(&self) -> Result<Vec<Student>, DatabaseError> {
        let sql = format!("SELECT {} FROM students", STUDENT_COLUMNS);
        let rows = sqlx::query_as::<_, StudentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Student::try_from).collect()
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, DatabaseError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Student::try_from).transpose()
    }

    async fn create_student(&self, student: NewStudent) -> Result<Student, DatabaseError> {
        let sql = format!(
            "INSERT INTO students (name, class, section, house, phone, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            STUDENT_COLUMNS
        );
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(student.name)
            .bind(student.class.to_string())
            .bind(student.section.as_str())
            .bind(student.house.as_str())
            .bind(student.phone)
            .bind(student.notes)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted student {}", row.id);
        Student::try_from(row)
    }

    async fn update_student(&self, id: i32, patch: StudentPatch) -> Result<Student, DatabaseError> {
        if patch.is_empty() {
            return self.get_student(id).await?.ok_or_else(|| student_not_found(id));
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE students SET ");
        {
            let mut set = query.separated(", ");
            if let Some(name) = patch.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(class) = patch.class {
                set.push("class = ").push_bind_unseparated(class.to_string());
            }
            if let Some(section) = patch.section {
                set.push("section = ").push_bind_unseparated(section.as_str());
            }
            if let Some(house) = patch.house {
                set.push("house = ").push_bind_unseparated(house.as_str());
            }
            if let Some(phone) = patch.phone {
                set.push("phone = ").push_bind_unseparated(phone);
            }
            if let Some(notes) = patch.notes {
                set.push("notes = ").push_bind_unseparated(notes);
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(STUDENT_COLUMNS);

        let row = query
            .build_query_as::<StudentRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| student_not_found(id))?;

        debug!("Updated student {}", id);
        Student::try_from(row)
    }

    async fn delete_student(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
