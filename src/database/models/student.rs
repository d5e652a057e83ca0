use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::database::manager::DatabaseError;
use crate::schema::Student;

/// Column list shared by every statement that returns a student row
pub const STUDENT_COLUMNS: &str = "id, name, class, section, house, phone, notes, created_at";

/// Raw `students` row. The enumerated columns are plain TEXT in the table,
/// so they are parsed back into their closed sets on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: i32,
    pub name: String,
    pub class: String,
    pub section: String,
    pub house: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = DatabaseError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let invalid = |column: &str, message: String| {
            DatabaseError::QueryError(format!(
                "student {} has invalid {}: {}",
                row.id, column, message
            ))
        };

        Ok(Student {
            id: row.id,
            class: row.class.parse().map_err(|e| invalid("class", e))?,
            section: row.section.parse().map_err(|e| invalid("section", e))?,
            house: row.house.parse().map_err(|e| invalid("house", e))?,
            name: row.name,
            phone: row.phone,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}
