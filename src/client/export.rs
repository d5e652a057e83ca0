use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::schema::Student;

pub const CSV_HEADERS: [&str; 6] = ["Name", "Class", "Section", "House", "Date Added", "Notes"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,
}

/// Short US-style date, e.g. `Mar 1, 2024`
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

/// `student_data_YYYY-MM-DD.csv`
pub fn default_filename(date: NaiveDate) -> String {
    format!("student_data_{}.csv", date.format("%Y-%m-%d"))
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the rows as CSV. Free-text columns are always quoted.
pub fn to_csv(students: &[&Student]) -> Result<String, ExportError> {
    if students.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut rows = Vec::with_capacity(students.len() + 1);
    rows.push(CSV_HEADERS.join(","));
    for student in students {
        rows.push(
            [
                quoted(&student.name),
                student.class.to_string(),
                student.section.to_string(),
                student.house.to_string(),
                quoted(&format_date(&student.created_at)),
                quoted(student.notes.as_deref().unwrap_or("")),
            ]
            .join(","),
        );
    }

    Ok(rows.join("\n"))
}
