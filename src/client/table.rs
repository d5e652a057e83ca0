use std::cmp::Ordering;
use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::Serialize;

use super::export::format_date;
use crate::schema::{ClassLevel, House, Student};

/// Dashboard filters. Every set filter must match.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub class: Option<ClassLevel>,
    pub house: Option<House>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if self.class.is_some_and(|class| class != student.class) {
            return false;
        }
        if self.house.is_some_and(|house| house != student.house) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => student.name.to_lowercase().contains(&term.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Name,
    Class,
    Section,
    House,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortKey {
    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            // Numeric, so 2 sorts before 10
            SortKey::Class => a.class.level().cmp(&b.class.level()),
            SortKey::Section => a.section.as_str().cmp(b.section.as_str()),
            SortKey::House => a.house.as_str().cmp(b.house.as_str()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// Stable sort; ties keep their incoming order
pub fn sort_students(students: &mut [&Student], key: SortKey, order: SortOrder) {
    students.sort_by(|a, b| {
        let ordering = key.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

const HEADERS: [&str; 7] = ["ID", "Name", "Class", "Section", "House", "Phone", "Date Added"];

/// Plain-text table with padded columns
pub fn render_table(students: &[&Student]) -> String {
    let rows: Vec<[String; 7]> = students
        .iter()
        .map(|s| {
            [
                s.id.to_string(),
                s.name.clone(),
                s.class.to_string(),
                s.section.to_string(),
                s.house.to_string(),
                s.phone.clone().unwrap_or_else(|| "-".to_string()),
                format_date(&s.created_at),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(&HEADERS.map(String::from)));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}

/// Summary counts shown above the dashboard table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub by_house: BTreeMap<String, usize>,
    pub by_class: BTreeMap<u8, usize>,
}

impl Stats {
    pub fn from_students<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        let mut by_house: BTreeMap<String, usize> =
            House::ALL.iter().map(|h| (h.to_string(), 0)).collect();
        let mut by_class = BTreeMap::new();
        let mut total = 0;

        for student in students {
            total += 1;
            *by_house.entry(student.house.to_string()).or_default() += 1;
            *by_class.entry(student.class.level()).or_default() += 1;
        }

        Self {
            total,
            by_house,
            by_class,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!("Total Students: {}", self.total)];
        lines.push(String::from("By house:"));
        for house in House::ALL {
            let count = self.by_house.get(house.as_str()).copied().unwrap_or(0);
            lines.push(format!("  {:<8} {}", house, count));
        }
        if !self.by_class.is_empty() {
            lines.push(String::from("By class:"));
            for (class, count) in &self.by_class {
                lines.push(format!("  Class {:<2} {}", class, count));
            }
        }
        lines.join("\n")
    }
}
