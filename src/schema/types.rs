/// Shared record types used by both the API server and the CLI client.
///
/// The closed value sets (class, section, house) live here once so the two
/// validation sites cannot drift apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of characters in a student name (after trimming)
pub const NAME_MIN_LEN: usize = 2;

/// Minimum number of characters in a phone number, when one is given
pub const PHONE_MIN_LEN: usize = 10;

/// One of the four fixed affiliation categories a student belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum House {
    Shivaji,
    Tagore,
    Ashoka,
    Raman,
}

impl House {
    pub const ALL: [House; 4] = [House::Shivaji, House::Tagore, House::Ashoka, House::Raman];

    pub fn as_str(&self) -> &'static str {
        match self {
            House::Shivaji => "Shivaji",
            House::Tagore => "Tagore",
            House::Ashoka => "Ashoka",
            House::Raman => "Raman",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for House {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        House::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| {
                let expected = House::ALL
                    .iter()
                    .map(|h| format!("'{}'", h))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!("Invalid enum value. Expected {}, received '{}'", expected, s)
            })
    }
}

/// Section within a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    A,
    B,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::A, Section::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::A => "A",
            Section::B => "B",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Section::A),
            "B" => Ok(Section::B),
            _ => Err("Section must be one of A, B".to_string()),
        }
    }
}

/// School class "1" through "12". Serialized as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassLevel(u8);

impl ClassLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 12;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = ClassLevel> {
        (Self::MIN..=Self::MAX).map(ClassLevel)
    }
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClassLevel {
    type Err = String;

    // Only the canonical spelling is accepted: "5", not "05" or "+5"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || "Class must be one of 1-12".to_string();
        if s.is_empty() || s.starts_with('0') || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<u8>()
            .ok()
            .and_then(ClassLevel::new)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for ClassLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClassLevel> for String {
    fn from(value: ClassLevel) -> Self {
        value.to_string()
    }
}

/// A persisted student registration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub class: ClassLevel,
    pub section: Section,
    pub house: House,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated record ready for insertion (no id, no timestamp yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub class: ClassLevel,
    pub section: Section,
    pub house: House,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewStudent {
    /// Combine with system-assigned fields into a stored record
    pub fn into_student(self, id: i32, created_at: DateTime<Utc>) -> Student {
        Student {
            id,
            name: self.name,
            class: self.class,
            section: self.section,
            house: self.house,
            phone: self.phone,
            notes: self.notes,
            created_at,
        }
    }
}

/// A validated partial update. `None` leaves the field untouched; for the
/// nullable columns `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house: Option<House>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.class.is_none()
            && self.section.is_none()
            && self.house.is_none()
            && self.phone.is_none()
            && self.notes.is_none()
    }

    /// Merge the present fields into an existing record
    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(class) = self.class {
            student.class = class;
        }
        if let Some(section) = self.section {
            student.section = section;
        }
        if let Some(house) = self.house {
            student.house = house;
        }
        if let Some(phone) = &self.phone {
            student.phone = phone.clone();
        }
        if let Some(notes) = &self.notes {
            student.notes = notes.clone();
        }
    }
}
