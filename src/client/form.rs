use serde_json::{Map, Value};

use super::api::{ApiClient, ClientError};
use crate::schema::{validate_for_create, validate_for_update, NewStudent, Student, StudentPatch, ValidationErrors};

/// Raw field text as typed by the operator. `None` means the field was
/// not supplied at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub name: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub house: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FormMode {
    Create,
    Edit(Student),
}

/// What a validated form turns into
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewStudent),
    Update { id: i32, patch: StudentPatch },
    Unchanged { id: i32 },
}

/// Registration form used both for public submission and for editing an
/// existing record from the dashboard
#[derive(Debug, Clone)]
pub struct StudentForm {
    mode: FormMode,
}

impl StudentForm {
    pub fn create() -> Self {
        Self { mode: FormMode::Create }
    }

    pub fn edit(student: Student) -> Self {
        Self {
            mode: FormMode::Edit(student),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Initial field values: empty for a new record, the stored values when editing
    pub fn defaults(&self) -> FormInput {
        match &self.mode {
            FormMode::Create => FormInput::default(),
            FormMode::Edit(student) => FormInput {
                name: Some(student.name.clone()),
                class: Some(student.class.to_string()),
                section: Some(student.section.to_string()),
                house: Some(student.house.to_string()),
                phone: Some(student.phone.clone().unwrap_or_default()),
                notes: Some(student.notes.clone().unwrap_or_default()),
            },
        }
    }

    /// Validate the input with the same rules the server applies. In edit
    /// mode only fields whose value differs from the stored record are sent.
    pub fn submission(&self, input: &FormInput) -> Result<Submission, ValidationErrors> {
        match &self.mode {
            FormMode::Create => {
                let body = to_body(input, |_, _| true);
                validate_for_create(&body).map(Submission::Create)
            }
            FormMode::Edit(student) => {
                let current = self.defaults();
                let body = to_body(input, |field, value| {
                    current_value(&current, field).map(str::trim) != Some(value.trim())
                });
                let patch = validate_for_update(&body)?;
                if patch.is_empty() {
                    Ok(Submission::Unchanged { id: student.id })
                } else {
                    Ok(Submission::Update { id: student.id, patch })
                }
            }
        }
    }

    /// Validate locally, then create or update through the API
    pub async fn submit(&self, client: &mut ApiClient, input: &FormInput) -> Result<Student, ClientError> {
        match self.submission(input).map_err(ClientError::Validation)? {
            Submission::Create(student) => client.create_student(&student).await,
            Submission::Update { id, patch } => client.update_student(id, &patch).await,
            Submission::Unchanged { id } => client.get_student(id).await,
        }
    }
}

fn field_pairs(input: &FormInput) -> [(&'static str, Option<&String>); 6] {
    [
        ("name", input.name.as_ref()),
        ("class", input.class.as_ref()),
        ("section", input.section.as_ref()),
        ("house", input.house.as_ref()),
        ("phone", input.phone.as_ref()),
        ("notes", input.notes.as_ref()),
    ]
}

fn current_value<'a>(current: &'a FormInput, field: &str) -> Option<&'a str> {
    field_pairs(current)
        .into_iter()
        .find(|(name, _)| *name == field)
        .and_then(|(_, value)| value.map(String::as_str))
}

fn to_body(input: &FormInput, include: impl Fn(&str, &str) -> bool) -> Value {
    let mut body = Map::new();
    for (field, value) in field_pairs(input) {
        if let Some(value) = value {
            if include(field, value) {
                body.insert(field.to_string(), Value::String(value.clone()));
            }
        }
    }
    Value::Object(body)
}
