use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::types::{ClassLevel, House, NewStudent, Section, StudentPatch, NAME_MIN_LEN, PHONE_MIN_LEN};

/// A single field that failed a constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field-level failure found in one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Message for the first error on `field`, if any
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Record the error (if any) under `field` and hand back the value
    fn capture<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "Validation error: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a full submission. Unknown fields (including `id` and
/// `createdAt`) are ignored.
pub fn validate_for_create(input: &Value) -> Result<NewStudent, ValidationErrors> {
    let obj = as_object(input)?;
    let mut errors = ValidationErrors::default();

    let name = errors.capture("name", required(obj, "name").and_then(parse_name));
    let class = errors.capture("class", required(obj, "class").and_then(parse_class));
    let section = errors.capture("section", required(obj, "section").and_then(parse_section));
    let house = errors.capture("house", required(obj, "house").and_then(parse_house));
    let phone = errors.capture("phone", optional(obj, "phone", parse_phone));
    let notes = errors.capture("notes", optional(obj, "notes", parse_notes));

    match (name, class, section, house, phone, notes) {
        (Some(name), Some(class), Some(section), Some(house), Some(phone), Some(notes))
            if errors.is_empty() =>
        {
            Ok(NewStudent {
                name,
                class,
                section,
                house,
                phone,
                notes,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a partial update: the same rules, applied only to fields present
pub fn validate_for_update(input: &Value) -> Result<StudentPatch, ValidationErrors> {
    let obj = as_object(input)?;
    let mut errors = ValidationErrors::default();

    let patch = StudentPatch {
        name: errors.capture("name", present(obj, "name", parse_name)).flatten(),
        class: errors.capture("class", present(obj, "class", parse_class)).flatten(),
        section: errors.capture("section", present(obj, "section", parse_section)).flatten(),
        house: errors.capture("house", present(obj, "house", parse_house)).flatten(),
        phone: errors.capture("phone", present(obj, "phone", parse_phone)).flatten(),
        notes: errors.capture("notes", present(obj, "notes", parse_notes)).flatten(),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    input.as_object().ok_or_else(|| {
        ValidationErrors::single(
            "body",
            format!("Expected object, received {}", json_type(input)),
        )
    })
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, String> {
    obj.get(field).ok_or_else(|| "Required".to_string())
}

// Missing or null both mean "not provided" on create
fn optional<T>(
    obj: &Map<String, Value>,
    field: &str,
    parse: fn(&Value) -> Result<Option<T>, String>,
) -> Result<Option<T>, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse(value),
    }
}

// Missing means "leave untouched" on update
fn present<T>(
    obj: &Map<String, Value>,
    field: &str,
    parse: fn(&Value) -> Result<T, String>,
) -> Result<Option<T>, String> {
    obj.get(field).map(parse).transpose()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_value(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("Expected string, received {}", json_type(value)))
}

fn parse_name(value: &Value) -> Result<String, String> {
    let name = string_value(value)?.trim();
    if name.chars().count() < NAME_MIN_LEN {
        return Err(format!("Name must be at least {} characters", NAME_MIN_LEN));
    }
    Ok(name.to_string())
}

fn parse_class(value: &Value) -> Result<ClassLevel, String> {
    let class = string_value(value)?.trim();
    if class.is_empty() {
        return Err("Please select a class".to_string());
    }
    class.parse()
}

fn parse_section(value: &Value) -> Result<Section, String> {
    let section = string_value(value)?.trim();
    if section.is_empty() {
        return Err("Please select a section".to_string());
    }
    section.parse()
}

fn parse_house(value: &Value) -> Result<House, String> {
    string_value(value)?.parse()
}

fn parse_phone(value: &Value) -> Result<Option<String>, String> {
    if value.is_null() {
        return Ok(None);
    }
    let phone = string_value(value)?.trim();
    if phone.is_empty() {
        return Ok(None);
    }
    if phone.chars().count() < PHONE_MIN_LEN {
        return Err("Please enter a valid phone number".to_string());
    }
    Ok(Some(phone.to_string()))
}

fn parse_notes(value: &Value) -> Result<Option<String>, String> {
    if value.is_null() {
        return Ok(None);
    }
    let notes = string_value(value)?.trim();
    Ok((!notes.is_empty()).then(|| notes.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({ "name": "Asha Rao", "class": "5", "section": "A", "house": "Tagore" })
    }

    #[test]
    fn accepts_minimal_valid_submission() {
        let student = validate_for_create(&valid()).unwrap();
        assert_eq!(student.name, "Asha Rao");
        assert_eq!(student.class.level(), 5);
        assert_eq!(student.section, Section::A);
        assert_eq!(student.house, House::Tagore);
        assert_eq!(student.phone, None);
        assert_eq!(student.notes, None);
    }

    #[test]
    fn normalizes_whitespace_and_empty_optionals() {
        let input = json!({
            "name": "  Ravi Kumar ",
            "class": "12",
            "section": "B",
            "house": "Raman",
            "phone": "   ",
            "notes": " likes chess ",
            "id": 99,
            "createdAt": "2020-01-01T00:00:00Z",
            "favouriteColour": "blue"
        });
        let student = validate_for_create(&input).unwrap();
        assert_eq!(student.name, "Ravi Kumar");
        assert_eq!(student.phone, None);
        assert_eq!(student.notes.as_deref(), Some("likes chess"));
    }

    #[test]
    fn rejects_each_bad_field_by_name() {
        let input = json!({
            "name": "A",
            "class": "13",
            "section": "C",
            "house": "Gandhi",
            "phone": "12345"
        });
        let errors = validate_for_create(&input).unwrap_err();
        assert_eq!(errors.message_for("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.message_for("class"), Some("Class must be one of 1-12"));
        assert_eq!(errors.message_for("section"), Some("Section must be one of A, B"));
        assert!(errors.message_for("house").unwrap().contains("received 'Gandhi'"));
        assert_eq!(errors.message_for("phone"), Some("Please enter a valid phone number"));
        assert_eq!(errors.errors().len(), 5);
    }

    #[test]
    fn reports_missing_required_fields() {
        let errors = validate_for_create(&json!({ "notes": "hello" })).unwrap_err();
        for field in ["name", "class", "section", "house"] {
            assert_eq!(errors.message_for(field), Some("Required"), "field {}", field);
        }
        assert_eq!(errors.message_for("notes"), None);
    }

    #[test]
    fn reports_wrong_types() {
        let mut input = valid();
        input["class"] = json!(5);
        input["name"] = Value::Null;
        let errors = validate_for_create(&input).unwrap_err();
        assert_eq!(errors.message_for("class"), Some("Expected string, received number"));
        assert_eq!(errors.message_for("name"), Some("Expected string, received null"));
    }

    #[test]
    fn empty_selection_gets_prompt_message() {
        let mut input = valid();
        input["class"] = json!("");
        input["section"] = json!("");
        let errors = validate_for_create(&input).unwrap_err();
        assert_eq!(errors.message_for("class"), Some("Please select a class"));
        assert_eq!(errors.message_for("section"), Some("Please select a section"));
    }

    #[test]
    fn phone_is_optional_but_checked_when_present() {
        let mut input = valid();
        input["phone"] = json!("9876543210");
        assert_eq!(
            validate_for_create(&input).unwrap().phone.as_deref(),
            Some("9876543210")
        );

        input["phone"] = json!("987654321");
        assert!(validate_for_create(&input).is_err());

        input["phone"] = Value::Null;
        assert_eq!(validate_for_create(&input).unwrap().phone, None);
    }

    #[test]
    fn rejects_non_object_body() {
        let errors = validate_for_create(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.message_for("body"), Some("Expected object, received array"));
        assert!(validate_for_update(&json!("name")).is_err());
    }

    #[test]
    fn update_only_validates_present_fields() {
        let patch = validate_for_update(&json!({ "house": "Ashoka" })).unwrap();
        assert_eq!(patch.house, Some(House::Ashoka));
        assert!(patch.name.is_none());
        assert!(patch.class.is_none());

        let empty = validate_for_update(&json!({})).unwrap();
        assert!(empty.is_empty());

        let errors = validate_for_update(&json!({ "name": "X", "class": "7" })).unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.message_for("name"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn update_null_clears_optional_but_not_required_fields() {
        let patch = validate_for_update(&json!({ "phone": null, "notes": "" })).unwrap();
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.notes, Some(None));

        let errors = validate_for_update(&json!({ "house": null })).unwrap_err();
        assert_eq!(errors.message_for("house"), Some("Expected string, received null"));
    }

    #[test]
    fn display_lists_fields() {
        let errors = validate_for_create(&json!({ "name": "Asha", "class": "5", "section": "A" }))
            .unwrap_err();
        assert_eq!(errors.to_string(), "Validation error: house: Required");
    }
}
