// handlers/students.rs - Student record CRUD endpoints
//
//   GET    /students        list every record
//   GET    /students/:id    one record
//   POST   /students        public submission
//   PATCH  /students/:id    partial update
//   DELETE /students/:id    remove a record
//
// Each handler performs at most one read and one write against the store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schema::{validate_for_create, validate_for_update, Student};

/// Parse the `:id` path segment. Only a plain base-10 integer is accepted.
fn parse_student_id(raw: &str) -> Result<i32, ApiError> {
    let invalid = || ApiError::bad_request("Invalid student ID");
    // No sign, no leading zeros
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<i32>().map_err(|_| invalid())
}

/// GET /students - all records, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let mut students = state
        .store
        .list_students()
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to fetch students"))?;

    // The store makes no ordering promise
    students.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(ApiResponse::success(students))
}

/// GET /students/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Student> {
    let id = parse_student_id(&id)?;

    let student = state
        .store
        .get_student(id)
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    Ok(ApiResponse::success(student))
}

/// POST /students - validate and store a new registration
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Student> {
    let Json(body) = payload?;
    let new_student = validate_for_create(&body)?;

    let student = state
        .store
        .create_student(new_student)
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to create student"))?;

    tracing::info!("Registered student {} ({}, house {})", student.id, student.name, student.house);
    Ok(ApiResponse::created(student))
}

/// PATCH /students/:id - update only the supplied fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Student> {
    let id = parse_student_id(&id)?;

    // Existence is reported before body problems
    state
        .store
        .get_student(id)
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to update student"))?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    let Json(body) = payload?;
    let patch = validate_for_update(&body)?;

    let student = state
        .store
        .update_student(id, patch)
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to update student"))?;

    tracing::info!("Updated student {}", student.id);
    Ok(ApiResponse::success(student))
}

/// DELETE /students/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_student_id(&id)?;

    let removed = state
        .store
        .delete_student(id)
        .await
        .map_err(|e| ApiError::from_database(e, "Failed to delete student"))?;

    if !removed {
        return Err(ApiError::not_found("Student not found"));
    }

    tracing::info!("Deleted student {}", id);
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn student_id_must_be_plain_integer() {
        assert_eq!(parse_student_id("17").unwrap(), 17);
        assert!(parse_student_id("12abc").is_err());
        assert!(parse_student_id("").is_err());
        assert!(parse_student_id("1.5").is_err());
        assert!(parse_student_id("99999999999").is_err());
        assert!(parse_student_id("+1").is_err());
        assert!(parse_student_id("-3").is_err());
        assert!(parse_student_id("007").is_err());
        assert!(parse_student_id("0").is_err());
    }

    #[tokio::test]
    async fn signed_and_zero_padded_ids_are_400() {
        let ctx = TestContext::new();
        let created = ctx.seed_student("Asha Rao", "5", "A", "Tagore").await;
        assert_eq!(created["id"], 1);

        for path in ["/api/students/+1", "/api/students/01"] {
            let (status, body) = ctx.send("GET", path, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(body["message"], "Invalid student ID");
        }
    }

    #[tokio::test]
    async fn create_get_list_delete_round_trip() {
        let ctx = TestContext::new();

        let (status, created) = ctx
            .send("POST", "/api/students", Some(json!({
                "name": "Asha Rao", "class": "5", "section": "A", "house": "Tagore"
            })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().expect("numeric id");
        assert!(created["createdAt"].is_string());
        assert!(created["phone"].is_null());

        let (status, fetched) = ctx.send("GET", &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, listed) = ctx.send("GET", "/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(listed.as_array().unwrap().iter().any(|s| s["id"] == id));

        let (status, body) = ctx.send("DELETE", &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, listed) = ctx.send("GET", "/api/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(listed.as_array().unwrap().is_empty());

        let (status, body) = ctx.send("DELETE", &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Student not found");
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields_with_details() {
        let ctx = TestContext::new();

        let (status, body) = ctx
            .send("POST", "/api/students", Some(json!({
                "name": "A", "class": "13", "section": "A", "house": "Nehru", "phone": "123"
            })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["name", "class", "house", "phone"]);
    }

    #[tokio::test]
    async fn create_rejects_unparsable_body() {
        let ctx = TestContext::new();
        let (status, body) = ctx.send_raw("POST", "/api/students", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid JSON body");
    }

    #[tokio::test]
    async fn malformed_ids_are_400() {
        let ctx = TestContext::new();
        for method in ["GET", "PATCH", "DELETE"] {
            let body = (method == "PATCH").then(|| json!({ "name": "Ravi" }));
            let (status, resp) = ctx.send(method, "/api/students/abc", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", method);
            assert_eq!(resp["message"], "Invalid student ID");
        }
    }

    #[tokio::test]
    async fn unknown_ids_are_404() {
        let ctx = TestContext::new();
        let (status, _) = ctx.send("GET", "/api/students/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Missing target wins over an invalid body
        let (status, _) = ctx
            .send("PATCH", "/api/students/404", Some(json!({ "house": "Nowhere" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = ctx.send("DELETE", "/api/students/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_changes_only_supplied_fields() {
        let ctx = TestContext::new();
        let created = ctx.seed_student("Ravi Kumar", "7", "B", "Ashoka").await;
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = ctx
            .send("PATCH", &format!("/api/students/{}", id), Some(json!({
                "house": "Shivaji",
                "notes": "captain",
                "id": 999,
                "createdAt": "1999-01-01T00:00:00Z"
            })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["house"], "Shivaji");
        assert_eq!(updated["notes"], "captain");
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_eq!(updated["name"], created["name"]);
        assert_eq!(updated["class"], created["class"]);
        assert_eq!(updated["section"], created["section"]);

        let (status, body) = ctx
            .send("PATCH", &format!("/api/students/{}", id), Some(json!({ "class": "0" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "class");
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation() {
        let ctx = TestContext::new();
        ctx.seed_student("First Pupil", "1", "A", "Raman").await;
        ctx.seed_student("Second Pupil", "2", "B", "Tagore").await;

        let (_, listed) = ctx.send("GET", "/api/students", None).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["name"].as_str())
            .collect();
        assert_eq!(names, vec!["First Pupil", "Second Pupil"]);
    }

    #[tokio::test]
    async fn admin_token_gates_dashboard_routes_when_required() {
        let ctx = TestContext::with_config(|config| config.security.require_admin_token = true);

        // Public submission stays open
        let created = ctx.seed_student("Asha Rao", "5", "A", "Tagore").await;
        let id = created["id"].as_i64().unwrap();

        let (status, _) = ctx.send("GET", "/api/students", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = ctx.send("DELETE", &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = ctx.admin_token().await;
        let (status, listed) = ctx.send_authed("GET", "/api/students", None, &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = ctx
            .send_authed("DELETE", &format!("/api/students/{}", id), None, &token)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
