use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::handlers::auth::{LoginResponse, WhoamiResponse};
use crate::schema::{FieldError, NewStudent, Student, StudentPatch, ValidationErrors};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// HTTP wrapper around the student API. The record list is cached after
/// the first fetch and dropped whenever a mutation succeeds, so the next
/// listing reflects the write.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    cached_students: Option<Vec<Student>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        // Url::join treats the last segment as a file unless it ends in '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
            cached_students: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Drop the cached record list
    pub fn invalidate(&mut self) {
        self.cached_students = None;
    }

    pub fn has_cached_list(&self) -> bool {
        self.cached_students.is_some()
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let request = self.http.get(self.url("health")?);
        // 503 still carries a useful body
        let response = request.send().await?;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(response.json().await?);
        }
        decode(response).await
    }

    pub async fn login(&self, password: &str) -> Result<LoginResponse, ClientError> {
        #[derive(Serialize)]
        struct LoginBody<'a> {
            password: &'a str,
        }

        let request = self
            .http
            .post(self.url("auth/login")?)
            .json(&LoginBody { password });
        decode(request.send().await?).await
    }

    pub async fn whoami(&self) -> Result<WhoamiResponse, ClientError> {
        let request = self.authorize(self.http.get(self.url("auth/whoami")?));
        decode(request.send().await?).await
    }

    pub async fn list_students(&mut self) -> Result<Vec<Student>, ClientError> {
        if let Some(students) = &self.cached_students {
            return Ok(students.clone());
        }

        let request = self.authorize(self.http.get(self.url("api/students")?));
        let students: Vec<Student> = decode(request.send().await?).await?;
        self.cached_students = Some(students.clone());
        Ok(students)
    }

    pub async fn get_student(&self, id: i32) -> Result<Student, ClientError> {
        let request = self.authorize(self.http.get(self.url(&format!("api/students/{}", id))?));
        decode(request.send().await?).await
    }

    pub async fn create_student(&mut self, student: &NewStudent) -> Result<Student, ClientError> {
        let request = self.http.post(self.url("api/students")?).json(student);
        let created = decode(request.send().await?).await?;
        self.invalidate();
        Ok(created)
    }

    pub async fn update_student(&mut self, id: i32, patch: &StudentPatch) -> Result<Student, ClientError> {
        let request = self
            .authorize(self.http.patch(self.url(&format!("api/students/{}", id))?))
            .json(patch);
        let updated = decode(request.send().await?).await?;
        self.invalidate();
        Ok(updated)
    }

    pub async fn delete_student(&mut self, id: i32) -> Result<(), ClientError> {
        let request = self.authorize(self.http.delete(self.url(&format!("api/students/{}", id))?));
        check(request.send().await?).await?;
        self.invalidate();
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

/// Turn a non-2xx response into the matching `ClientError`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
        message: if text.is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        } else {
            text
        },
        errors: Vec::new(),
    });

    Err(match status {
        StatusCode::BAD_REQUEST if !body.errors.is_empty() => {
            ClientError::Validation(ValidationErrors::from(body.errors))
        }
        StatusCode::BAD_REQUEST => ClientError::BadRequest(body.message),
        StatusCode::NOT_FOUND => ClientError::NotFound(body.message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(body.message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message: body.message,
        },
    })
}
