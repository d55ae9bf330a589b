#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use kurs::router::init_router;
use kurs::state::AppState;
use kurs::store::{MemoryStore, UserStore};
use kurs::utils::email::{EmailService, RecordingMailer};
use kurs::utils::upload::MemoryFileStorage;
use kurs_config::{CorsConfig, JwtConfig, UploadConfig};
use kurs_models::users::{UserChanges, UserRecord, UserRole};

pub const PASSWORD: &str = "Secret#123";
pub const MULTIPART_BOUNDARY: &str = "kurs-test-boundary";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 86400,
        secure_cookies: false,
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub fn set_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.set_cookies()
            .into_iter()
            .find(|cookie| cookie.starts_with(&prefix))
    }

    pub fn cookie_value(&self, name: &str) -> Option<String> {
        let cookie = self.set_cookie(name)?;
        let pair = cookie.split(';').next()?;
        pair.split_once('=').map(|(_, value)| value.to_string())
    }

    /// A `Cookie` request header carrying every non-empty cookie set here.
    pub fn cookie_header(&self) -> String {
        self.set_cookies()
            .iter()
            .filter_map(|cookie| cookie.split(';').next())
            .filter(|pair| !pair.ends_with('='))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub files: Arc<MemoryFileStorage>,
    pub jwt_config: JwtConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let files = Arc::new(MemoryFileStorage::new());
        let jwt_config = test_jwt_config();

        let state = AppState::with_store(
            store.clone(),
            files.clone(),
            EmailService::new(mailer.clone(), "Kurs <noreply@kurs.test>".to_string()),
            jwt_config.clone(),
            CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            UploadConfig {
                dir: "target/test-uploads".to_string(),
                max_file_size: 3 * 1024 * 1024,
            },
        );

        Self {
            router: init_router(state),
            store,
            mailer,
            files,
            jwt_config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookies: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, cookies: Option<&str>) -> TestResponse {
        self.request("GET", uri, None, cookies).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookies: Option<&str>) -> TestResponse {
        self.request("POST", uri, Some(body), cookies).await
    }

    pub async fn put_json(&self, uri: &str, body: Value, cookies: Option<&str>) -> TestResponse {
        self.request("PUT", uri, Some(body), cookies).await
    }

    pub async fn delete(&self, uri: &str, cookies: Option<&str>) -> TestResponse {
        self.request("DELETE", uri, None, cookies).await
    }

    pub async fn put_multipart(
        &self,
        uri: &str,
        body: Vec<u8>,
        cookies: Option<&str>,
    ) -> TestResponse {
        self.send_multipart("PUT", uri, body, cookies).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        body: Vec<u8>,
        cookies: Option<&str>,
    ) -> TestResponse {
        self.send_multipart("POST", uri, body, cookies).await
    }

    async fn send_multipart(
        &self,
        method: &str,
        uri: &str,
        body: Vec<u8>,
        cookies: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        );
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn register(&self, user_name: &str, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/user/register",
            json!({
                "userName": user_name,
                "email": email,
                "password": password,
                "tel": 998901234567i64,
            }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/user/login",
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Registers a student and returns its email and session cookies.
    pub async fn create_student(&self) -> (String, String) {
        let email = generate_unique_email();
        let response = self.register("Student", &email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::CREATED);
        (email, response.cookie_header())
    }

    /// Registers a user, promotes it to admin and logs in again.
    pub async fn create_admin(&self) -> (UserRecord, String) {
        let email = generate_unique_email();
        let response = self.register("Admin", &email, PASSWORD).await;
        assert_eq!(response.status, StatusCode::CREATED);

        let record = self.user_by_email(&email).await;
        let record = UserStore::update(
            self.store.as_ref(),
            record.id,
            UserChanges {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
            .unwrap()
            .unwrap();

        let login = self.login(&email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK);
        (record, login.cookie_header())
    }

    pub async fn user_by_email(&self, email: &str) -> UserRecord {
        UserStore::find_by_email(self.store.as_ref(), email)
            .await
            .unwrap()
            .expect("user exists")
    }

    /// Creates a category and returns its id.
    pub async fn create_category(&self, admin_cookies: &str, name: &str) -> String {
        let response = self
            .post_json(
                "/category/add-category",
                json!({ "name": name, "description": "Test kategoriya" }),
                Some(admin_cookies),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["category"]["_id"].as_str().unwrap().to_string()
    }

    /// Creates a pending course and returns its id.
    pub async fn create_course(&self, admin_cookies: &str, title: &str, category_id: &str) -> String {
        let response = self
            .post_json(
                "/kurs/add-kurs",
                json!({
                    "title": title,
                    "description": "Test kurs",
                    "davomiyligi": 12,
                    "narxi": 500000.0,
                    "category": category_id,
                }),
                Some(admin_cookies),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["kurs"]["_id"].as_str().unwrap().to_string()
    }

    pub async fn approve_course(&self, admin_cookies: &str, course_id: &str) {
        let response = self
            .request(
                "PUT",
                &format!("/admin/kurs/{}/approve", course_id),
                None,
                Some(admin_cookies),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
