//! HTTP client for the hostel report service.
//!
//! [`AdminApi`] is the seam the dashboard talks through; [`ApiClient`] is the
//! reqwest implementation. Every authenticated call carries the admin token
//! as a bearer credential.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Admin, FormSubmission, LoginResponse, NewTeacher, Report, ReportRange, Teacher};

/// Operations the dashboard needs from the report service.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Fetch every submitted form.
    async fn list_forms(&self) -> Result<Vec<FormSubmission>>;

    /// Fetch every teacher account.
    async fn list_teachers(&self) -> Result<Vec<Teacher>>;

    /// Create a teacher account.
    async fn add_teacher(&self, teacher: &NewTeacher) -> Result<()>;

    /// Delete a teacher account by id.
    async fn delete_teacher(&self, id: i64) -> Result<()>;

    /// Delete a submitted form by id.
    async fn delete_form(&self, id: i64) -> Result<()>;

    /// Export URL for a report range.
    fn report_url(&self, range: ReportRange) -> String;

    /// Download the exported report for a range.
    async fn download_report(&self, range: ReportRange) -> Result<Report>;
}

/// reqwest-backed client for the report service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url: String = base_url.into();
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the admin token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// The admin token in use, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange admin credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoginRejected`] if the service refuses the
    /// credentials, or a transport error.
    pub async fn login(&self, admin_id: &str, password: &str) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Credentials<'a> {
            admin_id: &'a str,
            password: &'a str,
        }

        let endpoint = "/admin-login";
        let response = self
            .request(Method::POST, endpoint)
            .json(&Credentials { admin_id, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(status_error(endpoint, response).await);
        }

        let text = response.text().await?;
        let body: LoginResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(Error::LoginRejected(body_message(&text)));
            }
            Err(e) => return Err(e.into()),
        };

        match body.token {
            Some(token) if status.is_success() && body.success => {
                info!("Logged in as {admin_id}");
                Ok(token)
            }
            _ => Err(Error::LoginRejected(if body.message.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                body.message
            })),
        }
    }

    /// Fetch every admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        let response = self.send(self.request(Method::GET, "/admins"), "/admins").await?;
        Ok(response.json().await?)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn add_admin(&self, admin: &NewTeacher) -> Result<()> {
        let endpoint = "/add-admin";
        self.send(self.request(Method::POST, endpoint).json(admin), endpoint)
            .await?;
        Ok(())
    }

    /// Delete an admin account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn delete_admin(&self, id: i64) -> Result<()> {
        let endpoint = format!("/delete-admin/{id}");
        self.send(self.request(Method::DELETE, &endpoint), &endpoint)
            .await?;
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(endpoint));
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response> {
        if self.token.is_none() {
            debug!("Calling {endpoint} without an admin token");
        }
        let response = request.send().await?;
        let status = response.status();
        debug!("{endpoint} -> {}", status.as_u16());

        if status.is_success() {
            Ok(response)
        } else {
            Err(status_error(endpoint, response).await)
        }
    }
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn list_forms(&self) -> Result<Vec<FormSubmission>> {
        let response = self.send(self.request(Method::GET, "/forms"), "/forms").await?;
        Ok(response.json().await?)
    }

    async fn list_teachers(&self) -> Result<Vec<Teacher>> {
        let response = self
            .send(self.request(Method::GET, "/teachers"), "/teachers")
            .await?;
        Ok(response.json().await?)
    }

    async fn add_teacher(&self, teacher: &NewTeacher) -> Result<()> {
        let endpoint = "/add-teacher";
        self.send(self.request(Method::POST, endpoint).json(teacher), endpoint)
            .await?;
        Ok(())
    }

    async fn delete_teacher(&self, id: i64) -> Result<()> {
        let endpoint = format!("/delete-teacher/{id}");
        self.send(self.request(Method::DELETE, &endpoint), &endpoint)
            .await?;
        Ok(())
    }

    async fn delete_form(&self, id: i64) -> Result<()> {
        let endpoint = format!("/delete-form/{id}");
        self.send(self.request(Method::DELETE, &endpoint), &endpoint)
            .await?;
        Ok(())
    }

    fn report_url(&self, range: ReportRange) -> String {
        self.url(&format!("/download/{range}"))
    }

    async fn download_report(&self, range: ReportRange) -> Result<Report> {
        let endpoint = format!("/download/{range}");
        let response = self
            .send(self.request(Method::GET, &endpoint), &endpoint)
            .await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .unwrap_or_else(|| range.default_file_name());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();
        debug!("Downloaded {} bytes as {file_name}", bytes.len());

        Ok(Report {
            range,
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Build a status error, pulling a message out of the body when possible.
async fn status_error(endpoint: &str, response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::status(endpoint, status, body_message(&body))
}

/// Extract `message` or `error` from a JSON body, else the trimmed text.
fn body_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(serde_json::Value::as_str) {
                return msg.to_string();
            }
        }
    }
    body.trim().chars().take(200).collect()
}

/// File name from a `Content-Disposition` header value.
///
/// Only the final path component is kept.
fn disposition_file_name(value: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#"(?i)filename\*?\s*=\s*(?:UTF-8'')?"?([^";]+)"?"#).ok())
        .as_ref()?;

    let name = pattern.captures(value)?.get(1)?.as_str().trim();
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    (!name.is_empty() && name != "." && name != "..").then(|| name.to_string())
}
