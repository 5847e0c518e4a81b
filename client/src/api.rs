//! Typed wrapper over the contest backend's REST endpoints.
//!
//! Every call issues exactly one request. A non-2xx response becomes
//! [`ClientError::Unauthorized`] (401) or [`ClientError::Api`], carrying the
//! status code and the message pulled out of the error body.

use crate::error::{ApiError, ClientError};
use crate::session::AuthToken;
use bytes::Bytes;
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use util::submission::{Category, Submission, ViewMode};

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaResponse {
    pub can_submit: bool,
}

/// Fields of a new submission plus the work file itself.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub student_name: String,
    pub grade: u8,
    pub class_number: u8,
    pub category: Category,
    pub work_title: String,
    pub file_name: String,
    pub file_bytes: Vec<u8>,
}

/// Source of submission file contents. The batch archive builder only needs this.
pub trait FileFetcher {
    fn fetch_file(
        &self,
        id: &str,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Bytes, ClientError>> + Send;
}

fn listing_path(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::All => "/submissions",
        ViewMode::Final => "/submissions/final",
    }
}

fn bearer(token: &AuthToken) -> String {
    format!("Bearer {}", token.as_str())
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("contest-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_api(ApiError::from_body(status.as_u16(), &body)));
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn request_bytes(&self, req: RequestBuilder) -> Result<Bytes, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let is_json = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("application/json"));

            let err = if is_json {
                let body = resp.bytes().await?;
                ApiError::from_body(status.as_u16(), &body)
            } else {
                ApiError::generic(status.as_u16())
            };
            return Err(ClientError::from_api(err));
        }

        Ok(resp.bytes().await?)
    }

    /// `POST /auth/login`
    pub async fn login(&self, password: &str) -> Result<LoginResponse, ClientError> {
        debug!("POST /auth/login");
        let req = self
            .http
            .post(self.url("/auth/login"))
            .header(ACCEPT, "application/json")
            .json(&LoginRequest { password });
        self.request_json(req).await
    }

    /// `GET /submissions` or `GET /submissions/final`, depending on `mode`.
    pub async fn list_submissions(
        &self,
        token: &AuthToken,
        mode: ViewMode,
    ) -> Result<Vec<Submission>, ClientError> {
        let path = listing_path(mode);
        debug!("GET {path}");
        let req = self
            .http
            .get(self.url(path))
            .header(ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, bearer(token));
        self.request_json(req).await
    }

    /// `GET /submissions/check?studentName=`; no auth.
    pub async fn check_quota(&self, student_name: &str) -> Result<QuotaResponse, ClientError> {
        debug!("GET /submissions/check");
        let req = self
            .http
            .get(self.url("/submissions/check"))
            .header(ACCEPT, "application/json")
            .query(&[("studentName", student_name)]);
        self.request_json(req).await
    }

    /// `POST /submissions` as multipart form data.
    pub async fn create_submission(&self, payload: CreateSubmission) -> Result<Submission, ClientError> {
        let mime = mime_guess::from_path(&payload.file_name).first_or_octet_stream();
        let file = Part::bytes(payload.file_bytes)
            .file_name(payload.file_name)
            .mime_str(mime.as_ref())?;

        let form = Form::new()
            .text("studentName", payload.student_name)
            .text("grade", payload.grade.to_string())
            .text("classNumber", payload.class_number.to_string())
            .text("category", payload.category.as_str())
            .text("workTitle", payload.work_title)
            .part("file", file);

        debug!("POST /submissions");
        let req = self.http.post(self.url("/submissions")).multipart(form);
        self.request_json(req).await
    }

    /// `GET /submissions/{id}/download`; raw file bytes.
    pub async fn download_file(&self, id: &str, token: &AuthToken) -> Result<Bytes, ClientError> {
        let path = format!(
            "/submissions/{}/download",
            utf8_percent_encode(id, URI_COMPONENT)
        );
        debug!("GET {path}");
        let req = self
            .http
            .get(self.url(&path))
            .header(reqwest::header::AUTHORIZATION, bearer(token));
        self.request_bytes(req).await
    }
}

impl FileFetcher for ApiClient {
    async fn fetch_file(&self, id: &str, token: &AuthToken) -> Result<Bytes, ClientError> {
        self.download_file(id, token).await
    }
}
