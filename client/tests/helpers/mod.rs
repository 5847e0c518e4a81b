#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use util::submission::{Category, Submission};

pub const PASSWORD: &str = "letmein";
pub const TOKEN: &str = "jwt-test-token";

#[derive(Debug, Clone)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub all: Vec<Submission>,
    pub final_list: Vec<Submission>,
    pub files: HashMap<String, Vec<u8>>,
    pub failing_downloads: HashSet<String>,
    pub quota_exhausted: HashSet<String>,
    pub reject_uploads_with: Option<Value>,
    pub uploads: Vec<Upload>,
    pub requests: usize,
    pub token_revoked: bool,
}

/// In-process stand-in for the contest backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn with<F: FnOnce(&mut BackendState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.state.lock().unwrap().uploads.clone()
    }

    fn hit(&self) {
        self.state.lock().unwrap().requests += 1;
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {TOKEN}");
        let revoked = self.state.lock().unwrap().token_revoked;
        !revoked
            && headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
    }
}

fn error_body(status: StatusCode, message: Value) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "timestamp": "2025-01-05T00:00:00.000Z"
        })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    error_body(StatusCode::UNAUTHORIZED, json!("Unauthorized"))
}

async fn login(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    backend.hit();
    if body["password"] == PASSWORD {
        Json(json!({ "access_token": TOKEN })).into_response()
    } else {
        unauthorized()
    }
}

async fn list_all(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.hit();
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    Json(backend.state.lock().unwrap().all.clone()).into_response()
}

async fn list_final(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.hit();
    if !backend.authorized(&headers) {
        return unauthorized();
    }
    Json(backend.state.lock().unwrap().final_list.clone()).into_response()
}

async fn check(
    State(backend): State<FakeBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.hit();
    let name = params.get("studentName").cloned().unwrap_or_default();
    let exhausted = backend.state.lock().unwrap().quota_exhausted.contains(&name);
    Json(json!({ "canSubmit": !exhausted })).into_response()
}

async fn create(State(backend): State<FakeBackend>, mut multipart: Multipart) -> Response {
    backend.hit();

    let mut upload = Upload {
        fields: HashMap::new(),
        file_name: None,
        content_type: None,
        bytes: Vec::new(),
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload.file_name = field.file_name().map(str::to_string);
            upload.content_type = field.content_type().map(str::to_string);
            upload.bytes = field.bytes().await.unwrap().to_vec();
        } else {
            upload.fields.insert(name, field.text().await.unwrap());
        }
    }

    let mut state = backend.state.lock().unwrap();
    if let Some(message) = state.reject_uploads_with.clone() {
        return error_body(StatusCode::BAD_REQUEST, message);
    }

    let created = Submission {
        id: format!("sub-{}", state.uploads.len() + 1),
        student_name: upload.fields["studentName"].clone(),
        grade: upload.fields["grade"].parse().unwrap(),
        class_number: upload.fields["classNumber"].parse().unwrap(),
        category: upload.fields["category"].parse().unwrap(),
        work_title: upload.fields["workTitle"].clone(),
        file_name: upload.file_name.clone().unwrap_or_default(),
        stored_file_name: "stored.bin".into(),
        file_type: upload.content_type.clone().unwrap_or_default(),
        file_size: upload.bytes.len() as u64,
        submitted_at: "2025-01-05T08:00:00.000Z".into(),
    };
    state.uploads.push(upload);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn download(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.hit();
    if !backend.authorized(&headers) {
        return unauthorized();
    }

    let state = backend.state.lock().unwrap();
    if state.failing_downloads.contains(&id) {
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, json!("存储读取失败"));
    }
    match state.files.get(&id) {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::from(bytes.clone()),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

pub fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/submissions", get(list_all).post(create))
        .route("/submissions/final", get(list_final))
        .route("/submissions/check", get(check))
        .route("/submissions/{id}/download", get(download))
        .with_state(backend)
}

/// Spawns the fake backend on a random local port and returns its base URL.
pub async fn spawn_server(backend: FakeBackend) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let app = router(backend);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn submission(id: &str, name: &str, grade: u8, class: u8, at: &str) -> Submission {
    Submission {
        id: id.to_string(),
        student_name: name.to_string(),
        grade,
        class_number: class,
        category: Category::Programming,
        work_title: format!("{name} game"),
        file_name: format!("{id}.sb3"),
        stored_file_name: format!("stored-{id}.sb3"),
        file_type: "application/octet-stream".to_string(),
        file_size: 3,
        submitted_at: at.to_string(),
    }
}
