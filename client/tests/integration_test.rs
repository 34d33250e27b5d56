//! Integration tests for the NoteOnline client
//!
//! These tests run the real HTTP client against an in-process fake backend
//! and verify end-to-end behavior including:
//! - Register/login and session persistence across restarts
//! - Note CRUD through the notes store
//! - Error messages reaching the stores

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use noteonline::app::AppState;
use noteonline::models::{LoginRequest, NoteDraft, NoteUpdate, RegisterRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ===== Fake backend =====

#[derive(Default)]
struct Backend {
    /// email → (user record, password)
    users: HashMap<String, (Value, String)>,
    /// token → user id
    tokens: HashMap<String, String>,
    notes: Vec<Value>,
    next_id: u32,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

type Db = Arc<Mutex<Backend>>;

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct NoteBody {
    title: String,
    content: String,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorize(db: &Backend, headers: &HeaderMap) -> Result<String, Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authorized, no token"))?;

    db.tokens
        .get(token)
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
}

async fn register(State(db): State<Db>, Json(body): Json<RegisterBody>) -> Response {
    let mut db = db.lock().unwrap();
    if db.users.contains_key(&body.email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }

    let id = db.next_id("u");
    let token = format!("token-{}", id);
    let user = json!({ "_id": id, "name": body.name, "email": body.email, "token": token });

    db.tokens.insert(token, id);
    db.users
        .insert(body.email, (user.clone(), body.password));

    (StatusCode::CREATED, Json(user)).into_response()
}

async fn login(State(db): State<Db>, Json(body): Json<LoginBody>) -> Response {
    let db = db.lock().unwrap();
    match db.users.get(&body.email) {
        Some((user, password)) if *password == body.password => Json(user.clone()).into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn list_notes(State(db): State<Db>, headers: HeaderMap) -> Response {
    let db = db.lock().unwrap();
    let owner = match authorize(&db, &headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    let notes: Vec<Value> = db
        .notes
        .iter()
        .filter(|note| note["user"] == owner.as_str())
        .cloned()
        .collect();

    Json(notes).into_response()
}

async fn create_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<NoteBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    let owner = match authorize(&db, &headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    if body.title.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Title required");
    }

    let id = db.next_id("n");
    let note = json!({
        "_id": id,
        "title": body.title,
        "content": body.content,
        "user": owner,
        "createdAt": "2024-05-01T10:00:00.000Z",
        "updatedAt": "2024-05-01T10:00:00.000Z",
        "__v": 0
    });
    db.notes.push(note.clone());

    (StatusCode::CREATED, Json(note)).into_response()
}

async fn get_note(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if id == "explode" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response();
    }

    let db = db.lock().unwrap();
    let owner = match authorize(&db, &headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    match db
        .notes
        .iter()
        .find(|note| note["_id"] == id.as_str() && note["user"] == owner.as_str())
    {
        Some(note) => Json(note.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn update_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    let owner = match authorize(&db, &headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    match db
        .notes
        .iter_mut()
        .find(|note| note["_id"] == id.as_str() && note["user"] == owner.as_str())
    {
        Some(note) => {
            note["title"] = json!(body.title);
            note["content"] = json!(body.content);
            note["updatedAt"] = json!("2024-05-02T10:00:00.000Z");
            Json(note.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn delete_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    let owner = match authorize(&db, &headers) {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    let before = db.notes.len();
    db.notes
        .retain(|note| !(note["_id"] == id.as_str() && note["user"] == owner.as_str()));

    if db.notes.len() == before {
        return error(StatusCode::NOT_FOUND, "Note not found");
    }

    Json(json!({ "id": id })).into_response()
}

/// Start the fake backend; returns its base URL
async fn spawn_backend() -> String {
    let db: Db = Arc::default();

    let app = Router::new()
        .route("/api/auth", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/note", get(list_notes).post(create_note))
        .route(
            "/api/note/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .with_state(db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to create client state pointed at `base_url`
async fn create_test_state(base_url: &str) -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::initialize(temp_dir.path().to_path_buf(), Some(base_url.to_string()))
        .await
        .unwrap();

    (state, temp_dir)
}

async fn register_ann(state: &AppState) {
    state
        .session
        .register(RegisterRequest::new("Ann", "ann@x.com", "secret"))
        .await;
    assert!(state.session.snapshot().status.is_success());
}

// ===== Tests =====

#[tokio::test]
async fn test_note_crud_operations() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;

    // Create
    state
        .notes
        .create_note(NoteDraft::new("Shopping", "milk"))
        .await;
    let notes = state.notes.snapshot();
    assert!(notes.status.is_success());
    assert_eq!(notes.items.len(), 1);
    let created = notes.items[0].clone();
    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());

    // List
    state.notes.list_notes().await;
    assert_eq!(state.notes.snapshot().items, vec![created.clone()]);

    // Read
    state.notes.get_note(&created.id).await;
    assert_eq!(state.notes.snapshot().selected, Some(created.clone()));

    // Update
    state
        .notes
        .update_note(NoteUpdate::new(&created.id, "Shopping", "milk, eggs"))
        .await;
    let notes = state.notes.snapshot();
    assert!(notes.status.is_success());
    assert_eq!(notes.items[0].content, "milk, eggs");
    assert_eq!(notes.selected.as_ref(), Some(&notes.items[0]));
    assert!(notes.items[0].updated_at > created.updated_at);

    // Delete
    state.notes.delete_note(&created.id).await;
    let notes = state.notes.snapshot();
    assert!(notes.status.is_success());
    assert!(notes.items.is_empty());
    assert!(notes.selected.is_none());

    state.notes.list_notes().await;
    assert!(state.notes.snapshot().items.is_empty());
}

#[tokio::test]
async fn test_session_persists_across_restart() {
    let base_url = spawn_backend().await;
    let temp_dir = TempDir::new().unwrap();

    {
        let state =
            AppState::initialize(temp_dir.path().to_path_buf(), Some(base_url.clone()))
                .await
                .unwrap();
        register_ann(&state).await;
        state.notes.create_note(NoteDraft::new("Kept", "on server")).await;
    }

    let state = AppState::initialize(temp_dir.path().to_path_buf(), Some(base_url))
        .await
        .unwrap();
    assert_eq!(
        state.session.user().map(|u| u.email),
        Some("ann@x.com".to_string())
    );

    // The restored token is accepted by the backend
    state.notes.list_notes().await;
    let notes = state.notes.snapshot();
    assert!(notes.status.is_success());
    assert_eq!(notes.items.len(), 1);
    assert_eq!(notes.items[0].title, "Kept");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;
    state.logout().await;

    state
        .session
        .login(LoginRequest::new("ann@x.com", "wrong"))
        .await;

    let session = state.session.snapshot();
    assert!(session.user.is_none());
    assert_eq!(session.status.message(), Some("Invalid credentials"));

    state.session.reset_status();
    state
        .session
        .login(LoginRequest::new("ann@x.com", "secret"))
        .await;
    assert!(state.session.is_authenticated());
}

#[tokio::test]
async fn test_duplicate_registration_reports_backend_message() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;

    state
        .session
        .register(RegisterRequest::new("Ann", "ann@x.com", "other"))
        .await;

    let session = state.session.snapshot();
    assert_eq!(session.status.message(), Some("User already exists"));
    assert!(session.user.is_none());
}

#[tokio::test]
async fn test_list_without_session_fails() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;

    state.notes.list_notes().await;

    assert_eq!(
        state.notes.snapshot().status.message(),
        Some("Not authorized, no token")
    );
}

#[tokio::test]
async fn test_rejected_create_leaves_items_unchanged() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;
    state.notes.create_note(NoteDraft::new("First", "one")).await;

    state.notes.create_note(NoteDraft::new("", "no title")).await;

    let notes = state.notes.snapshot();
    assert!(notes.status.is_error());
    assert_eq!(notes.status.message(), Some("Title required"));
    assert_eq!(notes.items.len(), 1);
}

#[tokio::test]
async fn test_missing_note_is_not_an_error() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;

    state.notes.get_note("does-not-exist").await;

    let notes = state.notes.snapshot();
    assert!(notes.status.is_success());
    assert!(notes.selected.is_none());
}

#[tokio::test]
async fn test_error_without_json_body_uses_status_text() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;

    state.notes.get_note("explode").await;

    assert_eq!(
        state.notes.snapshot().status.message(),
        Some("Request failed with status code 500")
    );
}

#[tokio::test]
async fn test_unreachable_backend_reports_transport_error() {
    // Bind and immediately release a port so nothing is listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (state, _temp) = create_test_state(&format!("http://{}", addr)).await;

    state
        .session
        .login(LoginRequest::new("ann@x.com", "secret"))
        .await;

    let session = state.session.snapshot();
    let message = session.status.message().unwrap();
    assert!(message.starts_with("HTTP error"), "unexpected message: {}", message);
    assert!(session.user.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_all_land() {
    let base_url = spawn_backend().await;
    let (state, _temp) = create_test_state(&base_url).await;
    register_ann(&state).await;

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let notes = state.notes.clone();
            tokio::spawn(async move {
                notes
                    .create_note(NoteDraft::new(format!("Note {}", i), "body"))
                    .await;
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let notes = state.notes.snapshot();
    assert_eq!(notes.items.len(), 10);
    assert!(notes.status.is_success());

    state.notes.list_notes().await;
    let mut listed: Vec<String> = state
        .notes
        .snapshot()
        .items
        .into_iter()
        .map(|n| n.id)
        .collect();
    let mut created: Vec<String> = notes.items.into_iter().map(|n| n.id).collect();
    listed.sort();
    created.sort();
    assert_eq!(listed, created);
}
