//! JSON REST API for the discussion board.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`BoardStore`] and [`EngagementStore`] for both subjects and comments.
//! TLS and listener concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = board_api::api_router(AppState::new(store, ttl));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use board_core::{
  comment::Comment,
  store::{BoardStore, EngagementStore},
  subject::Subject,
};
use chrono::Duration;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use handlers::{accounts, comments, engagement, subjects};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: BoardStore> {
  pub store:       Arc<S>,
  /// Lifetime of a session minted at login.
  pub session_ttl: Duration,
}

impl<S: BoardStore> AppState<S> {
  pub fn new(store: S, session_ttl: Duration) -> Self {
    Self { store: Arc::new(store), session_ttl }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: BoardStore + EngagementStore<Subject> + EngagementStore<Comment> + Clone + 'static,
{
  Router::new()
    // Accounts
    .route("/auth/register", post(accounts::register::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    .route("/auth/logout", post(accounts::logout::<S>))
    .route("/auth/me", get(accounts::me::<S>))
    // Subjects
    .route(
      "/entities/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route("/entities/subjects/{id}", get(subjects::get_one::<S>))
    .route(
      "/entities/subjects/{id}/like",
      post(engagement::toggle::<S, Subject>),
    )
    // Comments
    .route(
      "/entities/comments",
      get(comments::list::<S>).post(comments::create::<S>),
    )
    .route("/entities/comments/{id}", get(comments::get_one::<S>))
    .route(
      "/entities/comments/{id}/like",
      post(engagement::toggle::<S, Comment>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use board_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, Duration::hours(1))
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
      Some(b) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Register and log in; returns `(token, user_id)`.
  async fn sign_up(state: &AppState<SqliteStore>, username: &str) -> (String, String) {
    let (status, _) = send(
      state,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": username,
        "password": "Secret123",
        "display_name": "Tester",
        "phone": "(555) 123-4567",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
      state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": username, "password": "Secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
      body["token"].as_str().unwrap().to_owned(),
      body["user"]["user_id"].as_str().unwrap().to_owned(),
    )
  }

  async fn post_subject(state: &AppState<SqliteStore>, token: &str) -> String {
    let (status, body) = send(
      state,
      "POST",
      "/entities/subjects",
      Some(token),
      Some(json!({ "title": "T", "description": "D" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["subject_id"].as_str().unwrap().to_owned()
  }

  fn counts(listing: &Value, subject_id: &str) -> (usize, usize) {
    let s = listing
      .as_array()
      .unwrap()
      .iter()
      .find(|s| s["subject_id"] == subject_id)
      .unwrap();
    (
      s["likes"].as_array().unwrap().len(),
      s["dislikes"].as_array().unwrap().len(),
    )
  }

  // ── End to end ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn like_dislike_clear_flow_is_visible_in_listing() {
    let state = make_state().await;
    let (alice, _) = sign_up(&state, "alice@example.com").await;
    let (bob, bob_id) = sign_up(&state, "bob@example.com").await;
    let id = post_subject(&state, &alice).await;
    let like_uri = format!("/entities/subjects/{id}/like");

    let (status, body) =
      send(&state, "POST", &like_uri, Some(&bob), Some(json!({ "action": "like" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "likes": [bob_id], "dislikes": [] }));
    let (_, listing) = send(&state, "GET", "/entities/subjects", None, None).await;
    assert_eq!(counts(&listing, &id), (1, 0));

    send(&state, "POST", &like_uri, Some(&bob), Some(json!({ "action": "dislike" }))).await;
    let (_, listing) = send(&state, "GET", "/entities/subjects", None, None).await;
    assert_eq!(counts(&listing, &id), (0, 1));

    send(&state, "POST", &like_uri, Some(&bob), Some(json!({ "action": null }))).await;
    let (_, listing) = send(&state, "GET", "/entities/subjects", None, None).await;
    assert_eq!(counts(&listing, &id), (0, 0));
    assert_eq!(listing[0]["creator"]["username"], "alice@example.com");
  }

  #[tokio::test]
  async fn comments_count_and_toggle() {
    let state = make_state().await;
    let (alice, alice_id) = sign_up(&state, "alice@example.com").await;
    let id = post_subject(&state, &alice).await;

    let mut comment_ids = Vec::new();
    for content in ["one", "two", "three"] {
      let (status, body) = send(
        &state,
        "POST",
        "/entities/comments",
        Some(&alice),
        Some(json!({ "subject": id, "content": content })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
      comment_ids.push(body["comment_id"].as_str().unwrap().to_owned());
    }

    let (status, body) = send(
      &state,
      "POST",
      &format!("/entities/comments/{}/like", comment_ids[0]),
      Some(&alice),
      Some(json!({ "action": "dislike" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "likes": [], "dislikes": [alice_id] }));

    let (_, listing) = send(&state, "GET", "/entities/subjects", None, None).await;
    assert_eq!(listing[0]["comment_count"], 3);

    let (status, comments) =
      send(&state, "GET", &format!("/entities/comments?subject={id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<_> = comments
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["content"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
    assert_eq!(comments[0]["score"], -1);
  }

  #[tokio::test]
  async fn listing_comments_requires_subject_param() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/entities/comments", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  // ── Toggle errors ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn toggle_without_token_is_401() {
    let state = make_state().await;
    let uri = format!("/entities/subjects/{}/like", Uuid::new_v4());

    let (status, _) = send(&state, "POST", &uri, None, Some(json!({ "action": "like" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
      send(&state, "POST", &uri, Some("bogus"), Some(json!({ "action": "like" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn invalid_action_is_400_and_changes_nothing() {
    let state = make_state().await;
    let (alice, _) = sign_up(&state, "alice@example.com").await;
    let id = post_subject(&state, &alice).await;
    let uri = format!("/entities/subjects/{id}/like");

    for action in [json!("maybe"), json!("null"), json!(7)] {
      let (status, body) =
        send(&state, "POST", &uri, Some(&alice), Some(json!({ "action": action }))).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{action}");
      assert!(body["error"].as_str().unwrap().contains("Invalid action"));
    }

    let (_, view) = send(&state, "GET", &format!("/entities/subjects/{id}"), None, None).await;
    assert_eq!(view["likes"], json!([]));
    assert_eq!(view["dislikes"], json!([]));
  }

  #[tokio::test]
  async fn toggle_without_action_member_is_400_and_changes_nothing() {
    let state = make_state().await;
    let (alice, _) = sign_up(&state, "alice@example.com").await;
    let id = post_subject(&state, &alice).await;
    let uri = format!("/entities/subjects/{id}/like");

    send(&state, "POST", &uri, Some(&alice), Some(json!({ "action": "like" }))).await;

    let (status, body) = send(&state, "POST", &uri, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, view) = send(&state, "GET", &format!("/entities/subjects/{id}"), None, None).await;
    assert_eq!(view["likes"].as_array().unwrap().len(), 1);
    assert_eq!(view["dislikes"], json!([]));
  }

  #[tokio::test]
  async fn malformed_id_is_json_404() {
    let state = make_state().await;
    let (alice, _) = sign_up(&state, "alice@example.com").await;

    let (status, body) = send(
      &state,
      "POST",
      "/entities/subjects/abc/like",
      Some(&alice),
      Some(json!({ "action": "like" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    for uri in ["/entities/subjects/abc", "/entities/comments/abc"] {
      let (status, body) = send(&state, "GET", uri, None, None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
      assert!(body["error"].is_string(), "{uri}");
    }
  }

  #[tokio::test]
  async fn toggle_on_missing_entity_is_404() {
    let state = make_state().await;
    let (alice, _) = sign_up(&state, "alice@example.com").await;

    for kind in ["subjects", "comments"] {
      let uri = format!("/entities/{kind}/{}/like", Uuid::new_v4());
      let (status, _) =
        send(&state, "POST", &uri, Some(&alice), Some(json!({ "action": "like" }))).await;
      assert_eq!(status, StatusCode::NOT_FOUND);
    }
  }

  // ── Accounts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_rejects_invalid_and_duplicate() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": "not-an-email",
        "password": "Secret123",
        "display_name": "Tester",
        "phone": "(555) 123-4567",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    sign_up(&state, "alice@example.com").await;
    let (status, body) = send(
      &state,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": "alice@example.com",
        "password": "Secret123",
        "display_name": "Again",
        "phone": "(555) 123-4567",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
  }

  #[tokio::test]
  async fn login_with_wrong_password_is_400() {
    let state = make_state().await;
    sign_up(&state, "alice@example.com").await;
    let (status, body) = send(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "alice@example.com", "password": "Wrong1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");
  }

  #[tokio::test]
  async fn logout_invalidates_token() {
    let state = make_state().await;
    let (alice, alice_id) = sign_up(&state, "alice@example.com").await;

    let (status, me) = send(&state, "GET", "/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user_id"], alice_id.as_str());

    let (status, _) = send(&state, "POST", "/auth/logout", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&state, "GET", "/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn expired_session_is_rejected() {
    let state = make_state().await;
    let (_, alice_id) = sign_up(&state, "alice@example.com").await;

    let token = auth::mint_token();
    state
      .store
      .create_session(
        auth::token_digest(&token),
        alice_id.parse().unwrap(),
        chrono::Utc::now() - Duration::seconds(1),
      )
      .await
      .unwrap();

    let (status, _) = send(&state, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn creating_requires_auth_and_valid_input() {
    let state = make_state().await;
    let (status, _) = send(
      &state,
      "POST",
      "/entities/subjects",
      None,
      Some(json!({ "title": "T", "description": "D" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (alice, _) = sign_up(&state, "alice@example.com").await;
    let (status, _) = send(
      &state,
      "POST",
      "/entities/subjects",
      Some(&alice),
      Some(json!({ "title": "x".repeat(101), "description": "D" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
      &state,
      "POST",
      "/entities/comments",
      Some(&alice),
      Some(json!({ "subject": Uuid::new_v4(), "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
