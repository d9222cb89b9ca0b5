//! Async HTTP client wrapping the board JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use board_core::{
  comment::{Comment, NewComment},
  engagement::{Action, Engagement, EntityKind},
  subject::{NewSubject, Subject},
  user::UserSummary,
  view::{CommentView, SubjectView},
};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::session::Session;

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginReply {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       UserSummary,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
  pub username:     &'a str,
  pub password:     &'a str,
  pub display_name: &'a str,
  pub phone:        &'a str,
}

/// Async HTTP client for the board JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based. Holds no
/// identity of its own; authenticated calls take a [`Session`].
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  fn authed(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
    req.bearer_auth(&session.token)
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// `POST /auth/register`
  pub async fn register(&self, req: &RegisterRequest<'_>) -> Result<UserSummary> {
    #[derive(Deserialize)]
    struct Reply {
      user: UserSummary,
    }
    let resp = self
      .client
      .post(self.url("/auth/register"))
      .json(req)
      .send()
      .await
      .context("POST /auth/register failed")?;
    Ok(decode::<Reply>(resp, "POST /auth/register").await?.user)
  }

  /// `POST /auth/login`
  pub async fn login(&self, username: &str, password: &str) -> Result<LoginReply> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({ "username": username, "password": password }))
      .send()
      .await
      .context("POST /auth/login failed")?;
    decode(resp, "POST /auth/login").await
  }

  /// `POST /auth/logout`
  pub async fn logout(&self, session: &Session) -> Result<()> {
    let resp = self
      .authed(self.client.post(self.url("/auth/logout")), session)
      .send()
      .await
      .context("POST /auth/logout failed")?;
    check(resp, "POST /auth/logout").await.map(drop)
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  /// `GET /entities/subjects`
  pub async fn list_subjects(&self) -> Result<Vec<SubjectView>> {
    let resp = self
      .client
      .get(self.url("/entities/subjects"))
      .send()
      .await
      .context("GET /entities/subjects failed")?;
    decode(resp, "GET /entities/subjects").await
  }

  /// `GET /entities/subjects/:id`
  pub async fn get_subject(&self, id: Uuid) -> Result<SubjectView> {
    let path = format!("/entities/subjects/{id}");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(resp, &format!("GET {path}")).await
  }

  /// `POST /entities/subjects`
  pub async fn post_subject(&self, session: &Session, input: &NewSubject) -> Result<Subject> {
    let resp = self
      .authed(self.client.post(self.url("/entities/subjects")), session)
      .json(input)
      .send()
      .await
      .context("POST /entities/subjects failed")?;
    decode(resp, "POST /entities/subjects").await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  /// `GET /entities/comments?subject=<id>`
  pub async fn list_comments(&self, subject_id: Uuid) -> Result<Vec<CommentView>> {
    let resp = self
      .client
      .get(self.url("/entities/comments"))
      .query(&[("subject", subject_id.to_string())])
      .send()
      .await
      .context("GET /entities/comments failed")?;
    decode(resp, "GET /entities/comments").await
  }

  /// `GET /entities/comments/:id`
  pub async fn get_comment(&self, id: Uuid) -> Result<CommentView> {
    let path = format!("/entities/comments/{id}");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(resp, &format!("GET {path}")).await
  }

  /// `POST /entities/comments`
  pub async fn post_comment(&self, session: &Session, input: &NewComment) -> Result<Comment> {
    let resp = self
      .authed(self.client.post(self.url("/entities/comments")), session)
      .json(input)
      .send()
      .await
      .context("POST /entities/comments failed")?;
    decode(resp, "POST /entities/comments").await
  }

  // ── Engagement ────────────────────────────────────────────────────────────

  /// Current membership of one subject or comment.
  pub async fn engagement(&self, kind: EntityKind, id: Uuid) -> Result<Engagement> {
    Ok(match kind {
      EntityKind::Subject => self.get_subject(id).await?.subject.engagement,
      EntityKind::Comment => self.get_comment(id).await?.comment.engagement,
    })
  }

  /// `POST /entities/{subjects|comments}/:id/like` with exactly `action`.
  pub async fn send_action(
    &self,
    session: &Session,
    kind: EntityKind,
    id: Uuid,
    action: Action,
  ) -> Result<Engagement> {
    let path = format!("{}/{id}/like", collection_path(kind));
    let resp = self
      .authed(self.client.post(self.url(&path)), session)
      .json(&json!({ "action": action }))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    decode(resp, &format!("POST {path}")).await
  }
}

fn collection_path(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Subject => "/entities/subjects",
    EntityKind::Comment => "/entities/comments",
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}

async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  check(resp, what)
    .await?
    .json()
    .await
    .with_context(|| format!("deserialising {what} response"))
}
