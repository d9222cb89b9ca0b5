//! `board`: command-line client for the discussion board.
//!
//! # Usage
//!
//! ```
//! board register ada@example.com Secret123 "Ada L" "(555) 123-4567"
//! board login ada@example.com Secret123
//! board subjects
//! board like subject 6f1c…
//! board --url http://board.local:5000 comments 6f1c…
//! ```

mod client;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use board_core::{
  comment::NewComment,
  engagement::{Action, Engagement, EntityKind, Stance, resolve_toggle},
  subject::NewSubject,
  view::{CommentView, SubjectView},
};
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, RegisterRequest};
use serde::Deserialize;
use session::Session;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "board", about = "Command-line client for the discussion board")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the board server (default: http://localhost:5000).
  #[arg(long, env = "BOARD_URL")]
  url: Option<String>,

  /// Where the login session is kept.
  #[arg(long, env = "BOARD_SESSION", value_name = "FILE")]
  session: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account.
  Register {
    username:     String,
    password:     String,
    display_name: String,
    phone:        String,
  },
  /// Log in and store the session locally.
  Login { username: String, password: String },
  /// End the stored session.
  Logout,
  /// List subjects, newest first.
  Subjects,
  /// Create a subject.
  Post { title: String, description: String },
  /// List comments on a subject, oldest first.
  Comments { subject: Uuid },
  /// Comment on a subject.
  Comment { subject: Uuid, content: String },
  /// Like an entity; liking it again removes the like.
  Like { kind: Kind, id: Uuid },
  /// Dislike an entity; disliking it again removes the dislike.
  Dislike { kind: Kind, id: Uuid },
  /// Remove any like or dislike you hold on an entity.
  Clear { kind: Kind, id: Uuid },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
  Subject,
  Comment,
}

impl From<Kind> for EntityKind {
  fn from(kind: Kind) -> Self {
    match kind {
      Kind::Subject => EntityKind::Subject,
      Kind::Comment => EntityKind::Comment,
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:5000".to_string());
  let session_path = args.session.unwrap_or_else(session::default_path);

  let client = ApiClient::new(base_url)?;
  run(&client, &session_path, args.command).await
}

async fn run(client: &ApiClient, session_path: &Path, command: Command) -> Result<()> {
  match command {
    Command::Register { username, password, display_name, phone } => {
      let user = client
        .register(&RegisterRequest {
          username:     &username,
          password:     &password,
          display_name: &display_name,
          phone:        &phone,
        })
        .await?;
      println!("registered {} ({})", user.username, user.user_id);
    }

    Command::Login { username, password } => {
      let reply = client.login(&username, &password).await?;
      let session = Session {
        token:      reply.token,
        expires_at: reply.expires_at,
        user:       reply.user,
      };
      session.save(session_path)?;
      println!(
        "logged in as {} until {}",
        session.user.display_name,
        session.expires_at.format("%H:%M:%S UTC")
      );
    }

    Command::Logout => {
      // The local file goes first; a server that no longer knows the token
      // must not leave it behind.
      let session = Session::load(session_path).ok();
      Session::clear(session_path)?;
      if let Some(session) = session
        && let Err(e) = client.logout(&session).await
      {
        eprintln!("server did not end the session: {e:#}");
      }
      println!("logged out");
    }

    Command::Subjects => {
      for view in client.list_subjects().await? {
        print_subject(&view);
      }
    }

    Command::Post { title, description } => {
      let session = Session::load(session_path)?;
      let input = NewSubject { title, description };
      input.validate()?;
      let subject = client.post_subject(&session, &input).await?;
      println!("created subject {}", subject.subject_id);
    }

    Command::Comments { subject } => {
      for view in client.list_comments(subject).await? {
        print_comment(&view);
      }
    }

    Command::Comment { subject, content } => {
      let session = Session::load(session_path)?;
      let input = NewComment { subject_id: subject, content };
      input.validate()?;
      let comment = client.post_comment(&session, &input).await?;
      println!("created comment {}", comment.comment_id);
    }

    Command::Like { kind, id } => {
      react(client, session_path, kind.into(), id, Some(Stance::Like)).await?;
    }
    Command::Dislike { kind, id } => {
      react(client, session_path, kind.into(), id, Some(Stance::Dislike)).await?;
    }
    Command::Clear { kind, id } => {
      react(client, session_path, kind.into(), id, None).await?;
    }
  }
  Ok(())
}

/// Translate a click into the exact action the server applies, then send it.
///
/// The server never toggles on its own, so the current stance is read first
/// and a repeated click becomes a removal.
async fn react(
  client: &ApiClient,
  session_path: &Path,
  kind: EntityKind,
  id: Uuid,
  requested: Option<Stance>,
) -> Result<()> {
  let session = Session::load(session_path)?;
  let action = match requested {
    Some(stance) => {
      let current = client.engagement(kind, id).await?;
      resolve_toggle(current.stance_of(session.user.user_id), stance)
    }
    None => Action::None,
  };
  let updated = client.send_action(&session, kind, id, action).await?;
  print_engagement(kind, id, action, &updated);
  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_subject(view: &SubjectView) {
  println!(
    "{}  [{:+}]  {}  ({} comments, by {})",
    view.subject.subject_id,
    view.score,
    view.subject.title,
    view.comment_count,
    view.creator.display_name,
  );
}

fn print_comment(view: &CommentView) {
  println!(
    "{}  [{:+}]  {}: {}",
    view.comment.comment_id, view.score, view.author.display_name, view.comment.content,
  );
}

fn print_engagement(kind: EntityKind, id: Uuid, action: Action, engagement: &Engagement) {
  println!(
    "{kind} {id}: {action} applied, {} likes / {} dislikes, score {:+}",
    engagement.likes(),
    engagement.dislikes(),
    engagement.score(),
  );
}

#[cfg(test)]
mod tests {
  use board_api::AppState;
  use board_store_sqlite::SqliteStore;
  use tempfile::TempDir;
  use tokio::net::TcpListener;

  use super::*;

  /// Serve a fresh in-memory board on an ephemeral port.
  async fn serve() -> ApiClient {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = board_api::api_router(AppState::new(store, chrono::Duration::hours(1)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    ApiClient::new(format!("http://{addr}")).unwrap()
  }

  async fn log_in(client: &ApiClient, dir: &TempDir, username: &str) -> (PathBuf, Session) {
    client
      .register(&RegisterRequest {
        username,
        password: "Secret123",
        display_name: "Tester",
        phone: "(555) 123-4567",
      })
      .await
      .unwrap();
    let path = dir.path().join(format!("{username}.toml"));
    run(
      client,
      &path,
      Command::Login { username: username.into(), password: "Secret123".into() },
    )
    .await
    .unwrap();
    let session = Session::load(&path).unwrap();
    (path, session)
  }

  #[tokio::test]
  async fn repeated_like_from_cli_removes_it() {
    let client = serve().await;
    let dir = TempDir::new().unwrap();
    let (path, session) = log_in(&client, &dir, "ada@example.com").await;
    let me = session.user.user_id;

    let subject = client
      .post_subject(&session, &NewSubject { title: "T".into(), description: "D".into() })
      .await
      .unwrap();
    let id = subject.subject_id;
    let like = || Command::Like { kind: Kind::Subject, id };

    run(&client, &path, like()).await.unwrap();
    let e = client.engagement(EntityKind::Subject, id).await.unwrap();
    assert_eq!(e.stance_of(me), Some(Stance::Like));

    run(&client, &path, like()).await.unwrap();
    let e = client.engagement(EntityKind::Subject, id).await.unwrap();
    assert_eq!(e.stance_of(me), None);
    assert_eq!(e.score(), 0);
  }

  #[tokio::test]
  async fn dislike_switches_and_clear_removes_on_comments() {
    let client = serve().await;
    let dir = TempDir::new().unwrap();
    let (path, session) = log_in(&client, &dir, "ada@example.com").await;
    let me = session.user.user_id;

    let subject = client
      .post_subject(&session, &NewSubject { title: "T".into(), description: "D".into() })
      .await
      .unwrap();
    let comment = client
      .post_comment(
        &session,
        &NewComment { subject_id: subject.subject_id, content: "hi".into() },
      )
      .await
      .unwrap();
    let id = comment.comment_id;

    run(&client, &path, Command::Like { kind: Kind::Comment, id }).await.unwrap();
    run(&client, &path, Command::Dislike { kind: Kind::Comment, id }).await.unwrap();
    let e = client.engagement(EntityKind::Comment, id).await.unwrap();
    assert_eq!(e.stance_of(me), Some(Stance::Dislike));
    assert!(e.liked_by.is_empty());

    run(&client, &path, Command::Clear { kind: Kind::Comment, id }).await.unwrap();
    let e = client.engagement(EntityKind::Comment, id).await.unwrap();
    assert_eq!(e.stance_of(me), None);

    // The subject is untouched by comment engagement.
    let s = client.engagement(EntityKind::Subject, subject.subject_id).await.unwrap();
    assert_eq!(s, Engagement::default());
  }

  #[tokio::test]
  async fn toggle_on_unknown_entity_reports_server_error() {
    let client = serve().await;
    let dir = TempDir::new().unwrap();
    let (path, _) = log_in(&client, &dir, "ada@example.com").await;

    let err = run(&client, &path, Command::Clear { kind: Kind::Subject, id: Uuid::new_v4() })
      .await
      .unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
  }

  #[tokio::test]
  async fn logout_clears_session_the_server_no_longer_knows() {
    let client = serve().await;
    let dir = TempDir::new().unwrap();
    let (path, session) = log_in(&client, &dir, "ada@example.com").await;

    // Simulate a server reset: the token is unknown to the server.
    Session { token: "stale".into(), ..session }.save(&path).unwrap();

    run(&client, &path, Command::Logout).await.unwrap();
    assert!(!path.exists());
  }
}
