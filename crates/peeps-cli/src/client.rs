//! Async HTTP client wrapping the Peeps JSON API.

use std::{path::Path, time::Duration};

use peeps_core::{
  contact::{Contact, NewContact},
  group::{Group, NewGroup},
  identity::{ProfileUpdate, Session, User},
  post::Post,
  reaction::Reaction,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
  /// The server answered with a non-success status.
  #[error("{message}")]
  Api { status: StatusCode, message: String },

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("reading {path}: {source}")]
  Io {
    path:   String,
    #[source]
    source: std::io::Error,
  },

  #[error("unsupported image type: {0}")]
  UnsupportedImage(String),

  #[error("not signed in")]
  NotSignedIn,
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Deserialize)]
struct ReactionBody {
  reaction: Reaction,
}

#[derive(Deserialize)]
struct UploadBody {
  url: String,
}

/// Guess an upload media type from a file extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  match ext.as_str() {
    "png" => Some("image/png"),
    "jpg" | "jpeg" => Some("image/jpeg"),
    "gif" => Some("image/gif"),
    "webp" => Some("image/webp"),
    _ => None,
  }
}

/// Async HTTP client for the Peeps JSON API.
///
/// Holds the bearer token of the current session, if any.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
      token: None,
    })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  pub fn is_signed_in(&self) -> bool { self.token.is_some() }

  fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }

  fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    let token = self.token.as_deref().ok_or(ClientError::NotSignedIn)?;
    Ok(req.bearer_auth(token))
  }

  /// Turn non-success statuses into [`ClientError::Api`], keeping the
  /// server's `{"error": ...}` message when there is one.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.to_string(),
    };
    Err(ClientError::Api { status, message })
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self.authed(self.client.get(self.url(path)))?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  async fn send_empty(&self, req: RequestBuilder) -> Result<()> {
    let resp = self.authed(req)?.send().await?;
    Self::check(resp).await?;
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  async fn open_session(&mut self, path: &str, email: &str, password: &str) -> Result<User> {
    let resp = self
      .client
      .post(self.url(path))
      .json(&json!({ "email": email, "password": password }))
      .send()
      .await?;
    let session: Session = Self::check(resp).await?.json().await?;
    self.token = Some(session.token);
    Ok(session.user)
  }

  /// `POST /auth/sign-in`
  pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<User> {
    self.open_session("/auth/sign-in", email, password).await
  }

  /// `POST /auth/sign-up`
  pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<User> {
    self.open_session("/auth/sign-up", email, password).await
  }

  /// `POST /auth/sign-out`. The local token is dropped even if the server
  /// call fails.
  pub async fn sign_out(&mut self) -> Result<()> {
    let result = self.send_empty(self.client.post(self.url("/auth/sign-out"))).await;
    self.token = None;
    result
  }

  /// `PATCH /auth/me`
  pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
    let req = self.client.patch(self.url("/auth/me")).json(update);
    let resp = self.authed(req)?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  /// `GET /contacts`
  pub async fn list_contacts(&self) -> Result<Vec<Contact>> { self.get_json("/contacts").await }

  /// `POST /contacts`
  pub async fn add_contact(&self, input: &NewContact) -> Result<Contact> {
    let req = self.client.post(self.url("/contacts")).json(input);
    let resp = self.authed(req)?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `DELETE /contacts/{id}`
  pub async fn delete_contact(&self, id: Uuid) -> Result<()> {
    self.send_empty(self.client.delete(self.url(&format!("/contacts/{id}")))).await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  /// `GET /groups`
  pub async fn list_groups(&self) -> Result<Vec<Group>> { self.get_json("/groups").await }

  /// `POST /groups`
  pub async fn add_group(&self, input: &NewGroup) -> Result<Group> {
    let req = self.client.post(self.url("/groups")).json(input);
    let resp = self.authed(req)?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `DELETE /groups/{id}`
  pub async fn delete_group(&self, id: Uuid) -> Result<()> {
    self.send_empty(self.client.delete(self.url(&format!("/groups/{id}")))).await
  }

  /// `PUT /groups/{id}/members/{contact_id}`
  pub async fn add_member(&self, group_id: Uuid, contact_id: Uuid) -> Result<Group> {
    let url = self.url(&format!("/groups/{group_id}/members/{contact_id}"));
    let resp = self.authed(self.client.put(url))?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `DELETE /groups/{id}/members/{contact_id}`
  pub async fn remove_member(&self, group_id: Uuid, contact_id: Uuid) -> Result<Group> {
    let url = self.url(&format!("/groups/{group_id}/members/{contact_id}"));
    let resp = self.authed(self.client.delete(url))?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  /// `GET /posts`
  pub async fn feed(&self) -> Result<Vec<Post>> { self.get_json("/posts").await }

  /// `POST /posts`
  pub async fn create_post(&self, content: &str) -> Result<Post> {
    let req = self
      .client
      .post(self.url("/posts"))
      .json(&json!({ "content": content }));
    let resp = self.authed(req)?.send().await?;
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `DELETE /posts/{id}`
  pub async fn delete_post(&self, id: Uuid) -> Result<()> {
    self.send_empty(self.client.delete(self.url(&format!("/posts/{id}")))).await
  }

  async fn react(&self, id: Uuid, action: &str) -> Result<Option<Reaction>> {
    let url = self.url(&format!("/posts/{id}/{action}"));
    let resp = Self::check(self.authed(self.client.post(url))?.send().await?).await?;
    if resp.status() == StatusCode::NO_CONTENT {
      return Ok(None);
    }
    Ok(Some(resp.json::<ReactionBody>().await?.reaction))
  }

  /// `POST /posts/{id}/like`; `None` if the post is gone.
  pub async fn like(&self, id: Uuid) -> Result<Option<Reaction>> { self.react(id, "like").await }

  /// `POST /posts/{id}/dislike`; `None` if the post is gone.
  pub async fn dislike(&self, id: Uuid) -> Result<Option<Reaction>> {
    self.react(id, "dislike").await
  }

  /// `POST /posts/{id}/repost`; `None` if the post is gone.
  pub async fn repost(&self, id: Uuid) -> Result<Option<Post>> {
    let url = self.url(&format!("/posts/{id}/repost"));
    let resp = Self::check(self.authed(self.client.post(url))?.send().await?).await?;
    if resp.status() == StatusCode::NO_CONTENT {
      return Ok(None);
    }
    Ok(Some(resp.json().await?))
  }

  // ── Images ────────────────────────────────────────────────────────────────

  /// Upload the image at `path` and return its public URL.
  pub async fn upload_image(&self, path: &Path) -> Result<String> {
    let media_type = media_type_for(path)
      .ok_or_else(|| ClientError::UnsupportedImage(path.display().to_string()))?;
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
      path: path.display().to_string(),
      source,
    })?;

    let req = self
      .client
      .post(self.url("/images"))
      .header(header::CONTENT_TYPE, media_type)
      .body(bytes);
    let resp = self.authed(req)?.send().await?;
    Ok(Self::check(resp).await?.json::<UploadBody>().await?.url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn media_type_follows_extension() {
    assert_eq!(media_type_for(Path::new("me.PNG")), Some("image/png"));
    assert_eq!(media_type_for(Path::new("/tmp/a.jpeg")), Some("image/jpeg"));
    assert_eq!(media_type_for(Path::new("notes.txt")), None);
    assert_eq!(media_type_for(Path::new("no-extension")), None);
  }

  #[test]
  fn base_url_loses_trailing_slash() {
    let client = ApiClient::new("http://localhost:5232/").unwrap();
    assert_eq!(client.url("/posts"), "http://localhost:5232/posts");
    assert!(!client.is_signed_in());
  }
}
