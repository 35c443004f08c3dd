//! Router tests driven with `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use peeps_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, FsImageStore, api_router};

const BASE_URL: &str = "http://peeps.test";

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let dir = std::env::temp_dir().join(format!("peeps-api-test-{}", Uuid::new_v4()));
  let images = FsImageStore::open(dir, BASE_URL).await.unwrap();
  api_router(AppState::new(store, images))
}

async fn send_raw(
  app: &Router,
  method: &str,
  uri: &str,
  token: Option<&str>,
  content_type: Option<&str>,
  body: Vec<u8>,
) -> axum::response::Response {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  if let Some(ct) = content_type {
    req = req.header(header::CONTENT_TYPE, ct);
  }
  app
    .clone()
    .oneshot(req.body(Body::from(body)).unwrap())
    .await
    .unwrap()
}

/// Send a JSON request and decode the JSON response (`Null` when empty).
async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let (ct, bytes) = match body {
    Some(v) => (Some("application/json"), serde_json::to_vec(&v).unwrap()),
    None => (None, Vec::new()),
  };
  let resp = send_raw(app, method, uri, token, ct, bytes).await;
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Register `email` and return its bearer token.
async fn sign_up(app: &Router, email: &str) -> String {
  let (status, body) = send(
    app,
    "POST",
    "/auth/sign-up",
    None,
    Some(json!({ "email": email, "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_me() {
  let app = app().await;
  let token = sign_up(&app, "Alice@Example.com").await;

  let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let app = app().await;
  sign_up(&app, "a@example.com").await;
  let (status, body) = send(
    &app,
    "POST",
    "/auth/sign-up",
    None,
    Some(json!({ "email": "A@example.com", "password": "secret2" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn weak_password_and_bad_email_are_rejected() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "POST",
    "/auth/sign-up",
    None,
    Some(json!({ "email": "a@example.com", "password": "12345" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    "POST",
    "/auth/sign-up",
    None,
    Some(json!({ "email": "not-an-email", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_in_with_wrong_password_is_unauthorized() {
  let app = app().await;
  sign_up(&app, "a@example.com").await;

  let resp = send_raw(
    &app,
    "POST",
    "/auth/sign-in",
    None,
    Some("application/json"),
    br#"{"email":"a@example.com","password":"nope-nope"}"#.to_vec(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  let (status, body) = send(
    &app,
    "POST",
    "/auth/sign-in",
    None,
    Some(json!({ "email": "a@example.com", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["token"].is_string());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
  let app = app().await;
  let (status, _) = send(&app, "GET", "/contacts", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, body) = send(&app, "GET", "/contacts", Some("bogus"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "invalid session");
}

#[tokio::test]
async fn sign_out_revokes_the_token() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;

  let (status, _) = send(&app, "POST", "/auth/sign-out", Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "GET", "/auth/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_photo_can_be_set() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;
  let url = format!("{BASE_URL}/images/abc.png");

  let (status, me) = send(
    &app,
    "PATCH",
    "/auth/me",
    Some(&token),
    Some(json!({ "photo_url": url })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["photo_url"], url);
}

// ── Contacts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_lifecycle() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;

  let (status, created) = send(
    &app,
    "POST",
    "/contacts",
    Some(&token),
    Some(json!({ "name": "Alice", "role": "Engineer", "organization": "Acme" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = created["contact_id"].as_str().unwrap().to_owned();

  let (_, listed) = send(&app, "GET", "/contacts", Some(&token), None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);

  let (status, updated) = send(
    &app,
    "PATCH",
    &format!("/contacts/{id}"),
    Some(&token),
    Some(json!({ "role": "Manager", "phone": "555-0100" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["role"], "Manager");
  assert_eq!(updated["phone"], "555-0100");
  assert_eq!(updated["name"], "Alice");

  let (status, _) = send(&app, "DELETE", &format!("/contacts/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "GET", &format!("/contacts/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_contact_name_is_rejected() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;
  let (status, _) = send(
    &app,
    "POST",
    "/contacts",
    Some(&token),
    Some(json!({ "name": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contacts_are_private_to_their_owner() {
  let app = app().await;
  let alice = sign_up(&app, "alice@example.com").await;
  let bob = sign_up(&app, "bob@example.com").await;

  let (_, created) = send(
    &app,
    "POST",
    "/contacts",
    Some(&alice),
    Some(json!({ "name": "Carol" })),
  )
  .await;
  let id = created["contact_id"].as_str().unwrap();

  let (_, listed) = send(&app, "GET", "/contacts", Some(&bob), None).await;
  assert!(listed.as_array().unwrap().is_empty());

  let (status, _) = send(&app, "GET", &format!("/contacts/{id}"), Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "DELETE", &format!("/contacts/{id}"), Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Groups ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn group_membership_and_deletion() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;

  let (_, contact) = send(
    &app,
    "POST",
    "/contacts",
    Some(&token),
    Some(json!({ "name": "Alice" })),
  )
  .await;
  let contact_id = contact["contact_id"].as_str().unwrap();

  let (status, group) = send(
    &app,
    "POST",
    "/groups",
    Some(&token),
    Some(json!({ "name": "Work", "description": "colleagues" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(group["members"].as_array().unwrap().is_empty());
  let group_id = group["group_id"].as_str().unwrap();
  let member_uri = format!("/groups/{group_id}/members/{contact_id}");

  send(&app, "PUT", &member_uri, Some(&token), None).await;
  let (status, group) = send(&app, "PUT", &member_uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(group["members"], json!([contact_id]));

  let (status, _) = send(&app, "DELETE", &format!("/groups/{group_id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, contacts) = send(&app, "GET", "/contacts", Some(&token), None).await;
  assert_eq!(contacts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cannot_add_someone_elses_contact() {
  let app = app().await;
  let alice = sign_up(&app, "alice@example.com").await;
  let bob = sign_up(&app, "bob@example.com").await;

  let (_, contact) = send(
    &app,
    "POST",
    "/contacts",
    Some(&bob),
    Some(json!({ "name": "Secret" })),
  )
  .await;
  let (_, group) = send(
    &app,
    "POST",
    "/groups",
    Some(&alice),
    Some(json!({ "name": "Mine" })),
  )
  .await;

  let uri = format!(
    "/groups/{}/members/{}",
    group["group_id"].as_str().unwrap(),
    contact["contact_id"].as_str().unwrap()
  );
  let (status, _) = send(&app, "PUT", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Posts ────────────────────────────────────────────────────────────────────

async fn create_post(app: &Router, token: &str, content: &str) -> Value {
  let (status, post) = send(
    app,
    "POST",
    "/posts",
    Some(token),
    Some(json!({ "content": content })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  post
}

#[tokio::test]
async fn post_author_name_is_the_email() {
  let app = app().await;
  let token = sign_up(&app, "writer@example.com").await;
  let post = create_post(&app, &token, "hello").await;
  assert_eq!(post["author_name"], "writer@example.com");

  let (status, _) = send(
    &app,
    "POST",
    "/posts",
    Some(&token),
    Some(json!({ "content": "  " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn like_and_dislike_toggle() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;
  let post = create_post(&app, &token, "hello").await;
  let id = post["post_id"].as_str().unwrap();

  let (status, body) = send(&app, "POST", &format!("/posts/{id}/dislike"), Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["reaction"], "disliked");

  let (_, body) = send(&app, "POST", &format!("/posts/{id}/like"), Some(&token), None).await;
  assert_eq!(body["reaction"], "liked");

  let (_, body) = send(&app, "POST", &format!("/posts/{id}/like"), Some(&token), None).await;
  assert_eq!(body["reaction"], "none");
}

#[tokio::test]
async fn reacting_to_missing_post_is_a_silent_noop() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;
  let missing = Uuid::new_v4();

  for action in ["like", "dislike", "repost"] {
    let (status, body) = send(
      &app,
      "POST",
      &format!("/posts/{missing}/{action}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{action}");
    assert_eq!(body, Value::Null);
  }
}

#[tokio::test]
async fn repost_shows_up_in_feed_with_original() {
  let app = app().await;
  let alice = sign_up(&app, "alice@example.com").await;
  let bob = sign_up(&app, "bob@example.com").await;
  let original = create_post(&app, &alice, "worth sharing").await;
  let id = original["post_id"].as_str().unwrap();

  let (status, repost) = send(&app, "POST", &format!("/posts/{id}/repost"), Some(&bob), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(repost["original_post_id"], id);
  assert_eq!(repost["author_name"], "bob@example.com");

  let (_, feed) = send(&app, "GET", "/posts", Some(&alice), None).await;
  let feed = feed.as_array().unwrap();
  assert_eq!(feed.len(), 2);
  assert_eq!(feed[0]["post_id"], repost["post_id"]);
  assert_eq!(feed[0]["original_post"]["post_id"], id);
  assert_eq!(feed[1]["reposted_by"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn only_the_author_may_delete_a_post() {
  let app = app().await;
  let alice = sign_up(&app, "alice@example.com").await;
  let bob = sign_up(&app, "bob@example.com").await;
  let post = create_post(&app, &alice, "mine").await;
  let uri = format!("/posts/{}", post["post_id"].as_str().unwrap());

  let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Images ───────────────────────────────────────────────────────────────────

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

#[tokio::test]
async fn upload_then_download_image() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;

  let resp = send_raw(&app, "POST", "/images", Some(&token), Some("image/png"), PNG.to_vec()).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  let url = body["url"].as_str().unwrap();
  assert!(url.starts_with(&format!("{BASE_URL}/images/")), "{url}");
  assert!(url.ends_with(".png"), "{url}");

  let path = url.strip_prefix(BASE_URL).unwrap();
  let resp = send_raw(&app, "GET", path, None, None, Vec::new()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
  let served = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&served[..], PNG);
}

#[tokio::test]
async fn identical_uploads_share_a_url() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;

  let mut urls = Vec::new();
  for _ in 0..2 {
    let resp = send_raw(&app, "POST", "/images", Some(&token), Some("image/png"), PNG.to_vec()).await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    urls.push(body["url"].as_str().unwrap().to_owned());
  }
  assert_eq!(urls[0], urls[1]);
}

#[tokio::test]
async fn unsupported_media_type_is_rejected() {
  let app = app().await;
  let token = sign_up(&app, "a@example.com").await;
  let resp = send_raw(&app, "POST", "/images", Some(&token), Some("text/plain"), b"hi".to_vec()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = send_raw(&app, "POST", "/images", None, Some("image/png"), PNG.to_vec()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_image_is_not_found() {
  let app = app().await;
  let name = format!("{}.png", "0".repeat(64));
  let (status, _) = send(&app, "GET", &format!("/images/{name}"), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "GET", "/images/nope.txt", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let dir = std::env::temp_dir().join(format!("peeps-api-test-{}", Uuid::new_v4()));
  let images = FsImageStore::open(dir, BASE_URL).await.unwrap().with_max_bytes(16);
  let app = api_router(AppState::new(store, images));
  let token = sign_up(&app, "a@example.com").await;

  let resp = send_raw(&app, "POST", "/images", Some(&token), Some("image/png"), vec![0; 17]).await;
  assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

  let resp = send_raw(&app, "POST", "/images", Some(&token), Some("image/png"), vec![0; 16]).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
}
