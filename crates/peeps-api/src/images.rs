//! Content-addressed image storage on the local filesystem, plus the
//! `/images` endpoints that front it.
//!
//! Files are named `{sha256-hex}.{ext}`, so uploading the same bytes twice
//! yields the same URL and a single file on disk.

use std::{
  io::ErrorKind,
  path::{Path as FsPath, PathBuf},
};

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, Backend, CurrentUser, error::ApiError};

/// Upload ceiling used when none is configured.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted media types and the extension each is stored under.
const MEDIA_TYPES: &[(&str, &str)] = &[
  ("image/png", "png"),
  ("image/jpeg", "jpg"),
  ("image/gif", "gif"),
  ("image/webp", "webp"),
];

/// Map a `Content-Type` value (parameters ignored) to a file extension.
pub fn extension_for(media_type: &str) -> Option<&'static str> {
  let essence = media_type.split(';').next()?.trim().to_ascii_lowercase();
  MEDIA_TYPES
    .iter()
    .find(|(mt, _)| *mt == essence)
    .map(|(_, ext)| *ext)
}

/// Validate a stored file name and return its media type. Anything that is
/// not `{64 hex}.{known ext}` is rejected, which also rules out traversal.
pub fn media_type_of(file: &str) -> Option<&'static str> {
  let (stem, ext) = file.split_once('.')?;
  if stem.len() != 64 || !stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
    return None;
  }
  MEDIA_TYPES
    .iter()
    .find(|(_, e)| *e == ext)
    .map(|(mt, _)| *mt)
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Writes uploaded images into a directory and hands out public URLs.
#[derive(Debug, Clone)]
pub struct FsImageStore {
  dir:             PathBuf,
  public_base_url: String,
  max_bytes:       usize,
}

impl FsImageStore {
  /// Create the image directory if needed.
  pub async fn open(
    dir: impl Into<PathBuf>,
    public_base_url: impl Into<String>,
  ) -> std::io::Result<Self> {
    let dir = dir.into();
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Self {
      dir,
      public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
      max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    })
  }

  pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  pub fn max_bytes(&self) -> usize { self.max_bytes }

  pub fn dir(&self) -> &FsPath { &self.dir }

  /// Store `bytes` and return the public URL they are served from.
  pub async fn upload(&self, bytes: &[u8], media_type: &str) -> Result<String, ApiError> {
    let ext = extension_for(media_type).ok_or_else(|| {
      ApiError::BadRequest(format!("unsupported media type: {media_type}"))
    })?;
    if bytes.is_empty() {
      return Err(ApiError::BadRequest("empty upload".into()));
    }

    let file = format!("{}.{ext}", hex::encode(Sha256::digest(bytes)));
    let path = self.dir.join(&file);
    if !tokio::fs::try_exists(&path).await? {
      // Readers only ever see complete files under the final name.
      let tmp = self.dir.join(format!(".{file}.{}.tmp", uuid::Uuid::new_v4()));
      tokio::fs::write(&tmp, bytes).await?;
      if let Err(e) = tokio::fs::rename(&tmp, &path).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(e.into());
      }
      tracing::info!(%file, size = bytes.len(), "image stored");
    }

    Ok(format!("{}/images/{file}", self.public_base_url))
  }

  /// Read a stored image back. `None` for unknown or malformed names.
  pub async fn read(&self, file: &str) -> Result<Option<(Vec<u8>, &'static str)>, ApiError> {
    let Some(media_type) = media_type_of(file) else {
      return Ok(None);
    };
    match tokio::fs::read(self.dir.join(file)).await {
      Ok(bytes) => Ok(Some((bytes, media_type))),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadBody {
  pub url: String,
}

/// `POST /images` — raw body, `Content-Type` names the media type.
pub async fn upload<S: Backend>(
  State(state): State<AppState<S>>,
  _current: CurrentUser,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let media_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::BadRequest("missing Content-Type".into()))?;
  let url = state.images.upload(&body, media_type).await?;
  Ok((StatusCode::CREATED, Json(UploadBody { url })))
}

/// `GET /images/{file}` — public.
pub async fn download<S: Backend>(
  State(state): State<AppState<S>>,
  Path(file): Path<String>,
) -> Result<Response, ApiError> {
  let (bytes, media_type) = state
    .images
    .read(&file)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("image {file} not found")))?;

  let mut res = bytes.into_response();
  let headers = res.headers_mut();
  headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(media_type));
  headers.insert(
    header::CACHE_CONTROL,
    HeaderValue::from_static("public, max-age=31536000, immutable"),
  );
  Ok(res)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn media_type_parameters_are_ignored() {
    assert_eq!(extension_for("image/png"), Some("png"));
    assert_eq!(extension_for("IMAGE/JPEG; q=0.9"), Some("jpg"));
    assert_eq!(extension_for("text/plain"), None);
  }

  #[test]
  fn only_content_addressed_names_are_served() {
    let digest = hex::encode(Sha256::digest(b"x"));
    assert_eq!(media_type_of(&format!("{digest}.webp")), Some("image/webp"));
    assert_eq!(media_type_of(&format!("{digest}.exe")), None);
    assert_eq!(media_type_of("../etc/passwd"), None);
    assert_eq!(media_type_of(&format!("{}.png", digest.to_uppercase())), None);
  }

  #[tokio::test]
  async fn upload_leaves_only_the_final_file() {
    let dir = std::env::temp_dir().join(format!("peeps-images-{}", uuid::Uuid::new_v4()));
    let store = FsImageStore::open(&dir, "http://peeps.test/").await.unwrap();

    let url = store.upload(b"gif bytes", "image/gif").await.unwrap();
    let file = url.strip_prefix("http://peeps.test/images/").unwrap();

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(store.dir()).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
      names.push(entry.file_name().to_string_lossy().into_owned());
    }
    assert_eq!(names, [file]);
    assert!(media_type_of(file).is_some());
  }
}
