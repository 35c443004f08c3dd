//! Server configuration, deserialised from `config.toml` overlaid with
//! `PEEPS_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Prefix for image URLs handed back to clients.
  pub public_base_url:  String,
  pub store_path:       PathBuf,
  pub image_dir:        PathBuf,
  pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             5232,
      public_base_url:  "http://localhost:5232".to_owned(),
      store_path:       PathBuf::from("~/.local/share/peeps/peeps.db"),
      image_dir:        PathBuf::from("~/.local/share/peeps/images"),
      max_upload_bytes: peeps_api::images::DEFAULT_MAX_UPLOAD_BYTES,
    }
  }
}

impl ServerConfig {
  /// Load from `path` (optional) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PEEPS"))
      .build()?
      .try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.image_dir = expand_tilde(&cfg.image_dir);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/peeps.toml")).unwrap();
    assert_eq!(cfg.port, 5232);
    assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("/var/lib/peeps/~/db");
    assert_eq!(expand_tilde(plain), plain);
  }
}
