use std::io;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
  #[error("the script can't be edited while it is running")]
  Running,
  #[error("no block at index {index} (script has {len} blocks)")]
  NoSuchBlock { index: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("couldn't read config: {0}")]
  Io(#[from] io::Error),
  #[error("couldn't parse config: {0}")]
  Json(#[from] serde_json::Error),
}
