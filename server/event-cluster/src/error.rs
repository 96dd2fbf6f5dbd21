//! Errors at the stdin/stdout boundary. Clustering itself cannot fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
  #[error("stdio: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed input document: {0}")]
  Decode(#[from] serde_json::Error),
}
