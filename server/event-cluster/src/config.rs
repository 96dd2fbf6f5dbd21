//! Clustering options with sane defaults.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Smallest group that may be wrapped into a cluster.
pub const MIN_VALID_CLUSTER_SIZE: usize = 2;

/// Tunable grouping thresholds. Every field may be omitted in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterOptions {
  /// When false, clustering is an identity pass-through.
  pub enabled: bool,
  /// Groups smaller than this are emitted as standalone events.
  pub min_cluster_size: usize,
  /// Max gap between consecutive events of one group.
  pub window_minutes: f64,
  /// Also break groups at every camera change.
  pub same_camera: bool,
}

impl Default for ClusterOptions {
  fn default() -> Self {
    Self {
      enabled: true,
      min_cluster_size: 3,
      window_minutes: 5.0,
      same_camera: true,
    }
  }
}

impl ClusterOptions {
  /// Clamp out-of-range values instead of rejecting them.
  ///
  /// - `min_cluster_size` below 2 becomes 2.
  /// - negative or non-finite `window_minutes` falls back to the default.
  pub fn normalized(&self) -> Self {
    let defaults = Self::default();
    let mut out = self.clone();

    if out.min_cluster_size < MIN_VALID_CLUSTER_SIZE {
      tracing::warn!(
        "min_cluster_size {} below {}, clamping",
        out.min_cluster_size,
        MIN_VALID_CLUSTER_SIZE
      );
      out.min_cluster_size = MIN_VALID_CLUSTER_SIZE;
    }

    if !out.window_minutes.is_finite() || out.window_minutes < 0.0 {
      tracing::warn!(
        "window_minutes {} invalid, using default {}",
        out.window_minutes,
        defaults.window_minutes
      );
      out.window_minutes = defaults.window_minutes;
    }

    out
  }

  /// Window as a duration at nanosecond precision (options must be normalized first).
  pub fn window(&self) -> Duration {
    Duration::nanoseconds((self.window_minutes * 60_000_000_000.0).round() as i64)
  }
}
