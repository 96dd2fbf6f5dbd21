//! Compression report for the "N events shown as M cards" banner.

use std::fmt;

use crate::discriminator;
use crate::types::{ClusterItem, ClusterStats, Event};

/// Compute stats from the original events and the clustered output.
///
/// Pure read of both inputs; the builder is not re-run. An empty output
/// reports a ratio of exactly 1.
pub fn compute<E>(original: &[E], clustered: &[ClusterItem]) -> ClusterStats
where
  E: AsRef<Event>,
{
  let original_count = original.len();
  let display_count = clustered.len();
  let cluster_count = clustered
    .iter()
    .filter(|i| discriminator::is_cluster(Some(*i)))
    .count();
  let compression_ratio = if display_count > 0 {
    original_count as f64 / display_count as f64
  } else {
    1.0
  };

  ClusterStats {
    original_count,
    display_count,
    cluster_count,
    compression_ratio,
  }
}

impl ClusterStats {
  /// Fewer cards than events.
  pub fn is_compressed(&self) -> bool {
    self.display_count < self.original_count
  }
}

impl fmt::Display for ClusterStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} events shown as {} cards ({} clusters)",
      self.original_count, self.display_count, self.cluster_count
    )
  }
}
