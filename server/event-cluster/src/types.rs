//! Core types for the clustering engine (JSON contracts + derived models).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ClusterOptions;
use crate::timestamp;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Event or camera identifier. Upstream sends either numbers (`12`) or names
/// (`"front_door"`, UUIDs); both are kept as-is on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
  Num(i64),
  Text(String),
}

impl fmt::Display for Id {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Num(n) => write!(f, "{}", n),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for Id {
  fn from(n: i64) -> Self {
    Self::Num(n)
  }
}

impl From<&str> for Id {
  fn from(s: &str) -> Self {
    Self::Text(s.to_string())
  }
}

impl From<String> for Id {
  fn from(s: String) -> Self {
    Self::Text(s)
  }
}

// ---------------------------------------------------------------------------
// Inbound event (JSON contract supplied by the dashboard query layer)
// ---------------------------------------------------------------------------

/// One detection event. Fields the engine doesn't read are kept in `extra`
/// and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id: Id,
  pub camera_id: Id,
  pub started_at: String,
  #[serde(default)]
  pub ended_at: Option<String>,
  #[serde(default)]
  pub risk_score: Option<f64>,
  #[serde(default)]
  pub thumbnail_url: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Event {
  /// Parsed `startedAt`, or `None` when the timestamp is malformed.
  pub fn started_at_utc(&self) -> Option<DateTime<Utc>> {
    timestamp::parse(&self.started_at)
  }

  /// Risk score if present and finite. NaN/inf count as unscored.
  pub fn scored(&self) -> Option<f64> {
    self.risk_score.filter(|s| s.is_finite())
  }
}

impl AsRef<Event> for Event {
  fn as_ref(&self) -> &Event {
    self
  }
}

// ---------------------------------------------------------------------------
// Severity tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
  Low,
  Medium,
  High,
  Critical,
}

impl SeverityLevel {
  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
      Self::Critical => "Critical",
    }
  }
}

// ---------------------------------------------------------------------------
// Derived cluster
// ---------------------------------------------------------------------------

/// A burst of related events collapsed into one display card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCluster {
  pub cluster_id: String,
  pub camera_id: Id,
  pub events: Vec<Arc<Event>>,
  pub event_count: usize,
  pub start_time: DateTime<Utc>,
  pub end_time: DateTime<Utc>,
  pub highest_risk_score: Option<f64>,
  pub highest_risk_level: Option<SeverityLevel>,
  pub thumbnails: Vec<String>,
}

/// One entry of the clustered output: either a standalone event or a cluster.
///
/// Untagged on the wire so the JSON is the plain `Event | EventCluster` list.
/// `Cluster` is listed first so deserialization matches the richer shape
/// before falling back to a plain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterItem {
  Cluster(EventCluster),
  Event(Arc<Event>),
}

impl ClusterItem {
  pub fn is_cluster(&self) -> bool {
    matches!(self, Self::Cluster(_))
  }

  /// Number of input events this item stands for.
  pub fn event_count(&self) -> usize {
    match self {
      Self::Cluster(c) => c.event_count,
      Self::Event(_) => 1,
    }
  }

  pub fn camera_id(&self) -> &Id {
    match self {
      Self::Cluster(c) => &c.camera_id,
      Self::Event(e) => &e.camera_id,
    }
  }

  /// Earliest start time covered by this item, if it can be parsed.
  pub fn start_time(&self) -> Option<DateTime<Utc>> {
    match self {
      Self::Cluster(c) => Some(c.start_time),
      Self::Event(e) => e.started_at_utc(),
    }
  }

  pub fn as_cluster(&self) -> Option<&EventCluster> {
    match self {
      Self::Cluster(c) => Some(c),
      Self::Event(_) => None,
    }
  }

  pub fn as_event(&self) -> Option<&Arc<Event>> {
    match self {
      Self::Cluster(_) => None,
      Self::Event(e) => Some(e),
    }
  }

  /// Underlying events in chronological order.
  pub fn members(&self) -> impl Iterator<Item = &Arc<Event>> {
    let slice = match self {
      Self::Cluster(c) => c.events.as_slice(),
      Self::Event(e) => std::slice::from_ref(e),
    };
    slice.iter()
  }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
  pub original_count: usize,
  pub display_count: usize,
  pub cluster_count: usize,
  pub compression_ratio: f64,
}

/// Clustered items together with their stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReport {
  pub items: Vec<ClusterItem>,
  pub stats: ClusterStats,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Input document read from stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInput {
  pub events: Vec<Event>,
  #[serde(default)]
  pub options: ClusterOptions,
}

/// Output document written to stdout.
pub type ClusterOutput = ClusterReport;

/// Structured error output for unreadable input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
    }
  }
}
