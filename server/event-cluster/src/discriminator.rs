//! Tell clusters from plain events by shape, including after a JSON round trip.

use serde_json::Value;

use crate::types::ClusterItem;

/// Keys only a serialized cluster carries.
const CLUSTER_KEYS: [&str; 2] = ["clusterId", "eventCount"];

/// Typed check on builder output.
pub fn is_cluster(item: Option<&ClusterItem>) -> bool {
  item.is_some_and(ClusterItem::is_cluster)
}

/// Structural check on serialized output: an object with both `clusterId` and `eventCount`.
///
/// `None`, `null` and non-objects are never clusters.
pub fn is_cluster_value(value: Option<&Value>) -> bool {
  match value {
    Some(Value::Object(map)) => CLUSTER_KEYS.iter().all(|k| map.contains_key(*k)),
    _ => false,
  }
}
