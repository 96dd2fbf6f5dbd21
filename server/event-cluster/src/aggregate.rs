//! Summary fields for a group that qualifies as a cluster.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::{Event, EventCluster, SeverityLevel};

/// Max thumbnails sampled per cluster.
pub const MAX_THUMBNAILS: usize = 5;

/// A member with its already-parsed start time.
pub(crate) type Timed = (DateTime<Utc>, Arc<Event>);

/// Build a cluster from its first member and the chronologically ordered rest.
///
/// `position` is the cluster's index in the output list; together with the
/// first member's id it keeps cluster ids unique even when input ids repeat.
pub(crate) fn aggregate<F>(
  anchor: Timed,
  rest: Vec<Timed>,
  position: usize,
  classify: &F,
) -> EventCluster
where
  F: Fn(f64) -> SeverityLevel,
{
  let (start_time, first) = anchor;
  let end_time = rest.last().map_or(start_time, |(at, _)| *at);
  let cluster_id = format!("cluster-{}-{}", first.id, position);
  let camera_id = first.camera_id.clone();

  let members = || std::iter::once(&first).chain(rest.iter().map(|(_, e)| e));

  let highest_risk_score = members()
    .filter_map(|e| e.scored())
    .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))));
  let highest_risk_level = highest_risk_score.map(classify);

  let thumbnails = sample_thumbnails(members().map(|e| &**e));

  let mut events = Vec::with_capacity(rest.len() + 1);
  events.push(first);
  events.extend(rest.into_iter().map(|(_, e)| e));

  EventCluster {
    cluster_id,
    camera_id,
    event_count: events.len(),
    events,
    start_time,
    end_time,
    highest_risk_score,
    highest_risk_level,
    thumbnails,
  }
}

/// First `MAX_THUMBNAILS` thumbnails in order; stops reading once full.
fn sample_thumbnails<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<String> {
  let mut out = Vec::with_capacity(MAX_THUMBNAILS);
  for url in events.filter_map(|e| e.thumbnail_url.as_ref()) {
    out.push(url.clone());
    if out.len() == MAX_THUMBNAILS {
      break;
    }
  }
  out
}
