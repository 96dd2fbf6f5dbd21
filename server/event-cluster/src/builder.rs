//! Single-pass grouping: sort by `startedAt`, sweep once, close a group at
//! every gap larger than the window (or camera change), then wrap groups that
//! reach `min_cluster_size` into clusters.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::aggregate::{self, Timed};
use crate::config::ClusterOptions;
use crate::severity;
use crate::types::{ClusterItem, Event, SeverityLevel};

/// Sweep state: the open group plus everything already emitted.
struct Sweep<'a, F> {
  options: &'a ClusterOptions,
  classify: &'a F,
  open: Vec<Timed>,
  out: Vec<ClusterItem>,
}

impl<'a, F> Sweep<'a, F>
where
  F: Fn(f64) -> SeverityLevel,
{
  fn new(options: &'a ClusterOptions, classify: &'a F, capacity: usize) -> Self {
    Self {
      options,
      classify,
      open: Vec::new(),
      out: Vec::with_capacity(capacity),
    }
  }

  /// Whether `event` chains onto the open group (gap measured from the previous member).
  fn extends(&self, event: &Event, at: DateTime<Utc>) -> bool {
    let Some((prev_at, _)) = self.open.last() else {
      return false;
    };
    let within_window = at - *prev_at <= self.options.window();
    let same_camera = !self.options.same_camera
      || self
        .open
        .first()
        .is_some_and(|(_, anchor)| anchor.camera_id == event.camera_id);
    within_window && same_camera
  }

  fn push(mut self, at: Option<DateTime<Utc>>, event: Arc<Event>) -> Self {
    match at {
      Some(at) => {
        if !self.extends(&event, at) {
          self.close();
        }
        self.open.push((at, event));
      }
      None => {
        // Unparseable start time: can't be shown close to anything.
        self.close();
        self.out.push(ClusterItem::Event(event));
      }
    }
    self
  }

  fn close(&mut self) {
    let mut members = std::mem::take(&mut self.open).into_iter();
    let Some(anchor) = members.next() else {
      return;
    };
    let size = members.len() + 1;
    let camera_id = anchor.1.camera_id.clone();

    if size >= self.options.min_cluster_size {
      tracing::debug!(size, %camera_id, "group closed as cluster");
      let position = self.out.len();
      let cluster = aggregate::aggregate(anchor, members.collect(), position, self.classify);
      self.out.push(ClusterItem::Cluster(cluster));
    } else {
      tracing::debug!(size, %camera_id, "group closed below threshold");
      self.out.push(ClusterItem::Event(anchor.1));
      self.out.extend(members.map(|(_, e)| ClusterItem::Event(e)));
    }
  }

  fn finish(mut self) -> Vec<ClusterItem> {
    self.close();
    self.out
  }
}

/// Cluster a snapshot of events.
///
/// Options are normalized first. Input order doesn't matter: events are
/// stably sorted by parsed `startedAt`, with unparseable ones last.
/// Disabled clustering (or empty input) returns every event standalone, in input order.
pub fn build<F>(events: &[Arc<Event>], options: &ClusterOptions, classify: &F) -> Vec<ClusterItem>
where
  F: Fn(f64) -> SeverityLevel,
{
  let options = options.normalized();
  if !options.enabled || events.is_empty() {
    return events.iter().cloned().map(ClusterItem::Event).collect();
  }

  let mut timed: Vec<(Option<DateTime<Utc>>, Arc<Event>)> = events
    .iter()
    .map(|e| {
      let at = e.started_at_utc();
      if at.is_none() {
        tracing::warn!(event_id = %e.id, started_at = %e.started_at, "unparseable startedAt");
      }
      (at, Arc::clone(e))
    })
    .collect();
  timed.sort_by_key(|(at, _)| (at.is_none(), *at));

  let out = timed
    .into_iter()
    .fold(Sweep::new(&options, classify, events.len()), |sweep, (at, e)| {
      sweep.push(at, e)
    })
    .finish();

  tracing::debug!(input = events.len(), output = out.len(), "clustering done");
  out
}

/// [`build`] with the dashboard's default severity classifier.
pub fn build_default(events: &[Arc<Event>], options: &ClusterOptions) -> Vec<ClusterItem> {
  build(events, options, &severity::classify)
}

/// Expand clustered output back into the flat event list.
pub fn flatten(items: &[ClusterItem]) -> Vec<Arc<Event>> {
  items.iter().flat_map(|i| i.members().cloned()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};
  use serde_json::Map;

  use crate::types::Id;

  fn at(minute: i64) -> String {
    (Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap() + Duration::minutes(minute)).to_rfc3339()
  }

  fn ev(id: i64, camera_id: i64, started_at: String) -> Arc<Event> {
    Arc::new(Event {
      id: id.into(),
      camera_id: camera_id.into(),
      started_at,
      ended_at: None,
      risk_score: None,
      thumbnail_url: None,
      extra: Map::new(),
    })
  }

  fn ids(ns: &[i64]) -> Vec<Id> {
    ns.iter().copied().map(Id::from).collect()
  }

  fn run(events: &[Arc<Event>]) -> Vec<ClusterItem> {
    build_default(events, &ClusterOptions::default())
  }

  fn shape(items: &[ClusterItem]) -> Vec<usize> {
    items
      .iter()
      .map(|i| if i.is_cluster() { i.event_count() } else { 0 })
      .collect()
  }

  #[test]
  fn empty_input_is_empty() {
    assert!(run(&[]).is_empty());
    let disabled = ClusterOptions {
      enabled: false,
      ..ClusterOptions::default()
    };
    assert!(build_default(&[], &disabled).is_empty());
  }

  #[test]
  fn disabled_passes_through_in_input_order() {
    let events: Vec<_> = (0..5).rev().map(|i| ev(i, 1, at(i))).collect();
    let opts = ClusterOptions {
      enabled: false,
      ..ClusterOptions::default()
    };
    let out = build_default(&events, &opts);
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|i| !i.is_cluster()));
    let got: Vec<Id> = out.iter().map(|i| i.as_event().unwrap().id.clone()).collect();
    assert_eq!(got, ids(&[4, 3, 2, 1, 0]));
  }

  #[test]
  fn exactly_min_size_is_clustered() {
    let events: Vec<_> = (0..3).map(|i| ev(i, 1, at(i))).collect();
    assert_eq!(shape(&run(&events)), vec![3]);
  }

  #[test]
  fn gap_is_chained_not_from_group_start() {
    // 4-minute steps: each gap fits the 5-minute window, the total span doesn't.
    let events: Vec<_> = (0..6).map(|i| ev(i, 1, at(i * 4))).collect();
    assert_eq!(shape(&run(&events)), vec![6]);
  }

  #[test]
  fn gap_equal_to_window_still_merges() {
    let events: Vec<_> = (0..3).map(|i| ev(i, 1, at(i * 5))).collect();
    assert_eq!(shape(&run(&events)), vec![3]);
  }

  #[test]
  fn outlier_starts_new_group() {
    let mut events: Vec<_> = (0..3).map(|i| ev(i, 1, at(i))).collect();
    events.push(ev(9, 1, at(30)));
    assert_eq!(shape(&run(&events)), vec![3, 0]);
  }

  #[test]
  fn small_groups_are_not_merged_into_neighbours() {
    let events = vec![
      ev(1, 1, at(0)),
      ev(2, 1, at(1)),
      ev(3, 1, at(20)),
      ev(4, 1, at(21)),
      ev(5, 1, at(22)),
    ];
    assert_eq!(shape(&run(&events)), vec![0, 0, 3]);
  }

  #[test]
  fn unsorted_input_is_sorted_first() {
    let events = vec![ev(3, 1, at(2)), ev(1, 1, at(0)), ev(2, 1, at(1))];
    let out = run(&events);
    let cluster = out[0].as_cluster().unwrap();
    let got: Vec<Id> = cluster.events.iter().map(|e| e.id.clone()).collect();
    assert_eq!(got, ids(&[1, 2, 3]));
    assert_eq!(cluster.cluster_id, "cluster-1-0");
  }

  #[test]
  fn camera_change_breaks_group() {
    let events = vec![
      ev(1, 1, at(0)),
      ev(2, 1, at(1)),
      ev(3, 1, at(2)),
      ev(4, 2, at(3)),
      ev(5, 2, at(4)),
      ev(6, 2, at(5)),
    ];
    let out = run(&events);
    assert_eq!(shape(&out), vec![3, 3]);
    assert_eq!(out[0].camera_id(), &Id::from(1_i64));
    assert_eq!(out[1].camera_id(), &Id::from(2_i64));
  }

  #[test]
  fn any_camera_merges_across_cameras() {
    let events = vec![ev(1, 1, at(0)), ev(2, 2, at(1)), ev(3, 1, at(2))];
    let opts = ClusterOptions {
      same_camera: false,
      ..ClusterOptions::default()
    };
    let out = build_default(&events, &opts);
    assert_eq!(shape(&out), vec![3]);
    assert_eq!(out[0].camera_id(), &Id::from(1_i64));
  }

  #[test]
  fn malformed_timestamp_is_isolated_and_last() {
    let events = vec![
      ev(1, 1, at(0)),
      ev(2, 1, "garbage".into()),
      ev(3, 1, at(1)),
      ev(4, 1, at(2)),
    ];
    let out = run(&events);
    assert_eq!(shape(&out), vec![3, 0]);
    assert_eq!(out[1].as_event().unwrap().id, Id::from(2_i64));
  }

  #[test]
  fn invalid_min_size_is_normalized() {
    let events: Vec<_> = (0..2).map(|i| ev(i, 1, at(i))).collect();
    let opts = ClusterOptions {
      min_cluster_size: 1,
      ..ClusterOptions::default()
    };
    // Clamped to 2: the pair clusters, a single event never does.
    assert_eq!(shape(&build_default(&events, &opts)), vec![2]);
    assert_eq!(shape(&build_default(&events[..1], &opts)), vec![0]);
  }

  #[test]
  fn clusters_share_input_events() {
    let events: Vec<_> = (0..3).map(|i| ev(i, 1, at(i))).collect();
    let out = run(&events);
    let cluster = out[0].as_cluster().unwrap();
    for (a, b) in cluster.events.iter().zip(&events) {
      assert!(Arc::ptr_eq(a, b));
    }
  }

  #[test]
  fn flatten_restores_every_event_once() {
    let mut events: Vec<_> = (0..4).map(|i| ev(i, 1, at(i))).collect();
    events.push(ev(10, 2, at(40)));
    events.extend((20..23).map(|i| ev(i, 3, at(i * 3))));
    let out = run(&events);
    let total: usize = out.iter().map(ClusterItem::event_count).sum();
    assert_eq!(total, events.len());
    let mut got: Vec<Id> = flatten(&out).iter().map(|e| e.id.clone()).collect();
    got.sort_unstable();
    let mut want: Vec<Id> = events.iter().map(|e| e.id.clone()).collect();
    want.sort_unstable();
    assert_eq!(got, want);
  }

  #[test]
  fn output_is_chronological() {
    let events = vec![
      ev(5, 2, at(50)),
      ev(1, 1, at(0)),
      ev(2, 1, at(1)),
      ev(3, 1, at(2)),
      ev(4, 3, at(20)),
    ];
    let out = run(&events);
    let starts: Vec<_> = out.iter().map(|i| i.start_time().unwrap()).collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
  }

  #[test]
  fn gap_just_over_window_splits() {
    // 5 min + 0.9 ms between events: over the window, so nothing merges.
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
    let step = Duration::minutes(5) + Duration::microseconds(900);
    let events: Vec<_> = (0..3)
      .map(|i| ev(i, 1, (base + step * i as i32).to_rfc3339()))
      .collect();
    assert_eq!(shape(&run(&events)), vec![0, 0, 0]);
  }

  #[test]
  fn repeated_ids_still_cluster_with_distinct_cluster_ids() {
    let events = vec![
      ev(1, 1, at(0)),
      ev(1, 1, at(1)),
      ev(1, 1, at(2)),
      ev(1, 1, at(30)),
      ev(1, 1, at(31)),
      ev(1, 1, at(32)),
    ];
    let out = run(&events);
    assert_eq!(shape(&out), vec![3, 3]);
    let a = &out[0].as_cluster().unwrap().cluster_id;
    let b = &out[1].as_cluster().unwrap().cluster_id;
    assert_ne!(a, b);
  }

  #[test]
  fn named_cameras_group_by_name() {
    let named = |id: i64, camera: &str, minute: i64| {
      Arc::new(Event {
        id: id.into(),
        camera_id: camera.into(),
        started_at: at(minute),
        ended_at: None,
        risk_score: None,
        thumbnail_url: None,
        extra: Map::new(),
      })
    };
    let events = vec![
      named(1, "front_door", 0),
      named(2, "front_door", 1),
      named(3, "front_door", 2),
      named(4, "garage", 3),
    ];
    let out = run(&events);
    assert_eq!(shape(&out), vec![3, 0]);
    assert_eq!(out[0].camera_id(), &Id::from("front_door"));
  }
}
