//! Engine facade: options + classifier in, clustered items and stats out.

use std::sync::Arc;

use crate::builder;
use crate::config::ClusterOptions;
use crate::severity;
use crate::stats;
use crate::types::*;

/// Stateless clustering engine. Every call reclusters the whole snapshot.
pub struct Engine<F = fn(f64) -> SeverityLevel> {
  options: ClusterOptions,
  classify: F,
}

impl Engine {
  pub fn new(options: ClusterOptions) -> Self {
    Self {
      options: options.normalized(),
      classify: severity::classify,
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(ClusterOptions::default())
  }
}

impl<F> Engine<F>
where
  F: Fn(f64) -> SeverityLevel,
{
  /// Engine with a custom score → severity mapping.
  pub fn with_classifier(options: ClusterOptions, classify: F) -> Self {
    Self {
      options: options.normalized(),
      classify,
    }
  }

  pub fn options(&self) -> &ClusterOptions {
    &self.options
  }

  /// Cluster a snapshot and report compression stats.
  pub fn process(&self, events: &[Arc<Event>]) -> ClusterReport {
    let items = builder::build(events, &self.options, &self.classify);
    let stats = stats::compute(events, &items);
    ClusterReport { items, stats }
  }
}

/// Wrap owned events for sharing between the input list and clusters.
pub fn share(events: Vec<Event>) -> Vec<Arc<Event>> {
  events.into_iter().map(Arc::new).collect()
}

/// Cluster a snapshot with a custom classifier and report stats in one call.
pub fn cluster_with_stats<F>(
  events: &[Arc<Event>],
  options: &ClusterOptions,
  classify: F,
) -> ClusterReport
where
  F: Fn(f64) -> SeverityLevel,
{
  Engine::with_classifier(options.clone(), classify).process(events)
}

/// Cluster one input document with the default classifier (no I/O).
pub fn run(input: &ClusterInput) -> ClusterOutput {
  let events = share(input.events.clone());
  Engine::new(input.options.clone()).process(&events)
}
