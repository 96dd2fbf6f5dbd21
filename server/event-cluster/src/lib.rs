//! Event Clustering Engine: deterministic and stateless.
//!
//! Collapses bursts of closely spaced detection events into clusters so a
//! reviewer sees one card per incident, and reports how much the list shrank.
//!
//! No DB, no network; pure computation over one snapshot of events.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod discriminator;
pub mod engine;
pub mod error;
pub mod severity;
pub mod stats;
pub mod timestamp;
pub mod types;

pub use builder::{build, build_default, flatten};
pub use config::ClusterOptions;
pub use engine::Engine;
pub use error::ClusterError;
pub use types::{ClusterItem, ClusterReport, ClusterStats, Event, EventCluster, Id, SeverityLevel};
