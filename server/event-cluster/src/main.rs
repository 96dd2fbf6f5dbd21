//! Binary entrypoint: read one JSON document from stdin, write one to stdout.
//!
//! Input: `{"events": [...], "options": {...}}` (options optional).
//! Output: a ClusterReport (`{"items": [...], "stats": {...}}`), or an
//! ErrorOutput when the input can't be read or decoded.

use std::io::{self, Read, Write};

use clap::Parser;
use event_cluster::engine;
use event_cluster::types::{ClusterInput, ErrorOutput};
use event_cluster::ClusterError;

/// Collapse bursts of camera events into clusters.
#[derive(Debug, Parser)]
#[command(name = "event-cluster", version)]
struct Cli {
  /// Max minutes between consecutive events of one cluster.
  #[arg(long)]
  window_minutes: Option<f64>,

  /// Smallest group wrapped into a cluster.
  #[arg(long)]
  min_cluster_size: Option<usize>,

  /// Allow clusters to span cameras.
  #[arg(long)]
  any_camera: bool,

  /// Pass events through unclustered.
  #[arg(long)]
  disabled: bool,
}

impl Cli {
  /// Command-line flags win over the options embedded in the input.
  fn apply(&self, input: &mut ClusterInput) {
    let options = &mut input.options;
    if let Some(w) = self.window_minutes {
      options.window_minutes = w;
    }
    if let Some(n) = self.min_cluster_size {
      options.min_cluster_size = n;
    }
    if self.any_camera {
      options.same_camera = false;
    }
    if self.disabled {
      options.enabled = false;
    }
  }
}

fn main() {
  init_logging();
  let cli = Cli::parse();

  if let Err(e) = run_binary(&cli) {
    tracing::error!("event-cluster: {}", e);
    let err = ErrorOutput::new(e.to_string());
    let mut out = io::stdout().lock();
    let _ = serde_json::to_writer(&mut out, &err);
    let _ = writeln!(out);
    std::process::exit(1);
  }
}

fn init_logging() {
  use tracing_subscriber::{fmt, EnvFilter};

  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("event_cluster=info"));

  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(io::stderr)
    .init();
}

fn run_binary(cli: &Cli) -> Result<(), ClusterError> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let mut input: ClusterInput = serde_json::from_str(&raw)?;
  cli.apply(&mut input);

  let report = engine::run(&input);
  tracing::info!("{}", report.stats);

  let mut out = io::BufWriter::new(io::stdout().lock());
  serde_json::to_writer(&mut out, &report).map_err(io::Error::from)?;
  writeln!(out)?;
  out.flush()?;
  Ok(())
}
