//! Score → severity tier mapping shared with the dashboard badges.

use crate::types::SeverityLevel;

pub const CRITICAL_THRESHOLD: f64 = 80.0;
pub const HIGH_THRESHOLD: f64 = 60.0;
pub const MEDIUM_THRESHOLD: f64 = 40.0;

/// Classify a risk score (0-100 scale; out-of-range values land in the end tiers).
pub fn classify(score: f64) -> SeverityLevel {
  if score >= CRITICAL_THRESHOLD {
    SeverityLevel::Critical
  } else if score >= HIGH_THRESHOLD {
    SeverityLevel::High
  } else if score >= MEDIUM_THRESHOLD {
    SeverityLevel::Medium
  } else {
    SeverityLevel::Low
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tier_boundaries() {
    assert_eq!(classify(0.0), SeverityLevel::Low);
    assert_eq!(classify(39.9), SeverityLevel::Low);
    assert_eq!(classify(40.0), SeverityLevel::Medium);
    assert_eq!(classify(59.0), SeverityLevel::Medium);
    assert_eq!(classify(60.0), SeverityLevel::High);
    assert_eq!(classify(79.5), SeverityLevel::High);
    assert_eq!(classify(80.0), SeverityLevel::Critical);
    assert_eq!(classify(100.0), SeverityLevel::Critical);
  }

  #[test]
  fn out_of_range_scores() {
    assert_eq!(classify(-5.0), SeverityLevel::Low);
    assert_eq!(classify(250.0), SeverityLevel::Critical);
  }

  #[test]
  fn levels_are_ordered() {
    assert!(SeverityLevel::Low < SeverityLevel::Medium);
    assert!(SeverityLevel::Medium < SeverityLevel::High);
    assert!(SeverityLevel::High < SeverityLevel::Critical);
    assert_eq!(SeverityLevel::Critical.label(), "Critical");
  }
}
