//! Views bind a measure to a fixed set of tag keys and an aggregation.

use std::collections::HashSet;

use super::measure::{Measure, MeasureKind};
use super::tags::TagKey;
use super::RegistrationError;

/// Histogram bounds, in milliseconds, shared by every latency view.
pub const DEFAULT_LATENCY_BUCKETS_MS: [f64; 34] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 13.0, 16.0, 20.0, 25.0, 30.0, 40.0, 50.0, 65.0,
    80.0, 100.0, 130.0, 160.0, 200.0, 250.0, 300.0, 400.0, 500.0, 650.0, 800.0, 1_000.0,
    2_000.0, 5_000.0, 10_000.0, 20_000.0, 50_000.0, 100_000.0,
];

#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Count,
    Distribution(&'static [f64]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    measure: Measure,
    tag_keys: Vec<TagKey>,
    aggregation: Aggregation,
}

impl View {
    pub fn new(measure: Measure, tag_keys: &[TagKey], aggregation: Aggregation) -> Self {
        Self {
            measure,
            tag_keys: tag_keys.to_vec(),
            aggregation,
        }
    }

    /// A plain count over `tag_keys`.
    pub fn count(measure: Measure, tag_keys: &[TagKey]) -> Self {
        Self::new(measure, tag_keys, Aggregation::Count)
    }

    /// A latency histogram over `tag_keys` using the default buckets.
    pub fn latency(measure: Measure, tag_keys: &[TagKey]) -> Self {
        Self::new(
            measure,
            tag_keys,
            Aggregation::Distribution(&DEFAULT_LATENCY_BUCKETS_MS),
        )
    }

    /// Views are named after their measure.
    pub fn name(&self) -> &'static str {
        self.measure.name()
    }

    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    pub fn tag_keys(&self) -> &[TagKey] {
        &self.tag_keys
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Checks the view is well formed before it reaches a backend.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.tag_keys.is_empty() {
            return Err(self.invalid("no tag keys"));
        }

        let mut seen = HashSet::new();
        for key in &self.tag_keys {
            if !seen.insert(key) {
                return Err(self.invalid(format!("tag key '{}' listed twice", key)));
            }
        }

        match (&self.aggregation, self.measure.kind()) {
            (Aggregation::Count, MeasureKind::Counter) => Ok(()),
            (Aggregation::Distribution(bounds), MeasureKind::LatencyDistribution) => {
                if bounds.is_empty() {
                    return Err(self.invalid("distribution has no buckets"));
                }
                if bounds[0] <= 0.0 || bounds.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(self.invalid("bucket bounds must be positive and increasing"));
                }
                Ok(())
            }
            (aggregation, kind) => Err(self.invalid(format!(
                "{:?} aggregation does not fit a {:?} measure",
                aggregation, kind
            ))),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> RegistrationError {
        RegistrationError::InvalidView {
            name: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::measure::{MeasureRegistry, UNIT_MILLISECONDS};

    fn measures() -> (Measure, Measure) {
        let mut registry = MeasureRegistry::new();
        (
            registry
                .define_counter("runtime/test/count", "Test count.")
                .unwrap(),
            registry
                .define_latency("runtime/test/latency", "Test latency.", UNIT_MILLISECONDS)
                .unwrap(),
        )
    }

    #[test]
    fn test_valid_views() {
        let (count, latency) = measures();
        assert!(View::count(count, &[TagKey::AppId, TagKey::Status])
            .validate()
            .is_ok());
        assert!(View::latency(latency, &[TagKey::AppId, TagKey::Status])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_view_named_after_measure() {
        let (count, _) = measures();
        let view = View::count(count, &[TagKey::AppId]);
        assert_eq!(view.name(), "runtime/test/count");
        assert_eq!(view.tag_keys(), &[TagKey::AppId]);
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let (count, _) = measures();
        let err = View::count(count, &[TagKey::AppId, TagKey::AppId])
            .validate()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidView { .. }));
    }

    #[test]
    fn test_rejects_empty_keys() {
        let (count, _) = measures();
        assert!(View::count(count, &[]).validate().is_err());
    }

    #[test]
    fn test_rejects_mismatched_aggregation() {
        let (count, latency) = measures();
        assert!(View::latency(count, &[TagKey::AppId]).validate().is_err());
        assert!(View::count(latency, &[TagKey::AppId]).validate().is_err());
    }

    #[test]
    fn test_rejects_unsorted_buckets() {
        static BAD: [f64; 3] = [5.0, 1.0, 10.0];
        let (_, latency) = measures();
        let view = View::new(latency, &[TagKey::AppId], Aggregation::Distribution(&BAD));
        assert!(view.validate().is_err());
    }

    #[test]
    fn test_default_buckets_are_increasing() {
        assert!(DEFAULT_LATENCY_BUCKETS_MS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(DEFAULT_LATENCY_BUCKETS_MS[0], 1.0);
        assert_eq!(DEFAULT_LATENCY_BUCKETS_MS[33], 100_000.0);
    }
}
