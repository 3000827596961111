//! Measure declarations.

use std::collections::HashSet;

use super::RegistrationError;

pub const UNIT_DIMENSIONLESS: &str = "1";
pub const UNIT_MILLISECONDS: &str = "ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureKind {
    Counter,
    LatencyDistribution,
}

/// Handle to a declared quantity. Immutable and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measure {
    name: &'static str,
    description: &'static str,
    unit: &'static str,
    kind: MeasureKind,
}

impl Measure {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }
}

/// Hands out measures and refuses to define the same name twice.
#[derive(Debug, Default)]
pub struct MeasureRegistry {
    defined: HashSet<&'static str>,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a dimensionless counter.
    pub fn define_counter(
        &mut self,
        name: &'static str,
        description: &'static str,
    ) -> Result<Measure, RegistrationError> {
        self.define(name, description, UNIT_DIMENSIONLESS, MeasureKind::Counter)
    }

    /// Declares a latency distribution measured in `unit`.
    pub fn define_latency(
        &mut self,
        name: &'static str,
        description: &'static str,
        unit: &'static str,
    ) -> Result<Measure, RegistrationError> {
        self.define(name, description, unit, MeasureKind::LatencyDistribution)
    }

    fn define(
        &mut self,
        name: &'static str,
        description: &'static str,
        unit: &'static str,
        kind: MeasureKind,
    ) -> Result<Measure, RegistrationError> {
        if !self.defined.insert(name) {
            return Err(RegistrationError::DuplicateMeasure {
                name: name.to_string(),
            });
        }

        Ok(Measure {
            name,
            description,
            unit,
            kind,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.defined.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_counter_and_latency() {
        let mut registry = MeasureRegistry::new();
        let count = registry
            .define_counter("runtime/test/count", "Test counter.")
            .expect("counter should be defined");
        let latency = registry
            .define_latency("runtime/test/latency", "Test latency.", UNIT_MILLISECONDS)
            .expect("latency should be defined");

        assert_eq!(count.kind(), MeasureKind::Counter);
        assert_eq!(count.unit(), UNIT_DIMENSIONLESS);
        assert_eq!(latency.kind(), MeasureKind::LatencyDistribution);
        assert_eq!(latency.unit(), "ms");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = MeasureRegistry::new();
        registry
            .define_counter("runtime/test/count", "First.")
            .expect("first definition should succeed");

        // A latency with the same name still collides.
        let err = registry
            .define_latency("runtime/test/count", "Second.", UNIT_MILLISECONDS)
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateMeasure {
                name: "runtime/test/count".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_separate_registries_do_not_collide() {
        let mut a = MeasureRegistry::new();
        let mut b = MeasureRegistry::new();
        assert!(a.define_counter("runtime/test/count", "A.").is_ok());
        assert!(b.define_counter("runtime/test/count", "B.").is_ok());
    }
}
