//! Build identifier change detection.

use std::fmt;

/// A build identifier that differs from the baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifierChange {
    /// First identifier seen by the agent.
    pub baseline: String,
    /// Identifier that differs from the baseline.
    pub observed: String,
}

impl fmt::Display for IdentifierChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.baseline, self.observed)
    }
}

/// Result of feeding one identifier to the detector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    /// Empty identifier received before any baseline.
    Ignored,
    /// Identifier stored as the baseline.
    Baseline,
    /// Identifier matches the baseline.
    Unchanged,
    /// Identifier differs from the baseline.
    Changed(IdentifierChange),
}

/// Remembers the first identifier and compares later ones against it.
///
/// The baseline lives for the lifetime of the detector, so it survives
/// reconnects of the underlying channel.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    baseline: Option<String>,
}

impl ChangeDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&str> {
        self.baseline.as_deref()
    }

    /// Feed one identifier received from the server.
    pub fn observe(&mut self, identifier: &str) -> Observation {
        match &self.baseline {
            None if identifier.is_empty() => Observation::Ignored,
            None => {
                self.baseline = Some(identifier.to_owned());
                Observation::Baseline
            }
            Some(baseline) if baseline == identifier => Observation::Unchanged,
            Some(baseline) => Observation::Changed(IdentifierChange {
                baseline: baseline.clone(),
                observed: identifier.to_owned(),
            }),
        }
    }
}
