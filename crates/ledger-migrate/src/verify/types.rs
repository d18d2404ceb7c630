//! Verification report types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::SourceCounts;

/// Overall verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Count check and every sample check passed.
    Passed,
    /// At least one check found a discrepancy.
    Incomplete,
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::Passed => write!(f, "passed"),
            VerifyOutcome::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// Target record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCounts {
    pub profiles: usize,
    pub properties: usize,
    pub payments: usize,
}

/// Source vs target record counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountCheck {
    pub source: SourceCounts,
    pub target: TargetCounts,
}

impl CountCheck {
    /// Profiles = owners, properties = units, payments = payments.
    pub fn passed(&self) -> bool {
        self.source.owners == self.target.profiles
            && self.source.units == self.target.properties
            && self.source.payments == self.target.payments
    }
}

/// Entity type a sample check covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampledEntity {
    Profile,
    Property,
    Payment,
}

impl fmt::Display for SampledEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampledEntity::Profile => write!(f, "Profile"),
            SampledEntity::Property => write!(f, "Property"),
            SampledEntity::Payment => write!(f, "Payment"),
        }
    }
}

/// What was wrong with a sampled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// The record has no counterpart on the other side.
    Missing,
    /// A compared field differs.
    FieldMismatch {
        field: String,
        target: Option<String>,
        source: Option<String>,
    },
}

/// One mismatch found while sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Natural key: name, derived address, or check number.
    pub key: String,
    #[serde(flatten)]
    pub kind: DiscrepancyKind,
}

impl Discrepancy {
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: DiscrepancyKind::Missing,
        }
    }

    pub fn mismatch(
        key: impl Into<String>,
        field: &str,
        target: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: DiscrepancyKind::FieldMismatch {
                field: field.to_string(),
                target,
                source,
            },
        }
    }
}

/// Result of sampling one entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleCheck {
    pub entity: SampledEntity,
    pub sampled: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl SampleCheck {
    pub fn new(entity: SampledEntity) -> Self {
        Self {
            entity,
            sampled: 0,
            discrepancies: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Full verification report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub counts: CountCheck,
    pub profiles: SampleCheck,
    pub properties: SampleCheck,
    pub payments: SampleCheck,
    pub outcome: VerifyOutcome,
}

impl VerifyReport {
    /// Assemble a report; the outcome is derived from the checks.
    pub fn new(
        counts: CountCheck,
        profiles: SampleCheck,
        properties: SampleCheck,
        payments: SampleCheck,
    ) -> Self {
        let all_passed =
            counts.passed() && profiles.passed() && properties.passed() && payments.passed();
        Self {
            counts,
            profiles,
            properties,
            payments,
            outcome: if all_passed {
                VerifyOutcome::Passed
            } else {
                VerifyOutcome::Incomplete
            },
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == VerifyOutcome::Passed
    }

    pub fn discrepancy_count(&self) -> usize {
        self.profiles.discrepancies.len()
            + self.properties.discrepancies.len()
            + self.payments.discrepancies.len()
    }
}
