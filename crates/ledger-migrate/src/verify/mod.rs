//! Sampled verification of a completed load.
//!
//! Compares the held source snapshot against a freshly fetched target
//! snapshot:
//!
//! - **Counts**: profiles = owners, properties = units, payments = payments
//! - **Profiles**: first N target profiles, matched to owners by name;
//!   email and phone compared
//! - **Properties**: first N source units; the derived address must exist
//!   in the target
//! - **Payments**: first N target payments, matched by check number; check
//!   amount compared as a float (an amount that does not parse never
//!   matches), invoice number compared exactly
//!
//! Discrepancies are reported, never raised.

pub mod types;

pub use types::{
    CountCheck, Discrepancy, DiscrepancyKind, SampleCheck, SampledEntity, TargetCounts,
    VerifyOutcome, VerifyReport,
};

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::core::Payment;
use crate::progress::Progress;
use crate::source::SourceSnapshot;
use crate::target::TargetSnapshot;
use crate::transform::Transformer;

/// Default number of records sampled per entity type.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Sample-based verifier.
pub struct Verifier {
    sample_size: usize,
    transformer: Transformer,
    progress: Progress,
}

impl Verifier {
    pub fn new(sample_size: usize, transformer: Transformer, progress: Progress) -> Self {
        Self {
            sample_size,
            transformer,
            progress,
        }
    }

    /// Compare snapshots and report every check through progress.
    pub fn verify(&self, source: &SourceSnapshot, target: &TargetSnapshot) -> VerifyReport {
        self.progress.info("Beginning detailed verification...");

        let counts = count_check(source, target);
        self.progress.info(format!(
            "Source: Owners={}, Units={}, Payments={}",
            counts.source.owners, counts.source.units, counts.source.payments
        ));
        self.progress.info(format!(
            "Target: Profiles={}, Properties={}, Payments={}",
            counts.target.profiles, counts.target.properties, counts.target.payments
        ));
        if counts.passed() {
            self.progress.success("Record count verification passed");
        } else {
            self.progress.warning("Record count verification failed");
        }

        let profiles = self.sample_profiles(source, target);
        self.log_sample(&profiles);
        let properties = self.sample_properties(source, target);
        self.log_sample(&properties);
        let payments = self.sample_payments(source, target);
        self.log_sample(&payments);

        let report = VerifyReport::new(counts, profiles, properties, payments);
        if report.passed() {
            self.progress
                .success("VERIFICATION SUCCESSFUL: All checks passed");
        } else {
            self.progress
                .warning("VERIFICATION INCOMPLETE: Some checks failed");
        }
        report
    }

    fn log_sample(&self, check: &SampleCheck) {
        for d in &check.discrepancies {
            self.progress.warning(describe(check.entity, d));
        }
        if check.passed() {
            self.progress.success(format!(
                "{} data verification passed (sampled {} records)",
                check.entity, check.sampled
            ));
        }
    }

    fn sample_profiles(&self, source: &SourceSnapshot, target: &TargetSnapshot) -> SampleCheck {
        let mut check = SampleCheck::new(SampledEntity::Profile);
        // Later owners win on duplicate names.
        let owners_by_name: HashMap<&str, _> = source
            .owners
            .iter()
            .map(|o| (o.name.as_str(), o))
            .collect();

        for profile in target.profiles.iter().take(self.sample_size) {
            check.sampled += 1;
            let Some(owner) = owners_by_name.get(profile.name.as_str()) else {
                check.discrepancies.push(Discrepancy::missing(&profile.name));
                continue;
            };
            if profile.email != owner.email {
                check.discrepancies.push(Discrepancy::mismatch(
                    &profile.name,
                    "email",
                    profile.email.clone(),
                    owner.email.clone(),
                ));
            }
            if profile.phone != owner.phone {
                check.discrepancies.push(Discrepancy::mismatch(
                    &profile.name,
                    "phone",
                    profile.phone.clone(),
                    owner.phone.clone(),
                ));
            }
        }
        check
    }

    fn sample_properties(&self, source: &SourceSnapshot, target: &TargetSnapshot) -> SampleCheck {
        let mut check = SampleCheck::new(SampledEntity::Property);
        let addresses: HashSet<&str> = target
            .properties
            .iter()
            .map(|p| p.address.as_str())
            .collect();

        let sample = self.sample_size.min(target.properties.len());
        for unit in source.units.iter().take(sample) {
            check.sampled += 1;
            let label = self.transformer.unit_label(&unit.unit_number);
            if !addresses.contains(label.as_str()) {
                check.discrepancies.push(Discrepancy::missing(label));
            }
        }
        check
    }

    fn sample_payments(&self, source: &SourceSnapshot, target: &TargetSnapshot) -> SampleCheck {
        let mut check = SampleCheck::new(SampledEntity::Payment);
        let by_check_number: HashMap<&str, &Payment> = source
            .payments
            .iter()
            .filter_map(|p| p.check_number.as_deref().map(|n| (n, p)))
            .collect();

        for payment in target.payments.iter().take(self.sample_size) {
            check.sampled += 1;
            let key = payment.natural_key().to_string();
            let Some(original) = payment
                .check_number
                .as_deref()
                .and_then(|n| by_check_number.get(n))
            else {
                check.discrepancies.push(Discrepancy::missing(key));
                continue;
            };

            let (target_amount, source_amount) =
                (payment.check_amount.as_f64(), original.check_amount.as_f64());
            let amounts_match = match (target_amount, source_amount) {
                (Some(t), Some(s)) => t == s,
                _ => false,
            };
            if !amounts_match {
                debug!(
                    "check #{}: amount {:?} vs {:?}",
                    key, target_amount, source_amount
                );
                check.discrepancies.push(Discrepancy::mismatch(
                    key.clone(),
                    "checkAmount",
                    target_amount.map(|a| a.to_string()),
                    source_amount.map(|a| a.to_string()),
                ));
            }
            if payment.invoice_number != original.invoice_number {
                check.discrepancies.push(Discrepancy::mismatch(
                    key,
                    "invoiceNumber",
                    payment.invoice_number.clone(),
                    original.invoice_number.clone(),
                ));
            }
        }
        check
    }
}

/// Record counts on both sides.
pub fn count_check(source: &SourceSnapshot, target: &TargetSnapshot) -> CountCheck {
    CountCheck {
        source: source.counts(),
        target: TargetCounts {
            profiles: target.profiles.len(),
            properties: target.properties.len(),
            payments: target.payments.len(),
        },
    }
}

/// Human-readable line for a discrepancy, naming the natural key.
pub fn describe(entity: SampledEntity, d: &Discrepancy) -> String {
    match (&d.kind, entity) {
        (DiscrepancyKind::Missing, SampledEntity::Profile) => {
            format!("Profile \"{}\" not found in source data", d.key)
        }
        (DiscrepancyKind::Missing, SampledEntity::Property) => {
            format!("Property \"{}\" not found in target data", d.key)
        }
        (DiscrepancyKind::Missing, SampledEntity::Payment) => {
            format!("Payment with check number \"{}\" not found in source data", d.key)
        }
        (
            DiscrepancyKind::FieldMismatch {
                field,
                target,
                source,
            },
            entity,
        ) => {
            let subject = match entity {
                SampledEntity::Payment => format!("check #{}", d.key),
                _ => d.key.clone(),
            };
            format!(
                "{} mismatch for {}: {} vs {}",
                field,
                subject,
                target.as_deref().unwrap_or("<none>"),
                source.as_deref().unwrap_or("<none>")
            )
        }
    }
}
