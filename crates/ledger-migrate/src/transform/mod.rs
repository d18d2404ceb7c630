//! Source → target entity mapping.
//!
//! Pure functions, one per entity pair. Derived fields (joined address,
//! unit label) and injected defaults live here; foreign keys are resolved
//! against the [`IdRegistry`] built during load.

use std::fmt;

use crate::config::{MigrationConfig, ProfileDefaults, PropertyDefaults};
use crate::core::{IdRegistry, NewPayment, NewProfile, NewProperty, Owner, Payment, Unit};

/// Why a record could not be mapped onto the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unmappable {
    /// The record has no owner reference at all.
    MissingOwner,
    /// The referenced owner has no migrated profile.
    UnmappedOwner(String),
}

impl fmt::Display for Unmappable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unmappable::MissingOwner => write!(f, "owner not found"),
            Unmappable::UnmappedOwner(id) => write!(f, "owner {} not found", id),
        }
    }
}

/// Transformer configured with the migration defaults.
#[derive(Debug, Clone)]
pub struct Transformer {
    unit_label_prefix: String,
    property: PropertyDefaults,
    profile: ProfileDefaults,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(&MigrationConfig::default())
    }
}

impl Transformer {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            unit_label_prefix: config.unit_label_prefix.clone(),
            property: config.property_defaults.clone(),
            profile: config.profile_defaults.clone(),
        }
    }

    /// Owner → profile input.
    pub fn profile(&self, owner: &Owner) -> NewProfile {
        NewProfile {
            name: owner.name.clone(),
            email: owner.email.clone(),
            phone: owner.phone.clone(),
            address: join_address(owner.address1.as_deref(), owner.address2.as_deref()),
            city: owner.city.clone(),
            state: owner.state.clone(),
            zip: owner.zip.clone(),
            contact_pref: self.profile.contact_pref.clone(),
            billing_freq: self.profile.billing_freq.clone(),
            allow_text: self.profile.allow_text,
            balance: self.profile.balance,
        }
    }

    /// Unit → property input. Needs the unit's owner to be mapped.
    pub fn property(&self, unit: &Unit, profiles: &IdRegistry) -> Result<NewProperty, Unmappable> {
        let profile_id = resolve_owner(unit.owner_id(), profiles)?;
        Ok(NewProperty {
            address: self.unit_label(&unit.unit_number),
            city: self.property.city.clone(),
            state: self.property.state.clone(),
            zip: self.property.zip.clone(),
            prof_owner_id: profile_id.to_string(),
        })
    }

    /// Payment → payment input with the owner remapped to its profile.
    pub fn payment(&self, payment: &Payment, profiles: &IdRegistry) -> Result<NewPayment, Unmappable> {
        let owner_id = payment
            .owner_payments_id
            .as_deref()
            .filter(|id| !id.is_empty());
        let profile_id = resolve_owner(owner_id, profiles)?;
        Ok(NewPayment {
            check_date: payment.check_date.clone(),
            check_number: payment.check_number.clone(),
            check_amount: payment.check_amount.clone(),
            invoice_number: payment.invoice_number.clone(),
            invoice_amount: payment.invoice_amount.clone(),
            owner_payments_id: profile_id.to_string(),
        })
    }

    /// Property address for a unit number (`"Unit 4B"`).
    pub fn unit_label(&self, unit_number: &str) -> String {
        format!("{}{}", self.unit_label_prefix, unit_number)
    }
}

fn resolve_owner<'a>(owner_id: Option<&str>, profiles: &'a IdRegistry) -> Result<&'a str, Unmappable> {
    let owner_id = owner_id.ok_or(Unmappable::MissingOwner)?;
    profiles
        .get(owner_id)
        .ok_or_else(|| Unmappable::UnmappedOwner(owner_id.to_string()))
}

/// `address1, address2`, or just whichever part is present.
pub fn join_address(address1: Option<&str>, address2: Option<&str>) -> String {
    let address1 = address1.unwrap_or_default();
    match address2.filter(|a| !a.is_empty()) {
        Some(address2) if address1.is_empty() => address2.to_string(),
        Some(address2) => format!("{}, {}", address1, address2),
        None => address1.to_string(),
    }
}
