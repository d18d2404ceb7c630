//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::DEFAULT_PAGE_SIZE;
use crate::verify::DEFAULT_SAMPLE_SIZE;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source datastore endpoint (read only).
    pub source: EndpointConfig,

    /// Target datastore endpoint (cleared and loaded).
    pub target: EndpointConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Remote GraphQL endpoint configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,

    /// Pre-issued token sent with every request. Obtaining it is up to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Header carrying the token (default: "Authorization").
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("auth_header", &self.auth_header)
            .finish()
    }
}

impl EndpointConfig {
    /// Endpoint with no token.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
            auth_header: default_auth_header(),
        }
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Records requested per list call (default: 1000).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Records sampled per entity type during verification (default: 5).
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Prefix of the property address derived from a unit number (default: "Unit ").
    #[serde(default = "default_unit_label_prefix")]
    pub unit_label_prefix: String,

    /// Location assigned to every migrated property.
    #[serde(default)]
    pub property_defaults: PropertyDefaults,

    /// Values injected into every migrated profile.
    #[serde(default)]
    pub profile_defaults: ProfileDefaults,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sample_size: default_sample_size(),
            unit_label_prefix: default_unit_label_prefix(),
            property_defaults: PropertyDefaults::default(),
            profile_defaults: ProfileDefaults::default(),
        }
    }
}

/// City/state/zip for properties. All units belong to a single known location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefaults {
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Default for PropertyDefaults {
    fn default() -> Self {
        Self {
            city: "West Columbia".to_string(),
            state: "SC".to_string(),
            zip: "29169".to_string(),
        }
    }
}

/// Profile fields with no source counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    pub contact_pref: String,
    pub billing_freq: String,
    pub allow_text: bool,
    pub balance: f64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            contact_pref: "EMAIL".to_string(),
            billing_freq: "MONTHLY".to_string(),
            allow_text: false,
            balance: 0.0,
        }
    }
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_unit_label_prefix() -> String {
    "Unit ".to_string()
}
