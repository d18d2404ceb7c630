//! Source and target record shapes.
//!
//! Field names follow the remote schemas (camelCase on the wire). Records
//! reference each other only by identifier strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Monetary amount passed through exactly as the remote returned it.
///
/// The remote may send a JSON number or a numeric string; the engine never
/// reformats it and only parses it to compare values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub Value);

impl Amount {
    /// Parse as a float, the way the verifier compares amounts.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ===== Source records =====

/// Source owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Reference to an owner embedded in a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// Source unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    #[serde(default)]
    pub unit_number: String,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
}

impl Unit {
    /// Owner id, if the unit links to one.
    pub fn owner_id(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .and_then(|o| o.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Payment record. Source and target share this shape; only the meaning
/// of `owner_payments_id` differs (owner id vs profile id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub check_date: Option<String>,
    #[serde(default)]
    pub check_number: Option<String>,
    #[serde(default)]
    pub check_amount: Amount,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_amount: Amount,
    #[serde(default)]
    pub owner_payments_id: Option<String>,
}

impl Payment {
    /// Check number for messages; falls back to the id.
    pub fn natural_key(&self) -> &str {
        self.check_number.as_deref().unwrap_or(&self.id)
    }
}

// ===== Target records =====

/// Target profile as listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub balance: Amount,
}

/// Target property as listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub prof_owner_id: Option<String>,
}

// ===== Create inputs =====

/// `CreateProfileInput`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub contact_pref: String,
    pub billing_freq: String,
    pub allow_text: bool,
    pub balance: f64,
}

/// `CreatePropertyInput`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub prof_owner_id: String,
}

/// `CreatePaymentInput`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub check_date: Option<String>,
    pub check_number: Option<String>,
    pub check_amount: Amount,
    pub invoice_number: Option<String>,
    pub invoice_amount: Amount,
    pub owner_payments_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_owner_id() {
        let unit: Unit =
            serde_json::from_value(json!({"id": "u1", "unitNumber": "12", "owner": {"id": "o1"}}))
                .unwrap();
        assert_eq!(unit.owner_id(), Some("o1"));

        let orphan: Unit =
            serde_json::from_value(json!({"id": "u2", "unitNumber": "13", "owner": null})).unwrap();
        assert_eq!(orphan.owner_id(), None);

        let empty: Unit =
            serde_json::from_value(json!({"id": "u3", "unitNumber": "14", "owner": {"id": ""}}))
                .unwrap();
        assert_eq!(empty.owner_id(), None);
    }

    #[test]
    fn test_amount_parses_numbers_and_strings() {
        assert_eq!(Amount(json!(100.5)).as_f64(), Some(100.5));
        assert_eq!(Amount(json!("100.00")).as_f64(), Some(100.0));
        assert_eq!(Amount(json!(null)).as_f64(), None);
        assert_eq!(Amount(json!("n/a")).as_f64(), None);
    }

    #[test]
    fn test_payment_amount_passes_through_unchanged() {
        let payment: Payment = serde_json::from_value(json!({
            "id": "p1",
            "checkNumber": "1001",
            "checkAmount": "100.00",
            "ownerPaymentsId": "o1"
        }))
        .unwrap();
        assert_eq!(payment.check_amount, Amount(json!("100.00")));
        assert_eq!(payment.invoice_amount, Amount(Value::Null));

        let back = serde_json::to_value(&payment).unwrap();
        assert_eq!(back["checkAmount"], json!("100.00"));
    }

    #[test]
    fn test_new_property_wire_names() {
        let input = NewProperty {
            address: "Unit 4B".to_string(),
            city: "West Columbia".to_string(),
            state: "SC".to_string(),
            zip: "29169".to_string(),
            prof_owner_id: "profile-1".to_string(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["profOwnerId"], json!("profile-1"));
    }
}
