//! Catalogue of remote operations.
//!
//! Every remote interaction is described by an [`Operation`]: the GraphQL
//! document plus the metadata drivers need to route it and unwrap the
//! response.

/// What an operation does to its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    List,
    Create,
    Delete,
}

/// Descriptor for one remote query or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// GraphQL operation name (`ListOwners`).
    pub name: &'static str,
    /// Field under `data` holding the result (`listOwners`).
    pub root_field: &'static str,
    /// Collection the operation reads or writes.
    pub collection: &'static str,
    pub kind: OperationKind,
    /// GraphQL document.
    pub document: &'static str,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root_field)
    }
}

/// Source datastore operations.
pub mod source {
    use super::{Operation, OperationKind};

    pub const LIST_OWNERS: Operation = Operation {
        name: "ListOwners",
        root_field: "listOwners",
        collection: "owners",
        kind: OperationKind::List,
        document: r#"query ListOwners($filter: ModelOwnerFilterInput, $limit: Int, $nextToken: String) {
  listOwners(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id name email phone address1 address2 city state zip createdAt updatedAt }
    nextToken
  }
}"#,
    };

    pub const LIST_UNITS: Operation = Operation {
        name: "ListUnits",
        root_field: "listUnits",
        collection: "units",
        kind: OperationKind::List,
        document: r#"query ListUnits($filter: ModelUnitFilterInput, $limit: Int, $nextToken: String) {
  listUnits(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id unitNumber owner { id } createdAt updatedAt }
    nextToken
  }
}"#,
    };

    pub const LIST_PAYMENTS: Operation = Operation {
        name: "ListPayments",
        root_field: "listPayments",
        collection: "payments",
        kind: OperationKind::List,
        document: r#"query ListPayments($filter: ModelPaymentFilterInput, $limit: Int, $nextToken: String) {
  listPayments(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id checkDate checkNumber checkAmount invoiceNumber invoiceAmount ownerPaymentsId createdAt updatedAt }
    nextToken
  }
}"#,
    };
}

/// Target datastore operations.
pub mod target {
    use super::{Operation, OperationKind};

    pub const LIST_PROFILES: Operation = Operation {
        name: "ListProfiles",
        root_field: "listProfiles",
        collection: "profiles",
        kind: OperationKind::List,
        document: r#"query ListProfiles($filter: ModelProfileFilterInput, $limit: Int, $nextToken: String) {
  listProfiles(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id name email phone address city state zip balance createdAt updatedAt }
    nextToken
  }
}"#,
    };

    pub const LIST_PROPERTIES: Operation = Operation {
        name: "ListProperties",
        root_field: "listProperties",
        collection: "properties",
        kind: OperationKind::List,
        document: r#"query ListProperties($filter: ModelPropertyFilterInput, $limit: Int, $nextToken: String) {
  listProperties(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id address city state zip profOwnerId createdAt updatedAt }
    nextToken
  }
}"#,
    };

    pub const LIST_PAYMENTS: Operation = Operation {
        name: "ListPayments",
        root_field: "listPayments",
        collection: "payments",
        kind: OperationKind::List,
        document: r#"query ListPayments($filter: ModelPaymentFilterInput, $limit: Int, $nextToken: String) {
  listPayments(filter: $filter, limit: $limit, nextToken: $nextToken) {
    items { id checkDate checkNumber checkAmount invoiceNumber invoiceAmount ownerPaymentsId createdAt updatedAt }
    nextToken
  }
}"#,
    };

    pub const CREATE_PROFILE: Operation = Operation {
        name: "CreateProfile",
        root_field: "createProfile",
        collection: "profiles",
        kind: OperationKind::Create,
        document: r#"mutation CreateProfile($input: CreateProfileInput!) {
  createProfile(input: $input) { id }
}"#,
    };

    pub const CREATE_PROPERTY: Operation = Operation {
        name: "CreateProperty",
        root_field: "createProperty",
        collection: "properties",
        kind: OperationKind::Create,
        document: r#"mutation CreateProperty($input: CreatePropertyInput!) {
  createProperty(input: $input) { id }
}"#,
    };

    pub const CREATE_PAYMENT: Operation = Operation {
        name: "CreatePayment",
        root_field: "createPayment",
        collection: "payments",
        kind: OperationKind::Create,
        document: r#"mutation CreatePayment($input: CreatePaymentInput!) {
  createPayment(input: $input) { id }
}"#,
    };

    pub const DELETE_PROFILE: Operation = Operation {
        name: "DeleteProfile",
        root_field: "deleteProfile",
        collection: "profiles",
        kind: OperationKind::Delete,
        document: r#"mutation DeleteProfile($input: DeleteProfileInput!) {
  deleteProfile(input: $input) { id }
}"#,
    };

    pub const DELETE_PROPERTY: Operation = Operation {
        name: "DeleteProperty",
        root_field: "deleteProperty",
        collection: "properties",
        kind: OperationKind::Delete,
        document: r#"mutation DeleteProperty($input: DeletePropertyInput!) {
  deleteProperty(input: $input) { id }
}"#,
    };

    pub const DELETE_PAYMENT: Operation = Operation {
        name: "DeletePayment",
        root_field: "deletePayment",
        collection: "payments",
        kind: OperationKind::Delete,
        document: r#"mutation DeletePayment($input: DeletePaymentInput!) {
  deletePayment(input: $input) { id }
}"#,
    };
}
