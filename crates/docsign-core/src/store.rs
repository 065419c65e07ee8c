//! Persistence and identity collaborators
//!
//! The signing workflows talk to storage through [`ContractStore`] and learn
//! who is acting through [`IdentityProvider`]. [`InMemoryStore`] backs tests
//! and embedded use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{AuditAction, AuditChain, AuditEntry, Contract, FieldType, FormField};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contract not found: {0}")]
    ContractNotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A completed field's captured content, kept per signer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub contract_id: String,
    pub signer_id: String,
    pub field_id: String,
    pub field_type: FieldType,
    /// Image data URI, stamped date, text, or `true`/`false`
    pub signature_data: String,
    pub signed_at: DateTime<Utc>,
}

pub trait ContractStore {
    /// Add a new contract, replacing any with the same id
    fn insert_contract(&mut self, contract: Contract) -> Result<(), StoreError>;

    fn contract(&self, contract_id: &str) -> Result<Contract, StoreError>;

    fn update_contract(&mut self, contract: &Contract) -> Result<(), StoreError>;

    /// Delete a contract together with its saved fields, returning it
    fn remove_contract(&mut self, contract_id: &str) -> Result<Contract, StoreError>;

    /// Replace the saved field collection of a contract
    fn save_fields(&mut self, contract_id: &str, fields: &[FormField]) -> Result<(), StoreError>;

    /// Saved fields, empty if none have been saved
    fn load_fields(&self, contract_id: &str) -> Result<Vec<FormField>, StoreError>;

    /// Insert or replace the record for `(contract_id, signer_id, field_id)`
    fn record_signature(&mut self, record: SignatureRecord) -> Result<(), StoreError>;

    /// Append to the audit trail of a stored contract.
    ///
    /// [`AuditAction::ContractDeleted`] is recorded after the contract is
    /// gone, so it is accepted for ids the store no longer holds.
    fn append_audit(
        &mut self,
        contract_id: &str,
        user_id: &str,
        action: AuditAction,
        details: Value,
    ) -> Result<AuditEntry, StoreError>;
}

/// Resolves the user performing an action
pub trait IdentityProvider {
    fn acting_user(&self) -> Option<String>;
}

/// An identity fixed at construction
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn acting_user(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    contracts: HashMap<String, Contract>,
    fields: HashMap<String, Vec<FormField>>,
    signatures: Vec<SignatureRecord>,
    audit: AuditChain,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.values()
    }

    pub fn signatures(&self) -> &[SignatureRecord] {
        &self.signatures
    }

    pub fn audit(&self) -> &AuditChain {
        &self.audit
    }

    fn ensure_contract(&self, contract_id: &str) -> Result<(), StoreError> {
        if self.contracts.contains_key(contract_id) {
            Ok(())
        } else {
            Err(StoreError::ContractNotFound(contract_id.to_string()))
        }
    }
}

impl ContractStore for InMemoryStore {
    fn insert_contract(&mut self, contract: Contract) -> Result<(), StoreError> {
        self.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn contract(&self, contract_id: &str) -> Result<Contract, StoreError> {
        self.contracts
            .get(contract_id)
            .cloned()
            .ok_or_else(|| StoreError::ContractNotFound(contract_id.to_string()))
    }

    fn update_contract(&mut self, contract: &Contract) -> Result<(), StoreError> {
        self.ensure_contract(&contract.id)?;
        self.contracts.insert(contract.id.clone(), contract.clone());
        Ok(())
    }

    fn remove_contract(&mut self, contract_id: &str) -> Result<Contract, StoreError> {
        let contract = self
            .contracts
            .remove(contract_id)
            .ok_or_else(|| StoreError::ContractNotFound(contract_id.to_string()))?;
        self.fields.remove(contract_id);
        Ok(contract)
    }

    fn save_fields(&mut self, contract_id: &str, fields: &[FormField]) -> Result<(), StoreError> {
        self.ensure_contract(contract_id)?;
        self.fields.insert(contract_id.to_string(), fields.to_vec());
        Ok(())
    }

    fn load_fields(&self, contract_id: &str) -> Result<Vec<FormField>, StoreError> {
        self.ensure_contract(contract_id)?;
        Ok(self.fields.get(contract_id).cloned().unwrap_or_default())
    }

    fn record_signature(&mut self, record: SignatureRecord) -> Result<(), StoreError> {
        self.ensure_contract(&record.contract_id)?;
        let existing = self.signatures.iter_mut().find(|r| {
            r.contract_id == record.contract_id
                && r.signer_id == record.signer_id
                && r.field_id == record.field_id
        });
        match existing {
            Some(slot) => *slot = record,
            None => self.signatures.push(record),
        }
        Ok(())
    }

    fn append_audit(
        &mut self,
        contract_id: &str,
        user_id: &str,
        action: AuditAction,
        details: Value,
    ) -> Result<AuditEntry, StoreError> {
        if action != AuditAction::ContractDeleted {
            self.ensure_contract(contract_id)?;
        }
        Ok(self.audit.append(contract_id, user_id, action, details).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::ContractType;

    fn store_with_contract() -> (InMemoryStore, String) {
        let mut store = InMemoryStore::new();
        let contract = Contract::new("Residency", ContractType::Performer, "producer-1");
        let id = contract.id.clone();
        store.insert_contract(contract).unwrap();
        (store, id)
    }

    fn record(contract_id: &str, data: &str) -> SignatureRecord {
        SignatureRecord {
            contract_id: contract_id.to_string(),
            signer_id: "client-1".to_string(),
            field_id: "field_a".to_string(),
            field_type: FieldType::Date,
            signature_data: data.to_string(),
            signed_at: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_contract() {
        let mut store = InMemoryStore::new();
        assert!(matches!(
            store.contract("nope"),
            Err(StoreError::ContractNotFound(_))
        ));
        assert!(store.save_fields("nope", &[]).is_err());
        assert!(store
            .append_audit("nope", "u", AuditAction::ContractViewed, json!({}))
            .is_err());
    }

    #[test]
    fn test_fields_default_empty() {
        let (store, id) = store_with_contract();
        assert!(store.load_fields(&id).unwrap().is_empty());
    }

    #[test]
    fn test_record_signature_upserts() {
        let (mut store, id) = store_with_contract();
        store.record_signature(record(&id, "3/1/2026")).unwrap();
        store.record_signature(record(&id, "3/2/2026")).unwrap();
        assert_eq!(store.signatures().len(), 1);
        assert_eq!(store.signatures()[0].signature_data, "3/2/2026");
    }

    #[test]
    fn test_audit_appends_to_chain() {
        let (mut store, id) = store_with_contract();
        let first = store
            .append_audit(&id, "producer-1", AuditAction::ContractCreated, json!({}))
            .unwrap();
        let second = store
            .append_audit(&id, "producer-1", AuditAction::ContractSent, json!({}))
            .unwrap();
        assert_eq!(second.previous_hash, Some(first.compute_hash()));
        assert!(store.audit().verify().is_ok());
    }

    #[test]
    fn test_remove_contract_drops_fields() {
        let (mut store, id) = store_with_contract();
        let field = shared_types::field::create_field(
            FieldType::Text,
            shared_types::Point::new(1.0, 1.0),
            1,
            1,
        );
        store.save_fields(&id, &[field]).unwrap();

        let removed = store.remove_contract(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.contract(&id).is_err());
        assert!(store.load_fields(&id).is_err());
        assert!(!store.fields.contains_key(&id));
        assert!(matches!(
            store.remove_contract(&id),
            Err(StoreError::ContractNotFound(_))
        ));

        // The deletion itself can still be audited
        assert!(store
            .append_audit(&id, "producer-1", AuditAction::ContractDeleted, json!({}))
            .is_ok());
        assert!(store
            .append_audit(&id, "producer-1", AuditAction::ContractViewed, json!({}))
            .is_err());
    }

    #[test]
    fn test_static_identity() {
        assert_eq!(StaticIdentity::user("u1").acting_user().as_deref(), Some("u1"));
        assert_eq!(StaticIdentity::anonymous().acting_user(), None);
    }
}
