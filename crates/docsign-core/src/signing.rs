//! Contract workflows
//!
//! Each workflow resolves the acting user, applies its change through the
//! [`ContractStore`], and appends one audit entry describing it.

use chrono::{DateTime, Utc};
use serde_json::json;
use shared_types::field::ensure_unique_ids;
use shared_types::{AuditAction, AuditEntry, Contract, ContractStatus, FormField};
use tracing::{info, instrument, warn};

use crate::config::DocsignConfig;
use crate::error::{DocsignError, Result};
use crate::overlay::AnnotationOverlay;
use crate::store::{ContractStore, IdentityProvider, SignatureRecord};

/// Days until a sent contract expires unless the producer picks otherwise
pub const DEFAULT_EXPIRY_DAYS: u32 = 30;

/// Result of a successful [`complete_contract`]
#[derive(Debug, Clone)]
pub struct SigningReceipt {
    pub contract: Contract,
    pub fields_completed: usize,
    pub audit_entry: AuditEntry,
}

fn acting_user(identity: &dyn IdentityProvider) -> Result<String> {
    identity.acting_user().ok_or(DocsignError::NoIdentity)
}

/// Store a new draft contract
#[instrument(skip(store, identity, contract), fields(contract_id = %contract.id))]
pub fn create_contract<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract: &Contract,
) -> Result<AuditEntry> {
    let user = acting_user(identity)?;
    store.insert_contract(contract.clone())?;
    let entry = store.append_audit(
        &contract.id,
        &user,
        AuditAction::ContractCreated,
        json!({ "title": contract.title, "contract_type": contract.contract_type }),
    )?;
    Ok(entry)
}

/// Persist the placement editor's fields for a contract
#[instrument(skip(store, identity, fields), fields(count = fields.len()))]
pub fn save_form<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract_id: &str,
    fields: &[FormField],
) -> Result<AuditEntry> {
    let user = acting_user(identity)?;
    ensure_unique_ids(fields)?;
    store.contract(contract_id)?;

    store.save_fields(contract_id, fields)?;
    info!("Saved {} form fields", fields.len());

    let entry = store.append_audit(
        contract_id,
        &user,
        AuditAction::ContractUpdated,
        json!({ "fields": fields.len() }),
    )?;
    Ok(entry)
}

/// Send a draft contract to its client
///
/// # Errors
///
/// [`DocsignError::NotSendable`] unless the contract is a draft with a
/// client, and [`DocsignError::ExpiryOutOfRange`] when the expiry date cannot
/// be represented. The stored contract is unchanged on error.
#[instrument(skip(store, identity, message))]
pub fn send_contract<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract_id: &str,
    expiry_days: u32,
    message: &str,
    now: DateTime<Utc>,
) -> Result<Contract> {
    let user = acting_user(identity)?;
    let mut contract = store.contract(contract_id)?;
    let not_sendable = |reason: &str| DocsignError::NotSendable {
        contract_id: contract_id.to_string(),
        reason: reason.to_string(),
    };
    if contract.status != ContractStatus::Draft {
        return Err(not_sendable(&format!("status is {:?}", contract.status)));
    }
    if contract.client_id.is_none() {
        return Err(not_sendable("no client assigned"));
    }
    let expires_at = contract
        .send(now, expiry_days)
        .ok_or(DocsignError::ExpiryOutOfRange { days: expiry_days })?;
    store.update_contract(&contract)?;

    store.append_audit(
        contract_id,
        &user,
        AuditAction::ContractSent,
        json!({
            "client_id": contract.client_id,
            "expires_at": expires_at.to_rfc3339(),
            "message": message,
        }),
    )?;
    info!(%expires_at, "Contract sent");
    Ok(contract)
}

/// Load a contract's fields into an editable overlay for its signer
#[instrument(skip(store, identity, config))]
pub fn open_for_signing<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract_id: &str,
    config: DocsignConfig,
    now: DateTime<Utc>,
) -> Result<AnnotationOverlay> {
    let user = acting_user(identity)?;
    let contract = store.contract(contract_id)?;
    let editable = contract.status.is_awaiting_signature() && !contract.is_expired(now);
    let fields = store.load_fields(contract_id)?;

    store.append_audit(contract_id, &user, AuditAction::ContractViewed, json!({}))?;
    AnnotationOverlay::new(fields, editable, config)
}

/// Finalise a contract once every required field is filled.
///
/// Completed fields are recorded as signature records before the contract is
/// marked signed, so a failure part-way leaves the contract unsigned.
#[instrument(skip(store, identity, fields), fields(count = fields.len()))]
pub fn complete_contract<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract_id: &str,
    fields: &[FormField],
    now: DateTime<Utc>,
) -> Result<SigningReceipt> {
    let user = acting_user(identity)?;
    let mut contract = store.contract(contract_id)?;

    if contract.is_expired(now) || contract.status == ContractStatus::Expired {
        warn!("Refusing to sign expired contract");
        return Err(DocsignError::ContractExpired(contract_id.to_string()));
    }
    if contract.status.is_signed() {
        return Err(DocsignError::AlreadySigned(contract_id.to_string()));
    }
    if !contract.status.is_awaiting_signature() {
        return Err(DocsignError::NotAwaitingSignature(contract_id.to_string()));
    }
    if fields.is_empty() {
        return Err(DocsignError::NothingToSign(contract_id.to_string()));
    }
    let missing: Vec<String> = fields
        .iter()
        .filter(|f| !f.is_satisfied())
        .map(|f| f.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(DocsignError::IncompleteFields {
            contract_id: contract_id.to_string(),
            missing,
        });
    }

    let mut fields_completed = 0;
    for field in fields.iter().filter(|f| f.completed) {
        let Some(value) = &field.value else {
            continue;
        };
        store.record_signature(SignatureRecord {
            contract_id: contract_id.to_string(),
            signer_id: user.clone(),
            field_id: field.id.clone(),
            field_type: field.field_type,
            signature_data: value.to_string(),
            signed_at: now,
        })?;
        fields_completed += 1;
    }

    contract.mark_signed(now);
    store.update_contract(&contract)?;

    let audit_entry = store.append_audit(
        contract_id,
        &user,
        AuditAction::ContractSigned,
        json!({ "title": contract.title, "fields_completed": fields_completed }),
    )?;
    info!(fields_completed, "Contract signed");

    Ok(SigningReceipt {
        contract,
        fields_completed,
        audit_entry,
    })
}

/// Delete a contract and its saved fields
#[instrument(skip(store, identity))]
pub fn delete_contract<S: ContractStore + ?Sized>(
    store: &mut S,
    identity: &dyn IdentityProvider,
    contract_id: &str,
) -> Result<AuditEntry> {
    let user = acting_user(identity)?;
    let contract = store.remove_contract(contract_id)?;

    let entry = store.append_audit(
        contract_id,
        &user,
        AuditAction::ContractDeleted,
        json!({ "title": contract.title }),
    )?;
    info!("Contract deleted");
    Ok(entry)
}
