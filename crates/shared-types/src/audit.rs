//! Tamper-evident audit trail for contract events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Icon, Presentation, Tone};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuditError {
    #[error("unknown audit action: {0}")]
    UnknownAction(String),

    #[error("audit chain broken at entry {index}: expected previous hash {expected:?}, got {found:?}")]
    ChainBroken {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("audit entry {index} does not match its recorded hash")]
    EntryTampered { index: usize },

    #[error("audit serialization failed: {0}")]
    Serialization(String),
}

/// Types of auditable contract events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ContractCreated,
    ContractSent,
    ContractSigned,
    ContractViewed,
    ContractDeleted,
    ContractUpdated,
}

impl AuditAction {
    pub const ALL: [AuditAction; 6] = [
        AuditAction::ContractCreated,
        AuditAction::ContractSent,
        AuditAction::ContractSigned,
        AuditAction::ContractViewed,
        AuditAction::ContractDeleted,
        AuditAction::ContractUpdated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::ContractCreated => "contract_created",
            AuditAction::ContractSent => "contract_sent",
            AuditAction::ContractSigned => "contract_signed",
            AuditAction::ContractViewed => "contract_viewed",
            AuditAction::ContractDeleted => "contract_deleted",
            AuditAction::ContractUpdated => "contract_updated",
        }
    }

    /// Icon, tone and display text for this action
    pub fn presentation(self) -> Presentation {
        match self {
            AuditAction::ContractCreated => {
                Presentation::new(Icon::Plus, Tone::Blue, "Created contract")
            }
            AuditAction::ContractSent => Presentation::new(Icon::Send, Tone::Purple, "Sent contract"),
            AuditAction::ContractSigned => {
                Presentation::new(Icon::Pen, Tone::Green, "Signed contract")
            }
            AuditAction::ContractViewed => {
                Presentation::new(Icon::Eye, Tone::Gray, "Viewed contract")
            }
            AuditAction::ContractDeleted => {
                Presentation::new(Icon::Trash, Tone::Red, "Deleted contract")
            }
            AuditAction::ContractUpdated => {
                Presentation::new(Icon::Document, Tone::Amber, "Updated contract")
            }
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AuditError::UnknownAction(s.to_string()))
    }
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub contract_id: String,
    pub user_id: String,
    pub action: AuditAction,
    /// Opaque detail payload supplied by the caller
    #[serde(default)]
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub previous_hash: Option<String>,
    /// Hash of this entry taken when it was created
    pub entry_hash: String,
}

impl AuditEntry {
    pub fn new(
        contract_id: &str,
        user_id: &str,
        action: AuditAction,
        details: Value,
        previous_hash: Option<String>,
    ) -> Self {
        let mut entry = Self {
            id: Uuid::new_v4().to_string(),
            contract_id: contract_id.to_string(),
            user_id: user_id.to_string(),
            action,
            details,
            created_at: Utc::now(),
            previous_hash,
            entry_hash: String::new(),
        };
        entry.entry_hash = entry.compute_hash();
        entry
    }

    /// Compute the hash of this entry's content (for chain linking).
    /// `entry_hash` itself is not part of the digest.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(self.created_at.to_rfc3339().as_bytes());
        hasher.update(self.action.as_str().as_bytes());
        hasher.update(self.contract_id.as_bytes());
        hasher.update(self.user_id.as_bytes());
        hasher.update(self.details.to_string().as_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Append-only chain of audit entries with hash linking
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub entries: Vec<AuditEntry>,
}

impl AuditChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the hash of the last entry (for linking)
    pub fn last_hash(&self) -> Option<String> {
        self.entries.last().map(AuditEntry::compute_hash)
    }

    /// Append an entry, automatically linking to the previous hash
    pub fn append(
        &mut self,
        contract_id: &str,
        user_id: &str,
        action: AuditAction,
        details: Value,
    ) -> &AuditEntry {
        let entry = AuditEntry::new(contract_id, user_id, action, details, self.last_hash());
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Verify the integrity of the chain: every entry still matches its
    /// recorded hash and links to its predecessor
    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected: Option<String> = None;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.previous_hash != expected {
                return Err(AuditError::ChainBroken {
                    index,
                    expected,
                    found: entry.previous_hash.clone(),
                });
            }
            let hash = entry.compute_hash();
            if entry.entry_hash != hash {
                return Err(AuditError::EntryTampered { index });
            }
            expected = Some(hash);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with the given action, oldest first
    pub fn filter_by_action(&self, action: AuditAction) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.action == action).collect()
    }

    pub fn for_contract(&self, contract_id: &str) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.contract_id == contract_id)
            .collect()
    }

    /// Actions present in the chain, in first-seen order
    pub fn distinct_actions(&self) -> Vec<AuditAction> {
        let mut actions = Vec::new();
        for entry in &self.entries {
            if !actions.contains(&entry.action) {
                actions.push(entry.action);
            }
        }
        actions
    }

    /// Newest `limit` entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        serde_json::to_string_pretty(self).map_err(|e| AuditError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        serde_json::from_str(json).map_err(|e| AuditError::Serialization(e.to_string()))
    }

    /// Generate a summary for display
    pub fn summary(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "[{}] {} - {}",
                    e.created_at.format("%Y-%m-%d"),
                    e.user_id,
                    e.action.presentation().text
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chain_integrity() {
        let mut chain = AuditChain::new();

        chain.append("contract-1", "alice", AuditAction::ContractCreated, json!({"title": "Tour"}));
        chain.append("contract-1", "alice", AuditAction::ContractSent, Value::Null);
        chain.append(
            "contract-1",
            "bob",
            AuditAction::ContractSigned,
            json!({"fields_completed": 3}),
        );

        assert!(chain.verify().is_ok());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.entries[0].previous_hash, None);
    }

    #[test]
    fn test_chain_tamper_detection() {
        let mut chain = AuditChain::new();

        chain.append("contract-1", "alice", AuditAction::ContractCreated, Value::Null);
        chain.append("contract-1", "bob", AuditAction::ContractSigned, Value::Null);

        chain.entries[0].user_id = "mallory".to_string();
        assert_eq!(chain.verify(), Err(AuditError::EntryTampered { index: 0 }));

        // Re-sealing the edited entry still breaks the link from its successor
        chain.entries[0].entry_hash = chain.entries[0].compute_hash();
        assert!(matches!(
            chain.verify(),
            Err(AuditError::ChainBroken { index: 1, .. })
        ));
    }

    #[test]
    fn test_last_entry_tamper_detection() {
        let mut chain = AuditChain::new();

        chain.append("contract-1", "alice", AuditAction::ContractSent, Value::Null);
        chain.append(
            "contract-1",
            "bob",
            AuditAction::ContractSigned,
            json!({"fields_completed": 3}),
        );

        chain.entries[1].details = json!({"fields_completed": 0});
        chain.entries[1].user_id = "mallory".to_string();
        assert_eq!(chain.verify(), Err(AuditError::EntryTampered { index: 1 }));

        chain.entries[1].details = json!({"fields_completed": 3});
        chain.entries[1].user_id = "bob".to_string();
        chain.entries[1].action = AuditAction::ContractDeleted;
        assert_eq!(chain.verify(), Err(AuditError::EntryTampered { index: 1 }));
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert_eq!(
            "contract_signed".parse::<AuditAction>(),
            Ok(AuditAction::ContractSigned)
        );
        assert_eq!(
            "contract_archived".parse::<AuditAction>(),
            Err(AuditError::UnknownAction("contract_archived".to_string()))
        );
        assert!(serde_json::from_str::<AuditAction>("\"contract_archived\"").is_err());
    }

    #[test]
    fn test_presentation_table() {
        let signed = AuditAction::ContractSigned.presentation();
        assert_eq!(signed.icon, Icon::Pen);
        assert_eq!(signed.tone, Tone::Green);
        assert_eq!(signed.text, "Signed contract");

        assert_eq!(AuditAction::ContractDeleted.presentation().tone, Tone::Red);
        assert_eq!(AuditAction::ContractSent.presentation().icon, Icon::Send);
    }

    #[test]
    fn test_filters() {
        let mut chain = AuditChain::new();
        chain.append("c1", "alice", AuditAction::ContractViewed, Value::Null);
        chain.append("c2", "alice", AuditAction::ContractCreated, Value::Null);
        chain.append("c1", "bob", AuditAction::ContractViewed, Value::Null);
        chain.append("c1", "bob", AuditAction::ContractSigned, Value::Null);

        assert_eq!(chain.filter_by_action(AuditAction::ContractViewed).len(), 2);
        assert_eq!(chain.for_contract("c1").len(), 3);
        assert_eq!(
            chain.distinct_actions(),
            vec![
                AuditAction::ContractViewed,
                AuditAction::ContractCreated,
                AuditAction::ContractSigned
            ]
        );

        let recent = chain.recent(2);
        assert_eq!(recent[0].action, AuditAction::ContractSigned);
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_summary_uses_display_text() {
        let mut chain = AuditChain::new();
        chain.append("c1", "alice", AuditAction::ContractSent, Value::Null);
        let summary = chain.summary();
        assert!(summary[0].ends_with("alice - Sent contract"));
    }
}
