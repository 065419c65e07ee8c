//! Contract records, status vocabulary and dashboard analytics

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Icon, Presentation, Tone};

/// Number of contracts listed under recent activity
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Sent,
    Pending,
    Signed,
    Completed,
    Expired,
}

impl ContractStatus {
    pub fn presentation(self) -> Presentation {
        match self {
            ContractStatus::Draft => Presentation::new(Icon::Document, Tone::Gray, "Draft"),
            ContractStatus::Sent => Presentation::new(Icon::Clock, Tone::Blue, "Sent"),
            ContractStatus::Pending => Presentation::new(Icon::Alert, Tone::Amber, "Pending"),
            ContractStatus::Signed => Presentation::new(Icon::Check, Tone::Green, "Signed"),
            ContractStatus::Completed => Presentation::new(Icon::Check, Tone::Green, "Completed"),
            ContractStatus::Expired => Presentation::new(Icon::Cross, Tone::Red, "Expired"),
        }
    }

    /// Signed or completed
    pub fn is_signed(self) -> bool {
        matches!(self, ContractStatus::Signed | ContractStatus::Completed)
    }

    /// Sent to a client and waiting on their signature
    pub fn is_awaiting_signature(self) -> bool {
        matches!(self, ContractStatus::Sent | ContractStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Performer,
    Management,
    Other,
}

impl ContractType {
    pub fn tone(self) -> Tone {
        match self {
            ContractType::Performer => Tone::Purple,
            ContractType::Management => Tone::Blue,
            ContractType::Other => Tone::Gray,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub contract_type: ContractType,
    pub status: ContractStatus,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
}

impl Contract {
    /// A new draft contract owned by `created_by`
    pub fn new(title: &str, contract_type: ContractType, created_by: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            contract_type,
            status: ContractStatus::Draft,
            file_url: None,
            client_id: None,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            expires_at: None,
            signed_at: None,
        }
    }

    /// True once `expires_at` lies in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    /// Mark the contract sent, expiring `expiry_days` after `now`
    ///
    /// Returns `None` and leaves the contract untouched when the expiry
    /// falls outside the representable date range.
    pub fn send(&mut self, now: DateTime<Utc>, expiry_days: u32) -> Option<DateTime<Utc>> {
        let expires_at = expiry_from(now, expiry_days)?;
        self.status = ContractStatus::Sent;
        self.expires_at = Some(expires_at);
        Some(expires_at)
    }

    pub fn mark_signed(&mut self, now: DateTime<Utc>) {
        self.status = ContractStatus::Signed;
        self.signed_at = Some(now);
    }
}

/// Expiry timestamp `days` whole days after `now`
pub fn expiry_from(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    now.checked_add_signed(Duration::try_days(i64::from(days))?)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub performer: usize,
    pub management: usize,
    pub other: usize,
}

/// Dashboard statistics over a producer's contracts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractAnalytics {
    pub total: usize,
    pub signed: usize,
    pub pending: usize,
    pub expired: usize,
    pub draft: usize,
    /// Signed share of all contracts, as a rounded percentage
    pub signature_rate: u32,
    pub type_breakdown: TypeBreakdown,
    /// Ids of the most recently signed contracts, newest first
    pub recent_activity: Vec<String>,
}

impl ContractAnalytics {
    pub fn from_contracts(contracts: &[Contract]) -> Self {
        let mut analytics = ContractAnalytics {
            total: contracts.len(),
            ..Default::default()
        };

        for contract in contracts {
            match contract.status {
                ContractStatus::Signed | ContractStatus::Completed => analytics.signed += 1,
                ContractStatus::Sent | ContractStatus::Pending => analytics.pending += 1,
                ContractStatus::Expired => analytics.expired += 1,
                ContractStatus::Draft => analytics.draft += 1,
            }
            match contract.contract_type {
                ContractType::Performer => analytics.type_breakdown.performer += 1,
                ContractType::Management => analytics.type_breakdown.management += 1,
                ContractType::Other => analytics.type_breakdown.other += 1,
            }
        }

        analytics.signature_rate = percentage(analytics.signed, analytics.total);

        let mut signed: Vec<(&DateTime<Utc>, &str)> = contracts
            .iter()
            .filter_map(|c| c.signed_at.as_ref().map(|at| (at, c.id.as_str())))
            .collect();
        signed.sort_by(|a, b| b.0.cmp(a.0));
        analytics.recent_activity = signed
            .into_iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|(_, id)| id.to_string())
            .collect();

        analytics
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}
