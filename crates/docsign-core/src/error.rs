use shared_types::{AuditError, FieldError, FieldType};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum DocsignError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("nothing has been captured yet")]
    EmptyCapture,

    #[error("capture surface must have a positive size, got {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },

    #[error("failed to encode capture: {0}")]
    Encode(String),

    #[error("no embedded font is available for typed signatures")]
    FontUnavailable,

    #[error("date format {0:?} cannot format a calendar date")]
    DateFormat(String),

    #[error("no capture is open")]
    NoActiveCapture,

    #[error("field {field_id} is a {field_type} field and cannot be filled this way")]
    WrongInteraction {
        field_id: String,
        field_type: FieldType,
    },

    #[error("contract {contract_id} has incomplete required fields: {missing:?}")]
    IncompleteFields {
        contract_id: String,
        missing: Vec<String>,
    },

    #[error("contract {0} has no fields to sign")]
    NothingToSign(String),

    #[error("contract {0} has expired")]
    ContractExpired(String),

    #[error("contract {0} is already signed")]
    AlreadySigned(String),

    #[error("contract {contract_id} cannot be sent: {reason}")]
    NotSendable { contract_id: String, reason: String },

    #[error("contract {0} is not awaiting a signature")]
    NotAwaitingSignature(String),

    #[error("expiry of {days} days is out of range")]
    ExpiryOutOfRange { days: u32 },

    #[error("no acting user is available")]
    NoIdentity,

    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

pub type Result<T> = std::result::Result<T, DocsignError>;
