pub mod audit;
pub mod contract;
pub mod field;
pub mod types;

pub use audit::{AuditAction, AuditChain, AuditEntry, AuditError};
pub use contract::{Contract, ContractAnalytics, ContractStatus, ContractType};
pub use field::{FieldError, FieldPatch, FieldType, FieldValue, FormField, Point};
pub use types::{Icon, Presentation, Tone};
