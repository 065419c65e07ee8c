//! Document signing core logic
//!
//! This crate provides contract annotation and signature capture:
//! placing fields on document pages, filling them through the annotation
//! overlay, capturing drawn or typed signatures, and the contract workflows
//! that persist and audit the result.
//!
//! Page rendering, storage and identity are supplied by the host through the
//! [`DocumentRenderer`], [`ContractStore`] and [`IdentityProvider`] traits.

pub mod capture;
pub mod config;
pub mod coords;
pub mod editor;
pub mod error;
pub mod overlay;
pub mod signing;
pub mod store;
pub mod viewer;

pub use capture::{CaptureKind, CaptureMode, CaptureSession, CaptureSurface, TypedSignatureRenderer};
pub use config::DocsignConfig;
pub use coords::{document_to_viewport, viewport_to_document, Rotation, ScreenRect};
pub use editor::FieldPlacementEditor;
pub use error::{DocsignError, Result};
pub use overlay::{AnnotationOverlay, Interaction, OverlayRegion, RegionContent, VisualState};
pub use signing::{
    complete_contract, create_contract, delete_contract, open_for_signing, save_form, send_contract,
    SigningReceipt, DEFAULT_EXPIRY_DAYS,
};
pub use store::{
    ContractStore, IdentityProvider, InMemoryStore, SignatureRecord, StaticIdentity, StoreError,
};
pub use viewer::{DocumentRenderer, RenderedPage, ViewState, ViewerState};

// Re-export the shared data model
pub use shared_types::{
    AuditAction, AuditChain, AuditEntry, Contract, ContractAnalytics, ContractStatus,
    ContractType, FieldError, FieldPatch, FieldType, FieldValue, FormField, Point,
};

/// Version of the docsign-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
