#![forbid(unsafe_code)]

pub mod error;

pub mod blob;
pub mod catalog;
pub mod classify;
pub mod codec;
pub mod config;
pub mod domain;
pub mod mapping;
pub mod notes;
pub mod restore;
pub mod session;
pub mod transfer;

// Re-exports: stable API surface
pub use classify::classify;
pub use config::{DeviceLayout, Settings};
pub use domain::{CatalogRecord, ClassifiedBackup, Note};
pub use error::{PortError, Result};
pub use mapping::AppIdentifierMapping;
pub use restore::{
    CancelToken, Category, CategoryOutcome, RestoreOrchestrator, RestoreReport, RestoreSelection,
    RestoreTarget,
};
pub use session::BackupSession;
pub use transfer::{TransferChannel, TransferOutcome};
