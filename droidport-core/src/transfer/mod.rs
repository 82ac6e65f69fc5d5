// droidport_core/src/transfer/mod.rs
use async_trait::async_trait;
use std::path::Path;

pub mod adb;
pub mod factory;
pub mod mirror;

/// Result of one channel call: success flag plus whatever diagnostics the
/// channel produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    pub ok: bool,
    pub message: String,
}

impl TransferOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Push/mkdir capability of a target device. Both operations are expected to
/// be idempotent: `mkdir` tolerates existing directories and `push` overwrites.
#[async_trait]
pub trait TransferChannel: Send + Sync {
    fn describe(&self) -> String;

    async fn push(&self, src: &Path, dst: &str) -> TransferOutcome;

    async fn mkdir(&self, path: &str) -> TransferOutcome;
}
