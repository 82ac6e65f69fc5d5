use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{PortError, Result};
use crate::transfer::{TransferChannel, TransferOutcome};

/// Materialises the device-side tree under a local directory. Device paths
/// are taken relative to `root`.
pub struct MirrorChannel {
    root: PathBuf,
}

impl MirrorChannel {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for a device path; rejects `..` and prefix components.
    pub fn local_path(&self, device_path: &str) -> Result<PathBuf> {
        let rel = Path::new(device_path.trim_start_matches('/'));
        let mut out = self.root.clone();
        for component in rel.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => return Err(PortError::UnsafePath(device_path.to_string())),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl TransferChannel for MirrorChannel {
    fn describe(&self) -> String {
        format!("mirror:{}", self.root.display())
    }

    async fn push(&self, src: &Path, dst: &str) -> TransferOutcome {
        let target = match self.local_path(dst) {
            Ok(t) => t,
            Err(e) => return TransferOutcome::failed(e.to_string()),
        };
        if let Some(parent) = target.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return TransferOutcome::failed(format!("{}: {e}", parent.display()));
            }
        }
        match tokio::fs::copy(src, &target).await {
            Ok(n) => {
                debug!(dst, bytes = n, "mirrored");
                TransferOutcome::ok(format!("{}: 1 file pushed, {n} bytes", src.display()))
            }
            Err(e) => TransferOutcome::failed(format!("{}: {e}", src.display())),
        }
    }

    async fn mkdir(&self, path: &str) -> TransferOutcome {
        match self.local_path(path) {
            Ok(dir) => match tokio::fs::create_dir_all(&dir).await {
                Ok(()) => TransferOutcome::ok(""),
                Err(e) => TransferOutcome::failed(format!("mkdir {path}: {e}")),
            },
            Err(e) => TransferOutcome::failed(e.to_string()),
        }
    }
}
