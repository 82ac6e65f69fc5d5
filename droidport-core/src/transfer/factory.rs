use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{PortError, Result};
use crate::transfer::TransferChannel;
use crate::transfer::adb::AdbChannel;
use crate::transfer::mirror::MirrorChannel;

pub enum Backend {
    Adb,
    Mirror,
}

#[derive(Clone, Debug, Default)]
pub struct ChannelParams {
    pub adb_path: PathBuf,
    pub serial: String,
    pub mirror_root: Option<PathBuf>,
}

pub fn open_channel(backend: Backend, p: ChannelParams) -> Result<Arc<dyn TransferChannel>> {
    match backend {
        Backend::Adb => {
            if p.serial.trim().is_empty() {
                return Err(PortError::Config("adb transfer needs a device serial".into()));
            }
            Ok(Arc::new(AdbChannel::new(p.adb_path, p.serial)))
        }
        Backend::Mirror => {
            let root = p
                .mirror_root
                .ok_or_else(|| PortError::Config("mirror transfer needs a root directory".into()))?;
            Ok(Arc::new(MirrorChannel::new(root)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adb_requires_serial() {
        let res = open_channel(Backend::Adb, ChannelParams::default());
        assert!(matches!(res, Err(PortError::Config(_))));
        let ch = open_channel(
            Backend::Adb,
            ChannelParams {
                adb_path: "adb".into(),
                serial: "emulator-5554".into(),
                mirror_root: None,
            },
        )
        .unwrap();
        assert!(ch.describe().contains("emulator-5554"));
    }

    #[test]
    fn mirror_requires_root() {
        assert!(open_channel(Backend::Mirror, ChannelParams::default()).is_err());
        let dir = tempfile::tempdir().unwrap();
        let ch = open_channel(
            Backend::Mirror,
            ChannelParams {
                mirror_root: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(ch.describe().starts_with("mirror:"));
    }
}
