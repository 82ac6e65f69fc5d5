use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::rules::is_plain_relative;
use crate::error::{PortError, Result};
use crate::mapping::AppIdentifierMapping;

pub const ADB_ENV: &str = "DROIDPORT_ADB";

/// Where each category lands on the target device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLayout {
    pub media_dir: String,
    pub documents_root: String,
    pub notes_dir: String,
    pub notes_archive: String,
    pub app_data_root: String,
    /// Appended to `<app_data_root>/<package>`.
    pub app_data_suffix: String,
}

impl Default for DeviceLayout {
    fn default() -> Self {
        Self {
            media_dir: "/sdcard/Pictures".into(),
            documents_root: "/sdcard".into(),
            notes_dir: "/sdcard/Notes".into(),
            notes_archive: "/sdcard/Documents/PureNotes.json".into(),
            app_data_root: "/sdcard/Android/data".into(),
            app_data_suffix: "files".into(),
        }
    }
}

impl DeviceLayout {
    pub fn app_root(&self, package: &str) -> String {
        let root = join_device(&self.app_data_root, package);
        if self.app_data_suffix.is_empty() {
            root
        } else {
            join_device(&root, &self.app_data_suffix)
        }
    }
}

/// Join a device-side directory and a relative path with exactly one `/`.
pub fn join_device(dir: &str, rel: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let rel = rel.trim_start_matches('/');
    if dir.is_empty() {
        format!("/{rel}")
    } else {
        format!("{dir}/{rel}")
    }
}

/// Like [`join_device`], but refuses a relative part that could leave `dir`.
pub fn join_device_checked(dir: &str, rel: &str) -> Result<String> {
    if !is_plain_relative(rel) {
        return Err(PortError::UnsafePath(rel.to_string()));
    }
    Ok(join_device(dir, rel))
}

/// Parent directory of a device-side path, if it has one.
pub fn device_parent(path: &str) -> Option<&str> {
    let (parent, _) = path.rsplit_once('/')?;
    (!parent.is_empty()).then_some(parent)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub adb_path: String,
    pub layout: DeviceLayout,
    /// Merged over the built-in identifier table.
    pub app_mappings: BTreeMap<String, String>,
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adb_path: "adb".into(),
            layout: DeviceLayout::default(),
            app_mappings: BTreeMap::new(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Defaults when `path` is None; the adb env override applies either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(adb) = std::env::var(ADB_ENV) {
            if !adb.trim().is_empty() {
                settings.adb_path = adb;
            }
        }
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PortError::Config(format!("settings file {}: {e}", path.display())))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn mapping(&self) -> AppIdentifierMapping {
        AppIdentifierMapping::builtin().with_overrides(&self.app_mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"layout": {"media_dir": "/sdcard/DCIM/Restored"}, "app_mappings": {"a.b": "c.d"}}"#,
        )
        .unwrap();
        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.adb_path, "adb");
        assert_eq!(s.layout.media_dir, "/sdcard/DCIM/Restored");
        assert_eq!(s.layout.notes_dir, "/sdcard/Notes");
        assert_eq!(s.mapping().resolve("a.b"), Some("c.d"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Settings::from_file(Path::new("/nonexistent/droidport.json")).unwrap_err();
        assert!(matches!(err, PortError::Config(_)));
    }

    #[test]
    fn device_path_helpers() {
        assert_eq!(join_device("/sdcard/", "/Notes/a.txt"), "/sdcard/Notes/a.txt");
        assert_eq!(join_device("", "x"), "/x");
        assert_eq!(device_parent("/sdcard/Download/a.zip"), Some("/sdcard/Download"));
        assert_eq!(device_parent("/a"), None);
        assert_eq!(device_parent("a"), None);
        assert_eq!(
            join_device_checked("/sdcard", "Download/a.zip").unwrap(),
            "/sdcard/Download/a.zip"
        );
        assert!(matches!(
            join_device_checked("/sdcard/Android/data/p/files", "../../../../data/local/tmp/x"),
            Err(PortError::UnsafePath(_))
        ));
        let layout = DeviceLayout::default();
        assert_eq!(
            layout.app_root("com.example.android"),
            "/sdcard/Android/data/com.example.android/files"
        );
    }
}
