use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PortError, Result};
use crate::transfer::{TransferChannel, TransferOutcome};

/// Transfers through the Android debug bridge for one attached device.
pub struct AdbChannel {
    adb: PathBuf,
    serial: String,
}

impl AdbChannel {
    pub fn new(adb: impl Into<PathBuf>, serial: impl Into<String>) -> Self {
        Self {
            adb: adb.into(),
            serial: serial.into(),
        }
    }

    async fn run<I, S>(&self, args: I) -> TransferOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.adb);
        command.arg("-s").arg(&self.serial).args(args);
        match capture(command).await {
            Ok((true, text)) => TransferOutcome::ok(text),
            Ok((false, text)) => TransferOutcome::failed(text),
            Err(e) => TransferOutcome::failed(format!("failed to run {}: {e}", self.adb.display())),
        }
    }
}

/// Run to completion, returning exit success and merged stdout/stderr.
async fn capture(mut command: Command) -> std::io::Result<(bool, String)> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let output = command.output().await?;
    let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(stderr);
    }
    Ok((output.status.success(), text))
}

/// Quote for the device-side `sh` that `adb shell` hands its arguments to.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[async_trait]
impl TransferChannel for AdbChannel {
    fn describe(&self) -> String {
        format!("adb:{}", self.serial)
    }

    async fn push(&self, src: &Path, dst: &str) -> TransferOutcome {
        debug!(src = %src.display(), dst, "adb push");
        self.run([OsStr::new("push"), src.as_os_str(), OsStr::new(dst)])
            .await
    }

    async fn mkdir(&self, path: &str) -> TransferOutcome {
        debug!(path, "adb mkdir");
        let quoted = shell_quote(path);
        self.run(["shell", "mkdir", "-p", quoted.as_str()]).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial: String,
    pub product: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
}

impl DeviceInfo {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.model.as_deref())
            .unwrap_or(&self.serial)
    }
}

/// Parse `adb devices -l`, keeping only devices in the `device` state.
pub fn parse_devices(output: &str) -> Vec<DeviceInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            if fields.next()? != "device" {
                return None;
            }
            let mut info = DeviceInfo {
                serial: serial.to_string(),
                product: None,
                model: None,
                name: None,
            };
            for field in fields {
                if let Some(v) = field.strip_prefix("product:") {
                    info.product = Some(v.to_string());
                } else if let Some(v) = field.strip_prefix("model:") {
                    info.model = Some(v.to_string());
                }
            }
            Some(info)
        })
        .collect()
}

/// Attached devices with their user-visible names where the device reports one.
pub async fn list_devices(adb: &Path) -> Result<Vec<DeviceInfo>> {
    let mut command = Command::new(adb);
    command.args(["devices", "-l"]);
    let (ok, text) = capture(command)
        .await
        .map_err(|e| PortError::Transfer(format!("failed to run {}: {e}", adb.display())))?;
    if !ok {
        return Err(PortError::Transfer(text));
    }
    let mut devices = parse_devices(&text);
    for device in &mut devices {
        let mut command = Command::new(adb);
        command.args(["-s", &device.serial, "shell", "settings", "get", "global", "device_name"]);
        match capture(command).await {
            Ok((true, name)) if !name.is_empty() && name != "null" => device.name = Some(name),
            Ok(_) => {}
            Err(e) => warn!(serial = %device.serial, "device name lookup failed: {e}"),
        }
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_listing() {
        let out = "List of devices attached\n\
                   R58M123ABC             device usb:1-1 product:beyond1 model:SM_G973F device:beyond1 transport_id:1\n\
                   emulator-5554          offline transport_id:2\n\
                   0123456789ABCDEF       unauthorized usb:1-2 transport_id:3\n\
                   \n";
        let devices = parse_devices(out);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "R58M123ABC");
        assert_eq!(devices[0].product.as_deref(), Some("beyond1"));
        assert_eq!(devices[0].model.as_deref(), Some("SM_G973F"));
        assert_eq!(devices[0].display_name(), "SM_G973F");
    }

    #[test]
    fn quotes_for_device_shell() {
        assert_eq!(shell_quote("/sdcard/My Files"), "'/sdcard/My Files'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn missing_binary_is_a_failed_outcome() {
        let ch = AdbChannel::new("/nonexistent/adb-binary", "serial");
        let outcome = ch.mkdir("/sdcard/Notes").await;
        assert!(!outcome.ok);
        assert!(outcome.message.contains("failed to run"));
    }
}
