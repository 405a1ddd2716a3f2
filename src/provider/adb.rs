use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info};

use super::SwipeProvider;
use crate::config::{AdbConfig, SwipeGesture};
use crate::error::ProviderError;
use crate::process::{display_command, run_command};

/// One line of `adb devices` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbDevice {
    pub serial: String,
    pub state: String,
}

impl AdbDevice {
    /// Attached, authorized and ready for commands.
    pub fn is_ready(&self) -> bool {
        self.state == "device"
    }
}

/// Parse the device table printed by `adb devices`.
pub fn parse_devices(output: &str) -> Vec<AdbDevice> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next()?;
            Some(AdbDevice {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// A swipe provider that uses the Android Debug Bridge.
pub struct AdbProvider {
    program: String,
    serial: Option<String>,
    gesture: SwipeGesture,
    timeout: Duration,
}

impl AdbProvider {
    pub fn new(config: &AdbConfig) -> Self {
        Self {
            program: config.program.clone(),
            serial: config.serial.clone(),
            gesture: config.swipe.clone(),
            timeout: config.timeout(),
        }
    }

    fn device_args(&self) -> Vec<String> {
        match &self.serial {
            Some(serial) => vec!["-s".to_string(), serial.clone()],
            None => Vec::new(),
        }
    }

    /// Full argument list for the swipe-up gesture.
    pub fn swipe_args(&self) -> Vec<String> {
        let mut args = self.device_args();
        args.extend(["shell", "input", "swipe"].iter().map(|s| s.to_string()));
        args.extend(self.gesture.to_args());
        args
    }

    fn has_ready_device(&self, devices: &[AdbDevice]) -> bool {
        devices
            .iter()
            .filter(|d| self.serial.as_ref().map_or(true, |s| &d.serial == s))
            .any(AdbDevice::is_ready)
    }
}

#[async_trait]
impl SwipeProvider for AdbProvider {
    fn name(&self) -> &'static str {
        "adb"
    }

    async fn check_availability(&self) -> bool {
        let args = vec!["devices".to_string()];

        let output = match run_command(&self.program, &args, self.timeout).await {
            Ok(output) => output,
            Err(err) => {
                error!("ADB check failed: {}", err);
                return false;
            }
        };

        let devices = parse_devices(&output.stdout);
        debug!("ADB devices: {:?}", devices);

        if self.has_ready_device(&devices) {
            info!("ADB check OK: {} device(s) attached", devices.len());
            return true;
        }

        match &self.serial {
            Some(serial) => error!("ADB device {} is not attached or not authorized", serial),
            None if devices.is_empty() => error!("No ADB devices attached"),
            None => error!("No authorized ADB device (found: {:?})", devices),
        }
        false
    }

    async fn trigger(&self) -> Result<(), ProviderError> {
        let args = self.swipe_args();
        let output = run_command(&self.program, &args, self.timeout).await?;

        // Older adb builds report some shell failures on a zero exit.
        if output.stderr.starts_with("error:") || output.stdout.starts_with("error:") {
            let message = if output.stderr.is_empty() { output.stdout.trim() } else { output.stderr.as_str() };
            return Err(ProviderError::Rejected(message.to_string()));
        }

        debug!("Swipe command executed successfully: {}", display_command(&self.program, &args));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;

    fn provider(serial: Option<&str>) -> AdbProvider {
        let config = AdbConfig {
            serial: serial.map(str::to_string),
            ..AdbConfig::default()
        };
        AdbProvider::new(&config)
    }

    #[test]
    fn test_parse_devices() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      List of devices attached\n\
                      emulator-5554\tdevice\n\
                      R58M123\tunauthorized\n\n";
        let devices = parse_devices(output);

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert!(devices[0].is_ready());
        assert!(!devices[1].is_ready());
    }

    #[test]
    fn test_parse_no_devices() {
        assert!(parse_devices("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_swipe_args_default_gesture() {
        assert_eq!(
            provider(None).swipe_args(),
            vec!["shell", "input", "swipe", "500", "1500", "500", "500", "100"]
        );
    }

    #[test]
    fn test_swipe_args_with_serial() {
        let args = provider(Some("R58M123")).swipe_args();
        assert_eq!(&args[..3], &["-s", "R58M123", "shell"]);
    }

    #[test]
    fn test_ready_device_selection() {
        let devices = parse_devices("List of devices attached\nA\tdevice\nB\toffline\n");

        assert!(provider(None).has_ready_device(&devices));
        assert!(provider(Some("A")).has_ready_device(&devices));
        assert!(!provider(Some("B")).has_ready_device(&devices));
        assert!(!provider(Some("C")).has_ready_device(&devices));
        assert!(!provider(None).has_ready_device(&[]));
    }

    #[tokio::test]
    async fn test_missing_adb_is_unavailable() {
        let config = AdbConfig {
            program: "code4swipe-missing-adb".to_string(),
            ..AdbConfig::default()
        };
        assert!(!AdbProvider::new(&config).check_availability().await);
    }

    #[tokio::test]
    async fn test_trigger_with_missing_adb_fails() {
        let config = AdbConfig {
            program: "code4swipe-missing-adb".to_string(),
            ..AdbConfig::default()
        };
        let err = AdbProvider::new(&config).trigger().await.unwrap_err();
        assert!(matches!(err, ProviderError::Command(CommandError::NotFound { .. })));
    }
}
