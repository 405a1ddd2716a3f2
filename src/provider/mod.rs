//! Swipe providers: the external channel that delivers the reward.

pub mod adb;

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Code4SwipeConfig;
use crate::error::ProviderError;

pub use adb::{AdbDevice, AdbProvider};

/// A channel that can perform the reward gesture.
#[async_trait]
pub trait SwipeProvider: Send + Sync {
    /// Short name used in logs and output.
    fn name(&self) -> &'static str;

    /// Cheap check of the external channel. Called once at startup.
    async fn check_availability(&self) -> bool;

    /// Perform the reward action.
    async fn trigger(&self) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Android Debug Bridge: `adb shell input swipe`
    Adb,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Adb => "adb",
        }
    }

    /// Build the concrete provider for this kind.
    pub fn build(&self, config: &Code4SwipeConfig) -> Box<dyn SwipeProvider> {
        match self {
            ProviderKind::Adb => Box::new(AdbProvider::new(&config.adb)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
impl<P: SwipeProvider + ?Sized> SwipeProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn check_availability(&self) -> bool {
        (**self).check_availability().await
    }

    async fn trigger(&self) -> Result<(), ProviderError> {
        (**self).trigger().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_adb_provider() {
        let provider = ProviderKind::Adb.build(&Code4SwipeConfig::default());
        assert_eq!(provider.name(), "adb");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ProviderKind::from_str("ADB", true), Ok(ProviderKind::Adb));
        assert!(ProviderKind::from_str("usb-hid", true).is_err());
    }
}
