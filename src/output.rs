//! Rendering of reward events for the terminal or for scripts.

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::Serialize;

use crate::core::StrategyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    Text,
    /// One JSON object per reward, for scripting
    Json,
}

/// A poll cycle that decided to reward the user.
#[derive(Debug, Clone, Serialize)]
pub struct RewardEvent {
    pub timestamp: DateTime<Local>,
    pub strategy: StrategyKind,
    pub provider: String,
    pub diff_lines: usize,
    pub swiped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RewardEvent {
    pub fn new(strategy: StrategyKind, provider: &str, diff_lines: usize) -> Self {
        Self {
            timestamp: Local::now(),
            strategy,
            provider: provider.to_string(),
            diff_lines,
            swiped: true,
            error: None,
        }
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.swiped = false;
        self.error = Some(error.to_string());
        self
    }
}

impl OutputFormat {
    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }

    pub fn render(&self, event: &RewardEvent) -> String {
        match self {
            OutputFormat::Json => serde_json::to_string(event)
                .unwrap_or_else(|err| format!("{{\"error\":\"{}\"}}", err)),
            OutputFormat::Text => {
                let time = event.timestamp.format("%H:%M:%S");
                if event.swiped {
                    format!("[{}] New code detected! Swiping for dopamine...", time)
                } else {
                    format!("[{}] New code detected, but the swipe failed.", time)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_render() {
        let event = RewardEvent::new(StrategyKind::Exact, "adb", 3);
        let line = OutputFormat::Text.render(&event);
        assert!(line.starts_with('['));
        assert!(line.ends_with("New code detected! Swiping for dopamine..."));

        let failed = OutputFormat::Text.render(&event.failed("boom"));
        assert!(failed.contains("swipe failed"));
    }

    #[test]
    fn test_json_render() {
        let event = RewardEvent::new(StrategyKind::LineCount, "adb", 12);
        let value: serde_json::Value =
            serde_json::from_str(&OutputFormat::Json.render(&event)).expect("valid json");

        assert_eq!(value["strategy"], "linecount");
        assert_eq!(value["provider"], "adb");
        assert_eq!(value["diff_lines"], 12);
        assert_eq!(value["swiped"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_json_render_failure() {
        let event = RewardEvent::new(StrategyKind::Exact, "adb", 1).failed("device offline");
        let value: serde_json::Value =
            serde_json::from_str(&OutputFormat::Json.render(&event)).expect("valid json");

        assert_eq!(value["swiped"], false);
        assert_eq!(value["error"], "device offline");
    }
}
