//! Analysis configuration types
//!
//! Names the events and correlation-id pattern that identify sync pulses and
//! propagating messages. Everything else about the input is inferred from the
//! records themselves.

use crate::types::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the synchronicity and propagation analyzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Event name that denotes a sync pulse
    #[serde(default = "default_sync_event")]
    pub sync_event: String,

    /// Correlation ids starting with this prefix are sync-class
    #[serde(default = "default_sync_prefix")]
    pub sync_prefix: String,

    /// Event name emitted by the device sending a message
    #[serde(default = "default_send_event")]
    pub send_event: String,

    /// Event name emitted by each device receiving a message
    #[serde(default = "default_receive_event")]
    pub receive_event: String,
}

fn default_sync_event() -> String {
    "Sync_Pulse".to_string()
}

fn default_sync_prefix() -> String {
    "SYNC".to_string()
}

fn default_send_event() -> String {
    "Message_Send".to_string()
}

fn default_receive_event() -> String {
    "Message_Receive".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sync_event: default_sync_event(),
            sync_prefix: default_sync_prefix(),
            send_event: default_send_event(),
            receive_event: default_receive_event(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default event names
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the sync pulse event name
    pub fn with_sync_event(mut self, name: impl Into<String>) -> Self {
        self.sync_event = name.into();
        self
    }

    /// Builder method: set the sync-class correlation id prefix
    pub fn with_sync_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sync_prefix = prefix.into();
        self
    }

    /// Builder method: set the send and receive event names
    pub fn with_message_events(
        mut self,
        send: impl Into<String>,
        receive: impl Into<String>,
    ) -> Self {
        self.send_event = send.into();
        self.receive_event = receive.into();
        self
    }

    /// Check if a correlation id belongs to a sync pulse
    pub fn is_sync_id(&self, correlation_id: &str) -> bool {
        correlation_id.starts_with(&self.sync_prefix)
    }

    /// Reject configurations the analyzers cannot interpret
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("sync_event", &self.sync_event),
            ("sync_prefix", &self.sync_prefix),
            ("send_event", &self.send_event),
            ("receive_event", &self.receive_event),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(AnalysisError::InvalidConfig(format!("{} must not be empty", field)));
            }
        }

        if self.send_event == self.receive_event {
            return Err(AnalysisError::InvalidConfig(format!(
                "send_event and receive_event are both '{}'",
                self.send_event
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::new();
        assert_eq!(config.sync_event, "Sync_Pulse");
        assert_eq!(config.send_event, "Message_Send");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AnalysisConfig::new()
            .with_sync_event("Frame_Sync")
            .with_sync_prefix("FS_")
            .with_message_events("Tx", "Rx");

        assert_eq!(config.sync_event, "Frame_Sync");
        assert!(config.is_sync_id("FS_12"));
        assert!(!config.is_sync_id("SYNC_12"));
        assert_eq!(config.receive_event, "Rx");
    }

    #[test]
    fn test_sync_id_recognition() {
        let config = AnalysisConfig::new();
        assert!(config.is_sync_id("SYNC_0"));
        assert!(!config.is_sync_id("MSG_0"));
        assert!(!config.is_sync_id("sync_0"));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = AnalysisConfig::new().with_sync_prefix("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_same_message_events() {
        let config = AnalysisConfig::new().with_message_events("Msg", "Msg");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Msg"));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "sync_prefix": "PULSE" }"#).unwrap();
        assert_eq!(config.sync_prefix, "PULSE");
        assert_eq!(config.sync_event, "Sync_Pulse");
    }
}
