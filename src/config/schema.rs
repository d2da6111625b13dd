//! Configuration schema for the inspector.
//!
//! Defines the user-configurable settings and their validation rules.

use crate::formatter::{DEFAULT_INDENT_WIDTH, DEFAULT_MAX_FORMAT_SIZE};
use serde::{Deserialize, Serialize};
use url::Url;

/// Largest accepted indentation width.
pub const MAX_INDENT_WIDTH: usize = 8;

/// Inspector settings, read from the `"inspector"` settings object.
///
/// Missing settings fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorConfig {
    /// Base URL of the capturing backend that serves the replay command.
    ///
    /// Defaults to `http://127.0.0.1:4040`. Must be an `http` or `https` URL.
    #[serde(default = "default_replay_base_url")]
    pub replay_base_url: String,

    /// Spaces per nesting level when pretty-printing bodies.
    ///
    /// Defaults to 4. Must be between 1 and 8.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Bodies larger than this many bytes are shown without pretty-printing.
    ///
    /// Defaults to 10MB. Must be > 0.
    #[serde(default = "default_max_format_size")]
    pub max_format_size: usize,

    /// Whether XML and JSON bodies are re-indented. Defaults to true.
    #[serde(default = "default_pretty_print")]
    pub pretty_print: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            replay_base_url: default_replay_base_url(),
            indent_width: default_indent_width(),
            max_format_size: default_max_format_size(),
            pretty_print: default_pretty_print(),
        }
    }
}

impl InspectorConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.indent_width == 0 || self.indent_width > MAX_INDENT_WIDTH {
            return Err(format!(
                "indentWidth must be between 1 and {}",
                MAX_INDENT_WIDTH
            ));
        }

        if self.max_format_size == 0 {
            return Err("maxFormatSize must be greater than 0".to_string());
        }

        let url = Url::parse(&self.replay_base_url)
            .map_err(|e| format!("replayBaseUrl is not a valid URL: {}", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err("replayBaseUrl must use http or https".to_string());
        }

        Ok(())
    }

    /// Merges this configuration with another, using values from `other`.
    pub fn merge(&self, other: &InspectorConfig) -> Self {
        Self {
            replay_base_url: other.replay_base_url.clone(),
            indent_width: other.indent_width,
            max_format_size: other.max_format_size,
            pretty_print: other.pretty_print,
        }
    }
}

fn default_replay_base_url() -> String {
    "http://127.0.0.1:4040".to_string()
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

fn default_max_format_size() -> usize {
    DEFAULT_MAX_FORMAT_SIZE
}

fn default_pretty_print() -> bool {
    true
}
