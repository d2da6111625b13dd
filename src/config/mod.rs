//! Configuration management for the inspector.
//!
//! Settings live under the `"inspector"` key of a JSON settings object and
//! are merged over defaults. The active configuration is held in a
//! process-wide singleton; the pipeline itself only ever sees explicit
//! [`FormatOptions`](crate::formatter::FormatOptions) values derived from it.

pub mod schema;

pub use schema::InspectorConfig;

use log::warn;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

/// Settings key holding the inspector configuration.
pub const SETTINGS_KEY: &str = "inspector";

/// Global configuration instance, lazily initialized to the defaults.
static CONFIG: Lazy<RwLock<InspectorConfig>> =
    Lazy::new(|| RwLock::new(InspectorConfig::default()));

/// Loads configuration from a settings JSON value.
///
/// Reads the `"inspector"` settings, merges them with defaults, validates
/// the result and installs it as the global configuration. Settings that
/// fail to parse are ignored with a warning.
///
/// # Arguments
///
/// * `settings_json` - Optional settings object containing an `"inspector"` key
///
/// # Returns
///
/// `Ok(InspectorConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use txn_inspector::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "inspector": {
///         "indentWidth": 2,
///         "replayBaseUrl": "http://localhost:4040"
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.indent_width, 2);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<InspectorConfig, String> {
    let mut config = InspectorConfig::default();

    if let Some(user_settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<InspectorConfig>(user_settings.clone()) {
            Ok(user_config) => config = config.merge(&user_config),
            Err(e) => warn!(
                "Failed to parse {} settings: {}. Using defaults.",
                SETTINGS_KEY, e
            ),
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// # Arguments
///
/// * `path` - Path to a settings file shaped like `{"inspector": {...}}`
///
/// # Returns
///
/// The loaded configuration, or `Err` if the file cannot be read, is not
/// JSON, or fails validation.
pub fn load_config_file(path: &Path) -> Result<InspectorConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let settings: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    load_config(Some(settings))
}

/// Gets a clone of the current global configuration.
pub fn get_config() -> InspectorConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| InspectorConfig::default())
}

/// Updates the global configuration in place.
///
/// An update that leaves the configuration invalid is discarded and the
/// defaults are restored.
///
/// # Example
///
/// ```no_run
/// use txn_inspector::config::update_config;
///
/// update_config(|config| {
///     config.pretty_print = false;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut InspectorConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            warn!("Configuration validation failed after update: {}", e);
            *config = InspectorConfig::default();
        }
    }
}

/// Resets the global configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = InspectorConfig::default();
    }
}
