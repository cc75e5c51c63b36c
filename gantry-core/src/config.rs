// Dispatch configuration

use serde::Deserialize;
use std::env;

/// Process-wide configuration for the dispatch endpoint.
///
/// Field defaults follow the htmx client conventions; all of them can be
/// overridden through the builder methods or `GANTRY_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Marker header the client sets on partial-update requests.
    pub marker_header: String,
    /// Query parameter carrying the action handler name.
    pub action_param: String,
    /// Query parameter carrying the optional entity reference token.
    pub object_param: String,
    /// Whether out-of-band messaging headers are emitted. Disabled by
    /// default; when disabled no messaging header is ever attached.
    pub show_messages: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            marker_header: "HX-Request".to_string(),
            action_param: "hx_request_name".to_string(),
            object_param: "object".to_string(),
            show_messages: false,
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker header name
    pub fn with_marker_header(mut self, name: impl Into<String>) -> Self {
        self.marker_header = name.into();
        self
    }

    /// Set the action-name query parameter
    pub fn with_action_param(mut self, name: impl Into<String>) -> Self {
        self.action_param = name.into();
        self
    }

    /// Set the entity-reference query parameter
    pub fn with_object_param(mut self, name: impl Into<String>) -> Self {
        self.object_param = name.into();
        self
    }

    /// Enable or disable messaging headers
    pub fn with_show_messages(mut self, enabled: bool) -> Self {
        self.show_messages = enabled;
        self
    }

    /// Load overrides from `GANTRY_*` environment variables on top of the
    /// defaults: `GANTRY_MARKER_HEADER`, `GANTRY_ACTION_PARAM`,
    /// `GANTRY_OBJECT_PARAM`, `GANTRY_SHOW_MESSAGES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var("GANTRY_MARKER_HEADER") {
            config.marker_header = value;
        }
        if let Ok(value) = env::var("GANTRY_ACTION_PARAM") {
            config.action_param = value;
        }
        if let Ok(value) = env::var("GANTRY_OBJECT_PARAM") {
            config.object_param = value;
        }
        if let Ok(value) = env::var("GANTRY_SHOW_MESSAGES") {
            config.show_messages = truthy(&value);
        }
        config
    }
}

/// Interpret an environment flag the way the client marker header is
/// interpreted: "true"/"1"/"on"/"yes", case-insensitive.
pub(crate) fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
