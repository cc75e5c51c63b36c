//! Trigger URL builder
//!
//! The encode side of the round-trip: a page fragment that wants to invoke
//! an action embeds a URL carrying the action name, the optional entity
//! reference token and any extra kwargs as query parameters. The markup
//! attributes themselves (hx-get/hx-post, CSRF headers) belong to the
//! templating layer, not here.

use crate::config::DispatchConfig;
use crate::entity::Entity;

/// Builder for a partial-update trigger URL.
#[derive(Debug, Clone)]
pub struct TriggerUrl {
    path: String,
    action: String,
    object_token: Option<String>,
    params: Vec<(String, String)>,
}

impl TriggerUrl {
    /// Start a URL for `action` dispatched at `path`.
    pub fn new(path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: action.into(),
            object_token: None,
            params: Vec::new(),
        }
    }

    /// Round-trip `entity` as the target object.
    pub fn object(mut self, entity: &dyn Entity) -> Self {
        self.object_token = Some(entity.entity_ref().encode());
        self
    }

    /// Add an extra kwarg; repeatable, order preserved.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Build with the default parameter names.
    pub fn build(&self) -> String {
        self.build_with(&DispatchConfig::default())
    }

    /// Build using the configured action/object parameter names.
    pub fn build_with(&self, config: &DispatchConfig) -> String {
        let mut url = format!(
            "{}?{}={}",
            self.path,
            urlencoding::encode(&config.action_param),
            urlencoding::encode(&self.action)
        );
        if let Some(token) = &self.object_token {
            url.push_str(&format!(
                "&{}={}",
                urlencoding::encode(&config.object_param),
                urlencoding::encode(token)
            ));
        }
        for (key, value) in &self.params {
            url.push_str(&format!(
                "&{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }
        url
    }
}
