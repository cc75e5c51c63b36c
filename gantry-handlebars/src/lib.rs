//! Handlebars fragment rendering for the Gantry dispatch layer
//!
//! Implements the [`gantry_core::TemplateEngine`] collaborator with
//! Handlebars templates. Fragment templates live in a directory tree and
//! are named by their relative path (`contacts/row`), or are registered
//! from strings.
//!
//! ## Example
//!
//! ```no_run
//! use gantry_handlebars::{FragmentTemplates, TemplateConfig};
//!
//! # fn example() -> gantry_handlebars::Result<()> {
//! let templates = FragmentTemplates::new(TemplateConfig::new("templates"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::TemplateConfig;
pub use engine::TemplateRegistry;
pub use error::{Result, TemplateError};

use async_trait::async_trait;
use gantry_core::{Error, TemplateEngine};
use serde_json::Value;

/// Handlebars-backed template engine for fragment rendering.
#[derive(Clone)]
pub struct FragmentTemplates {
    registry: TemplateRegistry,
}

impl FragmentTemplates {
    pub fn new(config: TemplateConfig) -> Result<Self> {
        Ok(Self {
            registry: TemplateRegistry::new(config)?,
        })
    }

    /// Engine loading templates from `dir` with default settings.
    pub fn from_dir(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::new(TemplateConfig::new(dir))
    }

    /// Register a template from a string.
    pub fn register_template(&self, name: &str, template: &str) -> Result<()> {
        self.registry.register_template(name, template)
    }

    /// Register a partial usable from other templates.
    pub fn register_partial(&self, name: &str, template: &str) -> Result<()> {
        self.registry.register_partial(name, template)
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }
}

#[async_trait]
impl TemplateEngine for FragmentTemplates {
    async fn render(&self, template: &str, context: &Value) -> std::result::Result<String, Error> {
        // A handler naming a template that was never registered is a fatal
        // configuration error for the request.
        if !self.registry.has_template(template) {
            return Err(Error::Template(format!("missing template: {}", template)));
        }

        let registry = self.registry.clone();
        let template = template.to_string();
        let context = context.clone();

        tokio::task::spawn_blocking(move || registry.render(&template, &context))
            .await
            .map_err(|e| Error::Template(e.to_string()))?
            .map_err(|e| Error::Template(e.to_string()))
    }
}
