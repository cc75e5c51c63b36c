//! Handlebars engine wrapper

use crate::{config::TemplateConfig, error::TemplateError, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Thread-safe Handlebars registry holding the fragment templates.
#[derive(Clone)]
pub struct TemplateRegistry {
    handlebars: Arc<RwLock<Handlebars<'static>>>,
    config: TemplateConfig,
}

impl TemplateRegistry {
    pub fn new(config: TemplateConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(config.strict_mode);
        if !config.escape_html {
            handlebars.register_escape_fn(handlebars::no_escape);
        }

        let registry = Self {
            handlebars: Arc::new(RwLock::new(handlebars)),
            config,
        };
        registry.load_templates()?;
        Ok(registry)
    }

    /// Load all templates from the configured directory, if any.
    fn load_templates(&self) -> Result<()> {
        let Some(template_dir) = self.config.template_dir.clone() else {
            return Ok(());
        };
        if !template_dir.exists() {
            return Err(TemplateError::Config(format!(
                "Template directory not found: {:?}",
                template_dir
            )));
        }
        self.load_templates_from_dir(&template_dir)
    }

    /// Load templates from a directory recursively. Template names are the
    /// relative paths without extension, `/`-separated.
    fn load_templates_from_dir(&self, dir: &Path) -> Result<()> {
        use std::fs;

        let base = self
            .config
            .template_dir
            .as_deref()
            .unwrap_or(dir)
            .to_path_buf();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.load_templates_from_dir(&path)?;
            } else if let Some(ext) = path.extension() {
                if ext == self.config.template_extension.trim_start_matches('.') {
                    let template_name = path
                        .strip_prefix(&base)
                        .unwrap_or(&path)
                        .with_extension("")
                        .to_string_lossy()
                        .replace('\\', "/");

                    let template_content = fs::read_to_string(&path)?;
                    let mut handlebars = self.write_lock();
                    handlebars.register_template_string(&template_name, template_content)?;
                }
            }
        }

        Ok(())
    }

    /// Render a template with data
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        let handlebars = self.read_lock();
        handlebars
            .render(template, data)
            .map_err(TemplateError::from)
    }

    /// Register a template from string
    pub fn register_template(&self, name: &str, template: &str) -> Result<()> {
        let mut handlebars = self.write_lock();
        handlebars
            .register_template_string(name, template)
            .map_err(TemplateError::from)
    }

    /// Register a partial
    pub fn register_partial(&self, name: &str, template: &str) -> Result<()> {
        let mut handlebars = self.write_lock();
        handlebars
            .register_partial(name, template)
            .map_err(TemplateError::from)
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.read_lock().has_template(name)
    }

    /// Get list of registered template names
    pub fn template_names(&self) -> Vec<String> {
        self.read_lock().get_templates().keys().cloned().collect()
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, Handlebars<'static>> {
        self.handlebars.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Handlebars<'static>> {
        self.handlebars.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_templates() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let templates_dir = temp_dir.path().join("templates");
        fs::create_dir(&templates_dir).unwrap();
        fs::create_dir(templates_dir.join("contacts")).unwrap();

        fs::write(
            templates_dir.join("contacts/row.hbs"),
            "<tr><td>{{hx_object.name}}</td></tr>",
        )
        .unwrap();
        fs::write(
            templates_dir.join("contacts/form.hbs"),
            "<form>{{form.name}}</form>",
        )
        .unwrap();

        temp_dir
    }

    #[test]
    fn test_loads_nested_templates_with_slash_names() {
        let temp_dir = create_test_templates();
        let registry =
            TemplateRegistry::new(TemplateConfig::new(temp_dir.path().join("templates"))).unwrap();

        assert!(registry.has_template("contacts/row"));
        assert!(registry.has_template("contacts/form"));
        assert!(!registry.has_template("contacts/missing"));
    }

    #[test]
    fn test_render_loaded_template() {
        let temp_dir = create_test_templates();
        let registry =
            TemplateRegistry::new(TemplateConfig::new(temp_dir.path().join("templates"))).unwrap();

        let data = json!({"hx_object": {"name": "Ada"}});
        let html = registry.render("contacts/row", &data).unwrap();
        assert_eq!(html, "<tr><td>Ada</td></tr>");
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let result = TemplateRegistry::new(TemplateConfig::new("/nonexistent/templates"));
        assert!(matches!(result, Err(TemplateError::Config(_))));
    }

    #[test]
    fn test_register_template_from_string() {
        let registry = TemplateRegistry::new(TemplateConfig::in_memory()).unwrap();
        registry
            .register_template("greeting", "Hello {{name}}!")
            .unwrap();

        let html = registry.render("greeting", &json!({"name": "World"})).unwrap();
        assert_eq!(html, "Hello World!");
    }

    #[test]
    fn test_strict_mode_fails_on_missing_variable() {
        let config = TemplateConfig::in_memory().with_strict_mode(true);
        let registry = TemplateRegistry::new(config).unwrap();
        registry.register_template("strict", "{{missing}}").unwrap();

        assert!(registry.render("strict", &json!({})).is_err());
    }

    #[test]
    fn test_html_escaping_default() {
        let registry = TemplateRegistry::new(TemplateConfig::in_memory()).unwrap();
        registry.register_template("escape", "{{value}}").unwrap();

        let html = registry
            .render("escape", &json!({"value": "<script>"}))
            .unwrap();
        assert_eq!(html, "&lt;script&gt;");
    }
}
