// Configuration for the fragment template engine

use std::path::PathBuf;

/// Configuration for [`crate::FragmentTemplates`].
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    /// Directory fragment templates are loaded from. `None` means all
    /// templates are registered from strings.
    pub template_dir: Option<PathBuf>,
    /// File extension of template files (with leading dot).
    pub template_extension: String,
    /// Fail rendering on missing variables instead of printing nothing.
    pub strict_mode: bool,
    /// HTML-escape interpolated values.
    pub escape_html: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            template_extension: ".hbs".to_string(),
            strict_mode: false,
            escape_html: true,
        }
    }
}

impl TemplateConfig {
    /// Configuration loading templates from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Configuration with no template directory; templates are registered
    /// from strings.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Set the template file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.template_extension = extension.into();
        self
    }

    /// Enable strict mode
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Enable or disable HTML escaping
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }
}
