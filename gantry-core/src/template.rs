// Templating collaborator seam

use crate::Error;
use async_trait::async_trait;
use serde_json::Value;

/// Template rendering collaborator.
///
/// Handlers name templates by string reference; the engine owns loading
/// and caching. A missing template is a fatal configuration error for the
/// request and surfaces as [`Error::Template`].
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    async fn render(&self, template: &str, context: &Value) -> Result<String, Error>;
}
