// Error types for Handlebars fragment rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template configuration error: {0}")]
    Config(String),

    #[error("Template compile error: {0}")]
    Compile(String),

    #[error("Template render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<handlebars::TemplateError> for TemplateError {
    fn from(err: handlebars::TemplateError) -> Self {
        TemplateError::Compile(err.to_string())
    }
}

impl From<handlebars::RenderError> for TemplateError {
    fn from(err: handlebars::RenderError) -> Self {
        TemplateError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
