// Error types for the Gantry dispatch layer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An entity reference token did not split into exactly three
    /// non-empty `namespace_kind_id` parts.
    #[error("Malformed entity reference: {0}")]
    MalformedReference(String),

    /// A handler that requires a target entity was invoked without an
    /// `object` reference. This is a caller error, never a silent no-op.
    #[error("Missing entity reference: {0}")]
    MissingReference(String),

    /// An entity reference was well-formed but resolved to nothing.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// No handler is registered under the requested action name, or the
    /// request carried no action name at all.
    #[error("Unknown action handler: {0}")]
    UnknownHandler(String),

    /// Two handlers were registered under the same name during discovery.
    #[error("Duplicate action handler name: {0}")]
    DuplicateHandlerName(String),

    /// The entity store failed while saving or deleting.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A typed kwarg decoder rejected the raw query value.
    #[error("Parameter decode error for '{key}': {message}")]
    ParamDecode { key: String, message: String },

    /// Template rendering failed (missing template, render error).
    #[error("Template error: {0}")]
    Template(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl Error {
    /// Get the HTTP status code the transport boundary should use for
    /// this error. The core never converts errors to responses itself.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedReference(_) => 400,
            Error::MissingReference(_) => 400,
            Error::ParamDecode { .. } => 400,
            Error::BadRequest(_) => 400,
            Error::EntityNotFound(_) => 404,
            Error::UnknownHandler(_) => 404,
            Error::DuplicateHandlerName(_) => 500,
            Error::Persistence(_) => 500,
            Error::Template(_) => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
