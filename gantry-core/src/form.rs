//! Form collaborator contract for form-backed actions
//!
//! A form is built once per request from initial values, the submitted
//! payload (data and files, on POST only) and the target entity when one
//! exists. Validation failure is a normal state branch, not an error: the
//! form re-renders with its field errors and the request still completes
//! with a 200.

use crate::entity::{Entity, EntityStore};
use crate::http::FormFile;
use crate::Error;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a form needs to bind itself for one request.
pub struct FormBinding<'a> {
    /// Handler-supplied initial values (default empty).
    pub initial: &'a Map<String, Value>,
    /// Submitted field data; `None` on the fetch side.
    pub data: Option<&'a HashMap<String, String>>,
    /// Submitted files; `None` on the fetch side.
    pub files: Option<&'a HashMap<String, FormFile>>,
    /// Target entity when one was referenced (update semantics);
    /// `None` for create semantics.
    pub instance: Option<&'a Arc<dyn Entity>>,
}

impl<'a> FormBinding<'a> {
    /// True when the binding carries submitted payload data.
    pub fn is_bound(&self) -> bool {
        self.data.is_some()
    }
}

/// Field-level validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: HashMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// JSON shape used inside render contexts: field name to message list.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (field, messages) in &self.fields {
            map.insert(
                field.clone(),
                Value::Array(messages.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(map)
    }
}

/// The form contract a form-backed action drives.
///
/// `save` owns persistence for the valid path: the form decides what to
/// write through the store (create when unbound to an instance, update
/// when bound) and returns the saved entity.
#[async_trait]
pub trait FragmentForm: Send + Sync {
    /// Build the form for this request.
    fn bind(binding: FormBinding<'_>) -> Self
    where
        Self: Sized;

    /// Run validation, recording field errors. Returns overall validity.
    fn validate(&mut self) -> bool;

    fn errors(&self) -> &FormErrors;

    /// Persist through the store and return the saved entity. Only called
    /// after `validate` returned true.
    async fn save(&self, store: &dyn EntityStore) -> Result<Arc<dyn Entity>, Error>;

    /// JSON snapshot placed under the `form` context key: current values
    /// and errors, whatever the templates need to re-render the form.
    fn to_value(&self) -> Value;
}
