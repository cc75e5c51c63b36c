//! Action registry and discovery
//!
//! Modules register their actions explicitly: each collaborator implements
//! [`ActionModule`] and hands back named handler factories. Discovery walks
//! the module list once, collecting every registration into a read-only
//! name-to-factory map. There is no runtime reflection and no global cache;
//! rebuilding the registry is cheap and safe between test runs.
//!
//! Two registrations sharing one name are a configuration error and fail
//! discovery loudly with [`Error::DuplicateHandlerName`] rather than
//! silently shadowing one of them.

use crate::handler::ActionHandler;
use crate::Error;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Factory building a fresh handler instance for one request.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn ActionHandler> + Send + Sync>;

/// One named handler a module contributes.
pub struct ActionRegistration {
    pub name: String,
    pub factory: HandlerFactory,
}

impl ActionRegistration {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ActionHandler> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }
}

/// A collaborator module contributing actions to the registry.
///
/// `enabled` supports optional integrations: a disabled module is skipped
/// during discovery, not an error.
pub trait ActionModule: Send + Sync {
    /// Module name, used only for logging.
    fn name(&self) -> &str;

    fn enabled(&self) -> bool {
        true
    }

    fn actions(&self) -> Vec<ActionRegistration>;
}

/// Read-mostly mapping from action name to handler factory. Built once,
/// safe for concurrent reads; never rebuilt mid-request.
#[derive(Default)]
pub struct ActionRegistry {
    entries: BTreeMap<String, HandlerFactory>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every registration from every enabled module.
    pub fn discover(modules: &[Box<dyn ActionModule>]) -> Result<Self, Error> {
        let mut registry = Self::new();
        for module in modules {
            if !module.enabled() {
                tracing::debug!(module = module.name(), "skipping disabled action module");
                continue;
            }
            for registration in module.actions() {
                tracing::debug!(
                    module = module.name(),
                    action = %registration.name,
                    "registering action"
                );
                registry.register(registration)?;
            }
        }
        tracing::info!(actions = registry.len(), "action registry built");
        Ok(registry)
    }

    /// Register a single action, rejecting empty and duplicate names.
    pub fn register(&mut self, registration: ActionRegistration) -> Result<(), Error> {
        if registration.name.is_empty() {
            return Err(Error::BadRequest(
                "action registration with empty name".to_string(),
            ));
        }
        if self.entries.contains_key(&registration.name) {
            return Err(Error::DuplicateHandlerName(registration.name));
        }
        self.entries.insert(registration.name, registration.factory);
        Ok(())
    }

    /// Resolve a name to a fresh handler instance.
    ///
    /// `None` covers requests routed as partial updates without carrying a
    /// name at all.
    pub fn resolve(&self, name: Option<&str>) -> Result<Box<dyn ActionHandler>, Error> {
        let name = name.ok_or_else(|| Error::UnknownHandler("<missing>".to_string()))?;
        let factory = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownHandler(name.to_string()))?;
        Ok(factory())
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
