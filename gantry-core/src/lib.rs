// Core library for the Gantry partial-update dispatch layer
// One endpoint, many named fragment actions: registry, param codec,
// handler state machine, dispatch, messaging.

pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod form;
pub mod handler;
pub mod http;
pub mod messaging;
pub mod params;
pub mod registry;
pub mod template;
pub mod trigger;

// Re-export commonly used types
pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, PageView};
pub use entity::{Entity, EntityRef, EntityStore};
pub use error::Error;
pub use form::{FormBinding, FormErrors, FragmentForm};
pub use handler::{ActionContext, ActionHandler, ActionOutput, DeleteAction, FormAction};
pub use http::{FormFile, HttpRequest, HttpResponse};
pub use messaging::{FlashMessage, MessageLevel, MessagePolicy, TRIGGER_HEADER};
pub use params::{KwargDecoder, ParamCodec};
pub use registry::{ActionModule, ActionRegistration, ActionRegistry, HandlerFactory};
pub use template::TemplateEngine;
pub use trigger::TriggerUrl;
