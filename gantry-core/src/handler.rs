//! Action handlers: the polymorphic unit of work
//!
//! A handler implements the fetch/submit state machine for one named
//! fragment operation. The base trait renders its fetch template for both
//! verbs; the two built-in variants add form-backed create/update
//! semantics ([`FormAction`]) and delete semantics ([`DeleteAction`]).
//!
//! Handlers receive an immutable [`ActionContext`] built once per request
//! by the dispatcher, instead of having request state attached after
//! construction. Errors raised inside a handler are never caught here;
//! they propagate to the dispatch boundary.

use crate::entity::{Entity, EntityStore};
use crate::form::{FormBinding, FragmentForm};
use crate::http::HttpRequest;
use crate::messaging::FlashMessage;
use crate::template::TemplateEngine;
use crate::Error;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// Context key the target entity is published under by default.
pub const DEFAULT_OBJECT_KEY: &str = "hx_object";

/// Everything a handler may consume for one request, built once by the
/// dispatcher and never mutated afterwards.
pub struct ActionContext {
    pub request: HttpRequest,
    /// Base context supplied by the hosting page view.
    pub page_context: Map<String, Value>,
    /// Typed kwargs reconstructed from the query string and path params.
    pub kwargs: Map<String, Value>,
    /// Target entity, when the request carried an `object` reference.
    pub object: Option<Arc<dyn Entity>>,
}

impl ActionContext {
    /// Kind label used for default messages: the target entity's kind when
    /// one is bound, otherwise the given fallback.
    fn kind_label(&self, fallback: &str) -> String {
        self.object
            .as_ref()
            .map(|entity| entity.kind().to_string())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A handler's result: the rendered fragment plus an optional message for
/// the out-of-band signaling header.
#[derive(Debug)]
pub struct ActionOutput {
    pub html: String,
    pub message: Option<FlashMessage>,
}

impl ActionOutput {
    pub fn fragment(html: String) -> Self {
        Self {
            html,
            message: None,
        }
    }

    pub fn with_message(mut self, message: FlashMessage) -> Self {
        self.message = Some(message);
        self
    }
}

/// A named unit implementing fetch/submit for one fragment operation.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Unique name this handler is registered and resolved under.
    fn name(&self) -> &str;

    /// Template rendered on fetch (and on invalid submits).
    fn fetch_template(&self) -> &str;

    /// Template rendered after a successful submit.
    fn submit_template(&self) -> &str;

    /// Context key the target entity is published under.
    fn object_key(&self) -> &str {
        DEFAULT_OBJECT_KEY
    }

    /// Build the render context: page context, then kwargs, then the
    /// reserved keys (object, `request`, `hx_request`). Merge order is
    /// fixed and last write wins on collisions.
    fn render_context(&self, ctx: &ActionContext) -> Value {
        let mut context = ctx.page_context.clone();
        for (key, value) in &ctx.kwargs {
            context.insert(key.clone(), value.clone());
        }
        context.insert(
            self.object_key().to_string(),
            ctx.object
                .as_ref()
                .map(|entity| entity.to_value())
                .unwrap_or(Value::Null),
        );
        context.insert(
            "request".to_string(),
            json!({
                "method": &ctx.request.method,
                "path": &ctx.request.path,
                "query": &ctx.request.query_params,
            }),
        );
        context.insert(
            "hx_request".to_string(),
            json!({
                "name": self.name(),
                "fetch_template": self.fetch_template(),
                "submit_template": self.submit_template(),
            }),
        );
        Value::Object(context)
    }

    /// Render the fetch-side fragment.
    async fn handle_fetch(
        &self,
        ctx: &ActionContext,
        engine: &dyn TemplateEngine,
    ) -> Result<ActionOutput, Error> {
        let html = engine
            .render(self.fetch_template(), &self.render_context(ctx))
            .await?;
        Ok(ActionOutput::fragment(html))
    }

    /// Handle a submit. The base behavior is a plain re-render; mutating
    /// variants override this.
    async fn handle_submit(
        &self,
        ctx: &ActionContext,
        engine: &dyn TemplateEngine,
        _store: &dyn EntityStore,
    ) -> Result<ActionOutput, Error> {
        self.handle_fetch(ctx, engine).await
    }
}

impl std::fmt::Debug for dyn ActionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandler")
            .field("name", &self.name())
            .finish()
    }
}

/// Form-backed create/update action.
///
/// On fetch the form is built unbound (initial values, plus the target
/// entity as instance when one exists) and rendered into the fetch
/// template under the `form` key. On submit the form binds the payload:
///
/// - valid: the form persists itself through the store, the submit
///   template renders against the saved entity, and a success message is
///   attached;
/// - invalid: the fetch template re-renders with the form's field errors
///   and a danger message is attached. No persistence call occurs.
///
/// Both paths are ordinary 200 responses; validity only shows through
/// which template rendered and the message level.
pub struct FormAction<F: FragmentForm> {
    name: String,
    fetch_template: String,
    submit_template: String,
    object_key: String,
    initial: Map<String, Value>,
    success_message: Option<String>,
    error_message: Option<String>,
    _form: PhantomData<fn() -> F>,
}

impl<F: FragmentForm> FormAction<F> {
    pub fn new(
        name: impl Into<String>,
        fetch_template: impl Into<String>,
        submit_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fetch_template: fetch_template.into(),
            submit_template: submit_template.into(),
            object_key: DEFAULT_OBJECT_KEY.to_string(),
            initial: Map::new(),
            success_message: None,
            error_message: None,
            _form: PhantomData,
        }
    }

    /// Override the context key the target entity is published under.
    pub fn with_object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = key.into();
        self
    }

    /// Initial form values for the fetch side.
    pub fn with_initial(mut self, initial: Map<String, Value>) -> Self {
        self.initial = initial;
        self
    }

    /// Explicit success message, replacing the kind-derived default.
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Explicit error message, replacing the kind-derived default.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    fn success_text(&self, kind: &str) -> String {
        self.success_message
            .clone()
            .unwrap_or_else(|| format!("{} saved successfully", capitalize(kind)))
    }

    fn error_text(&self, kind: &str) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| format!("{} could not be saved", capitalize(kind)))
    }

    fn context_with_form(&self, ctx: &ActionContext, form: &F) -> Value {
        let mut context = match self.render_context(ctx) {
            Value::Object(map) => map,
            other => return other,
        };
        context.insert("form".to_string(), form.to_value());
        Value::Object(context)
    }
}

#[async_trait]
impl<F: FragmentForm> ActionHandler for FormAction<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_template(&self) -> &str {
        &self.fetch_template
    }

    fn submit_template(&self) -> &str {
        &self.submit_template
    }

    fn object_key(&self) -> &str {
        &self.object_key
    }

    async fn handle_fetch(
        &self,
        ctx: &ActionContext,
        engine: &dyn TemplateEngine,
    ) -> Result<ActionOutput, Error> {
        let form = F::bind(FormBinding {
            initial: &self.initial,
            data: None,
            files: None,
            instance: ctx.object.as_ref(),
        });
        let html = engine
            .render(self.fetch_template(), &self.context_with_form(ctx, &form))
            .await?;
        Ok(ActionOutput::fragment(html))
    }

    async fn handle_submit(
        &self,
        ctx: &ActionContext,
        engine: &dyn TemplateEngine,
        store: &dyn EntityStore,
    ) -> Result<ActionOutput, Error> {
        let data = ctx.request.form_map()?;
        let mut form = F::bind(FormBinding {
            initial: &self.initial,
            data: Some(&data),
            files: Some(&ctx.request.files),
            instance: ctx.object.as_ref(),
        });

        if form.validate() {
            let saved = form.save(store).await?;
            tracing::debug!(action = %self.name, entity = %saved.entity_ref(), "form saved");

            let mut context = match self.context_with_form(ctx, &form) {
                Value::Object(map) => map,
                other => return Err(Error::Template(format!("non-object context: {}", other))),
            };
            // Render the submit template against the saved entity, not the
            // pre-save snapshot.
            context.insert(self.object_key.clone(), saved.to_value());

            let html = engine
                .render(self.submit_template(), &Value::Object(context))
                .await?;
            let message = FlashMessage::success(self.success_text(saved.kind()));
            Ok(ActionOutput::fragment(html).with_message(message))
        } else {
            tracing::debug!(action = %self.name, "form invalid");
            let html = engine
                .render(self.fetch_template(), &self.context_with_form(ctx, &form))
                .await?;
            let kind = ctx.kind_label(&self.name);
            let message = FlashMessage::danger(self.error_text(&kind));
            Ok(ActionOutput::fragment(html).with_message(message))
        }
    }
}

/// Delete action.
///
/// Fetch renders the trigger fragment (a button or link, not a
/// confirmation dialog) through the generic base behavior. Submit requires
/// a target entity, delegates deletion to the store, renders the submit
/// template against the post-delete context and attaches a success
/// message.
pub struct DeleteAction {
    name: String,
    fetch_template: String,
    submit_template: String,
    object_key: String,
    success_message: Option<String>,
}

impl DeleteAction {
    pub fn new(
        name: impl Into<String>,
        fetch_template: impl Into<String>,
        submit_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fetch_template: fetch_template.into(),
            submit_template: submit_template.into(),
            object_key: DEFAULT_OBJECT_KEY.to_string(),
            success_message: None,
        }
    }

    /// Override the context key the target entity is published under.
    pub fn with_object_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = key.into();
        self
    }

    /// Explicit success message, replacing the kind-derived default.
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }
}

#[async_trait]
impl ActionHandler for DeleteAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_template(&self) -> &str {
        &self.fetch_template
    }

    fn submit_template(&self) -> &str {
        &self.submit_template
    }

    fn object_key(&self) -> &str {
        &self.object_key
    }

    async fn handle_submit(
        &self,
        ctx: &ActionContext,
        engine: &dyn TemplateEngine,
        store: &dyn EntityStore,
    ) -> Result<ActionOutput, Error> {
        let entity = ctx
            .object
            .as_ref()
            .ok_or_else(|| Error::MissingReference(self.name.clone()))?;

        store.delete(entity.as_ref()).await?;
        tracing::debug!(action = %self.name, entity = %entity.entity_ref(), "entity deleted");

        let html = engine
            .render(self.submit_template(), &self.render_context(ctx))
            .await?;
        let text = self
            .success_message
            .clone()
            .unwrap_or_else(|| format!("{} deleted", capitalize(entity.kind())));
        Ok(ActionOutput::fragment(html).with_message(FlashMessage::success(text)))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormErrors;
    use crate::messaging::MessageLevel;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Lead {
        id: u64,
        name: String,
    }

    impl Entity for Lead {
        fn namespace(&self) -> &str {
            "crm"
        }
        fn kind(&self) -> &str {
            "lead"
        }
        fn id(&self) -> String {
            self.id.to_string()
        }
        fn to_value(&self) -> Value {
            json!({"id": self.id, "name": &self.name})
        }
    }

    /// Engine that records renders and echoes template name + context.
    #[derive(Default)]
    struct EchoEngine {
        rendered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TemplateEngine for EchoEngine {
        async fn render(&self, template: &str, context: &Value) -> Result<String, Error> {
            self.rendered.lock().unwrap().push(template.to_string());
            Ok(format!("{}|{}", template, context))
        }
    }

    /// Store that records calls; save returns a fixed saved lead.
    #[derive(Default)]
    struct RecordingStore {
        saves: Mutex<u32>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EntityStore for RecordingStore {
        async fn lookup(
            &self,
            namespace: &str,
            kind: &str,
            id: &str,
        ) -> Result<Arc<dyn Entity>, Error> {
            Err(Error::EntityNotFound(format!("{namespace}_{kind}_{id}")))
        }

        async fn save(&self, entity: Arc<dyn Entity>) -> Result<Arc<dyn Entity>, Error> {
            *self.saves.lock().unwrap() += 1;
            Ok(entity)
        }

        async fn delete(&self, entity: &dyn Entity) -> Result<(), Error> {
            self.deletes
                .lock()
                .unwrap()
                .push(entity.entity_ref().encode());
            Ok(())
        }
    }

    /// Minimal form: requires a non-empty `name` field.
    struct LeadForm {
        name: String,
        instance_id: Option<u64>,
        errors: FormErrors,
    }

    #[async_trait]
    impl FragmentForm for LeadForm {
        fn bind(binding: FormBinding<'_>) -> Self {
            let name = binding
                .data
                .and_then(|data| data.get("name").cloned())
                .unwrap_or_default();
            let instance_id = binding
                .instance
                .and_then(|entity| entity.id().parse().ok());
            Self {
                name,
                instance_id,
                errors: FormErrors::new(),
            }
        }

        fn validate(&mut self) -> bool {
            if self.name.trim().is_empty() {
                self.errors.add("name", "This field is required.");
            }
            self.errors.is_empty()
        }

        fn errors(&self) -> &FormErrors {
            &self.errors
        }

        async fn save(&self, store: &dyn EntityStore) -> Result<Arc<dyn Entity>, Error> {
            let lead = Lead {
                id: self.instance_id.unwrap_or(1),
                name: self.name.clone(),
            };
            store.save(Arc::new(lead)).await
        }

        fn to_value(&self) -> Value {
            json!({"name": &self.name, "errors": self.errors.to_value()})
        }
    }

    fn submit_ctx(body: &str, object: Option<Arc<dyn Entity>>) -> ActionContext {
        let mut request = HttpRequest::new("POST", "/fragments");
        request.body = body.as_bytes().to_vec();
        ActionContext {
            request,
            page_context: Map::new(),
            kwargs: Map::new(),
            object,
        }
    }

    #[tokio::test]
    async fn test_base_submit_rerenders_fetch_template() {
        struct Plain;

        #[async_trait]
        impl ActionHandler for Plain {
            fn name(&self) -> &str {
                "refresh_list"
            }
            fn fetch_template(&self) -> &str {
                "leads/list"
            }
            fn submit_template(&self) -> &str {
                "leads/list"
            }
        }

        let engine = EchoEngine::default();
        let store = RecordingStore::default();
        let ctx = submit_ctx("", None);
        let output = Plain.handle_submit(&ctx, &engine, &store).await.unwrap();

        assert!(output.html.starts_with("leads/list|"));
        assert!(output.message.is_none());
    }

    #[tokio::test]
    async fn test_render_context_merge_order() {
        struct Plain;

        #[async_trait]
        impl ActionHandler for Plain {
            fn name(&self) -> &str {
                "show_lead"
            }
            fn fetch_template(&self) -> &str {
                "leads/detail"
            }
            fn submit_template(&self) -> &str {
                "leads/detail"
            }
        }

        let mut page_context = Map::new();
        page_context.insert("title".to_string(), json!("Leads"));
        page_context.insert("page".to_string(), json!("from-page"));

        let mut kwargs = Map::new();
        kwargs.insert("page".to_string(), json!(3));

        let ctx = ActionContext {
            request: HttpRequest::new("GET", "/fragments"),
            page_context,
            kwargs,
            object: Some(Arc::new(Lead {
                id: 7,
                name: "Ada".into(),
            })),
        };

        let context = Plain.render_context(&ctx);
        // kwargs overwrite page context; reserved keys always present.
        assert_eq!(context["page"], json!(3));
        assert_eq!(context["title"], json!("Leads"));
        assert_eq!(context["hx_object"]["id"], json!(7));
        assert_eq!(context["hx_request"]["name"], json!("show_lead"));
        assert_eq!(context["request"]["method"], json!("GET"));
    }

    #[tokio::test]
    async fn test_form_submit_valid_saves_and_renders_submit_template() {
        let action: FormAction<LeadForm> =
            FormAction::new("edit_lead", "leads/form", "leads/row");
        let engine = EchoEngine::default();
        let store = RecordingStore::default();
        let existing: Arc<dyn Entity> = Arc::new(Lead {
            id: 7,
            name: "Old".into(),
        });

        let ctx = submit_ctx("name=Ada", Some(existing));
        let output = action.handle_submit(&ctx, &engine, &store).await.unwrap();

        assert_eq!(*store.saves.lock().unwrap(), 1);
        assert!(output.html.starts_with("leads/row|"));
        assert!(output.html.contains("Ada"));
        let message = output.message.unwrap();
        assert_eq!(message.level, MessageLevel::Success);
        assert_eq!(message.text, "Lead saved successfully");
    }

    #[tokio::test]
    async fn test_form_submit_invalid_rerenders_fetch_template_without_save() {
        let action: FormAction<LeadForm> =
            FormAction::new("edit_lead", "leads/form", "leads/row");
        let engine = EchoEngine::default();
        let store = RecordingStore::default();

        let ctx = submit_ctx("name=", None);
        let output = action.handle_submit(&ctx, &engine, &store).await.unwrap();

        assert_eq!(*store.saves.lock().unwrap(), 0);
        assert!(output.html.starts_with("leads/form|"));
        assert!(output.html.contains("This field is required."));
        let message = output.message.unwrap();
        assert_eq!(message.level, MessageLevel::Danger);
    }

    #[tokio::test]
    async fn test_form_message_overrides() {
        let action: FormAction<LeadForm> =
            FormAction::new("edit_lead", "leads/form", "leads/row")
                .with_success_message("Saved!")
                .with_error_message("Nope");
        let engine = EchoEngine::default();
        let store = RecordingStore::default();

        let valid = action
            .handle_submit(&submit_ctx("name=Ada", None), &engine, &store)
            .await
            .unwrap();
        assert_eq!(valid.message.unwrap().text, "Saved!");

        let invalid = action
            .handle_submit(&submit_ctx("name=", None), &engine, &store)
            .await
            .unwrap();
        assert_eq!(invalid.message.unwrap().text, "Nope");
    }

    #[tokio::test]
    async fn test_form_fetch_includes_form_key() {
        let action: FormAction<LeadForm> =
            FormAction::new("edit_lead", "leads/form", "leads/row");
        let engine = EchoEngine::default();

        let ctx = ActionContext {
            request: HttpRequest::new("GET", "/fragments"),
            page_context: Map::new(),
            kwargs: Map::new(),
            object: None,
        };
        let output = action.handle_fetch(&ctx, &engine).await.unwrap();
        assert!(output.html.contains("\"form\""));
    }

    #[tokio::test]
    async fn test_delete_submit_requires_reference() {
        let action = DeleteAction::new("delete_lead", "leads/delete", "leads/gone");
        let engine = EchoEngine::default();
        let store = RecordingStore::default();

        let err = action
            .handle_submit(&submit_ctx("", None), &engine, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingReference(ref name) if name == "delete_lead"));
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_submit_deletes_once_and_messages() {
        let action = DeleteAction::new("delete_lead", "leads/delete", "leads/gone");
        let engine = EchoEngine::default();
        let store = RecordingStore::default();
        let lead: Arc<dyn Entity> = Arc::new(Lead {
            id: 9,
            name: "Ada".into(),
        });

        let output = action
            .handle_submit(&submit_ctx("", Some(lead)), &engine, &store)
            .await
            .unwrap();

        assert_eq!(*store.deletes.lock().unwrap(), vec!["crm_lead_9".to_string()]);
        assert!(output.html.starts_with("leads/gone|"));
        let message = output.message.unwrap();
        assert_eq!(message.level, MessageLevel::Success);
        assert_eq!(message.text, "Lead deleted");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("lead"), "Lead");
        assert_eq!(capitalize(""), "");
    }
}
