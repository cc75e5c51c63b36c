//! The dispatch endpoint
//!
//! One URL, many actions. An inbound request is classified by the marker
//! header: without it the request belongs to the hosting page and is
//! delegated untouched; with it the action name selects a handler, kwargs
//! are reconstructed from the query string and path captures, the optional
//! entity reference is resolved, and the handler's fetch or submit flow
//! runs. The composed response is the rendered fragment plus the messaging
//! header when the policy allows it.
//!
//! Errors are not converted to responses here; they propagate to the
//! transport boundary, which maps them to HTTP statuses via
//! [`Error::status_code`].

use crate::config::{truthy, DispatchConfig};
use crate::entity::EntityStore;
use crate::handler::ActionContext;
use crate::http::{HttpRequest, HttpResponse};
use crate::messaging::MessagePolicy;
use crate::params::ParamCodec;
use crate::registry::ActionRegistry;
use crate::template::TemplateEngine;
use crate::Error;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The hosting page view.
///
/// `setup_get` runs before every partial-update request so the page's
/// ambient state (object lists, lookups) is populated the same way it is
/// for a full page load; its output is discarded. Implementations that
/// need to mutate state use interior mutability.
#[async_trait]
pub trait PageView: Send + Sync {
    async fn setup_get(&self, request: &HttpRequest) -> Result<(), Error>;

    /// Base render context the page contributes to every fragment.
    fn build_context(&self, kwargs: &Map<String, Value>) -> Map<String, Value>;

    /// Full-page rendering for requests without the marker header.
    async fn render_page(&self, request: &HttpRequest) -> Result<HttpResponse, Error>;
}

/// The HTTP-facing entry point of the dispatch layer.
pub struct Dispatcher {
    registry: ActionRegistry,
    codec: ParamCodec,
    config: DispatchConfig,
    store: Arc<dyn EntityStore>,
    engine: Arc<dyn TemplateEngine>,
    messages: MessagePolicy,
}

impl Dispatcher {
    pub fn new(
        registry: ActionRegistry,
        codec: ParamCodec,
        config: DispatchConfig,
        store: Arc<dyn EntityStore>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        let messages = MessagePolicy::new(config.show_messages);
        Self {
            registry,
            codec,
            config,
            store,
            engine,
            messages,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Classify a request: partial-update iff the marker header is truthy.
    pub fn is_partial(&self, request: &HttpRequest) -> bool {
        request
            .header(&self.config.marker_header)
            .map(truthy)
            .unwrap_or(false)
    }

    /// Serve one request on behalf of `view`.
    pub async fn dispatch(
        &self,
        view: &dyn PageView,
        request: HttpRequest,
    ) -> Result<HttpResponse, Error> {
        if !self.is_partial(&request) {
            tracing::debug!(path = %request.path, "plain page request");
            return view.render_page(&request).await;
        }

        // Populate the page's ambient context first; output is discarded.
        view.setup_get(&request).await?;

        let action_name = request.query(&self.config.action_param).map(str::to_string);
        let handler = self.registry.resolve(action_name.as_deref())?;
        tracing::debug!(action = handler.name(), method = %request.method, "dispatching action");

        let mut kwargs = self.codec.decode_query(
            &request.query_params,
            &[
                self.config.action_param.as_str(),
                self.config.object_param.as_str(),
            ],
        )?;
        // Path captures take precedence over query-decoded kwargs.
        for (key, value) in &request.path_params {
            kwargs.insert(key.clone(), Value::String(value.clone()));
        }

        let object = self
            .codec
            .decode_reference(request.query(&self.config.object_param), self.store.as_ref())
            .await?;

        let page_context = view.build_context(&kwargs);
        let ctx = ActionContext {
            request,
            page_context,
            kwargs,
            object,
        };

        let output = if ctx.request.is_get() {
            handler.handle_fetch(&ctx, self.engine.as_ref()).await?
        } else if ctx.request.is_post() {
            handler
                .handle_submit(&ctx, self.engine.as_ref(), self.store.as_ref())
                .await?
        } else {
            return Err(Error::BadRequest(format!(
                "unsupported method for partial update: {}",
                ctx.request.method
            )));
        };

        let mut response = HttpResponse::html(output.html);
        if let Some(message) = &output.message {
            if let Some((name, value)) = self.messages.header(message) {
                response.headers.insert(name.to_string(), value);
            }
        }
        Ok(response)
    }
}
