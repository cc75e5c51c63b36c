// Smoke tests for the facade crate: the re-exported surface must be
// enough to register actions and run a dispatch end to end.

use async_trait::async_trait;
use gantry::{
    ActionModule, ActionRegistration, ActionRegistry, DeleteAction, DispatchConfig, Dispatcher,
    Entity, EntityStore, Error, HttpRequest, HttpResponse, PageView, ParamCodec, TemplateEngine,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug)]
struct Widget;

impl Entity for Widget {
    fn namespace(&self) -> &str {
        "inventory"
    }
    fn kind(&self) -> &str {
        "widget"
    }
    fn id(&self) -> String {
        "1".to_string()
    }
    fn to_value(&self) -> Value {
        json!({"id": 1})
    }
}

struct OneWidgetStore;

#[async_trait]
impl EntityStore for OneWidgetStore {
    async fn lookup(
        &self,
        namespace: &str,
        kind: &str,
        id: &str,
    ) -> Result<Arc<dyn Entity>, Error> {
        if (namespace, kind, id) == ("inventory", "widget", "1") {
            Ok(Arc::new(Widget))
        } else {
            Err(Error::EntityNotFound(format!("{namespace}_{kind}_{id}")))
        }
    }
    async fn save(&self, entity: Arc<dyn Entity>) -> Result<Arc<dyn Entity>, Error> {
        Ok(entity)
    }
    async fn delete(&self, _entity: &dyn Entity) -> Result<(), Error> {
        Ok(())
    }
}

struct NameOnlyEngine;

#[async_trait]
impl TemplateEngine for NameOnlyEngine {
    async fn render(&self, template: &str, _context: &Value) -> Result<String, Error> {
        Ok(template.to_string())
    }
}

struct EmptyPage;

#[async_trait]
impl PageView for EmptyPage {
    async fn setup_get(&self, _request: &HttpRequest) -> Result<(), Error> {
        Ok(())
    }
    fn build_context(&self, _kwargs: &Map<String, Value>) -> Map<String, Value> {
        Map::new()
    }
    async fn render_page(&self, _request: &HttpRequest) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::html("full page"))
    }
}

struct WidgetsModule;

impl ActionModule for WidgetsModule {
    fn name(&self) -> &str {
        "widgets"
    }
    fn actions(&self) -> Vec<ActionRegistration> {
        vec![ActionRegistration::new("delete_widget", || {
            Box::new(DeleteAction::new(
                "delete_widget",
                "widgets/button",
                "widgets/deleted",
            ))
        })]
    }
}

#[tokio::test]
async fn test_facade_dispatch_round_trip() {
    let modules: Vec<Box<dyn ActionModule>> = vec![Box::new(WidgetsModule)];
    let dispatcher = Dispatcher::new(
        ActionRegistry::discover(&modules).unwrap(),
        ParamCodec::new(),
        DispatchConfig::default(),
        Arc::new(OneWidgetStore),
        Arc::new(NameOnlyEngine),
    );

    let mut request = HttpRequest::new("POST", "/fragments");
    request
        .headers
        .insert("HX-Request".to_string(), "true".to_string());
    request
        .query_params
        .insert("hx_request_name".to_string(), "delete_widget".to_string());
    request
        .query_params
        .insert("object".to_string(), "inventory_widget_1".to_string());

    let response = dispatcher.dispatch(&EmptyPage, request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body_str(), "widgets/deleted");
}
