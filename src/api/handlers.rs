use axum::{
    extract::{Host, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::logic::{ResolveError, Resolver};
use crate::model::{ClassView, EntityKind, EntityLinks, EntitySummary, GroupView, NodeView};
use crate::store::traits::Store;

/// Shared request state: the injected store plus the protocol hrefs are
/// built with. Replaces the process-wide connection globals of older
/// classifier deployments with an explicit capability.
pub struct ApiContext<S> {
    pub store: Arc<S>,
    pub protocol: String,
}

impl<S> Clone for ApiContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            protocol: self.protocol.clone(),
        }
    }
}

/// Link builder for one request; hrefs point back at this API.
pub struct ApiLinks {
    protocol: String,
    host: String,
}

impl ApiLinks {
    pub fn new(protocol: &str, host: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
        }
    }
}

impl EntityLinks for ApiLinks {
    fn href_for(&self, kind: EntityKind, name: &str) -> String {
        format!(
            "{}://{}/api/{}/{}",
            self.protocol,
            self.host,
            kind.path_segment(),
            name
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: ResolveError) -> ApiError {
    let status = match &err {
        ResolveError::NotFound { .. } => StatusCode::NOT_FOUND,
        ResolveError::Cycle { .. } => {
            log::error!("resolution failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ResolveError::Store(_) => {
            log::error!("entity store failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(&err.to_string())))
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// API home page; lists the other available endpoints.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub nodes: String,
    pub node_classes: String,
    pub node_groups: String,
}

pub async fn index<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
) -> Json<IndexResponse> {
    let base = format!("{}://{}/api", ctx.protocol, host);
    Json(IndexResponse {
        nodes: format!("{}/nodes", base),
        node_classes: format!("{}/node_classes", base),
        node_groups: format!("{}/node_groups", base),
    })
}

pub async fn list_nodes<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
) -> Result<Json<Vec<EntitySummary>>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .list_nodes(None)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn list_nodes_with_status<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
    Path(status): Path<String>,
) -> Result<Json<Vec<EntitySummary>>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .list_nodes(Some(&status))
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_node<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
    Path(name): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .resolve_node(&name)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_node<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let node = ctx
        .store
        .get_node_by_name(&name)
        .await
        .map_err(|e| error_response(ResolveError::Store(e)))?
        .ok_or_else(|| error_response(ResolveError::not_found(EntityKind::Node, &name)))?;

    ctx.store
        .delete_node(node.id)
        .await
        .map_err(|e| error_response(ResolveError::Store(e)))?;
    log::info!("deleted node '{}' and its memberships", name);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_node_groups<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
) -> Result<Json<Vec<EntitySummary>>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver.list_groups().await.map(Json).map_err(error_response)
}

pub async fn get_node_group<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
    Path(name): Path<String>,
) -> Result<Json<GroupView>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .resolve_group(&name)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn list_node_classes<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
) -> Result<Json<Vec<EntitySummary>>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .list_classes()
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_node_class<S: Store>(
    State(ctx): State<ApiContext<S>>,
    Host(host): Host,
    Path(name): Path<String>,
) -> Result<Json<ClassView>, ApiError> {
    let links = ApiLinks::new(&ctx.protocol, &host);
    let resolver = Resolver::new(&*ctx.store, &links);
    resolver
        .resolve_class(&name)
        .await
        .map(Json)
        .map_err(error_response)
}
