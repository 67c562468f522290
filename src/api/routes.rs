use axum::{
    routing::{delete, get},
    Router,
};

use crate::api::handlers::{self, ApiContext};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<ApiContext<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // API index
        .route("/api", get(handlers::index::<S>))
        // Nodes
        .route("/api/nodes", get(handlers::list_nodes::<S>))
        .route(
            "/api/nodes/:status",
            get(handlers::list_nodes_with_status::<S>),
        )
        .route("/api/node/:name", get(handlers::get_node::<S>))
        .route("/api/node/:name", delete(handlers::delete_node::<S>))
        // Node groups
        .route("/api/node_groups", get(handlers::list_node_groups::<S>))
        .route("/api/node_group/:name", get(handlers::get_node_group::<S>))
        // Node classes
        .route("/api/node_classes", get(handlers::list_node_classes::<S>))
        .route("/api/node_class/:name", get(handlers::get_node_class::<S>))
}
