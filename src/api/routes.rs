use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Cost estimation matrix
        .route(
            "/cost-estimations",
            get(handlers::list_cost_estimations::<S>),
        )
        .route(
            "/cost-estimations",
            post(handlers::create_cost_estimation::<S>),
        )
        // Dimension value operations (before :id so the static segment wins)
        .route(
            "/cost-estimations/dimensions",
            get(handlers::get_dimension_values::<S>),
        )
        .route(
            "/cost-estimations/dimensions/:dimension/values",
            post(handlers::preview_dimension_value::<S>),
        )
        .route(
            "/cost-estimations/dimensions/:dimension/values/submit",
            post(handlers::submit_priced_combinations::<S>),
        )
        .route(
            "/cost-estimations/dimensions/:dimension/values/:value",
            patch(handlers::rename_dimension_value::<S>),
        )
        .route(
            "/cost-estimations/dimensions/:dimension/values/:value",
            delete(handlers::delete_dimension_value::<S>),
        )
        .route(
            "/cost-estimations/:id",
            get(handlers::get_cost_estimation::<S>),
        )
        .route(
            "/cost-estimations/:id",
            patch(handlers::update_cost_estimation::<S>),
        )
        .route(
            "/cost-estimations/:id",
            delete(handlers::delete_cost_estimation::<S>),
        )
        // Master data tables
        .route("/master/:kind", get(handlers::list_master::<S>))
        .route("/master/:kind", post(handlers::create_master::<S>))
        .route("/master/:kind/:id", patch(handlers::update_master::<S>))
        .route("/master/:kind/:id", delete(handlers::delete_master::<S>))
}
