use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::logic::matrix::{self, MatrixError};
use crate::logic::matrix_ops::{into_matrix_error, MatrixOps, PricedCombination};
use crate::model::{
    CostEstimation, CostEstimationPatch, Dimension, DimensionValues, Id, MasterKind, MasterRecord,
    NewCostEstimation, PendingCombination,
};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

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

/// List envelope: `{"data": [...], "count": n}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> ListResponse<T> {
    fn new(data: Vec<T>) -> Self {
        let count = data.len();
        Self { data, count }
    }
}

/// Mutation envelope: `{"data": {...}}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn matrix_error_response(err: MatrixError) -> ApiError {
    let status = match &err {
        MatrixError::Validation { .. } | MatrixError::NoNewCombinations => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        MatrixError::Conflict(_) | MatrixError::LastDimensionValue(_) => StatusCode::CONFLICT,
        MatrixError::NotFound(_) => StatusCode::NOT_FOUND,
        MatrixError::Store(inner) => {
            error!("store failure: {:#}", inner);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(&err.to_string())))
}

fn parse_dimension(raw: &str) -> Result<Dimension, ApiError> {
    Dimension::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&format!(
                "unknown dimension \"{}\" (expected project_type, style_preference, or project_specification)",
                raw
            ))),
        )
    })
}

fn parse_master_kind(raw: &str) -> Result<MasterKind, ApiError> {
    MasterKind::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&format!(
                "unknown master table \"{}\" (expected departments, languages, or specializations)",
                raw
            ))),
        )
    })
}

// === Cost estimation CRUD ===

pub async fn list_cost_estimations<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<CostEstimation>>, ApiError> {
    let rows = store
        .list_cost_estimations()
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    Ok(Json(ListResponse::new(rows)))
}

pub async fn get_cost_estimation<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<DataResponse<CostEstimation>>, ApiError> {
    let row = store
        .get_cost_estimation(&id)
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    match row {
        Some(row) => Ok(Json(DataResponse { data: row })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&format!(
                "cost estimation \"{}\" not found",
                id
            ))),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCostEstimationRequest {
    pub project_type: String,
    pub style_preference: String,
    pub project_specification: String,
    pub price_per_sqft: String,
    pub furniture_included_price_per_sqft: String,
}

pub async fn create_cost_estimation<S: Store>(
    State(store): State<AppState<S>>,
    Json(request): Json<CreateCostEstimationRequest>,
) -> Result<(StatusCode, Json<DataResponse<CostEstimation>>), ApiError> {
    let new = NewCostEstimation {
        project_type: request.project_type.trim().to_string(),
        style_preference: request.style_preference.trim().to_string(),
        project_specification: request.project_specification.trim().to_string(),
        price_per_sqft: matrix::parse_price("price_per_sqft", &request.price_per_sqft)
            .map_err(matrix_error_response)?,
        furniture_included_price_per_sqft: matrix::parse_price(
            "furniture_included_price_per_sqft",
            &request.furniture_included_price_per_sqft,
        )
        .map_err(matrix_error_response)?,
    };
    let created = MatrixOps::create_manual(&*store, new)
        .await
        .map_err(matrix_error_response)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

#[derive(Debug, Deserialize)]
pub struct PriceUpdateRequest {
    pub price_per_sqft: Option<String>,
    pub furniture_included_price_per_sqft: Option<String>,
}

pub async fn update_cost_estimation<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    Json(request): Json<PriceUpdateRequest>,
) -> Result<Json<DataResponse<CostEstimation>>, ApiError> {
    let patch = CostEstimationPatch {
        price_per_sqft: request
            .price_per_sqft
            .as_deref()
            .map(|raw| matrix::parse_price("price_per_sqft", raw))
            .transpose()
            .map_err(matrix_error_response)?,
        furniture_included_price_per_sqft: request
            .furniture_included_price_per_sqft
            .as_deref()
            .map(|raw| matrix::parse_price("furniture_included_price_per_sqft", raw))
            .transpose()
            .map_err(matrix_error_response)?,
    };
    let updated = MatrixOps::edit_prices(&*store, &id, patch)
        .await
        .map_err(matrix_error_response)?;
    Ok(Json(DataResponse { data: updated }))
}

pub async fn delete_cost_estimation<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let deleted = store
        .delete_cost_estimation(&id)
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&format!(
                "cost estimation \"{}\" not found",
                id
            ))),
        ))
    }
}

// === Dimension value operations ===

pub async fn get_dimension_values<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<DataResponse<DimensionValues>>, ApiError> {
    let rows = store
        .list_cost_estimations()
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    Ok(Json(DataResponse {
        data: matrix::dimension_values(&rows),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddDimensionValueRequest {
    pub value: String,
}

/// Preview the pending combinations a new dimension value would create. No
/// rows are written; the operator prices the pending set and submits it.
pub async fn preview_dimension_value<S: Store>(
    State(store): State<AppState<S>>,
    Path(dimension): Path<String>,
    Json(request): Json<AddDimensionValueRequest>,
) -> Result<Json<ListResponse<PendingCombination>>, ApiError> {
    let dimension = parse_dimension(&dimension)?;
    let pending = MatrixOps::preview_dimension_value(&*store, dimension, &request.value)
        .await
        .map_err(matrix_error_response)?;
    Ok(Json(ListResponse::new(pending)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitCombinationsRequest {
    pub combinations: Vec<PricedCombination>,
}

pub async fn submit_priced_combinations<S: Store>(
    State(store): State<AppState<S>>,
    Path(dimension): Path<String>,
    Json(request): Json<SubmitCombinationsRequest>,
) -> Result<(StatusCode, Json<ListResponse<CostEstimation>>), ApiError> {
    // The dimension segment keeps the route shape symmetric with preview;
    // the submitted triples carry all the information the batch needs.
    parse_dimension(&dimension)?;
    let outcome = MatrixOps::submit_priced_combinations(&*store, request.combinations)
        .await
        .map_err(matrix_error_response)?;

    match outcome.first_error {
        None => Ok((
            StatusCode::CREATED,
            Json(ListResponse::new(outcome.created)),
        )),
        Some(err) => {
            // Rows created before the failure stay persisted; the next list
            // fetch shows the true state.
            let (status, _) = matrix_error_response(err);
            let err = (
                status,
                Json(ErrorResponse::new(&format!(
                    "batch stopped after creating {} of {} combinations",
                    outcome.created.len(),
                    outcome.attempted
                ))),
            );
            Err(err)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenameDimensionValueRequest {
    pub new_value: String,
}

#[derive(Debug, Serialize)]
pub struct RenameOutcomeResponse {
    pub affected: u64,
}

pub async fn rename_dimension_value<S: Store>(
    State(store): State<AppState<S>>,
    Path((dimension, value)): Path<(String, String)>,
    Json(request): Json<RenameDimensionValueRequest>,
) -> Result<Json<DataResponse<RenameOutcomeResponse>>, ApiError> {
    let dimension = parse_dimension(&dimension)?;
    let affected = MatrixOps::rename_value(&*store, dimension, &value, &request.new_value)
        .await
        .map_err(matrix_error_response)?;
    Ok(Json(DataResponse {
        data: RenameOutcomeResponse { affected },
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteValueResponse {
    pub deleted: usize,
    pub matched: usize,
}

pub async fn delete_dimension_value<S: Store>(
    State(store): State<AppState<S>>,
    Path((dimension, value)): Path<(String, String)>,
) -> Result<Json<DataResponse<DeleteValueResponse>>, ApiError> {
    let dimension = parse_dimension(&dimension)?;
    let outcome = MatrixOps::delete_value(&*store, dimension, &value)
        .await
        .map_err(matrix_error_response)?;

    match outcome.first_error {
        None => Ok(Json(DataResponse {
            data: DeleteValueResponse {
                deleted: outcome.deleted,
                matched: outcome.matched,
            },
        })),
        Some(err) => {
            let (status, _) = matrix_error_response(err);
            Err((
                status,
                Json(ErrorResponse::new(&format!(
                    "delete stopped after removing {} of {} combinations",
                    outcome.deleted, outcome.matched
                ))),
            ))
        }
    }
}

// === Master data ===

#[derive(Debug, Deserialize)]
pub struct MasterNameRequest {
    pub name: String,
}

fn validated_name(kind: MasterKind, raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(&format!(
                "{} name cannot be empty",
                kind.label()
            ))),
        ));
    }
    Ok(name.to_string())
}

pub async fn list_master<S: Store>(
    State(store): State<AppState<S>>,
    Path(kind): Path<String>,
) -> Result<Json<ListResponse<MasterRecord>>, ApiError> {
    let kind = parse_master_kind(&kind)?;
    let records = store
        .list_master(kind)
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    Ok(Json(ListResponse::new(records)))
}

pub async fn create_master<S: Store>(
    State(store): State<AppState<S>>,
    Path(kind): Path<String>,
    Json(request): Json<MasterNameRequest>,
) -> Result<(StatusCode, Json<DataResponse<MasterRecord>>), ApiError> {
    let kind = parse_master_kind(&kind)?;
    let name = validated_name(kind, &request.name)?;
    let record = store
        .create_master(kind, &name)
        .await
        .map_err(|e| matrix_error_response(into_matrix_error(e)))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

pub async fn update_master<S: Store>(
    State(store): State<AppState<S>>,
    Path((kind, id)): Path<(String, Id)>,
    Json(request): Json<MasterNameRequest>,
) -> Result<Json<DataResponse<MasterRecord>>, ApiError> {
    let kind = parse_master_kind(&kind)?;
    let name = validated_name(kind, &request.name)?;
    let record = store
        .update_master(kind, &id, &name)
        .await
        .map_err(|e| matrix_error_response(into_matrix_error(e)))?;
    match record {
        Some(record) => Ok(Json(DataResponse { data: record })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&format!(
                "{} \"{}\" not found",
                kind.label(),
                id
            ))),
        )),
    }
}

pub async fn delete_master<S: Store>(
    State(store): State<AppState<S>>,
    Path((kind, id)): Path<(String, Id)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_master_kind(&kind)?;
    let deleted = store
        .delete_master(kind, &id)
        .await
        .map_err(|e| matrix_error_response(MatrixError::Store(e)))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(&format!(
                "{} \"{}\" not found",
                kind.label(),
                id
            ))),
        ))
    }
}
