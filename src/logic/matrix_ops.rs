use log::warn;
use serde::Deserialize;
use std::collections::HashSet;

use crate::logic::matrix::{self, MatrixError};
use crate::model::{
    CostEstimation, CostEstimationPatch, Dimension, Id, NewCostEstimation, PendingCombination,
};
use crate::store::traits::CostEstimationStore;

/// One priced row of a pending set, as submitted by the operator.
#[derive(Debug, Clone, Deserialize)]
pub struct PricedCombination {
    pub project_type: String,
    pub style_preference: String,
    pub project_specification: String,
    pub price_per_sqft: String,
    pub furniture_included_price_per_sqft: String,
}

/// Result of a sequential batch create. `first_error` is set when the batch
/// stopped early; everything in `created` stays persisted regardless.
#[derive(Debug)]
pub struct BatchCreateOutcome {
    pub created: Vec<CostEstimation>,
    pub skipped: usize,
    pub attempted: usize,
    pub first_error: Option<MatrixError>,
}

/// Result of a dimension-value delete. Deletion is row-by-row; a failure
/// aborts the remainder and leaves the earlier deletes committed.
#[derive(Debug)]
pub struct DeleteValueOutcome {
    pub deleted: usize,
    pub matched: usize,
    pub first_error: Option<MatrixError>,
}

/// Stores report unique-constraint races as `MatrixError` wrapped in anyhow;
/// unwrap those so callers see a conflict, not a 500.
pub fn into_matrix_error(err: anyhow::Error) -> MatrixError {
    match err.downcast::<MatrixError>() {
        Ok(matrix) => matrix,
        Err(other) => MatrixError::Store(other),
    }
}

/// The structural operations the pricing matrix supports. Each one
/// re-fetches the row collection first, so every precondition is checked
/// against the freshest state this session can see.
pub struct MatrixOps;

impl MatrixOps {
    /// Phase one of AddDimensionValue: validate the value and compute the
    /// pending combinations the operator must price. No writes.
    pub async fn preview_dimension_value<S: CostEstimationStore>(
        store: &S,
        dimension: Dimension,
        new_value: &str,
    ) -> Result<Vec<PendingCombination>, MatrixError> {
        let rows = store.list_cost_estimations().await.map_err(into_matrix_error)?;
        matrix::pending_combinations(&rows, dimension, new_value)
    }

    /// Phase two of AddDimensionValue: persist the priced pending rows.
    /// Every row is validated before the first create is issued (fail
    /// closed); the creates themselves run sequentially and stop at the
    /// first failure, leaving earlier rows committed.
    pub async fn submit_priced_combinations<S: CostEstimationStore>(
        store: &S,
        priced: Vec<PricedCombination>,
    ) -> Result<BatchCreateOutcome, MatrixError> {
        if priced.is_empty() {
            return Err(MatrixError::validation(
                "combinations",
                "at least one priced combination is required",
            ));
        }

        let mut validated = Vec::with_capacity(priced.len());
        let mut batch_triples = HashSet::new();
        for row in &priced {
            let new = NewCostEstimation {
                project_type: row.project_type.trim().to_string(),
                style_preference: row.style_preference.trim().to_string(),
                project_specification: row.project_specification.trim().to_string(),
                price_per_sqft: matrix::parse_price("price_per_sqft", &row.price_per_sqft)?,
                furniture_included_price_per_sqft: matrix::parse_price(
                    "furniture_included_price_per_sqft",
                    &row.furniture_included_price_per_sqft,
                )?,
            };
            let (p, s, z) = new.triple();
            if p.is_empty() || s.is_empty() || z.is_empty() {
                return Err(MatrixError::validation(
                    "combinations",
                    "every combination needs all three dimension values",
                ));
            }
            if !batch_triples.insert((p.to_string(), s.to_string(), z.to_string())) {
                return Err(MatrixError::validation(
                    "combinations",
                    format!("duplicate combination ({}, {}, {}) in batch", p, s, z),
                ));
            }
            validated.push(new);
        }

        // Triples that appeared since the preview are skipped silently,
        // mirroring the preview-time skip of pre-existing triples.
        let rows = store.list_cost_estimations().await.map_err(into_matrix_error)?;
        let existing: HashSet<(String, String, String)> = rows
            .iter()
            .map(|r| {
                let (p, s, z) = r.triple();
                (p.to_string(), s.to_string(), z.to_string())
            })
            .collect();

        let mut outcome = BatchCreateOutcome {
            created: Vec::new(),
            skipped: 0,
            attempted: 0,
            first_error: None,
        };

        for new in validated {
            let (p, s, z) = new.triple();
            if existing.contains(&(p.to_string(), s.to_string(), z.to_string())) {
                outcome.skipped += 1;
                continue;
            }
            outcome.attempted += 1;
            match store.create_cost_estimation(new).await {
                Ok(created) => outcome.created.push(created),
                Err(err) => {
                    let err = into_matrix_error(err);
                    warn!(
                        "batch create stopped after {} rows: {}",
                        outcome.created.len(),
                        err
                    );
                    outcome.first_error = Some(err);
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Single manual combination entry.
    pub async fn create_manual<S: CostEstimationStore>(
        store: &S,
        new: NewCostEstimation,
    ) -> Result<CostEstimation, MatrixError> {
        let rows = store.list_cost_estimations().await.map_err(into_matrix_error)?;
        matrix::check_new_combination(&rows, &new)?;
        store.create_cost_estimation(new).await.map_err(into_matrix_error)
    }

    /// In-place update of the price fields on one row.
    pub async fn edit_prices<S: CostEstimationStore>(
        store: &S,
        id: &Id,
        patch: CostEstimationPatch,
    ) -> Result<CostEstimation, MatrixError> {
        if patch.is_empty() {
            return Err(MatrixError::validation(
                "price_per_sqft",
                "no price fields supplied",
            ));
        }
        store
            .update_prices(id, patch)
            .await
            .map_err(into_matrix_error)?
            .ok_or_else(|| MatrixError::NotFound(format!("cost estimation \"{}\" not found", id)))
    }

    /// Bulk column rewrite for a dimension-value rename. A single scoped
    /// update, so no partial-rewrite state is observable.
    pub async fn rename_value<S: CostEstimationStore>(
        store: &S,
        dimension: Dimension,
        old_value: &str,
        new_value: &str,
    ) -> Result<u64, MatrixError> {
        let rows = store.list_cost_estimations().await.map_err(into_matrix_error)?;
        if !matrix::distinct_values(&rows, dimension)
            .iter()
            .any(|v| v == old_value)
        {
            return Err(MatrixError::NotFound(format!(
                "{} \"{}\" not found",
                dimension.label(),
                old_value
            )));
        }
        let new_value = matrix::check_rename(&rows, dimension, old_value, new_value)?;
        if new_value == old_value {
            return Ok(0);
        }
        store
            .rename_dimension_value(dimension, old_value, &new_value)
            .await
            .map_err(into_matrix_error)
    }

    /// Remove a dimension value and every row referencing it, one delete at
    /// a time. The last remaining value of a dimension can never be removed.
    pub async fn delete_value<S: CostEstimationStore>(
        store: &S,
        dimension: Dimension,
        value: &str,
    ) -> Result<DeleteValueOutcome, MatrixError> {
        let rows = store.list_cost_estimations().await.map_err(into_matrix_error)?;
        let ids = matrix::plan_delete(&rows, dimension, value)?;

        let mut outcome = DeleteValueOutcome {
            deleted: 0,
            matched: ids.len(),
            first_error: None,
        };
        for id in ids {
            match store.delete_cost_estimation(&id).await {
                Ok(_) => outcome.deleted += 1,
                Err(err) => {
                    let err = into_matrix_error(err);
                    warn!(
                        "delete of {} \"{}\" stopped after {} of {} rows: {}",
                        dimension.label(),
                        value,
                        outcome.deleted,
                        outcome.matched,
                        err
                    );
                    outcome.first_error = Some(err);
                    break;
                }
            }
        }
        Ok(outcome)
    }
}
