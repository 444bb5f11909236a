use itertools::Itertools;
use std::collections::HashSet;

use crate::model::{
    CostEstimation, Dimension, DimensionValues, Id, NewCostEstimation, PendingCombination, Price,
};

/// Errors the matrix engine can report. Every precondition violation is
/// raised before any store call is issued.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("No new combinations would be created")]
    NoNewCombinations,

    #[error("Cannot delete the last {0}")]
    LastDimensionValue(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl MatrixError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        MatrixError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Distinct values of one dimension across all rows, in first-seen order.
pub fn distinct_values(rows: &[CostEstimation], dimension: Dimension) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        let value = row.dimension_value(dimension);
        if seen.insert(value.to_string()) {
            values.push(value.to_string());
        }
    }
    values
}

/// All three derived value sets, recomputed from the row collection. Never
/// cached across mutations.
pub fn dimension_values(rows: &[CostEstimation]) -> DimensionValues {
    DimensionValues {
        project_types: distinct_values(rows, Dimension::ProjectType),
        style_preferences: distinct_values(rows, Dimension::StylePreference),
        project_specifications: distinct_values(rows, Dimension::ProjectSpecification),
    }
}

fn existing_triples<'a>(rows: &'a [CostEstimation]) -> HashSet<(&'a str, &'a str, &'a str)> {
    rows.iter().map(|row| row.triple()).collect()
}

fn assemble(
    dimension: Dimension,
    value: &str,
    first: &str,
    second: &str,
) -> (String, String, String) {
    // `others()` returns the remaining axes in (first, second) order; map the
    // pair back onto the fixed triple order.
    match dimension {
        Dimension::ProjectType => (value.to_string(), first.to_string(), second.to_string()),
        Dimension::StylePreference => (first.to_string(), value.to_string(), second.to_string()),
        Dimension::ProjectSpecification => {
            (first.to_string(), second.to_string(), value.to_string())
        }
    }
}

/// Validate a new dimension value and compute the pending combinations it
/// implies: the cross-product of the value against the other two dimensions'
/// current value sets, minus triples that already exist.
pub fn pending_combinations(
    rows: &[CostEstimation],
    dimension: Dimension,
    new_value: &str,
) -> Result<Vec<PendingCombination>, MatrixError> {
    let value = new_value.trim();
    if value.is_empty() {
        return Err(MatrixError::validation(
            dimension.column(),
            format!("{} cannot be empty", dimension.label()),
        ));
    }
    if distinct_values(rows, dimension).iter().any(|v| v == value) {
        return Err(MatrixError::validation(
            dimension.column(),
            format!("\"{}\" already exists as a {}", value, dimension.label()),
        ));
    }

    let (first_dim, second_dim) = dimension.others();
    let first_values = distinct_values(rows, first_dim);
    let second_values = distinct_values(rows, second_dim);
    let existing = existing_triples(rows);

    let pending: Vec<PendingCombination> = first_values
        .iter()
        .cartesian_product(second_values.iter())
        .map(|(first, second)| {
            let (project_type, style_preference, project_specification) =
                assemble(dimension, value, first, second);
            PendingCombination {
                project_type,
                style_preference,
                project_specification,
            }
        })
        // A colliding triple can only appear through a concurrent manual
        // insert; skip it silently rather than erroring.
        .filter(|p| !existing.contains(&p.triple()))
        .collect();

    if pending.is_empty() {
        return Err(MatrixError::NoNewCombinations);
    }
    Ok(pending)
}

/// Validate a rename of one dimension value. Returns the trimmed new value.
/// Renaming onto another existing value would silently merge two categories,
/// so it is rejected.
pub fn check_rename(
    rows: &[CostEstimation],
    dimension: Dimension,
    old_value: &str,
    new_value: &str,
) -> Result<String, MatrixError> {
    let new_value = new_value.trim();
    if new_value.is_empty() {
        return Err(MatrixError::validation(
            dimension.column(),
            format!("{} cannot be empty", dimension.label()),
        ));
    }
    if new_value != old_value
        && distinct_values(rows, dimension)
            .iter()
            .any(|v| v == new_value)
    {
        return Err(MatrixError::validation(
            dimension.column(),
            format!(
                "\"{}\" already exists as a {}",
                new_value,
                dimension.label()
            ),
        ));
    }
    Ok(new_value.to_string())
}

/// Validate a dimension-value delete and return the ids of the rows it
/// removes. Deleting the only value of a dimension is always rejected so the
/// cross-product never degenerates.
pub fn plan_delete(
    rows: &[CostEstimation],
    dimension: Dimension,
    value: &str,
) -> Result<Vec<Id>, MatrixError> {
    let values = distinct_values(rows, dimension);
    if !values.iter().any(|v| v == value) {
        return Err(MatrixError::NotFound(format!(
            "{} \"{}\" not found",
            dimension.label(),
            value
        )));
    }
    if !values.iter().any(|v| v != value) {
        return Err(MatrixError::LastDimensionValue(dimension.label()));
    }

    Ok(rows
        .iter()
        .filter(|row| row.dimension_value(dimension) == value)
        .map(|row| row.id.clone())
        .collect())
}

/// Pre-check for a manual combination: no field empty, triple not already
/// present in the loaded rows. The database unique constraint backs this up
/// under races.
pub fn check_new_combination(
    rows: &[CostEstimation],
    new: &NewCostEstimation,
) -> Result<(), MatrixError> {
    for (field, value) in [
        ("project_type", &new.project_type),
        ("style_preference", &new.style_preference),
        ("project_specification", &new.project_specification),
    ] {
        if value.trim().is_empty() {
            return Err(MatrixError::validation(
                field,
                format!("{} cannot be empty", field.replace('_', " ")),
            ));
        }
    }
    if existing_triples(rows).contains(&new.triple()) {
        return Err(MatrixError::validation(
            "project_type",
            format!(
                "combination ({}, {}, {}) already exists",
                new.project_type, new.style_preference, new.project_specification
            ),
        ));
    }
    Ok(())
}

/// Parse a raw price string into a validated [`Price`], reporting against the
/// given field.
pub fn parse_price(field: &'static str, raw: &str) -> Result<Price, MatrixError> {
    Price::parse(raw).map_err(|e| MatrixError::validation(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::model::generate_id;

    fn row(project_type: &str, style: &str, spec: &str) -> CostEstimation {
        CostEstimation {
            id: generate_id(),
            project_type: project_type.to_string(),
            style_preference: style.to_string(),
            project_specification: spec.to_string(),
            price_per_sqft: Price::parse("10").unwrap(),
            furniture_included_price_per_sqft: Price::parse("15").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn distinct_values_first_seen_order() {
        let rows = vec![
            row("Villa", "Modern", "Basic"),
            row("Apartment", "Modern", "Basic"),
            row("Villa", "Classic", "Premium"),
        ];
        assert_eq!(
            distinct_values(&rows, Dimension::ProjectType),
            vec!["Villa", "Apartment"]
        );
        assert_eq!(
            distinct_values(&rows, Dimension::StylePreference),
            vec!["Modern", "Classic"]
        );
        assert_eq!(
            distinct_values(&rows, Dimension::ProjectSpecification),
            vec!["Basic", "Premium"]
        );
    }

    #[test]
    fn pending_set_for_single_row_matrix() {
        // {(Villa, Modern, Basic)} + Classic style preference
        let rows = vec![row("Villa", "Modern", "Basic")];
        let pending =
            pending_combinations(&rows, Dimension::StylePreference, "Classic").unwrap();
        assert_eq!(
            pending,
            vec![PendingCombination {
                project_type: "Villa".to_string(),
                style_preference: "Classic".to_string(),
                project_specification: "Basic".to_string(),
            }]
        );
    }

    #[test]
    fn pending_set_is_full_cross_product_of_other_dimensions() {
        let rows = vec![
            row("Villa", "Modern", "Basic"),
            row("Apartment", "Modern", "Premium"),
        ];
        let mut pending =
            pending_combinations(&rows, Dimension::StylePreference, "Classic").unwrap();
        pending.sort_by(|a, b| a.triple().cmp(&b.triple()));

        // 2 project types × 2 specifications
        assert_eq!(pending.len(), 4);
        assert!(pending.iter().all(|p| p.style_preference == "Classic"));
        let mut triples: Vec<_> = pending.iter().map(|p| p.triple()).collect();
        triples.dedup();
        assert_eq!(triples.len(), 4);
    }

    #[test]
    fn add_value_rejects_empty_and_duplicate() {
        let rows = vec![row("Villa", "Modern", "Basic")];
        assert!(matches!(
            pending_combinations(&rows, Dimension::ProjectType, "  "),
            Err(MatrixError::Validation { .. })
        ));
        assert!(matches!(
            pending_combinations(&rows, Dimension::ProjectType, "Villa"),
            Err(MatrixError::Validation { .. })
        ));
        // Case-sensitive exact match: a different casing is a new value.
        assert!(pending_combinations(&rows, Dimension::ProjectType, "villa").is_ok());
    }

    #[test]
    fn add_value_on_empty_matrix_reports_no_new_combinations() {
        assert!(matches!(
            pending_combinations(&[], Dimension::ProjectType, "Villa"),
            Err(MatrixError::NoNewCombinations)
        ));
    }

    #[test]
    fn rename_rejects_merge_onto_existing_value() {
        let rows = vec![
            row("Villa", "Modern", "Basic"),
            row("Apartment", "Modern", "Basic"),
        ];
        assert!(matches!(
            check_rename(&rows, Dimension::ProjectType, "Villa", "Apartment"),
            Err(MatrixError::Validation { .. })
        ));
        // Renaming to itself (e.g. trimming whitespace) is allowed.
        assert_eq!(
            check_rename(&rows, Dimension::ProjectType, "Villa", " Villa ").unwrap(),
            "Villa"
        );
        assert_eq!(
            check_rename(&rows, Dimension::ProjectType, "Villa", "Mansion").unwrap(),
            "Mansion"
        );
    }

    #[test]
    fn delete_rejects_last_value() {
        let rows = vec![
            row("Villa", "Modern", "Basic"),
            row("Villa", "Classic", "Basic"),
        ];
        assert!(matches!(
            plan_delete(&rows, Dimension::ProjectType, "Villa"),
            Err(MatrixError::LastDimensionValue("project type"))
        ));
        assert!(matches!(
            plan_delete(&rows, Dimension::ProjectSpecification, "Basic"),
            Err(MatrixError::LastDimensionValue(_))
        ));
    }

    #[test]
    fn delete_plan_selects_matching_rows_only() {
        // {(A,X,1), (A,Y,1), (B,X,1)}, delete project type A
        let rows = vec![row("A", "X", "1"), row("A", "Y", "1"), row("B", "X", "1")];
        let ids = plan_delete(&rows, Dimension::ProjectType, "A").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&rows[0].id));
        assert!(ids.contains(&rows[1].id));
    }

    #[test]
    fn delete_unknown_value_is_not_found() {
        let rows = vec![row("A", "X", "1"), row("B", "X", "1")];
        assert!(matches!(
            plan_delete(&rows, Dimension::ProjectType, "C"),
            Err(MatrixError::NotFound(_))
        ));
    }

    #[test]
    fn manual_combination_duplicate_triple_rejected() {
        let rows = vec![row("Villa", "Modern", "Basic")];
        let duplicate = NewCostEstimation {
            project_type: "Villa".to_string(),
            style_preference: "Modern".to_string(),
            project_specification: "Basic".to_string(),
            price_per_sqft: Price::parse("12").unwrap(),
            furniture_included_price_per_sqft: Price::parse("18").unwrap(),
        };
        assert!(matches!(
            check_new_combination(&rows, &duplicate),
            Err(MatrixError::Validation { .. })
        ));

        let fresh = NewCostEstimation {
            project_specification: "Premium".to_string(),
            ..duplicate
        };
        assert!(check_new_combination(&rows, &fresh).is_ok());
    }
}
