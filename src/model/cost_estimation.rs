use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{Id, Price};

/// The three categorical axes of the pricing matrix. A dimension has no
/// storage of its own; its value set is derived from the combination rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ProjectType,
    StylePreference,
    ProjectSpecification,
}

impl Dimension {
    /// Column name in the `cost_estimations` table (also the wire name).
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::ProjectType => "project_type",
            Dimension::StylePreference => "style_preference",
            Dimension::ProjectSpecification => "project_specification",
        }
    }

    /// Human-readable label used in operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::ProjectType => "project type",
            Dimension::StylePreference => "style preference",
            Dimension::ProjectSpecification => "project specification",
        }
    }

    /// The other two axes, in a fixed order.
    pub fn others(&self) -> (Dimension, Dimension) {
        match self {
            Dimension::ProjectType => {
                (Dimension::StylePreference, Dimension::ProjectSpecification)
            }
            Dimension::StylePreference => {
                (Dimension::ProjectType, Dimension::ProjectSpecification)
            }
            Dimension::ProjectSpecification => {
                (Dimension::ProjectType, Dimension::StylePreference)
            }
        }
    }
}

impl FromStr for Dimension {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project_type" => Ok(Dimension::ProjectType),
            "style_preference" => Ok(Dimension::StylePreference),
            "project_specification" => Ok(Dimension::ProjectSpecification),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One priced cell of the project type × style preference × specification
/// cross-product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimation {
    #[serde(rename = "cost_estimation_id")]
    pub id: Id,
    pub project_type: String,
    pub style_preference: String,
    pub project_specification: String,
    pub price_per_sqft: Price,
    pub furniture_included_price_per_sqft: Price,
    pub created_at: DateTime<Utc>,
}

impl CostEstimation {
    pub fn triple(&self) -> (&str, &str, &str) {
        (
            &self.project_type,
            &self.style_preference,
            &self.project_specification,
        )
    }

    pub fn dimension_value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::ProjectType => &self.project_type,
            Dimension::StylePreference => &self.style_preference,
            Dimension::ProjectSpecification => &self.project_specification,
        }
    }

    pub fn set_dimension_value(&mut self, dimension: Dimension, value: &str) {
        match dimension {
            Dimension::ProjectType => self.project_type = value.to_string(),
            Dimension::StylePreference => self.style_preference = value.to_string(),
            Dimension::ProjectSpecification => self.project_specification = value.to_string(),
        }
    }
}

/// Validated fields for a combination about to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCostEstimation {
    pub project_type: String,
    pub style_preference: String,
    pub project_specification: String,
    pub price_per_sqft: Price,
    pub furniture_included_price_per_sqft: Price,
}

impl NewCostEstimation {
    pub fn triple(&self) -> (&str, &str, &str) {
        (
            &self.project_type,
            &self.style_preference,
            &self.project_specification,
        )
    }
}

/// Partial price update; dimension columns are never touched through this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostEstimationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqft: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furniture_included_price_per_sqft: Option<Price>,
}

impl CostEstimationPatch {
    pub fn is_empty(&self) -> bool {
        self.price_per_sqft.is_none() && self.furniture_included_price_per_sqft.is_none()
    }
}

/// An unpriced draft produced when a new dimension value is introduced,
/// awaiting operator-supplied prices before it becomes a real combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCombination {
    pub project_type: String,
    pub style_preference: String,
    pub project_specification: String,
}

impl PendingCombination {
    pub fn triple(&self) -> (&str, &str, &str) {
        (
            &self.project_type,
            &self.style_preference,
            &self.project_specification,
        )
    }
}

/// The derived distinct-value sets of the three dimensions, first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValues {
    pub project_types: Vec<String>,
    pub style_preferences: Vec<String>,
    pub project_specifications: Vec<String>,
}
