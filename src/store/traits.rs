use anyhow::Result;

use crate::model::{
    CostEstimation, CostEstimationPatch, Dimension, Id, MasterKind, MasterRecord,
    NewCostEstimation,
};

#[async_trait::async_trait]
pub trait CostEstimationStore: Send + Sync {
    async fn list_cost_estimations(&self) -> Result<Vec<CostEstimation>>;
    async fn get_cost_estimation(&self, id: &Id) -> Result<Option<CostEstimation>>;
    async fn create_cost_estimation(&self, new: NewCostEstimation) -> Result<CostEstimation>;
    /// Partial update of the price fields; dimension columns are immutable
    /// through this path.
    async fn update_prices(
        &self,
        id: &Id,
        patch: CostEstimationPatch,
    ) -> Result<Option<CostEstimation>>;
    /// Bulk rewrite of one dimension column, `SET col = new WHERE col = old`.
    /// Returns the number of rows rewritten.
    async fn rename_dimension_value(
        &self,
        dimension: Dimension,
        old_value: &str,
        new_value: &str,
    ) -> Result<u64>;
    async fn delete_cost_estimation(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait MasterStore: Send + Sync {
    async fn list_master(&self, kind: MasterKind) -> Result<Vec<MasterRecord>>;
    async fn create_master(&self, kind: MasterKind, name: &str) -> Result<MasterRecord>;
    async fn update_master(
        &self,
        kind: MasterKind,
        id: &Id,
        name: &str,
    ) -> Result<Option<MasterRecord>>;
    async fn delete_master(&self, kind: MasterKind, id: &Id) -> Result<bool>;
}

pub trait Store: CostEstimationStore + MasterStore + Send + Sync {}
