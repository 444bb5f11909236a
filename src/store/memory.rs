use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::logic::matrix::MatrixError;
use crate::model::{
    generate_id, CostEstimation, CostEstimationPatch, Dimension, Id, MasterKind, MasterRecord,
    NewCostEstimation,
};
use crate::store::traits::{CostEstimationStore, MasterStore, Store};

/// In-memory store used by the test suite and for local development without
/// Postgres. Enforces the same uniqueness rules as the database schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cost_estimations: RwLock<Vec<CostEstimation>>,
    master: RwLock<HashMap<MasterKind, Vec<MasterRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CostEstimationStore for MemoryStore {
    async fn list_cost_estimations(&self) -> Result<Vec<CostEstimation>> {
        Ok(self.cost_estimations.read().clone())
    }

    async fn get_cost_estimation(&self, id: &Id) -> Result<Option<CostEstimation>> {
        Ok(self
            .cost_estimations
            .read()
            .iter()
            .find(|row| &row.id == id)
            .cloned())
    }

    async fn create_cost_estimation(&self, new: NewCostEstimation) -> Result<CostEstimation> {
        let mut rows = self.cost_estimations.write();
        if rows.iter().any(|row| row.triple() == new.triple()) {
            let (p, s, z) = new.triple();
            return Err(MatrixError::Conflict(format!(
                "combination ({}, {}, {}) already exists",
                p, s, z
            ))
            .into());
        }
        let row = CostEstimation {
            id: generate_id(),
            project_type: new.project_type,
            style_preference: new.style_preference,
            project_specification: new.project_specification,
            price_per_sqft: new.price_per_sqft,
            furniture_included_price_per_sqft: new.furniture_included_price_per_sqft,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update_prices(
        &self,
        id: &Id,
        patch: CostEstimationPatch,
    ) -> Result<Option<CostEstimation>> {
        let mut rows = self.cost_estimations.write();
        let Some(row) = rows.iter_mut().find(|row| &row.id == id) else {
            return Ok(None);
        };
        if let Some(price) = patch.price_per_sqft {
            row.price_per_sqft = price;
        }
        if let Some(price) = patch.furniture_included_price_per_sqft {
            row.furniture_included_price_per_sqft = price;
        }
        Ok(Some(row.clone()))
    }

    async fn rename_dimension_value(
        &self,
        dimension: Dimension,
        old_value: &str,
        new_value: &str,
    ) -> Result<u64> {
        let mut rows = self.cost_estimations.write();
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.dimension_value(dimension) == old_value {
                row.set_dimension_value(dimension, new_value);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete_cost_estimation(&self, id: &Id) -> Result<bool> {
        let mut rows = self.cost_estimations.write();
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        Ok(rows.len() < before)
    }
}

#[async_trait::async_trait]
impl MasterStore for MemoryStore {
    async fn list_master(&self, kind: MasterKind) -> Result<Vec<MasterRecord>> {
        Ok(self
            .master
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_master(&self, kind: MasterKind, name: &str) -> Result<MasterRecord> {
        let mut master = self.master.write();
        let records = master.entry(kind).or_default();
        if records.iter().any(|r| r.name == name) {
            return Err(MatrixError::Conflict(format!(
                "{} \"{}\" already exists",
                kind.label(),
                name
            ))
            .into());
        }
        let record = MasterRecord {
            id: generate_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_master(
        &self,
        kind: MasterKind,
        id: &Id,
        name: &str,
    ) -> Result<Option<MasterRecord>> {
        let mut master = self.master.write();
        let records = master.entry(kind).or_default();
        if records.iter().any(|r| r.name == name && &r.id != id) {
            return Err(MatrixError::Conflict(format!(
                "{} \"{}\" already exists",
                kind.label(),
                name
            ))
            .into());
        }
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            return Ok(None);
        };
        record.name = name.to_string();
        Ok(Some(record.clone()))
    }

    async fn delete_master(&self, kind: MasterKind, id: &Id) -> Result<bool> {
        let mut master = self.master.write();
        let records = master.entry(kind).or_default();
        let before = records.len();
        records.retain(|r| &r.id != id);
        Ok(records.len() < before)
    }
}

impl Store for MemoryStore {}
