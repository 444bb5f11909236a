use anyhow::{Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::logic::matrix::MatrixError;
use crate::model::{
    generate_id, CostEstimation, CostEstimationPatch, Dimension, Id, MasterKind, MasterRecord,
    NewCostEstimation, Price,
};
use crate::store::traits::{CostEstimationStore, MasterStore, Store};

const COST_ESTIMATION_COLUMNS: &str = "cost_estimation_id, project_type, style_preference, \
     project_specification, price_per_sqft::TEXT AS price_per_sqft, \
     furniture_included_price_per_sqft::TEXT AS furniture_included_price_per_sqft, created_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the schema if it does not exist yet. The unique constraint on
    /// the dimension triple is the server-side guard behind the engine's
    /// client-side duplicate pre-check.
    pub async fn migrate(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS cost_estimations (
                cost_estimation_id TEXT PRIMARY KEY,
                project_type TEXT NOT NULL,
                style_preference TEXT NOT NULL,
                project_specification TEXT NOT NULL,
                price_per_sqft NUMERIC(12,2) NOT NULL CHECK (price_per_sqft > 0),
                furniture_included_price_per_sqft NUMERIC(12,2) NOT NULL
                    CHECK (furniture_included_price_per_sqft > 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (project_type, style_preference, project_specification)
            )
            "#,
            "CREATE TABLE IF NOT EXISTS departments (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            "CREATE TABLE IF NOT EXISTS languages (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            "CREATE TABLE IF NOT EXISTS specializations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run database migrations")?;
        }
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn cost_estimation_from_row(row: &PgRow) -> Result<CostEstimation> {
    let price: String = row.try_get("price_per_sqft")?;
    let furniture_price: String = row.try_get("furniture_included_price_per_sqft")?;
    Ok(CostEstimation {
        id: row.try_get("cost_estimation_id")?,
        project_type: row.try_get("project_type")?,
        style_preference: row.try_get("style_preference")?,
        project_specification: row.try_get("project_specification")?,
        price_per_sqft: Price::parse(&price).context("Invalid price stored in database")?,
        furniture_included_price_per_sqft: Price::parse(&furniture_price)
            .context("Invalid price stored in database")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_unique_violation(err: sqlx::Error, conflict: String) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            MatrixError::Conflict(conflict).into()
        }
        _ => anyhow::Error::new(err),
    }
}

#[async_trait::async_trait]
impl CostEstimationStore for PostgresStore {
    async fn list_cost_estimations(&self) -> Result<Vec<CostEstimation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cost_estimations ORDER BY created_at, cost_estimation_id",
            COST_ESTIMATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list cost estimations")?;

        rows.iter().map(cost_estimation_from_row).collect()
    }

    async fn get_cost_estimation(&self, id: &Id) -> Result<Option<CostEstimation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cost_estimations WHERE cost_estimation_id = $1",
            COST_ESTIMATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch cost estimation")?;

        row.as_ref().map(cost_estimation_from_row).transpose()
    }

    async fn create_cost_estimation(&self, new: NewCostEstimation) -> Result<CostEstimation> {
        let conflict = {
            let (p, s, z) = new.triple();
            format!("combination ({}, {}, {}) already exists", p, s, z)
        };
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cost_estimations
                (cost_estimation_id, project_type, style_preference, project_specification,
                 price_per_sqft, furniture_included_price_per_sqft)
            VALUES ($1, $2, $3, $4, CAST($5 AS NUMERIC), CAST($6 AS NUMERIC))
            RETURNING {}
            "#,
            COST_ESTIMATION_COLUMNS
        ))
        .bind(generate_id())
        .bind(&new.project_type)
        .bind(&new.style_preference)
        .bind(&new.project_specification)
        .bind(new.price_per_sqft.as_str())
        .bind(new.furniture_included_price_per_sqft.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, conflict))?;

        cost_estimation_from_row(&row)
    }

    async fn update_prices(
        &self,
        id: &Id,
        patch: CostEstimationPatch,
    ) -> Result<Option<CostEstimation>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE cost_estimations SET
                price_per_sqft = COALESCE(CAST($2 AS NUMERIC), price_per_sqft),
                furniture_included_price_per_sqft =
                    COALESCE(CAST($3 AS NUMERIC), furniture_included_price_per_sqft)
            WHERE cost_estimation_id = $1
            RETURNING {}
            "#,
            COST_ESTIMATION_COLUMNS
        ))
        .bind(id)
        .bind(patch.price_per_sqft.map(String::from))
        .bind(patch.furniture_included_price_per_sqft.map(String::from))
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update cost estimation prices")?;

        row.as_ref().map(cost_estimation_from_row).transpose()
    }

    async fn rename_dimension_value(
        &self,
        dimension: Dimension,
        old_value: &str,
        new_value: &str,
    ) -> Result<u64> {
        // Column names come from the Dimension enum, never from user input.
        let result = sqlx::query(&format!(
            "UPDATE cost_estimations SET {col} = $1 WHERE {col} = $2",
            col = dimension.column()
        ))
        .bind(new_value)
        .bind(old_value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                format!(
                    "renaming {} \"{}\" to \"{}\" would collide with an existing combination",
                    dimension.label(),
                    old_value,
                    new_value
                ),
            )
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_cost_estimation(&self, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cost_estimations WHERE cost_estimation_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete cost estimation")?;

        Ok(result.rows_affected() > 0)
    }
}

fn master_from_row(row: &PgRow) -> Result<MasterRecord> {
    Ok(MasterRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl MasterStore for PostgresStore {
    async fn list_master(&self, kind: MasterKind) -> Result<Vec<MasterRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT id, name, created_at FROM {} ORDER BY created_at, id",
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list {}", kind.table()))?;

        rows.iter().map(master_from_row).collect()
    }

    async fn create_master(&self, kind: MasterKind, name: &str) -> Result<MasterRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO {} (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
            kind.table()
        ))
        .bind(generate_id())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("{} \"{}\" already exists", kind.label(), name))
        })?;

        master_from_row(&row)
    }

    async fn update_master(
        &self,
        kind: MasterKind,
        id: &Id,
        name: &str,
    ) -> Result<Option<MasterRecord>> {
        let row = sqlx::query(&format!(
            "UPDATE {} SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
            kind.table()
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("{} \"{}\" already exists", kind.label(), name))
        })?;

        row.as_ref().map(master_from_row).transpose()
    }

    async fn delete_master(&self, kind: MasterKind, id: &Id) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete {}", kind.label()))?;

        Ok(result.rows_affected() > 0)
    }
}

impl Store for PostgresStore {}
