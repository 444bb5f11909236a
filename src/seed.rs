use anyhow::Result;
use log::info;

use crate::model::{MasterKind, NewCostEstimation, Price};
use crate::store::traits::Store;

/// Load a small starter matrix and master data for demonstration. Skipped
/// when the tables already hold rows, so repeated startups stay idempotent.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    if !store.list_cost_estimations().await?.is_empty() {
        info!("seed skipped: cost_estimations is not empty");
        return Ok(());
    }

    // 2 project types × 2 style preferences × 2 specifications
    let combinations = [
        ("Villa", "Modern", "Basic", "10", "15"),
        ("Villa", "Modern", "Premium", "14", "20"),
        ("Villa", "Classic", "Basic", "12", "17"),
        ("Villa", "Classic", "Premium", "16", "22"),
        ("Apartment", "Modern", "Basic", "8", "12"),
        ("Apartment", "Modern", "Premium", "11", "16"),
        ("Apartment", "Classic", "Basic", "9", "13"),
        ("Apartment", "Classic", "Premium", "12", "18"),
    ];
    for (project_type, style, spec, price, furniture_price) in combinations {
        store
            .create_cost_estimation(NewCostEstimation {
                project_type: project_type.to_string(),
                style_preference: style.to_string(),
                project_specification: spec.to_string(),
                price_per_sqft: Price::parse(price)?,
                furniture_included_price_per_sqft: Price::parse(furniture_price)?,
            })
            .await?;
    }

    for (kind, names) in [
        (MasterKind::Departments, ["Design", "Sales"].as_slice()),
        (MasterKind::Languages, ["English", "Arabic"].as_slice()),
        (
            MasterKind::Specializations,
            ["Interior", "Landscape"].as_slice(),
        ),
    ] {
        if !store.list_master(kind).await?.is_empty() {
            continue;
        }
        for &name in names {
            store.create_master(kind, name).await?;
        }
    }

    info!("seed data loaded");
    Ok(())
}
