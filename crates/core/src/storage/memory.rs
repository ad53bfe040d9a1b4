use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::field::FieldValue;
use crate::models::portfolio::Portfolio;

use super::traits::PortfolioStore;

/// A stored asset row. Everything but the keys is untyped JSON, like a
/// loosely-typed SQL column: the store never learns what the values mean.
#[derive(Debug, Clone)]
struct AssetRow {
    id: Uuid,
    portfolio_id: Uuid,
    row: Value,
}

/// In-process [`PortfolioStore`] for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    portfolios: RwLock<Vec<Portfolio>>,
    assets: RwLock<Vec<AssetRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset row verbatim, as an older client might have written it
    /// (e.g. `"quantity": "42.0"`). The row needs `id` and `portfolio_id`.
    pub fn insert_raw_asset(&self, row: Value) -> Result<Uuid, CoreError> {
        let id = uuid_field(&row, "id")?;
        let portfolio_id = uuid_field(&row, "portfolio_id")?;
        write(&self.assets)?.push(AssetRow { id, portfolio_id, row });
        Ok(id)
    }

    /// The untyped row for an asset, exactly as stored.
    pub fn raw_asset(&self, asset_id: Uuid) -> Result<Value, CoreError> {
        read(&self.assets)?
            .iter()
            .find(|a| a.id == asset_id)
            .map(|a| a.row.clone())
            .ok_or_else(|| CoreError::AssetNotFound(asset_id.to_string()))
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<(), CoreError> {
        let mut portfolios = write(&self.portfolios)?;
        if portfolios.iter().any(|p| p.id == portfolio.id) {
            return Err(CoreError::Storage(format!(
                "portfolio {} already exists",
                portfolio.id
            )));
        }
        portfolios.push(portfolio.clone());
        Ok(())
    }

    async fn list_portfolios(&self, owner: &str) -> Result<Vec<Portfolio>, CoreError> {
        let mut owned: Vec<Portfolio> = read(&self.portfolios)?
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at)); // newest first
        Ok(owned)
    }

    async fn get_portfolio(&self, owner: &str, portfolio_id: Uuid) -> Result<Portfolio, CoreError> {
        read(&self.portfolios)?
            .iter()
            .find(|p| p.id == portfolio_id && p.owner == owner)
            .cloned()
            .ok_or_else(|| CoreError::PortfolioNotFound(portfolio_id.to_string()))
    }

    async fn delete_portfolio(&self, owner: &str, portfolio_id: Uuid) -> Result<(), CoreError> {
        let mut portfolios = write(&self.portfolios)?;
        let idx = portfolios
            .iter()
            .position(|p| p.id == portfolio_id && p.owner == owner)
            .ok_or_else(|| CoreError::PortfolioNotFound(portfolio_id.to_string()))?;
        portfolios.remove(idx);

        // Cascade
        write(&self.assets)?.retain(|a| a.portfolio_id != portfolio_id);
        Ok(())
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<(), CoreError> {
        let row = serde_json::to_value(asset)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize asset: {e}")))?;
        let mut assets = write(&self.assets)?;
        if assets.iter().any(|a| a.id == asset.id) {
            return Err(CoreError::Storage(format!("asset {} already exists", asset.id)));
        }
        assets.push(AssetRow {
            id: asset.id,
            portfolio_id: asset.portfolio_id,
            row,
        });
        Ok(())
    }

    async fn update_asset_fields(
        &self,
        asset_id: Uuid,
        quantity: Option<&FieldValue>,
        cost_basis: Option<&FieldValue>,
    ) -> Result<(), CoreError> {
        let quantity = quantity.map(slot_value).transpose()?;
        let cost_basis = cost_basis.map(slot_value).transpose()?;

        let mut assets = write(&self.assets)?;
        let stored = assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| CoreError::AssetNotFound(asset_id.to_string()))?;

        let obj = stored
            .row
            .as_object_mut()
            .ok_or_else(|| CoreError::Storage(format!("asset row {asset_id} is not an object")))?;
        if let Some(quantity) = quantity {
            obj.insert("quantity".into(), quantity);
        }
        if let Some(cost_basis) = cost_basis {
            obj.insert("cost_basis".into(), cost_basis);
        }
        Ok(())
    }

    async fn list_assets(&self, portfolio_id: Uuid) -> Result<Vec<Asset>, CoreError> {
        Ok(read(&self.assets)?
            .iter()
            .filter(|a| a.portfolio_id == portfolio_id)
            .map(|a| {
                serde_json::from_value(a.row.clone()).unwrap_or_else(|e| {
                    warn!(asset = %a.id, error = %e, "asset row is unreadable; its fields render locked");
                    Asset::from_unreadable_row(a.id, a.portfolio_id, &a.row)
                })
            })
            .collect())
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, CoreError> {
    lock.read()
        .map_err(|_| CoreError::Storage("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, CoreError> {
    lock.write()
        .map_err(|_| CoreError::Storage("store lock poisoned".into()))
}

fn slot_value(value: &FieldValue) -> Result<Value, CoreError> {
    serde_json::to_value(value)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize field: {e}")))
}

fn uuid_field(row: &Value, name: &str) -> Result<Uuid, CoreError> {
    row.get(name)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::Storage(format!("asset row is missing a valid {name:?}")))
}
