use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::field::FieldValue;
use crate::models::portfolio::Portfolio;

/// The persistence collaborator, seen as an opaque store.
///
/// Implementations must keep `quantity` / `cost_basis` exactly as given (a
/// number or a string in the same slot) and must not interpret them.
/// Portfolio lookups are scoped to the owning username.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PortfolioStore: Send + Sync {
    async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<(), CoreError>;

    /// All portfolios of `owner`, newest first.
    async fn list_portfolios(&self, owner: &str) -> Result<Vec<Portfolio>, CoreError>;

    /// Fails with `PortfolioNotFound` if it does not exist or belongs to someone else.
    async fn get_portfolio(&self, owner: &str, portfolio_id: Uuid) -> Result<Portfolio, CoreError>;

    /// Removes the portfolio and all of its assets.
    async fn delete_portfolio(&self, owner: &str, portfolio_id: Uuid) -> Result<(), CoreError>;

    async fn insert_asset(&self, asset: &Asset) -> Result<(), CoreError>;

    /// Overwrite the numeric fields of an asset. A `None` slot is left exactly as stored.
    async fn update_asset_fields(
        &self,
        asset_id: Uuid,
        quantity: Option<&FieldValue>,
        cost_basis: Option<&FieldValue>,
    ) -> Result<(), CoreError>;

    /// Assets of a portfolio in insertion order.
    async fn list_assets(&self, portfolio_id: Uuid) -> Result<Vec<Asset>, CoreError>;
}
