use crate::crypto::MasterKey;
use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::field::FieldValue;
use crate::models::portfolio::Portfolio;
use crate::models::settings::WritePolicy;
use crate::models::view::{PortfolioView, PositionView};

use super::field_service::FieldService;

/// Replacement values produced by [`PortfolioService::seal_legacy_fields`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SealedFields {
    pub quantity: Option<FieldValue>,
    pub cost_basis: Option<FieldValue>,
}

impl SealedFields {
    /// Number of slots that need writing.
    pub fn count(&self) -> usize {
        usize::from(self.quantity.is_some()) + usize::from(self.cost_basis.is_some())
    }
}

/// Builds decrypted portfolio views and migrates plaintext positions.
///
/// Pure logic — no I/O. Each field is handled on its own, so one unreadable
/// field never affects the rest of the portfolio.
pub struct PortfolioService {
    fields: FieldService,
}

impl PortfolioService {
    pub fn new(policy: WritePolicy) -> Self {
        Self {
            fields: FieldService::new(policy),
        }
    }

    pub fn fields(&self) -> &FieldService {
        &self.fields
    }

    /// Resolve one asset's numeric fields.
    pub fn position(&self, asset: &Asset, key: Option<&MasterKey>) -> PositionView {
        PositionView {
            asset_id: asset.id,
            symbol: asset.symbol.clone(),
            quantity: self.fields.open(&asset.quantity, key),
            cost_basis: self.fields.open(&asset.cost_basis, key),
            encrypted: asset.quantity.is_encrypted(),
        }
    }

    /// Resolve every position and aggregate what is readable.
    pub fn view(&self, portfolio: &Portfolio, assets: &[Asset], key: Option<&MasterKey>) -> PortfolioView {
        let positions: Vec<PositionView> = assets.iter().map(|a| self.position(a, key)).collect();

        let total_cost = positions.iter().filter_map(PositionView::total_cost).sum();
        let locked_count = positions
            .iter()
            .filter(|p| p.quantity.is_locked() || p.cost_basis.is_locked())
            .count();

        PortfolioView {
            portfolio_id: portfolio.id,
            name: portfolio.name.clone(),
            currency: portfolio.currency.clone(),
            positions,
            total_cost,
            locked_count,
        }
    }

    /// Seal whichever fields of `asset` are still plaintext. Slots that are
    /// already encrypted or unreadable come back as `None` and must be left as stored.
    pub fn seal_legacy_fields(&self, asset: &Asset, key: &MasterKey) -> Result<SealedFields, CoreError> {
        Ok(SealedFields {
            quantity: self.fields.reseal(&asset.quantity, key)?,
            cost_basis: self.fields.reseal(&asset.cost_basis, key)?,
        })
    }

    /// Trimmed, uppercased ticker symbol.
    pub fn normalize_symbol(symbol: &str) -> Result<String, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::ValidationError("symbol must not be empty".into()));
        }
        if symbol.contains(char::is_whitespace) {
            return Err(CoreError::ValidationError(format!(
                "symbol must not contain whitespace: {symbol:?}"
            )));
        }
        Ok(symbol.to_uppercase())
    }

    pub fn validate_name(name: &str) -> Result<String, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("portfolio name must not be empty".into()));
        }
        Ok(name.to_string())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new(WritePolicy::default())
    }
}
