pub mod crypto;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

use models::{
    asset::Asset,
    portfolio::Portfolio,
    settings::Settings,
    view::PortfolioView,
};
use services::{field_service::parse_amount, portfolio_service::PortfolioService};
use session::Session;
use storage::traits::PortfolioStore;
use uuid::Uuid;

use crypto::{KeyDeriver, MasterKey};
use errors::CoreError;

/// Main entry point for the PrivateFolio core library.
///
/// Holds the settings, the current session (and with it the master key, if
/// unlocked) and the store. Every numeric write goes through the field
/// protocol; the store only ever sees numbers or ciphertext strings.
#[must_use]
pub struct PrivateFolio<S: PortfolioStore> {
    settings: Settings,
    deriver: KeyDeriver,
    session: Option<Session>,
    store: S,
    portfolio_service: PortfolioService,
}

impl<S: PortfolioStore> std::fmt::Debug for PrivateFolio<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateFolio")
            .field("settings", &self.settings)
            .field("user", &self.session.as_ref().map(Session::username))
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}

impl<S: PortfolioStore> PrivateFolio<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            deriver: KeyDeriver::new(settings.kdf),
            portfolio_service: PortfolioService::new(settings.write_policy),
            settings,
            session: None,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Start a session for an already-authenticated user and derive their key
    /// from the password they just logged in with (salted with the username).
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), CoreError> {
        self.start_session(Session::locked(username), password)
    }

    /// Like [`login`](Self::login), but salting with a persisted per-account salt.
    pub fn login_with_salt(&mut self, username: &str, salt: &str, password: &str) -> Result<(), CoreError> {
        self.start_session(Session::with_account_salt(username, salt), password)
    }

    fn start_session(&mut self, mut session: Session, password: &str) -> Result<(), CoreError> {
        if session.username().is_empty() {
            return Err(CoreError::InvalidInput("username must not be empty".into()));
        }
        session.unlock(&self.deriver, password)?;
        tracing::info!(user = %session.username(), "logged in");
        self.session = Some(session);
        Ok(())
    }

    /// Re-derive the key for the current user (e.g. after a page reload).
    pub fn unlock(&mut self, password: &str) -> Result<(), CoreError> {
        let session = self.session.as_mut().ok_or(CoreError::NotLoggedIn)?;
        session.unlock(&self.deriver, password)
    }

    /// Forget the key but stay logged in.
    pub fn lock(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.lock();
        }
    }

    /// End the session; the key is zeroized when the session drops.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user = %session.username(), "logged out");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_unlocked)
    }

    fn current_session(&self) -> Result<&Session, CoreError> {
        self.session.as_ref().ok_or(CoreError::NotLoggedIn)
    }

    fn key(&self) -> Option<&MasterKey> {
        self.session.as_ref().and_then(Session::key)
    }

    // ── Portfolios ──────────────────────────────────────────────────

    pub async fn create_portfolio(
        &self,
        name: &str,
        currency: Option<&str>,
    ) -> Result<Portfolio, CoreError> {
        let session = self.current_session()?;
        let name = PortfolioService::validate_name(name)?;
        let currency = currency
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.settings.default_currency.as_str())
            .to_string();

        let portfolio = Portfolio::new(session.username(), name, Some(currency));
        self.store.insert_portfolio(&portfolio).await?;

        tracing::info!(portfolio = %portfolio.id, user = %session.username(), "portfolio created");
        Ok(portfolio)
    }

    /// The current user's portfolios, newest first.
    pub async fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError> {
        let session = self.current_session()?;
        self.store.list_portfolios(session.username()).await
    }

    /// Delete a portfolio and every asset in it.
    pub async fn delete_portfolio(&self, portfolio_id: Uuid) -> Result<(), CoreError> {
        let session = self.current_session()?;
        self.store.delete_portfolio(session.username(), portfolio_id).await?;
        tracing::info!(portfolio = %portfolio_id, user = %session.username(), "portfolio deleted");
        Ok(())
    }

    /// Load a portfolio and resolve every field the current key can read.
    pub async fn view_portfolio(&self, portfolio_id: Uuid) -> Result<PortfolioView, CoreError> {
        let session = self.current_session()?;
        let portfolio = self.store.get_portfolio(session.username(), portfolio_id).await?;
        let assets = self.store.list_assets(portfolio_id).await?;

        let view = self.portfolio_service.view(&portfolio, &assets, self.key());
        tracing::debug!(
            portfolio = %portfolio_id,
            positions = view.positions.len(),
            locked = view.locked_count,
            "portfolio resolved"
        );
        Ok(view)
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// Add a position. Quantity and cost basis are sealed with the session key
    /// when one is held; otherwise the configured write policy applies.
    pub async fn add_asset(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
        quantity: f64,
        cost_basis: f64,
    ) -> Result<Uuid, CoreError> {
        let session = self.current_session()?;
        let symbol = PortfolioService::normalize_symbol(symbol)?;
        self.store.get_portfolio(session.username(), portfolio_id).await?;

        let fields = self.portfolio_service.fields();
        let quantity = fields.seal(quantity, self.key())?;
        let cost_basis = fields.seal(cost_basis, self.key())?;

        let asset = Asset::new(portfolio_id, symbol, quantity, cost_basis);
        self.store.insert_asset(&asset).await?;

        tracing::info!(
            portfolio = %portfolio_id,
            symbol = %asset.symbol,
            encrypted = asset.quantity.is_encrypted(),
            "asset added"
        );
        Ok(asset.id)
    }

    /// [`add_asset`](Self::add_asset) from raw form input.
    pub async fn add_asset_from_input(
        &self,
        portfolio_id: Uuid,
        symbol: &str,
        quantity: &str,
        cost_basis: &str,
    ) -> Result<Uuid, CoreError> {
        let quantity = parse_amount(quantity)?;
        let cost_basis = parse_amount(cost_basis)?;
        self.add_asset(portfolio_id, symbol, quantity, cost_basis).await
    }

    /// Overwrite both numeric fields of an existing position.
    pub async fn update_asset(
        &self,
        portfolio_id: Uuid,
        asset_id: Uuid,
        quantity: f64,
        cost_basis: f64,
    ) -> Result<(), CoreError> {
        let session = self.current_session()?;
        self.store.get_portfolio(session.username(), portfolio_id).await?;
        let assets = self.store.list_assets(portfolio_id).await?;
        if !assets.iter().any(|a| a.id == asset_id) {
            return Err(CoreError::AssetNotFound(asset_id.to_string()));
        }

        let fields = self.portfolio_service.fields();
        let quantity = fields.seal(quantity, self.key())?;
        let cost_basis = fields.seal(cost_basis, self.key())?;
        self.store
            .update_asset_fields(asset_id, Some(&quantity), Some(&cost_basis))
            .await?;

        tracing::info!(portfolio = %portfolio_id, asset = %asset_id, "asset updated");
        Ok(())
    }

    /// Encrypt every plaintext quantity / cost basis in a portfolio with the
    /// session key. Returns the number of fields sealed.
    pub async fn encrypt_legacy_fields(&self, portfolio_id: Uuid) -> Result<usize, CoreError> {
        let session = self.current_session()?;
        let key = session.key().ok_or(CoreError::Locked)?;
        self.store.get_portfolio(session.username(), portfolio_id).await?;

        let mut sealed = 0;
        for asset in self.store.list_assets(portfolio_id).await? {
            let fields = self.portfolio_service.seal_legacy_fields(&asset, key)?;
            if fields.count() > 0 {
                self.store
                    .update_asset_fields(asset.id, fields.quantity.as_ref(), fields.cost_basis.as_ref())
                    .await?;
                sealed += fields.count();
            }
        }

        tracing::info!(portfolio = %portfolio_id, sealed, "legacy fields encrypted");
        Ok(sealed)
    }
}
