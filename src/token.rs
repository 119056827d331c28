//! ERC20 balances, metadata and allowances.

use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::chain::ChainClient;
use crate::errors::{AmmError, Result};
use crate::models::{ConfirmationPolicy, TokenHandle};
use crate::utils::format_units;

#[derive(Debug, Clone, Default)]
struct CachedMetadata {
    decimals: Option<u8>,
    symbol: Option<String>,
    name: Option<String>,
}

/// Token reads and allowance writes. Metadata is cached per address for the
/// lifetime of the accountant; balances are always read live.
pub struct TokenAccountant {
    chain: Arc<dyn ChainClient>,
    metadata: RwLock<HashMap<Address, CachedMetadata>>,
}

impl TokenAccountant {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self {
            chain,
            metadata: RwLock::new(HashMap::new()),
        }
    }

    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.chain
            .balance_of(token, owner)
            .await
            .map_err(query_failed(token))
    }

    pub async fn decimals_of(&self, token: Address) -> Result<u8> {
        if let Some(decimals) = self.cached(token, |m| m.decimals).await {
            return Ok(decimals);
        }
        let decimals = self
            .chain
            .decimals(token)
            .await
            .map_err(query_failed(token))?;
        self.metadata.write().await.entry(token).or_default().decimals = Some(decimals);
        Ok(decimals)
    }

    pub async fn symbol_of(&self, token: Address) -> Result<String> {
        if let Some(symbol) = self.cached(token, |m| m.symbol.clone()).await {
            return Ok(symbol);
        }
        let symbol = self
            .chain
            .symbol(token)
            .await
            .map_err(query_failed(token))?;
        self.metadata.write().await.entry(token).or_default().symbol = Some(symbol.clone());
        Ok(symbol)
    }

    pub async fn name_of(&self, token: Address) -> Result<String> {
        if let Some(name) = self.cached(token, |m| m.name.clone()).await {
            return Ok(name);
        }
        let name = self.chain.name(token).await.map_err(query_failed(token))?;
        self.metadata.write().await.entry(token).or_default().name = Some(name.clone());
        Ok(name)
    }

    pub async fn token(&self, token: Address) -> Result<TokenHandle> {
        let (decimals, symbol, name) = futures::try_join!(
            self.decimals_of(token),
            self.symbol_of(token),
            self.name_of(token)
        )?;
        Ok(TokenHandle {
            address: token,
            decimals,
            symbol,
            name,
        })
    }

    pub async fn to_human(&self, token: Address, raw: U256) -> Result<BigDecimal> {
        Ok(format_units(raw, self.decimals_of(token).await?))
    }

    /// Fails with `InsufficientBalance` unless `owner` holds at least
    /// `required` of `token`. Returns the available balance.
    pub async fn ensure_balance(
        &self,
        token: Address,
        owner: Address,
        required: U256,
    ) -> Result<U256> {
        let available = self.balance_of(token, owner).await?;
        if available >= required {
            return Ok(available);
        }
        let decimals = self.decimals_of(token).await?;
        let symbol = self.symbol_of(token).await?;
        Err(AmmError::InsufficientBalance {
            symbol,
            required: format_units(required, decimals),
            available: format_units(available, decimals),
            shortfall: format_units(required - available, decimals),
        })
    }

    /// Sets the allowance of `spender` to exactly `amount`.
    pub async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let tx = self
            .chain
            .approve(owner, token, spender, amount, policy)
            .await?;
        debug!(?token, ?spender, %amount, ?tx, "[TOKEN] approved");
        Ok(tx)
    }

    /// Wraps `amount` of the native coin by depositing into `wrapper`.
    pub async fn wrap_native(
        &self,
        owner: Address,
        wrapper: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let tx = self
            .chain
            .deposit_native(owner, wrapper, amount, policy)
            .await?;
        info!(?wrapper, amount = %format_units(amount, 18), ?tx, "[TOKEN] wrapped native coin");
        Ok(tx)
    }

    async fn cached<T>(&self, token: Address, pick: impl Fn(&CachedMetadata) -> Option<T>) -> Option<T> {
        self.metadata.read().await.get(&token).and_then(pick)
    }
}

fn query_failed(token: Address) -> impl FnOnce(AmmError) -> AmmError {
    move |err| match err {
        AmmError::Contract(e) => AmmError::TokenQueryFailed {
            token,
            reason: e.to_string(),
        },
        other => other,
    }
}
