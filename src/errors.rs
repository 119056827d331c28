use bigdecimal::BigDecimal;
use ethers::types::{Address, TxHash, U256};
use thiserror::Error;

use crate::models::ProtocolVariant;

pub type Result<T> = std::result::Result<T, AmmError>;

#[derive(Debug, Error)]
pub enum AmmError {
    #[error(
        "Not enough {symbol}: required {required}, available {available} (short by {shortfall})"
    )]
    InsufficientBalance {
        symbol: String,
        required: BigDecimal,
        available: BigDecimal,
        shortfall: BigDecimal,
    },

    #[error("Need to refuel signer with {symbol} ({token:?}): balance is zero")]
    NeedsFunding { token: Address, symbol: String },

    #[error("Route of {len} token(s) is not supported by the {variant} protocol")]
    UnsupportedRoute { variant: ProtocolVariant, len: usize },

    #[error("No pool for {token_a:?}/{token_b:?} on factory {factory:?}")]
    PoolNotFound {
        token_a: Address,
        token_b: Address,
        factory: Address,
    },

    #[error("Empty reserve side (reserve0 = {reserve0}, reserve1 = {reserve1})")]
    ZeroReserve { reserve0: U256, reserve1: U256 },

    #[error("Token {token:?} is not part of pool {pool:?}")]
    TokenNotInPool { pool: Address, token: Address },

    #[error("Token {token:?} query failed: {reason}")]
    TokenQueryFailed { token: Address, reason: String },

    #[error("Transaction {0:?} reverted")]
    TransactionReverted(TxHash),

    #[error("Transaction {0:?} dropped before inclusion")]
    TransactionDropped(TxHash),

    #[error("No venue configured for address {0:?}")]
    UnknownVenue(Address),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    Contract(
        #[from]
        ethers::contract::ContractError<ethers::providers::Provider<ethers::providers::Http>>,
    ),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Amount parse error: {0}")]
    ParseAmount(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(&'static str),
}
