//! Configuration loader and application settings.

use std::collections::HashSet;

use ethers::types::{Address, U256};
use url::Url;

use crate::errors::{AmmError, Result};
use crate::models::{ConfirmationPolicy, DeadlineStrategy, Venue, WorkflowConfig};
use crate::utils::parse_units;

/// Native coin wrapped when the wrapper token itself has to be acquired.
pub const DEFAULT_WRAP_RESERVE: &str = "10000000";

/// Configured venues, looked up by factory or router address.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    venues: Vec<Venue>,
}

impl VenueRegistry {
    /// Fails on duplicate factory or router addresses.
    pub fn new(venues: Vec<Venue>) -> Result<Self> {
        let mut factories = HashSet::new();
        let mut routers = HashSet::new();
        for venue in &venues {
            if !factories.insert(venue.factory) {
                return Err(AmmError::Config(format!(
                    "factory {:?} configured twice",
                    venue.factory
                )));
            }
            if !routers.insert(venue.router) {
                return Err(AmmError::Config(format!(
                    "router {:?} configured twice",
                    venue.router
                )));
            }
        }
        Ok(Self { venues })
    }

    pub fn by_factory(&self, factory: Address) -> Result<&Venue> {
        self.venues
            .iter()
            .find(|v| v.factory == factory)
            .ok_or(AmmError::UnknownVenue(factory))
    }

    pub fn by_router(&self, router: Address) -> Result<&Venue> {
        self.venues
            .iter()
            .find(|v| v.router == router)
            .ok_or(AmmError::UnknownVenue(router))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Venue> {
        self.venues.iter()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

/// Native-coin wrapper token and how much to wrap when acquiring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWrap {
    pub wrapper: Address,
    pub reserve_amount: U256,
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC endpoint for the Ethereum-compatible node.
    pub rpc_url: Url,
    pub venues: VenueRegistry,
    pub native: NativeWrap,
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            var(key).ok_or_else(|| AmmError::Config(format!("Set {key} env var")))
        };

        let rpc_url = Url::parse(&required("RPC_URL")?)?;

        let venues: Vec<Venue> = serde_json::from_str(&required("AMM_VENUES")?)?;
        if venues.is_empty() {
            return Err(AmmError::Config("AMM_VENUES lists no venue".into()));
        }
        let venues = VenueRegistry::new(venues)?;

        let wrapper = parse_address("NATIVE_WRAPPER", &required("NATIVE_WRAPPER")?)?;
        let reserve_amount = parse_units(
            &var("WRAP_RESERVE").unwrap_or_else(|| DEFAULT_WRAP_RESERVE.into()),
            18,
        )?;
        if reserve_amount.is_zero() {
            return Err(AmmError::Config(
                "WRAP_RESERVE must leave a non-zero native balance".into(),
            ));
        }

        let confirmation = match var("CONFIRMATION").as_deref() {
            None | Some("wait_for_inclusion") => ConfirmationPolicy::WaitForInclusion,
            Some("fire_and_forget") => ConfirmationPolicy::FireAndForget,
            Some(other) => {
                return Err(AmmError::Config(format!(
                    "CONFIRMATION must be wait_for_inclusion or fire_and_forget, got {other:?}"
                )));
            }
        };
        let deadline = match var("DEADLINE") {
            None => DeadlineStrategy::FarFuture,
            Some(raw) => DeadlineStrategy::At(raw.trim().parse().map_err(|_| {
                AmmError::Config(format!("DEADLINE must be unix seconds, got {raw:?}"))
            })?),
        };

        Ok(Self {
            rpc_url,
            venues,
            native: NativeWrap {
                wrapper,
                reserve_amount,
            },
            workflow: WorkflowConfig {
                confirmation,
                deadline,
            },
        })
    }
}

fn parse_address(key: &str, raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|_| AmmError::Config(format!("{key} is not an address: {raw:?}")))
}
