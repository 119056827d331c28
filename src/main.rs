use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::types::Address;
use unified_amm::{
    chain::EthersChain,
    config::AppConfig,
    dex::{PairResolver, ReserveReader},
    token::TokenAccountant,
    utils,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    let token_a: Address = std::env::var("SCAN_TOKEN_A")
        .context("Set SCAN_TOKEN_A env var to the first token of the scanned pair")?
        .parse()?;
    let token_b: Address = std::env::var("SCAN_TOKEN_B")
        .context("Set SCAN_TOKEN_B env var to the second token of the scanned pair")?
        .parse()?;

    tracing::info!(
        venues = config.venues.len(),
        confirmation = ?config.workflow.confirmation,
        "[INIT] unified-amm pool scan starting"
    );

    let chain = Arc::new(EthersChain::connect(config.rpc_url.as_str())?);
    let tokens = Arc::new(TokenAccountant::new(chain.clone()));
    let resolver = PairResolver::new(chain.clone());
    let reader = ReserveReader::new(chain.clone(), tokens.clone());

    let symbol_a = tokens.symbol_of(token_a).await?;
    let symbol_b = tokens.symbol_of(token_b).await?;

    for venue in config.venues.iter() {
        let pool = match resolver
            .resolve_pair(token_a, token_b, venue.factory, venue.variant)
            .await
        {
            Ok(Some(pool)) => pool,
            Ok(None) => {
                tracing::info!(venue = %venue.label, "[SCAN] no {symbol_a}/{symbol_b} pool");
                continue;
            }
            Err(e) => {
                tracing::warn!(venue = %venue.label, ?e, "[SCAN] pair lookup failed");
                continue;
            }
        };

        match reader.lp_info(pool, token_a).await {
            Ok(info) => tracing::info!(
                venue = %venue.label,
                variant = %venue.variant,
                ?pool,
                stacked_a = %info.token_stacked,
                stacked_b = %info.opposite_stacked,
                price = info.price,
                "[SCAN] {symbol_a} priced in {symbol_b}"
            ),
            Err(e) => tracing::warn!(venue = %venue.label, ?pool, ?e, "[SCAN] reserve read failed"),
        }
    }
    Ok(())
}
