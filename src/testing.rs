//! In-memory chain used by unit tests.
//!
//! Models ERC20 balances and allowances, constant-product pools with the
//! 0.3% fee, and both router shapes. Every successful mutating call is
//! recorded as a [`TxKind`]; reverted calls leave no trace.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use ethers::contract::ContractError;
use ethers::types::{Address, Bytes, TxHash, U256};

use crate::chain::{
    ChainClient, LiquidityDeposit, LiquidityWithdrawal, NativeSwap, PathSwap, PoolSwap,
};
use crate::dex::sort_tokens;
use crate::errors::{AmmError, Result};
use crate::models::{ConfirmationPolicy, TierParams};

const MINIMUM_LIQUIDITY: u64 = 1_000;
const DEAD: u64 = 0xdead;
/// Block time of the mock chain; deadlines before it revert.
pub const MOCK_NOW: u64 = 1_700_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxKind {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Deposit,
    Swap,
    AddLiquidity {
        pool: Address,
    },
    RemoveLiquidity,
}

/// Terms a mutating call was submitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxTerms {
    pub policy: ConfirmationPolicy,
    /// `None` for calls without a deadline argument.
    pub deadline: Option<U256>,
    /// `amountOutMin` of a swap, `[amountAMin, amountBMin]` of a liquidity call.
    pub minimums: Vec<U256>,
}

impl TxTerms {
    fn plain(policy: ConfirmationPolicy) -> Self {
        Self {
            policy,
            deadline: None,
            minimums: Vec::new(),
        }
    }

    fn bounded(policy: ConfirmationPolicy, deadline: U256, minimums: Vec<U256>) -> Self {
        Self {
            policy,
            deadline: Some(deadline),
            minimums,
        }
    }
}

struct TokenState {
    symbol: String,
    name: String,
    decimals: u8,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

#[derive(Clone, Copy)]
struct PoolState {
    factory: Address,
    tier: Option<TierParams>,
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
    total_supply: U256,
}

impl PoolState {
    fn reserves_from(&self, token_in: Address) -> Option<(U256, U256, Address)> {
        if token_in == self.token0 {
            Some((self.reserve0, self.reserve1, self.token1))
        } else if token_in == self.token1 {
            Some((self.reserve1, self.reserve0, self.token0))
        } else {
            None
        }
    }
}

/// One hop of a swap: the pool and the token sold into it.
type Hop = (Address, Address);

#[derive(Default)]
struct Ledger {
    next_address: u64,
    next_tx: u64,
    tokens: HashMap<Address, TokenState>,
    pools: HashMap<Address, PoolState>,
    factories: HashSet<Address>,
    routers: HashMap<Address, Address>,
    native: HashMap<Address, U256>,
    wrapper: Option<Address>,
    submitted: Vec<TxKind>,
    terms: Vec<TxTerms>,
    now: u64,
    metadata_reads: usize,
    unreadable: HashSet<Address>,
}

fn not_deployed() -> AmmError {
    AmmError::Contract(ContractError::ContractNotDeployed)
}

fn revert(reason: &str) -> AmmError {
    AmmError::Contract(ContractError::Revert(Bytes::from(
        reason.as_bytes().to_vec(),
    )))
}

fn deposit_terms(policy: ConfirmationPolicy, deposit: &LiquidityDeposit) -> TxTerms {
    TxTerms::bounded(
        policy,
        deposit.deadline,
        vec![deposit.amount_a_min, deposit.amount_b_min],
    )
}

fn quote_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if amount_in.is_zero() {
        return Err(revert("INSUFFICIENT_INPUT_AMOUNT"));
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(revert("INSUFFICIENT_LIQUIDITY"));
    }
    let with_fee = amount_in * U256::from(997u64);
    Ok(with_fee * reserve_out / (reserve_in * U256::from(1_000u64) + with_fee))
}

fn quote_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Result<U256> {
    if reserve_in.is_zero() || amount_out >= reserve_out {
        return Err(revert("INSUFFICIENT_LIQUIDITY"));
    }
    let numerator = reserve_in * amount_out * U256::from(1_000u64);
    let denominator = (reserve_out - amount_out) * U256::from(997u64);
    Ok(numerator / denominator + U256::one())
}

impl Ledger {
    fn fresh_address(&mut self) -> Address {
        self.next_address += 1;
        Address::from_low_u64_be(0x1000 + self.next_address)
    }

    fn record(&mut self, kind: TxKind, terms: TxTerms) -> TxHash {
        self.next_tx += 1;
        self.submitted.push(kind);
        self.terms.push(terms);
        TxHash::from_low_u64_be(self.next_tx)
    }

    fn check_deadline(&self, deadline: U256) -> Result<()> {
        if deadline < U256::from(self.now) {
            return Err(revert("EXPIRED"));
        }
        Ok(())
    }

    fn token(&self, token: Address) -> Result<&TokenState> {
        self.tokens.get(&token).ok_or_else(not_deployed)
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenState> {
        self.tokens.get_mut(&token).ok_or_else(not_deployed)
    }

    fn register_token(&mut self, address: Address, symbol: &str, name: String, decimals: u8) {
        self.tokens.insert(
            address,
            TokenState {
                symbol: symbol.to_string(),
                name,
                decimals,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.tokens
            .get(&token)
            .and_then(|t| t.balances.get(&owner).copied())
            .unwrap_or_default()
    }

    fn credit(&mut self, token: Address, owner: Address, amount: U256) -> Result<()> {
        *self
            .token_mut(token)?
            .balances
            .entry(owner)
            .or_default() += amount;
        Ok(())
    }

    fn ensure_spendable(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<()> {
        let state = self.token(token)?;
        let allowance = state
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount {
            return Err(revert("TRANSFER_FROM_FAILED: allowance"));
        }
        if self.balance(token, owner) < amount {
            return Err(revert("TRANSFER_FROM_FAILED: balance"));
        }
        Ok(())
    }

    /// Router-side `transferFrom`: consumes allowance and balance.
    fn spend(&mut self, token: Address, owner: Address, spender: Address, amount: U256) -> Result<()> {
        self.ensure_spendable(token, owner, spender, amount)?;
        let state = self.token_mut(token)?;
        *state.allowances.entry((owner, spender)).or_default() -= amount;
        *state.balances.entry(owner).or_default() -= amount;
        Ok(())
    }

    fn factory_of(&self, router: Address) -> Result<Address> {
        self.routers.get(&router).copied().ok_or_else(not_deployed)
    }

    fn find_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        tier: impl Fn(Option<TierParams>) -> bool,
    ) -> Option<Address> {
        let (token0, token1) = sort_tokens(token_a, token_b);
        self.pools
            .iter()
            .find(|(_, p)| {
                p.factory == factory && p.token0 == token0 && p.token1 == token1 && tier(p.tier)
            })
            .map(|(address, _)| *address)
    }

    fn open_pool(&mut self, factory: Address, tier: Option<TierParams>, a: Address, b: Address) -> Result<Address> {
        let (token0, token1) = sort_tokens(a, b);
        let name = format!(
            "{}-{} LP",
            self.token(token0)?.symbol,
            self.token(token1)?.symbol
        );
        let address = self.fresh_address();
        self.register_token(address, "LP", name, 18);
        self.pools.insert(
            address,
            PoolState {
                factory,
                tier,
                token0,
                token1,
                reserve0: U256::zero(),
                reserve1: U256::zero(),
                total_supply: U256::zero(),
            },
        );
        Ok(address)
    }

    fn drop_pool(&mut self, pool: Address) {
        self.pools.remove(&pool);
        self.tokens.remove(&pool);
    }

    fn pool(&self, pool: Address) -> Result<PoolState> {
        self.pools.get(&pool).copied().ok_or_else(not_deployed)
    }

    /// Amounts along `hops`, starting with `amount_in`.
    fn quote_hops(&self, hops: &[Hop], amount_in: U256) -> Result<Vec<U256>> {
        let mut amounts = vec![amount_in];
        for (pool, token_in) in hops {
            let (reserve_in, reserve_out, _) = self
                .pool(*pool)?
                .reserves_from(*token_in)
                .ok_or_else(|| revert("INVALID_PATH"))?;
            let last = amounts[amounts.len() - 1];
            amounts.push(quote_out(last, reserve_in, reserve_out)?);
        }
        Ok(amounts)
    }

    fn settle_hops(&mut self, hops: &[Hop], amounts: &[U256]) -> Result<()> {
        for (i, (pool, token_in)) in hops.iter().enumerate() {
            let state = self.pools.get_mut(pool).ok_or_else(not_deployed)?;
            if *token_in == state.token0 {
                state.reserve0 += amounts[i];
                state.reserve1 -= amounts[i + 1];
            } else {
                state.reserve1 += amounts[i];
                state.reserve0 -= amounts[i + 1];
            }
        }
        Ok(())
    }

    fn path_hops(&self, factory: Address, path: &[Address]) -> Result<Vec<Hop>> {
        if path.len() < 2 {
            return Err(revert("INVALID_PATH"));
        }
        path.windows(2)
            .map(|w| {
                self.find_pool(factory, w[0], w[1], |tier| tier.is_none())
                    .map(|pool| (pool, w[0]))
                    .ok_or_else(|| revert("PAIR_MISSING"))
            })
            .collect()
    }

    fn deposit(
        &mut self,
        from: Address,
        router: Address,
        pool: Address,
        deposit: &LiquidityDeposit,
    ) -> Result<()> {
        let state = self.pool(pool)?;
        let (desired0, desired1, min0, min1) = if deposit.token_a == state.token0
            && deposit.token_b == state.token1
        {
            (deposit.amount_a, deposit.amount_b, deposit.amount_a_min, deposit.amount_b_min)
        } else if deposit.token_a == state.token1 && deposit.token_b == state.token0 {
            (deposit.amount_b, deposit.amount_a, deposit.amount_b_min, deposit.amount_a_min)
        } else {
            return Err(revert("INVALID_PAIR"));
        };

        let (used0, used1) = if state.reserve0.is_zero() && state.reserve1.is_zero() {
            (desired0, desired1)
        } else {
            let optimal1 = desired0 * state.reserve1 / state.reserve0;
            if optimal1 <= desired1 {
                if optimal1 < min1 {
                    return Err(revert("INSUFFICIENT_B_AMOUNT"));
                }
                (desired0, optimal1)
            } else {
                let optimal0 = desired1 * state.reserve0 / state.reserve1;
                if optimal0 < min0 {
                    return Err(revert("INSUFFICIENT_A_AMOUNT"));
                }
                (optimal0, desired1)
            }
        };

        let minted = if state.total_supply.is_zero() {
            (used0 * used1)
                .integer_sqrt()
                .checked_sub(U256::from(MINIMUM_LIQUIDITY))
                .ok_or_else(|| revert("INSUFFICIENT_LIQUIDITY_MINTED"))?
        } else {
            std::cmp::min(
                used0 * state.total_supply / state.reserve0,
                used1 * state.total_supply / state.reserve1,
            )
        };
        if minted.is_zero() {
            return Err(revert("INSUFFICIENT_LIQUIDITY_MINTED"));
        }

        self.ensure_spendable(state.token0, from, router, used0)?;
        self.ensure_spendable(state.token1, from, router, used1)?;
        self.spend(state.token0, from, router, used0)?;
        self.spend(state.token1, from, router, used1)?;

        let mut supply_added = minted;
        if state.total_supply.is_zero() {
            self.credit(pool, Address::from_low_u64_be(DEAD), U256::from(MINIMUM_LIQUIDITY))?;
            supply_added += U256::from(MINIMUM_LIQUIDITY);
        }
        self.credit(pool, deposit.to, minted)?;
        let state = self.pools.get_mut(&pool).ok_or_else(not_deployed)?;
        state.reserve0 += used0;
        state.reserve1 += used1;
        state.total_supply += supply_added;
        Ok(())
    }
}

pub struct MockChain {
    ledger: Mutex<Ledger>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                now: MOCK_NOW,
                ..Ledger::default()
            }),
        }
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }

    /// Deploys a token named `"{symbol} Token"`.
    pub fn add_token(&self, symbol: &str, decimals: u8) -> Address {
        let mut ledger = self.ledger();
        let address = ledger.fresh_address();
        ledger.register_token(address, symbol, format!("{symbol} Token"), decimals);
        address
    }

    pub fn mint(&self, token: Address, owner: Address, amount: U256) {
        self.ledger().credit(token, owner, amount).unwrap();
    }

    pub fn set_native(&self, owner: Address, amount: U256) {
        self.ledger().native.insert(owner, amount);
    }

    pub fn native(&self, owner: Address) -> U256 {
        self.ledger().native.get(&owner).copied().unwrap_or_default()
    }

    pub fn set_wrapper(&self, token: Address) {
        self.ledger().wrapper = Some(token);
    }

    pub fn add_factory(&self) -> Address {
        let mut ledger = self.ledger();
        let address = ledger.fresh_address();
        ledger.factories.insert(address);
        address
    }

    pub fn add_router(&self, factory: Address) -> Address {
        let mut ledger = self.ledger();
        let address = ledger.fresh_address();
        ledger.routers.insert(address, factory);
        address
    }

    /// Opens a seeded pool. Initial LP supply is `sqrt(reserve0 * reserve1)`,
    /// held by a burn address.
    pub fn create_pool(
        &self,
        factory: Address,
        tier: Option<TierParams>,
        token_a: Address,
        amount_a: U256,
        token_b: Address,
        amount_b: U256,
    ) -> Address {
        let mut ledger = self.ledger();
        let pool = ledger.open_pool(factory, tier, token_a, token_b).unwrap();
        let supply = (amount_a * amount_b).integer_sqrt();
        ledger
            .credit(pool, Address::from_low_u64_be(DEAD), supply)
            .unwrap();
        let state = ledger.pools.get_mut(&pool).unwrap();
        if token_a == state.token0 {
            state.reserve0 = amount_a;
            state.reserve1 = amount_b;
        } else {
            state.reserve0 = amount_b;
            state.reserve1 = amount_a;
        }
        state.total_supply = supply;
        pool
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.ledger().balance(token, owner)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.ledger()
            .tokens
            .get(&token)
            .and_then(|t| t.allowances.get(&(owner, spender)).copied())
            .unwrap_or_default()
    }

    pub fn submitted(&self) -> Vec<TxKind> {
        self.ledger().submitted.clone()
    }

    /// Terms of every recorded transaction, in submission order.
    pub fn terms(&self) -> Vec<TxTerms> {
        self.ledger().terms.clone()
    }

    /// Makes decimals/symbol/name calls on `token` revert.
    pub fn hide_metadata(&self, token: Address) {
        self.ledger().unreadable.insert(token);
    }

    /// Number of decimals/symbol/name calls that reached the chain.
    pub fn metadata_reads(&self) -> usize {
        self.ledger().metadata_reads
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn native_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.native(owner))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let ledger = self.ledger();
        ledger.token(token)?;
        Ok(ledger.balance(token, owner))
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        let mut ledger = self.ledger();
        ledger.metadata_reads += 1;
        if ledger.unreadable.contains(&token) {
            return Err(revert("metadata unavailable"));
        }
        Ok(ledger.token(token)?.decimals)
    }

    async fn symbol(&self, token: Address) -> Result<String> {
        let mut ledger = self.ledger();
        ledger.metadata_reads += 1;
        if ledger.unreadable.contains(&token) {
            return Err(revert("metadata unavailable"));
        }
        Ok(ledger.token(token)?.symbol.clone())
    }

    async fn name(&self, token: Address) -> Result<String> {
        let mut ledger = self.ledger();
        ledger.metadata_reads += 1;
        if ledger.unreadable.contains(&token) {
            return Err(revert("metadata unavailable"));
        }
        Ok(ledger.token(token)?.name.clone())
    }

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        ledger
            .token_mut(token)?
            .allowances
            .insert((owner, spender), amount);
        Ok(ledger.record(
            TxKind::Approve {
                token,
                spender,
                amount,
            },
            TxTerms::plain(policy),
        ))
    }

    async fn deposit_native(
        &self,
        owner: Address,
        wrapper: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        if ledger.wrapper != Some(wrapper) {
            return Err(not_deployed());
        }
        let native = ledger.native.get(&owner).copied().unwrap_or_default();
        if native < amount {
            return Err(revert("insufficient native balance"));
        }
        ledger.native.insert(owner, native - amount);
        ledger.credit(wrapper, owner, amount)?;
        Ok(ledger.record(TxKind::Deposit, TxTerms::plain(policy)))
    }

    async fn pair_tokens(&self, pool: Address) -> Result<(Address, Address)> {
        let state = self.ledger().pool(pool)?;
        Ok((state.token0, state.token1))
    }

    async fn get_reserves(&self, pool: Address) -> Result<(U256, U256, u32)> {
        let state = self.ledger().pool(pool)?;
        Ok((state.reserve0, state.reserve1, 0))
    }

    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let ledger = self.ledger();
        if !ledger.factories.contains(&factory) {
            return Err(not_deployed());
        }
        Ok(ledger
            .find_pool(factory, token_a, token_b, |tier| tier.is_none())
            .unwrap_or_default())
    }

    async fn get_tiered_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        tier: TierParams,
    ) -> Result<Address> {
        let ledger = self.ledger();
        if !ledger.factories.contains(&factory) {
            return Err(not_deployed());
        }
        Ok(ledger
            .find_pool(factory, token_a, token_b, |t| t == Some(tier))
            .unwrap_or_default())
    }

    async fn swap_along_path(
        &self,
        from: Address,
        router: Address,
        swap: &PathSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(swap.deadline)?;
        let hops = ledger.path_hops(factory, &swap.path)?;
        let amounts = ledger.quote_hops(&hops, swap.amount_in)?;
        let out = amounts[amounts.len() - 1];
        if out < swap.amount_out_min {
            return Err(revert("INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        ledger.spend(swap.path[0], from, router, swap.amount_in)?;
        ledger.settle_hops(&hops, &amounts)?;
        ledger.credit(swap.path[swap.path.len() - 1], swap.to, out)?;
        let terms = TxTerms::bounded(policy, swap.deadline, vec![swap.amount_out_min]);
        Ok(ledger.record(TxKind::Swap, terms))
    }

    async fn swap_through_pools(
        &self,
        from: Address,
        router: Address,
        swap: &PoolSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(swap.deadline)?;
        let mut hops = Vec::with_capacity(swap.pools.len());
        let mut current = swap.token_in;
        for pool in &swap.pools {
            let state = ledger.pool(*pool)?;
            if state.factory != factory {
                return Err(revert("INVALID_PAIR"));
            }
            let (_, _, next) = state
                .reserves_from(current)
                .ok_or_else(|| revert("INVALID_PATH"))?;
            hops.push((*pool, current));
            current = next;
        }
        if hops.is_empty() || current != swap.token_out {
            return Err(revert("INVALID_PATH"));
        }
        let amounts = ledger.quote_hops(&hops, swap.amount_in)?;
        let out = amounts[amounts.len() - 1];
        if out < swap.amount_out_min {
            return Err(revert("INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        ledger.spend(swap.token_in, from, router, swap.amount_in)?;
        ledger.settle_hops(&hops, &amounts)?;
        ledger.credit(swap.token_out, swap.to, out)?;
        let terms = TxTerms::bounded(policy, swap.deadline, vec![swap.amount_out_min]);
        Ok(ledger.record(TxKind::Swap, terms))
    }

    async fn swap_native_for_exact_tokens(
        &self,
        from: Address,
        router: Address,
        swap: &NativeSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(swap.deadline)?;
        if swap.path.first().copied() != ledger.wrapper {
            return Err(revert("INVALID_PATH"));
        }
        let hops = ledger.path_hops(factory, &swap.path)?;

        let mut amounts = vec![U256::zero(); hops.len() + 1];
        amounts[hops.len()] = swap.amount_out;
        for (i, (pool, token_in)) in hops.iter().enumerate().rev() {
            let (reserve_in, reserve_out, _) = ledger
                .pool(*pool)?
                .reserves_from(*token_in)
                .ok_or_else(|| revert("INVALID_PATH"))?;
            amounts[i] = quote_in(amounts[i + 1], reserve_in, reserve_out)?;
        }
        let native = ledger.native.get(&from).copied().unwrap_or_default();
        if amounts[0] > swap.value || native < swap.value {
            return Err(revert("EXCESSIVE_INPUT_AMOUNT"));
        }

        // only the quoted input is kept, the rest of `value` is refunded
        ledger.native.insert(from, native - amounts[0]);
        ledger.settle_hops(&hops, &amounts)?;
        ledger.credit(swap.path[swap.path.len() - 1], swap.to, swap.amount_out)?;
        Ok(ledger.record(TxKind::Swap, TxTerms::bounded(policy, swap.deadline, Vec::new())))
    }

    async fn add_liquidity(
        &self,
        from: Address,
        router: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(deposit.deadline)?;
        let (pool, created) =
            match ledger.find_pool(factory, deposit.token_a, deposit.token_b, |tier| tier.is_none()) {
                Some(pool) => (pool, false),
                None => (
                    ledger.open_pool(factory, None, deposit.token_a, deposit.token_b)?,
                    true,
                ),
            };
        if let Err(err) = ledger.deposit(from, router, pool, deposit) {
            if created {
                ledger.drop_pool(pool);
            }
            return Err(err);
        }
        Ok(ledger.record(TxKind::AddLiquidity { pool }, deposit_terms(policy, deposit)))
    }

    async fn add_liquidity_to_pool(
        &self,
        from: Address,
        router: Address,
        pool: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(deposit.deadline)?;
        if ledger.pool(pool)?.factory != factory {
            return Err(revert("INVALID_PAIR"));
        }
        ledger.deposit(from, router, pool, deposit)?;
        Ok(ledger.record(TxKind::AddLiquidity { pool }, deposit_terms(policy, deposit)))
    }

    async fn remove_liquidity(
        &self,
        from: Address,
        router: Address,
        withdrawal: &LiquidityWithdrawal,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let mut ledger = self.ledger();
        let factory = ledger.factory_of(router)?;
        ledger.check_deadline(withdrawal.deadline)?;
        let pool = ledger
            .find_pool(factory, withdrawal.token_a, withdrawal.token_b, |_| true)
            .ok_or_else(|| revert("PAIR_MISSING"))?;
        let state = ledger.pool(pool)?;
        if state.total_supply.is_zero() {
            return Err(revert("INSUFFICIENT_LIQUIDITY_BURNED"));
        }

        let amount0 = withdrawal.liquidity * state.reserve0 / state.total_supply;
        let amount1 = withdrawal.liquidity * state.reserve1 / state.total_supply;
        let (amount_a, amount_b) = if withdrawal.token_a == state.token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < withdrawal.amount_a_min {
            return Err(revert("INSUFFICIENT_A_AMOUNT"));
        }
        if amount_b < withdrawal.amount_b_min {
            return Err(revert("INSUFFICIENT_B_AMOUNT"));
        }

        ledger.spend(pool, from, router, withdrawal.liquidity)?;
        let entry = ledger.pools.get_mut(&pool).ok_or_else(not_deployed)?;
        entry.reserve0 -= amount0;
        entry.reserve1 -= amount1;
        entry.total_supply -= withdrawal.liquidity;
        ledger.credit(state.token0, withdrawal.to, amount0)?;
        ledger.credit(state.token1, withdrawal.to, amount1)?;
        let terms = TxTerms::bounded(
            policy,
            withdrawal.deadline,
            vec![withdrawal.amount_a_min, withdrawal.amount_b_min],
        );
        Ok(ledger.record(TxKind::RemoveLiquidity, terms))
    }
}
