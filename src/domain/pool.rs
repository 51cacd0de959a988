//! Constant-product (Uniswap V2 style) pool math.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Pool fee numerator over [`FEE_DENOMINATOR`]: 0.3%.
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

/// A V2 pair snapshot as listed in the pools file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Pool {
    pub chain_id: u64,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl V2Pool {
    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// The token on the other side of `token`, if `token` is in this pool.
    pub fn other(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    /// `(reserve_in, reserve_out)` when swapping from `token_in`.
    pub fn reserves_from(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }

    pub fn amount_out(&self, token_in: Address, amount_in: U256) -> Option<U256> {
        let (reserve_in, reserve_out) = self.reserves_from(token_in)?;
        get_amount_out(amount_in, reserve_in, reserve_out)
    }

    pub fn amount_in(&self, token_in: Address, amount_out: U256) -> Option<U256> {
        let (reserve_in, reserve_out) = self.reserves_from(token_in)?;
        get_amount_in(amount_out, reserve_in, reserve_out)
    }
}

/// Output for an exact input, after the pool fee. `None` on empty reserves or overflow.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }
    let amount_in_with_fee = amount_in.checked_mul(U256::from(FEE_NUMERATOR))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR))?
        .checked_add(amount_in_with_fee)?;
    Some(numerator / denominator)
}

/// Input required for an exact output, rounded up by one unit as the pair
/// contract does. `None` when the pool cannot supply `amount_out`.
pub fn get_amount_in(amount_out: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if amount_out.is_zero() || reserve_in.is_zero() || amount_out >= reserve_out {
        return None;
    }
    let numerator = reserve_in
        .checked_mul(amount_out)?
        .checked_mul(U256::from(FEE_DENOMINATOR))?;
    let denominator = (reserve_out - amount_out).checked_mul(U256::from(FEE_NUMERATOR))?;
    (numerator / denominator).checked_add(U256::from(1u64))
}
