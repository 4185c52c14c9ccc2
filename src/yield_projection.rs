//! Projected yield for the savings and growth strategies

use crate::chain::units::{format_units_fixed, serialize_decimal};
use crate::config::YieldConfig;
use crate::{Error, Result};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Longest projection served (50 years)
pub const MAX_MONTHS: u32 = 600;

/// Basis points per year spread over twelve months
const MONTHLY_DENOMINATOR: u64 = 120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Aave supply
    Savings,
    /// Swap half and provide full-range liquidity
    Growth,
}

impl Strategy {
    pub fn apy_bps(&self, yields: &YieldConfig) -> u32 {
        match self {
            Strategy::Savings => yields.savings_apy_bps,
            Strategy::Growth => yields.growth_apy_bps,
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "savings" => Ok(Strategy::Savings),
            "growth" => Ok(Strategy::Growth),
            other => Err(Error::invalid(format!(
                "Unknown strategy '{}', expected savings or growth",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: u32,
    #[serde(serialize_with = "serialize_decimal")]
    pub raw: U256,
    pub balance: String,
    pub earned: String,
}

/// Month-by-month balance with monthly compounding in base units
///
/// Each month adds `floor(balance * apy_bps / 120000)`. Month 0 is the
/// principal.
pub fn project(
    principal: U256,
    decimals: u8,
    apy_bps: u32,
    months: u32,
) -> Result<Vec<ProjectionPoint>> {
    if months > MAX_MONTHS {
        return Err(Error::invalid(format!(
            "months must be at most {}",
            MAX_MONTHS
        )));
    }

    let point = |month: u32, balance: U256| ProjectionPoint {
        month,
        raw: balance,
        balance: format_units_fixed(balance, decimals),
        earned: format_units_fixed(balance.saturating_sub(principal), decimals),
    };

    let rate = U256::from(apy_bps);
    let denominator = U256::from(MONTHLY_DENOMINATOR);
    let mut balance = principal;
    let mut points = Vec::with_capacity(months as usize + 1);
    points.push(point(0, balance));
    for month in 1..=months {
        let interest = balance
            .checked_mul(rate)
            .ok_or_else(|| Error::invalid("Projection overflows"))?
            / denominator;
        balance = balance
            .checked_add(interest)
            .ok_or_else(|| Error::invalid("Projection overflows"))?;
        points.push(point(month, balance));
    }
    Ok(points)
}
