//! Transaction builders
//!
//! Pure calldata encoders for the contract calls the app makes. Nothing in
//! this module performs I/O. Amounts must already be scaled to the token's
//! decimals by the caller; no rounding happens here.

use crate::{Error, Result};
use alloy::primitives::aliases::{I24, U160, U24};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }

    contract IAavePool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
    }

    contract ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
    }

    contract INonfungiblePositionManager {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Desired;
            uint256 amount1Desired;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
            uint256 deadline;
        }

        function mint(MintParams calldata params) external payable returns (
            uint256 tokenId,
            uint128 liquidity,
            uint256 amount0,
            uint256 amount1
        );
    }

    #[sol(rpc)]
    contract IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams memory params) external returns (
            uint256 amountOut,
            uint160 sqrtPriceX96After,
            uint32 initializedTicksCrossed,
            uint256 gasEstimate
        );
    }

    #[sol(rpc)]
    contract IKycToken {
        function balanceOf(address owner) external view returns (uint256);
        function mintFree() external;
    }
}

/// Basis-point denominator for slippage math
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Uniswap V3 tick bounds
pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// A transaction ready to be signed: target, calldata and native value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl TxRequest {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data: Bytes::from(data),
            value: U256::ZERO,
        }
    }

    /// Parse a transaction supplied as strings (hex calldata, decimal or 0x value)
    pub fn from_parts(to: &str, data: &str, value: Option<&str>) -> Result<Self> {
        let to = Address::from_str(to.trim())
            .map_err(|e| Error::invalid(format!("Invalid transaction target: {}", e)))?;
        let data = Bytes::from_str(data.trim())
            .map_err(|e| Error::invalid(format!("Invalid calldata: {}", e)))?;
        let value = match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => U256::from_str(v)
                .map_err(|e| Error::invalid(format!("Invalid transaction value: {}", e)))?,
            None => U256::ZERO,
        };
        Ok(Self { to, data, value })
    }
}

/// ERC-20 `approve(spender, amount)`
pub fn approve(token: Address, spender: Address, amount: U256) -> TxRequest {
    TxRequest::new(token, IERC20::approveCall { spender, amount }.abi_encode())
}

/// ERC-20 `transfer(to, amount)`
pub fn transfer(token: Address, to: Address, amount: U256) -> TxRequest {
    TxRequest::new(token, IERC20::transferCall { to, amount }.abi_encode())
}

/// ERC-20 `transferFrom(from, to, amount)`
pub fn transfer_from(token: Address, from: Address, to: Address, amount: U256) -> TxRequest {
    TxRequest::new(
        token,
        IERC20::transferFromCall { from, to, amount }.abi_encode(),
    )
}

/// Aave V3 `supply(asset, amount, onBehalfOf, 0)`
pub fn aave_supply(pool: Address, asset: Address, amount: U256, on_behalf_of: Address) -> TxRequest {
    TxRequest::new(
        pool,
        IAavePool::supplyCall {
            asset,
            amount,
            onBehalfOf: on_behalf_of,
            referralCode: 0,
        }
        .abi_encode(),
    )
}

/// KYC token free mint (no arguments, fixed selector)
pub fn kyc_mint(token: Address) -> TxRequest {
    TxRequest::new(token, IKycToken::mintFreeCall {}.abi_encode())
}

/// Arguments for a single-pool exact-input swap
#[derive(Debug, Clone, Copy)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub deadline: U256,
}

/// Uniswap V3 SwapRouter `exactInputSingle`
pub fn exact_input_single(router: Address, params: &SwapParams) -> Result<TxRequest> {
    tick_spacing(params.fee)?;
    let call = ISwapRouter::exactInputSingleCall {
        params: ISwapRouter::ExactInputSingleParams {
            tokenIn: params.token_in,
            tokenOut: params.token_out,
            fee: U24::from(params.fee),
            recipient: params.recipient,
            deadline: params.deadline,
            amountIn: params.amount_in,
            amountOutMinimum: params.amount_out_minimum,
            sqrtPriceLimitX96: U160::ZERO,
        },
    };
    Ok(TxRequest::new(router, call.abi_encode()))
}

/// Arguments for minting a liquidity position. Tokens must be sorted.
#[derive(Debug, Clone, Copy)]
pub struct MintParams {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: U256,
}

/// Uniswap V3 NonfungiblePositionManager `mint`
pub fn position_mint(position_manager: Address, params: &MintParams) -> Result<TxRequest> {
    tick_spacing(params.fee)?;
    if params.token0 >= params.token1 {
        return Err(Error::invalid("token0 must sort before token1"));
    }
    if params.tick_lower >= params.tick_upper {
        return Err(Error::invalid(format!(
            "Invalid tick range [{}, {}]",
            params.tick_lower, params.tick_upper
        )));
    }
    let tick = |t: i32| {
        I24::try_from(t).map_err(|e| Error::invalid(format!("Tick {} out of range: {}", t, e)))
    };
    let call = INonfungiblePositionManager::mintCall {
        params: INonfungiblePositionManager::MintParams {
            token0: params.token0,
            token1: params.token1,
            fee: U24::from(params.fee),
            tickLower: tick(params.tick_lower)?,
            tickUpper: tick(params.tick_upper)?,
            amount0Desired: params.amount0_desired,
            amount1Desired: params.amount1_desired,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            recipient: params.recipient,
            deadline: params.deadline,
        },
    };
    Ok(TxRequest::new(position_manager, call.abi_encode()))
}

/// `floor(estimated * (10000 - bps) / 10000)`
pub fn min_amount_out(estimated: U256, slippage_bps: u32) -> Result<U256> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(Error::invalid(format!(
            "Slippage {} bps exceeds {} bps",
            slippage_bps, BPS_DENOMINATOR
        )));
    }
    let keep = U256::from(BPS_DENOMINATOR - slippage_bps);
    Ok(estimated * keep / U256::from(BPS_DENOMINATOR))
}

/// Unix deadline `now + window`
pub fn deadline_after(now_secs: u64, window_secs: u64) -> U256 {
    U256::from(now_secs.saturating_add(window_secs))
}

/// Tick spacing of a fee tier; also rejects unknown tiers
pub fn tick_spacing(fee: u32) -> Result<i32> {
    match fee {
        100 => Ok(1),
        500 => Ok(10),
        3000 => Ok(60),
        10000 => Ok(200),
        other => Err(Error::invalid(format!("Unsupported fee tier: {}", other))),
    }
}

/// Widest usable tick range for a fee tier
pub fn full_range_ticks(fee: u32) -> Result<(i32, i32)> {
    let spacing = tick_spacing(fee)?;
    // Integer division truncates toward zero, keeping both bounds inside the limits
    Ok(((MIN_TICK / spacing) * spacing, (MAX_TICK / spacing) * spacing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const TOKEN: Address = address!("6c3ea9036406852006290770bedfcaba0e23a0e8");
    const SPENDER: Address = address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");

    #[test]
    fn test_approve_encoding() {
        let tx = approve(TOKEN, SPENDER, U256::from(1_000_000u64));
        assert_eq!(tx.to, TOKEN);
        assert_eq!(tx.value, U256::ZERO);
        // approve(address,uint256)
        assert_eq!(&tx.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(tx.data.len(), 4 + 32 * 2);

        let decoded = IERC20::approveCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.spender, SPENDER);
        assert_eq!(decoded.amount, U256::from(1_000_000u64));
    }

    #[test]
    fn test_transfer_selectors() {
        let to = Address::repeat_byte(0x11);
        let tx = transfer(TOKEN, to, U256::from(5u64));
        assert_eq!(&tx.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

        let tx = transfer_from(TOKEN, SPENDER, to, U256::from(5u64));
        assert_eq!(&tx.data[..4], &[0x23, 0xb8, 0x72, 0xdd]);
    }

    #[test]
    fn test_aave_supply_encoding() {
        let owner = Address::repeat_byte(0x22);
        let tx = aave_supply(SPENDER, TOKEN, U256::from(42u64), owner);
        assert_eq!(tx.to, SPENDER);
        // supply(address,uint256,address,uint16)
        assert_eq!(&tx.data[..4], &[0x61, 0x7b, 0xa0, 0x37]);
        let decoded = IAavePool::supplyCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.onBehalfOf, owner);
        assert_eq!(decoded.referralCode, 0);
    }

    #[test]
    fn test_kyc_mint_is_selector_only() {
        let tx = kyc_mint(TOKEN);
        assert_eq!(tx.data.len(), 4);
        assert_eq!(&tx.data[..], &IKycToken::mintFreeCall::SELECTOR[..]);
    }

    #[test]
    fn test_exact_input_single_carries_deadline_and_minimum() {
        let params = SwapParams {
            token_in: TOKEN,
            token_out: SPENDER,
            fee: 500,
            recipient: Address::repeat_byte(0x33),
            amount_in: U256::from(1_000u64),
            amount_out_minimum: U256::from(950u64),
            deadline: deadline_after(1_700_000_000, 1200),
        };
        let tx = exact_input_single(Address::repeat_byte(0x44), &params).unwrap();
        let decoded = ISwapRouter::exactInputSingleCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.params.deadline, U256::from(1_700_001_200u64));
        assert_eq!(decoded.params.amountOutMinimum, U256::from(950u64));
        assert_eq!(decoded.params.fee, U24::from(500u32));
    }

    #[test]
    fn test_exact_input_single_rejects_unknown_fee() {
        let params = SwapParams {
            token_in: TOKEN,
            token_out: SPENDER,
            fee: 1234,
            recipient: Address::ZERO,
            amount_in: U256::from(1u64),
            amount_out_minimum: U256::ZERO,
            deadline: U256::ZERO,
        };
        assert!(exact_input_single(Address::ZERO, &params).is_err());
    }

    #[test]
    fn test_position_mint_requires_sorted_tokens() {
        let (lower, upper) = full_range_ticks(100).unwrap();
        let mut params = MintParams {
            token0: SPENDER,
            token1: TOKEN,
            fee: 100,
            tick_lower: lower,
            tick_upper: upper,
            amount0_desired: U256::from(10u64),
            amount1_desired: U256::from(10u64),
            amount0_min: U256::from(1u64),
            amount1_min: U256::from(1u64),
            recipient: Address::ZERO,
            deadline: U256::from(1u64),
        };
        assert!(position_mint(Address::ZERO, &params).is_err());

        params.token0 = TOKEN;
        params.token1 = SPENDER;
        let tx = position_mint(Address::ZERO, &params).unwrap();
        let decoded = INonfungiblePositionManager::mintCall::abi_decode(&tx.data).unwrap();
        assert_eq!(decoded.params.tickLower, I24::try_from(-887_272i32).unwrap());
    }

    #[test]
    fn test_min_amount_out_floors() {
        // 1_000_001 * 9500 / 10000 = 950_000.95 -> 950_000
        assert_eq!(
            min_amount_out(U256::from(1_000_001u64), 500).unwrap(),
            U256::from(950_000u64)
        );
        assert_eq!(
            min_amount_out(U256::from(999u64), 2500).unwrap(),
            U256::from(749u64)
        );
        assert_eq!(
            min_amount_out(U256::from(12_345u64), 9000).unwrap(),
            U256::from(1_234u64)
        );
        assert_eq!(min_amount_out(U256::from(7u64), 0).unwrap(), U256::from(7u64));
        assert_eq!(min_amount_out(U256::from(7u64), 10_000).unwrap(), U256::ZERO);
        assert!(min_amount_out(U256::from(7u64), 10_001).is_err());
    }

    #[test]
    fn test_min_amount_out_matches_formula_over_grid() {
        for amount in [0u64, 1, 99, 10_000, 123_456_789] {
            for bps in [0u32, 1, 500, 2500, 9000, 9999] {
                let expected = amount as u128 * (10_000 - bps) as u128 / 10_000;
                assert_eq!(
                    min_amount_out(U256::from(amount), bps).unwrap(),
                    U256::from(expected)
                );
            }
        }
    }

    #[test]
    fn test_full_range_ticks() {
        assert_eq!(full_range_ticks(100).unwrap(), (-887_272, 887_272));
        assert_eq!(full_range_ticks(500).unwrap(), (-887_270, 887_270));
        assert_eq!(full_range_ticks(3000).unwrap(), (-887_220, 887_220));
        assert_eq!(full_range_ticks(10000).unwrap(), (-887_200, 887_200));
    }

    #[test]
    fn test_tx_request_from_parts() {
        let tx = TxRequest::from_parts(
            "0x6c3ea9036406852006290770bedfcaba0e23a0e8",
            "0x095ea7b3",
            Some("0x10"),
        )
        .unwrap();
        assert_eq!(tx.to, TOKEN);
        assert_eq!(tx.value, U256::from(16u64));

        let tx = TxRequest::from_parts(
            "0x6c3ea9036406852006290770bedfcaba0e23a0e8",
            "0x",
            None,
        )
        .unwrap();
        assert!(tx.data.is_empty());

        let err = TxRequest::from_parts("0x1234", "0x", None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(TxRequest::from_parts(
            "0x6c3ea9036406852006290770bedfcaba0e23a0e8",
            "0xzz",
            None
        )
        .is_err());
    }
}
