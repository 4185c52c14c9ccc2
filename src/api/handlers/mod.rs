//! Route handlers
//!
//! Request bodies use optional fields so a missing field is reported as a
//! 400 with a readable message instead of a serde rejection.

mod aave;
mod balance;
mod invest;
mod kyc;
mod solana;
mod verify;

pub use aave::aave_deposit;
pub use balance::{get_allowance, get_balance};
pub use invest::{invest, yield_projection};
pub use kyc::kyc_token;
pub use solana::sign_message;
pub use verify::{verify_get, verify_post};

use super::ApiError;
use alloy::primitives::Address;
use std::str::FromStr;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("{} is required", field)))
}

fn required_str(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let value = required(value, field)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn required_address(value: Option<String>, field: &str) -> Result<Address, ApiError> {
    let value = required_str(value, field)?;
    Address::from_str(&value)
        .map_err(|_| ApiError::bad_request(format!("{} is not a valid address", field)))
}
