//! User-facing failure messages

use crate::Error;
use alloy::hex;
use alloy::sol_types::SolValue;

/// Selector of the standard `Error(string)` revert payload
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Map raw provider error text to something a user can act on
pub fn friendly_message(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("user denied") || lower.contains("user rejected") {
        return "Transaction was rejected in the wallet.".to_string();
    }
    if lower.contains("execution reverted") {
        return match revert_reason(raw) {
            Some(reason) => format!("Transaction reverted: {}", reason),
            None => "Transaction reverted by the contract.".to_string(),
        };
    }
    if lower.contains("insufficient") {
        return "Insufficient funds to complete this transaction.".to_string();
    }
    raw.to_string()
}

/// Friendly text for a flow failure
pub fn describe(error: &Error) -> String {
    match error {
        Error::InsufficientBalance {
            required,
            available,
            ..
        } => format!(
            "Insufficient balance: {} required, {} available.",
            required, available
        ),
        Error::InsufficientAllowance { required, approved, .. } => format!(
            "Approval did not take effect: {} required, {} approved.",
            required, approved
        ),
        Error::Reverted(hash) => format!("Transaction {} was reverted on-chain.", hash),
        Error::ConfirmationTimeout { hash, .. } => format!(
            "Transaction {} is still pending. Check its status before retrying.",
            hash
        ),
        Error::ChainMismatch { token, chain_id } => format!(
            "Token {} is not available on chain {}.",
            token, chain_id
        ),
        other => friendly_message(&other.to_string()),
    }
}

/// Extract a revert reason from provider error text
///
/// Understands ABI `Error(string)` payloads embedded as hex as well as the
/// `execution reverted: <reason>` text form.
pub fn revert_reason(raw: &str) -> Option<String> {
    if let Some(reason) = encoded_reason(raw) {
        return Some(reason);
    }

    let lower = raw.to_ascii_lowercase();
    let marker = "execution reverted";
    let start = lower.find(marker)? + marker.len();
    let rest = raw[start..].trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let rest = rest.strip_prefix("revert:").unwrap_or(rest).trim_start();
    let end = rest
        .find(|c: char| c == '"' || c == ',' || c == '\n')
        .unwrap_or(rest.len());
    let reason = rest[..end].trim();

    if reason.is_empty() || reason.starts_with("0x") {
        None
    } else {
        Some(reason.to_string())
    }
}

fn encoded_reason(raw: &str) -> Option<String> {
    let start = raw.find("0x08c379a0")?;
    let hex_data = &raw[start + 2..];
    let end = hex_data
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(hex_data.len());
    let bytes = hex::decode(&hex_data[..end]).ok()?;
    if bytes.len() < 4 || bytes[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    String::abi_decode(&bytes[4..]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    fn encoded_error(reason: &str) -> String {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(reason.to_string().abi_encode());
        format!("0x{}", hex::encode(data))
    }

    #[test]
    fn user_rejection() {
        assert_eq!(
            friendly_message("MetaMask Tx Signature: User denied transaction signature."),
            "Transaction was rejected in the wallet."
        );
        assert_eq!(
            friendly_message("user rejected the request"),
            "Transaction was rejected in the wallet."
        );
    }

    #[test]
    fn revert_with_text_reason() {
        assert_eq!(
            friendly_message("execution reverted: STF"),
            "Transaction reverted: STF"
        );
        assert_eq!(
            friendly_message(r#"server returned an error: execution reverted: revert: Too little received", data: ..."#),
            "Transaction reverted: Too little received"
        );
    }

    #[test]
    fn revert_with_encoded_reason() {
        let raw = format!(
            "server returned an error response: execution reverted, data: \"{}\"",
            encoded_error("ERC20: transfer amount exceeds balance")
        );
        assert_eq!(
            friendly_message(&raw),
            "Transaction reverted: ERC20: transfer amount exceeds balance"
        );
    }

    #[test]
    fn revert_without_reason() {
        assert_eq!(
            friendly_message("execution reverted"),
            "Transaction reverted by the contract."
        );
        assert_eq!(revert_reason("execution reverted: 0xdeadbeef"), None);
    }

    #[test]
    fn insufficient_funds() {
        assert_eq!(
            friendly_message("insufficient funds for gas * price + value"),
            "Insufficient funds to complete this transaction."
        );
    }

    #[test]
    fn rejection_wins_over_revert() {
        assert_eq!(
            friendly_message("User rejected; execution reverted"),
            "Transaction was rejected in the wallet."
        );
    }

    #[test]
    fn unmatched_text_passes_through() {
        assert_eq!(friendly_message("nonce too low"), "nonce too low");
    }

    #[test]
    fn describes_flow_errors() {
        let err = Error::InsufficientBalance {
            token: Address::ZERO,
            required: U256::from(10u64),
            available: U256::from(3u64),
        };
        assert_eq!(describe(&err), "Insufficient balance: 10 required, 3 available.");

        let err = Error::WalletProvider("400 Bad Request: user rejected".into());
        assert_eq!(describe(&err), "Transaction was rejected in the wallet.");
    }
}
