//! Privy server wallet REST client
//!
//! Authenticates with HTTP basic auth (app id / app secret) plus the
//! `privy-app-id` header. Transactions are submitted through the wallet RPC
//! endpoint, which signs with the provider-held key and broadcasts.

use super::{SignedMessage, WalletKind, WalletProvider, WalletRef};
use crate::calldata::TxRequest;
use crate::config::{TransportConfig, WalletProviderConfig};
use crate::{Error, Result};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

const APP_ID_HEADER: &str = "privy-app-id";

#[derive(Debug, Deserialize)]
struct WalletResponse {
    id: String,
    address: String,
    chain_type: String,
    #[serde(default)]
    smart_wallet_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SendTransactionData {
    hash: String,
}

pub struct PrivyClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: SecretString,
}

impl PrivyClient {
    pub fn new(config: &WalletProviderConfig, transport: &TransportConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(Error::Config("wallet provider app id not set".to_string()));
        }
        let app_secret = config
            .app_secret
            .clone()
            .ok_or_else(|| Error::Config("wallet provider app secret not set".to_string()))?;

        let http = Client::builder().timeout(transport.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_secret,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.app_id, Some(self.app_secret.expose_secret()))
            .header(APP_ID_HEADER, &self.app_id)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::WalletProvider(format!(
                "{}: {}",
                status,
                error_text(&body)
            )));
        }
        Ok(response.json().await?)
    }
}

/// Pull the `error` field out of an error body, else return it raw
fn error_text(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl WalletProvider for PrivyClient {
    async fn wallet(&self, wallet_id: &str) -> Result<WalletRef> {
        let path = format!("/v1/wallets/{}", wallet_id);
        let wallet: WalletResponse = self.send_json(self.request(Method::GET, &path)).await?;

        if wallet.chain_type != "ethereum" {
            return Err(Error::Wallet(format!(
                "Wallet {} is a {} wallet, not an EVM wallet",
                wallet.id, wallet.chain_type
            )));
        }
        let address = Address::from_str(&wallet.address)
            .map_err(|e| Error::WalletProvider(format!("Invalid wallet address: {}", e)))?;
        let kind = match wallet.smart_wallet_type {
            Some(_) => WalletKind::Smart,
            None => WalletKind::ExternallyOwned,
        };

        tracing::debug!(wallet_id, %address, ?kind, "Resolved wallet");
        Ok(WalletRef {
            id: wallet.id,
            address,
            kind,
        })
    }

    async fn send_transaction(
        &self,
        wallet_id: &str,
        chain_id: u64,
        tx: &TxRequest,
        sponsor: bool,
    ) -> Result<B256> {
        let mut body = json!({
            "method": "eth_sendTransaction",
            "caip2": format!("eip155:{}", chain_id),
            "chain_type": "ethereum",
            "params": {
                "transaction": {
                    "to": tx.to,
                    "data": tx.data,
                    "value": tx.value,
                }
            }
        });
        if sponsor {
            body["sponsor"] = Value::Bool(true);
        }

        let path = format!("/v1/wallets/{}/rpc", wallet_id);
        let response: RpcResponse<SendTransactionData> = self
            .send_json(self.request(Method::POST, &path).json(&body))
            .await?;

        let hash = B256::from_str(&response.data.hash)
            .map_err(|e| Error::WalletProvider(format!("Invalid transaction hash: {}", e)))?;
        tracing::info!(wallet_id, chain_id, %hash, to = %tx.to, "Transaction submitted");
        Ok(hash)
    }

    async fn sign_solana_message(&self, wallet_id: &str, message: &[u8]) -> Result<SignedMessage> {
        let body = json!({
            "method": "signMessage",
            "params": {
                "message": base64::engine::general_purpose::STANDARD.encode(message),
                "encoding": "base64",
            }
        });

        let path = format!("/v1/wallets/{}/rpc", wallet_id);
        let response: RpcResponse<SignedMessage> = self
            .send_json(self.request(Method::POST, &path).json(&body))
            .await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TX_HASH: &str = "0x8f3a7e1c2b5d4f6a9e0c3b2a1d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e";

    fn client(base_url: String) -> PrivyClient {
        let config = WalletProviderConfig {
            base_url,
            app_id: "app-id".to_string(),
            app_secret: Some(SecretString::from("app-secret")),
        };
        PrivyClient::new(&config, &TransportConfig::default()).unwrap()
    }

    fn basic_auth() -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode("app-id:app-secret");
        format!("Basic {}", encoded)
    }

    #[test]
    fn requires_credentials() {
        let config = WalletProviderConfig::default();
        assert!(matches!(
            PrivyClient::new(&config, &TransportConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn resolves_wallet_with_auth_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/wallets/w1"))
            .and(header("privy-app-id", "app-id"))
            .and(header("authorization", basic_auth().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "w1",
                "address": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "chain_type": "ethereum"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let wallet = client(mock_server.uri()).wallet("w1").await.unwrap();
        assert_eq!(wallet.id, "w1");
        assert_eq!(wallet.kind, WalletKind::ExternallyOwned);
        assert_eq!(
            wallet.address,
            Address::from_str("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
        );
    }

    #[tokio::test]
    async fn rejects_solana_wallet_for_evm_flows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/wallets/sol"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sol",
                "address": "7EcDhSYGxXyscszYEp35KHN8vvw3svAuLKTzXwCFLtV",
                "chain_type": "solana"
            })))
            .mount(&mock_server)
            .await;

        let err = client(mock_server.uri()).wallet("sol").await.unwrap_err();
        assert!(matches!(err, Error::Wallet(_)));
    }

    #[tokio::test]
    async fn sends_transaction_with_caip2_and_sponsor() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/wallets/w1/rpc"))
            .and(body_partial_json(json!({
                "method": "eth_sendTransaction",
                "caip2": "eip155:42161",
                "sponsor": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "method": "eth_sendTransaction",
                "data": { "hash": TX_HASH, "caip2": "eip155:42161" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tx = TxRequest {
            to: Address::repeat_byte(0x11),
            data: vec![0x09, 0x5e, 0xa7, 0xb3].into(),
            value: U256::ZERO,
        };
        let hash = client(mock_server.uri())
            .send_transaction("w1", 42161, &tx, true)
            .await
            .unwrap();
        assert_eq!(hash, B256::from_str(TX_HASH).unwrap());
    }

    #[tokio::test]
    async fn provider_error_body_is_surfaced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/wallets/w1/rpc"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "insufficient funds for gas" })),
            )
            .mount(&mock_server)
            .await;

        let tx = TxRequest::new(Address::ZERO, vec![]);
        let err = client(mock_server.uri())
            .send_transaction("w1", 1, &tx, false)
            .await
            .unwrap_err();
        match err {
            Error::WalletProvider(msg) => assert!(msg.contains("insufficient funds for gas")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn signs_solana_message_as_base64() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/wallets/sol/rpc"))
            .and(body_partial_json(json!({
                "method": "signMessage",
                "params": { "message": "aGVsbG8=", "encoding": "base64" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "method": "signMessage",
                "data": { "signature": "c2lnbmF0dXJl", "encoding": "base64" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let signed = client(mock_server.uri())
            .sign_solana_message("sol", b"hello")
            .await
            .unwrap();
        assert_eq!(signed.signature, "c2lnbmF0dXJl");
        assert_eq!(signed.encoding, "base64");
    }
}
