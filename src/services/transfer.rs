//! Token Transfer Submitter
//!
//! Hands a token-transfer instruction to the signing and broadcast service
//! behind the configured RPC endpoint and returns the transaction
//! signature. Single best-effort attempt: no retry and no idempotency key,
//! so a caller that re-submits risks a double charge.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("wallet rejected signing: {0}")]
    Rejected(String),
    #[error("insufficient token balance: {0}")]
    InsufficientFunds(String),
    #[error("transfer network error: {0}")]
    Network(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

/// A token transfer to submit: sender pays `amount_base_units` of the mint
/// to the recipient
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub sender: String,
    pub mint: String,
    pub recipient: String,
    pub amount_base_units: u64,
}

/// Convert a floating-point token amount to the chain's smallest unit,
/// truncating any sub-unit dust
pub fn to_base_units(amount: f64, decimals: u32) -> u64 {
    (amount * 10f64.powi(decimals as i32)).floor() as u64
}

/// Opaque signing + broadcast service. The wallet owns key custody,
/// user-facing confirmation, and cancellation; this side only sees the
/// resulting signature or the failure.
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn send_token_transfer(&self, request: &TransferRequest)
        -> Result<String, TransferError>;
}

/// JSON-RPC client for the broadcast endpoint
#[derive(Debug, Clone)]
pub struct RpcWalletClient {
    http: reqwest::Client,
    rpc_url: String,
}

impl RpcWalletClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
        }
    }
}

#[async_trait]
impl WalletClient for RpcWalletClient {
    async fn send_token_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<String, TransferError> {
        debug!(
            "Submitting transfer of {} base units from {} to {}",
            request.amount_base_units, request.sender, request.recipient
        );

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [request],
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransferError::Network(format!(
                "rpc endpoint returned status {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if let Some(err) = payload.get("error") {
            let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown rpc error")
                .to_string();

            let lowered = message.to_lowercase();
            if lowered.contains("insufficient") {
                return Err(TransferError::InsufficientFunds(message));
            }
            if lowered.contains("rejected") {
                return Err(TransferError::Rejected(message));
            }
            return Err(TransferError::Rpc { code, message });
        }

        payload
            .get("result")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .ok_or_else(|| TransferError::Rpc {
                code: 0,
                message: "response carried no signature".to_string(),
            })
    }
}
