//! HTTP client for a ledger gateway.
//!
//! Talks to the `farmstead-proxy` routes (or anything serving the same JSON
//! shapes) with `reqwest`. Every non-success status is surfaced as
//! [`StoreError::Status`], except 404 which becomes
//! [`StoreError::NotFound`] or, for plots, `Ok(None)`.

use farmstead_types::{OperationId, PlayerAddress, PlayerRecord, PlotRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::call::{OperationHandle, Receipt, StoreCall};
use crate::error::StoreError;
use crate::wire::{
    ChainResponse, OperationResponse, PlayerResponse, PlotResponse, ReceiptResponse,
    SubmitRequest,
};

/// A ledger reached through the gateway HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedger {
    /// Create a client for the gateway at `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Gateway base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chain the gateway's ledger lives on.
    pub async fn chain_id(&self) -> Result<u64, StoreError> {
        let url = format!("{}/api/chain", self.base_url);
        let request = self.client.get(&url);
        let body: ChainResponse = send(request, "getChain").await?;
        Ok(body.chain_id)
    }

    /// Player record.
    pub async fn get_player(&self, address: &PlayerAddress) -> Result<PlayerRecord, StoreError> {
        let url = format!("{}/api/player", self.base_url);
        let request = self.client.get(&url).query(&[("address", address.as_str())]);
        let body: PlayerResponse = send(request, "getPlayer").await?;
        Ok(body.player)
    }

    /// Plot record, `None` when the gateway reports the plot as not found.
    pub async fn get_plot(
        &self,
        address: &PlayerAddress,
        plot: u32,
    ) -> Result<Option<PlotRecord>, StoreError> {
        let url = format!("{}/api/plot", self.base_url);
        let plot_id = plot.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("address", address.as_str()), ("plotId", plot_id.as_str())]);
        match send::<PlotResponse>(request, "getPlot").await {
            Ok(body) => Ok(Some(body.plot)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Submit a state-changing call.
    pub async fn submit(
        &self,
        address: &PlayerAddress,
        call: StoreCall,
    ) -> Result<OperationHandle, StoreError> {
        let url = format!("{}/api/tx", self.base_url);
        let name = call.name();
        let request = self.client.post(&url).json(&SubmitRequest {
            address: address.clone(),
            call,
        });
        let body: OperationResponse = send(request, name).await?;
        debug!(operation = %body.operation.id, call = name, "Submitted through gateway");
        Ok(body.operation)
    }

    /// Current receipt of an operation.
    pub async fn poll_transaction(&self, id: OperationId) -> Result<Receipt, StoreError> {
        let url = format!("{}/api/tx/{id}", self.base_url);
        let request = self.client.get(&url);
        let body: ReceiptResponse = send(request, "getReceipt").await?;
        Ok(body.receipt)
    }
}

/// Send a request and decode a JSON body.
async fn send<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    operation: &str,
) -> Result<T, StoreError> {
    let response = request.send().await.map_err(|e| StoreError::Transport {
        operation: operation.to_owned(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| StoreError::Transport {
        operation: operation.to_owned(),
        reason: format!("unable to read body: {e}"),
    })?;

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound {
            what: format!("{operation}: {body}"),
        });
    }
    if !status.is_success() {
        return Err(StoreError::Status {
            operation: operation.to_owned(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        let ledger = HttpLedger::new("http://127.0.0.1:8080/");
        assert_eq!(ledger.base_url(), "http://127.0.0.1:8080");
    }
}
