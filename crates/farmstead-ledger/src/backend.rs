//! Ledger backend dispatch.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible. Engines hold a [`LedgerBackend`] and never care
//! whether the ledger lives in-process or behind the gateway.

use std::sync::Arc;
use std::time::Duration;

use farmstead_types::{OperationId, PlayerAddress, PlayerRecord, PlotRecord};
use tracing::debug;

use crate::call::{OperationHandle, Receipt, StoreCall};
use crate::error::StoreError;
use crate::http::HttpLedger;
use crate::memory::MemoryLedger;

/// An authoritative ledger the remote engine can talk to.
#[derive(Clone)]
pub enum LedgerBackend {
    /// In-process ledger, shared with whoever else holds the `Arc`.
    Memory(Arc<MemoryLedger>),
    /// Ledger behind the gateway HTTP API.
    Http(HttpLedger),
}

impl LedgerBackend {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Memory(_) => "memory",
            Self::Http(_) => "http",
        }
    }

    /// Chain the session is currently connected to.
    pub async fn session_chain(&self) -> Result<u64, StoreError> {
        match self {
            Self::Memory(ledger) => Ok(ledger.session_chain()),
            Self::Http(ledger) => ledger.chain_id().await,
        }
    }

    /// Ask the session to move to `chain_id`.
    ///
    /// The gateway is bound to one chain, so an HTTP backend can only
    /// "switch" to the chain it is already on.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), StoreError> {
        match self {
            Self::Memory(ledger) => {
                ledger.switch_chain(chain_id);
                Ok(())
            }
            Self::Http(ledger) => {
                let current = ledger.chain_id().await?;
                if current == chain_id {
                    Ok(())
                } else {
                    Err(StoreError::Unsupported {
                        reason: format!(
                            "gateway {} is bound to chain {current}",
                            ledger.base_url()
                        ),
                    })
                }
            }
        }
    }

    /// Player record.
    pub async fn get_player(&self, address: &PlayerAddress) -> Result<PlayerRecord, StoreError> {
        match self {
            Self::Memory(ledger) => {
                ledger.check_reads("getPlayer")?;
                Ok(ledger.get_player(address).await)
            }
            Self::Http(ledger) => ledger.get_player(address).await,
        }
    }

    /// Plot record, `None` if never initialized.
    pub async fn get_plot(
        &self,
        address: &PlayerAddress,
        plot: u32,
    ) -> Result<Option<PlotRecord>, StoreError> {
        match self {
            Self::Memory(ledger) => {
                ledger.check_reads("getPlot")?;
                Ok(ledger.get_plot(address, plot).await)
            }
            Self::Http(ledger) => ledger.get_plot(address, plot).await,
        }
    }

    /// Submit a state-changing call.
    pub async fn submit(
        &self,
        address: &PlayerAddress,
        call: StoreCall,
    ) -> Result<OperationHandle, StoreError> {
        match self {
            Self::Memory(ledger) => ledger.submit(address, call).await,
            Self::Http(ledger) => ledger.submit(address, call).await,
        }
    }

    /// Current receipt of an operation.
    pub async fn poll_transaction(&self, id: OperationId) -> Result<Receipt, StoreError> {
        match self {
            Self::Memory(ledger) => ledger.poll_transaction(id).await,
            Self::Http(ledger) => ledger.poll_transaction(id).await,
        }
    }

    /// Poll until the operation reaches a terminal status.
    ///
    /// With a `timeout`, gives up with [`StoreError::ConfirmationTimeout`].
    pub async fn wait_for_confirmation(
        &self,
        id: OperationId,
        poll_interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<Receipt, StoreError> {
        let wait = self.poll_until_terminal(id, poll_interval);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_elapsed| StoreError::ConfirmationTimeout { operation: id })?,
            None => wait.await,
        }
    }

    async fn poll_until_terminal(
        &self,
        id: OperationId,
        poll_interval: Duration,
    ) -> Result<Receipt, StoreError> {
        loop {
            let receipt = self.poll_transaction(id).await?;
            if receipt.status.is_terminal() {
                return Ok(receipt);
            }
            debug!(operation = %id, "Waiting for confirmation");
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use farmstead_rules::{FarmClock, ManualClock};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::call::TxStatus;
    use crate::memory::MemoryLedgerConfig;

    fn backend() -> (LedgerBackend, Arc<MemoryLedger>) {
        let clock = ManualClock::starting_at(DateTime::<Utc>::default());
        let ledger = Arc::new(MemoryLedger::new(
            MemoryLedgerConfig::default(),
            FarmClock::Manual(clock),
        ));
        (LedgerBackend::Memory(Arc::clone(&ledger)), ledger)
    }

    fn address() -> PlayerAddress {
        "0x00000000000000000000000000000000000000b2".parse().unwrap()
    }

    #[tokio::test]
    async fn waits_until_confirmed() {
        let (backend, _) = backend();
        let handle = backend
            .submit(&address(), StoreCall::BuyCoins { payment: dec!(1) })
            .await
            .unwrap();
        let receipt = backend
            .wait_for_confirmation(handle.id, Duration::from_millis(5), None)
            .await
            .unwrap();
        assert_eq!(receipt.status, TxStatus::Confirmed);
        assert_eq!(backend.get_player(&address()).await.unwrap().coins, 150);
    }

    #[tokio::test]
    async fn held_confirmation_times_out() {
        let (backend, ledger) = backend();
        ledger.hold_confirmations();
        let handle = backend
            .submit(&address(), StoreCall::WaterPlot { plot: 0 })
            .await
            .unwrap();
        let result = backend
            .wait_for_confirmation(
                handle.id,
                Duration::from_millis(5),
                Some(Duration::from_millis(40)),
            )
            .await;
        assert!(matches!(result, Err(StoreError::ConfirmationTimeout { .. })));
    }

    #[tokio::test]
    async fn offline_reads_fail_but_receipts_still_settle() {
        let (backend, ledger) = backend();
        ledger.take_reads_offline();
        let handle = backend
            .submit(&address(), StoreCall::BuyCoins { payment: dec!(1) })
            .await
            .unwrap();
        let receipt = backend
            .wait_for_confirmation(handle.id, Duration::from_millis(5), None)
            .await
            .unwrap();
        assert_eq!(receipt.status, TxStatus::Confirmed);
        assert!(matches!(
            backend.get_player(&address()).await,
            Err(StoreError::Transport { .. })
        ));
        assert!(backend.get_plot(&address(), 0).await.is_err());

        ledger.restore_reads();
        assert_eq!(backend.get_player(&address()).await.unwrap().coins, 150);
    }

    #[tokio::test]
    async fn switch_chain_moves_memory_session() {
        let (backend, ledger) = backend();
        ledger.switch_chain(1);
        assert_eq!(backend.session_chain().await.unwrap(), 1);
        backend.switch_chain(10143).await.unwrap();
        assert_eq!(backend.session_chain().await.unwrap(), 10143);
    }
}
