//! Single-flight guard.
//!
//! At most one mutating call per session may be in flight. The slot is
//! claimed before dispatch and released when the [`FlightGuard`] drops,
//! whether the call confirmed, reverted, timed out or failed to send.
//! The guard owns a handle to the slot, so it can travel with the task
//! that waits for the receipt.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use farmstead_types::OperationId;

use crate::engine::PendingView;
use crate::error::EngineError;

/// Slot holding the one in-flight operation of a session.
#[derive(Debug, Default)]
pub struct SingleFlight {
    slot: Mutex<Option<PendingView>>,
}

impl SingleFlight {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingView>> {
        // The slot holds plain data; a panic elsewhere cannot leave it torn.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot for `call`, or reject with [`EngineError::Busy`].
    pub fn begin(
        self: &Arc<Self>,
        call: &str,
        since: DateTime<Utc>,
    ) -> Result<FlightGuard, EngineError> {
        let mut slot = self.lock();
        if let Some(current) = slot.as_ref() {
            return Err(EngineError::Busy {
                in_flight: current.call.clone(),
            });
        }
        *slot = Some(PendingView {
            call: call.to_owned(),
            operation_id: None,
            since,
        });
        Ok(FlightGuard {
            flight: Arc::clone(self),
        })
    }

    /// The operation currently in flight.
    pub fn current(&self) -> Option<PendingView> {
        self.lock().clone()
    }

    /// Whether an operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().is_some()
    }
}

/// Holds the single-flight slot. Releases it on drop.
#[derive(Debug)]
pub struct FlightGuard {
    flight: Arc<SingleFlight>,
}

impl FlightGuard {
    /// Record the ledger operation id once the call has been accepted.
    pub fn accepted(&self, operation: OperationId) {
        if let Some(pending) = self.flight.lock().as_mut() {
            pending.operation_id = Some(operation);
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        *self.flight.lock() = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn second_call_is_rejected_until_release() {
        let flight = Arc::new(SingleFlight::new());
        let guard = flight.begin("waterPlot", Utc::now()).unwrap();
        assert!(flight.is_busy());

        let err = flight.begin("plantCrop", Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Busy { ref in_flight } if in_flight == "waterPlot"));

        drop(guard);
        assert!(!flight.is_busy());
        assert!(flight.begin("plantCrop", Utc::now()).is_ok());
    }

    #[test]
    fn accepted_records_operation() {
        let flight = Arc::new(SingleFlight::new());
        let guard = flight.begin("harvestCrop", Utc::now()).unwrap();
        let id = OperationId::new();
        guard.accepted(id);
        assert_eq!(flight.current().unwrap().operation_id, Some(id));
    }

    #[tokio::test]
    async fn guard_moved_into_a_task_holds_the_slot() {
        let flight = Arc::new(SingleFlight::new());
        let guard = flight.begin("buyCoins", Utc::now()).unwrap();
        let (release, released) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let _ = released.await;
        });

        assert!(flight.is_busy());
        release.send(()).unwrap();
        task.await.unwrap();
        assert!(!flight.is_busy());
    }
}
