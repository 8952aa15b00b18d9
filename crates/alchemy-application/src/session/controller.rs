//! Session controller.
//!
//! Owns one user's selection, current result and history, and guarantees at
//! most one fusion in flight. The state lock is never held across the
//! provider call.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use alchemy_core::config::SessionConfig;
use alchemy_core::fusion::{FusionResult, HistoryEntry};
use alchemy_core::selection::{SelectionSet, ToggleOutcome};
use alchemy_core::symbol::Symbol;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::Mutex;

use super::state::{SessionPhase, SessionState};
use crate::fusion_service::FusionService;

/// Shown when a fusion fails outside the service's own fallback handling.
pub const FUSION_UNSTABLE_MESSAGE: &str = "融合过程变得不稳定。请重试。";

/// Why `run_fusion` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Another fusion is still running.
    InFlight,
    /// Exactly two symbols are required; carries the current count.
    IncompleteSelection(usize),
}

/// What a call to [`SessionController::run_fusion`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FusionOutcome {
    /// Preconditions not met; no provider call, no state change.
    Skipped(SkipReason),
    /// A result (real or fallback) was stored and added to history.
    Completed(HistoryEntry),
    /// The fusion broke unexpectedly; the message is now the session error.
    Failed(String),
}

pub struct SessionController {
    service: Arc<FusionService>,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(service: Arc<FusionService>) -> Self {
        Self::with_config(service, SessionConfig::default())
    }

    pub fn with_config(service: Arc<FusionService>, config: SessionConfig) -> Self {
        Self {
            service,
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Toggles `symbol` in the selection. Refused while fusing.
    pub async fn toggle_select(&self, symbol: Symbol) -> ToggleOutcome {
        let mut state = self.state.lock().await;
        if state.is_fusing {
            tracing::warn!(symbol = %symbol, "Selection locked while fusing");
            return ToggleOutcome::Locked;
        }
        let outcome = state.selection.toggle(symbol);
        tracing::debug!(?outcome, selected = state.selection.len(), "Selection toggled");
        outcome
    }

    /// Fuses the two selected symbols, in selection order.
    pub async fn run_fusion(&self) -> FusionOutcome {
        let [first, second] = {
            let mut state = self.state.lock().await;
            if state.is_fusing {
                tracing::warn!("Fusion already in flight, ignoring request");
                return FusionOutcome::Skipped(SkipReason::InFlight);
            }
            let Some(pair) = state.selection.pair() else {
                return FusionOutcome::Skipped(SkipReason::IncompleteSelection(
                    state.selection.len(),
                ));
            };
            state.is_fusing = true;
            state.result = None;
            state.error = None;
            pair
        };

        let fused = AssertUnwindSafe(self.service.fuse(&first, &second))
            .catch_unwind()
            .await;

        let mut state = self.state.lock().await;
        state.is_fusing = false;
        match fused {
            Ok(result) => {
                let entry = HistoryEntry::new(result.clone(), [first, second]);
                state.result = Some(result);
                state.history.insert(0, entry.clone());
                if let Some(limit) = self.config.history_limit {
                    state.history.truncate(limit.max(1));
                }
                tracing::info!(id = %entry.id, history = state.history.len(), "Fusion recorded");
                FusionOutcome::Completed(entry)
            }
            Err(_) => {
                tracing::error!(first = %first, second = %second, "Fusion panicked");
                state.error = Some(FUSION_UNSTABLE_MESSAGE.to_string());
                FusionOutcome::Failed(FUSION_UNSTABLE_MESSAGE.to_string())
            }
        }
    }

    /// Clears selection, result and error. History is kept.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.selection.clear();
        state.result = None;
        state.error = None;
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase()
    }

    pub async fn selection(&self) -> SelectionSet {
        self.state.lock().await.selection.clone()
    }

    pub async fn current_result(&self) -> Option<FusionResult> {
        self.state.lock().await.result.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn is_fusing(&self) -> bool {
        self.state.lock().await.is_fusing
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.history.clone()
    }
}
