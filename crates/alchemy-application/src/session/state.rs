use alchemy_core::fusion::{FusionResult, HistoryEntry};
use alchemy_core::selection::SelectionSet;
use serde::Serialize;

/// Where a session stands in the fusion lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// Nothing selected.
    Idle,
    /// One symbol selected.
    Selecting,
    /// Two symbols selected, fusion can run.
    Ready,
    /// A provider call is in flight.
    Fusing,
    /// A result is on display until the next reset.
    Result,
    /// The last fusion failed unexpectedly; selections are kept for a retry.
    Failed,
}

/// Everything the front end reads from a session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub selection: SelectionSet,
    pub result: Option<FusionResult>,
    pub is_fusing: bool,
    pub error: Option<String>,
    /// Most recent first.
    pub history: Vec<HistoryEntry>,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.is_fusing {
            SessionPhase::Fusing
        } else if self.result.is_some() {
            SessionPhase::Result
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else {
            match self.selection.len() {
                0 => SessionPhase::Idle,
                1 => SessionPhase::Selecting,
                _ => SessionPhase::Ready,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemy_core::symbol::Symbol;

    #[test]
    fn test_phase_follows_selection() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.selection.toggle(Symbol::new("🔥").unwrap());
        assert_eq!(state.phase(), SessionPhase::Selecting);

        state.selection.toggle(Symbol::new("❄️").unwrap());
        assert_eq!(state.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_fusing_takes_precedence() {
        let state = SessionState {
            is_fusing: true,
            error: Some("boom".into()),
            ..SessionState::default()
        };
        assert_eq!(state.phase(), SessionPhase::Fusing);

        let state = SessionState {
            result: Some(FusionResult::fallback()),
            ..SessionState::default()
        };
        assert_eq!(state.phase(), SessionPhase::Result);

        let state = SessionState {
            error: Some("boom".into()),
            ..SessionState::default()
        };
        assert_eq!(state.phase(), SessionPhase::Failed);
    }
}
