use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use alchemy_application::{FusionOutcome, FusionService, SessionController, SessionPhase};
use alchemy_core::provider::{FusionProvider, FusionRequest, ProviderError};
use alchemy_core::{FusionResult, Rarity, Symbol, ToggleOutcome};

/// Stand-in for the Gemini client.
struct MockProvider {
    answer: Result<String, ProviderError>,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(answer: Result<String, ProviderError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl FusionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &FusionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.user_instruction.contains("🔥"));
        assert!(request.user_instruction.contains("❄️"));
        self.answer.clone()
    }
}

fn frost_fire() -> FusionResult {
    FusionResult {
        name: "霜火水晶".to_string(),
        description: "一种燃烧着冰冷火焰的水晶。".to_string(),
        category: "神器".to_string(),
        rarity: Rarity::Rare,
        power_level: 62,
        color_hex: "#7fd4ff".to_string(),
        fun_fact: "它在夏天会结霜。".to_string(),
    }
}

fn controller_with(provider: Arc<MockProvider>) -> SessionController {
    SessionController::new(Arc::new(FusionService::new(provider)))
}

async fn select_fire_then_ice(controller: &SessionController) {
    let fire = Symbol::new("🔥").unwrap();
    let ice = Symbol::new("❄️").unwrap();
    assert_eq!(controller.toggle_select(fire).await, ToggleOutcome::Added);
    assert_eq!(controller.toggle_select(ice).await, ToggleOutcome::Added);
    assert_eq!(controller.phase().await, SessionPhase::Ready);
}

#[tokio::test]
async fn fire_and_ice_become_frost_fire_crystal() {
    let payload = serde_json::to_string(&frost_fire()).unwrap();
    let provider = MockProvider::new(Ok(payload));
    let controller = controller_with(provider.clone());
    select_fire_then_ice(&controller).await;

    let outcome = controller.run_fusion().await;

    assert!(matches!(outcome, FusionOutcome::Completed(_)));
    let state = controller.snapshot().await;
    assert_eq!(state.result, Some(frost_fire()));
    assert_eq!(state.history.len(), 1);
    let entry = &state.history[0];
    assert_eq!(entry.result, frost_fire());
    assert_eq!(
        entry.input_pair,
        [Symbol::new("🔥").unwrap(), Symbol::new("❄️").unwrap()]
    );
    assert!(entry.timestamp <= chrono::Utc::now());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn provider_failure_lands_fallback_in_history() {
    let provider = MockProvider::new(Err(ProviderError::Request {
        message: "connection reset".to_string(),
        is_retryable: true,
    }));
    let controller = controller_with(provider);
    select_fire_then_ice(&controller).await;

    controller.run_fusion().await;

    let state = controller.snapshot().await;
    assert_eq!(state.result, Some(FusionResult::fallback()));
    assert!(state.error.is_none());
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].result, FusionResult::fallback());
    assert_eq!(state.history[0].result.name, "不稳定的物质");
    assert_eq!(state.history[0].result.color_hex, "#555555");
}

#[tokio::test]
async fn reselecting_after_reset_runs_again() {
    let payload = serde_json::to_string(&frost_fire()).unwrap();
    let provider = MockProvider::new(Ok(payload));
    let controller = controller_with(provider.clone());

    select_fire_then_ice(&controller).await;
    controller.run_fusion().await;
    controller.reset().await;
    assert_eq!(controller.phase().await, SessionPhase::Idle);

    select_fire_then_ice(&controller).await;
    controller.run_fusion().await;

    assert_eq!(controller.history().await.len(), 2);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
