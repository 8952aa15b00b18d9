//! Fusion Request Service
//!
//! Turns two symbols into a [`FusionResult`] with exactly one provider call.
//! Every failure on the way (transport, provider status, empty or malformed
//! payload, broken invariant) collapses into [`FusionResult::fallback`].

use std::sync::Arc;

use alchemy_core::error::Result;
use alchemy_core::fusion::FusionResult;
use alchemy_core::provider::FusionProvider;
use alchemy_core::symbol::Symbol;

use crate::prompt;

/// Service that asks the provider for one creation per call.
#[derive(Clone)]
pub struct FusionService {
    provider: Arc<dyn FusionProvider>,
}

impl FusionService {
    pub fn new(provider: Arc<dyn FusionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Runs one fusion and reports why it failed, if it did.
    pub async fn try_fuse(&self, first: &Symbol, second: &Symbol) -> Result<FusionResult> {
        let request = prompt::build_request(first, second)?;
        let text = self.provider.generate(&request).await?;
        FusionResult::from_json(&text)
    }

    /// Runs one fusion. Never fails; returns the fallback result instead.
    pub async fn fuse(&self, first: &Symbol, second: &Symbol) -> FusionResult {
        tracing::info!(
            provider = self.provider.name(),
            first = %first,
            second = %second,
            "Fusing symbols"
        );

        match self.try_fuse(first, second).await {
            Ok(result) => {
                tracing::info!(
                    name = %result.name,
                    rarity = %result.rarity,
                    power_level = result.power_level,
                    "Fusion succeeded"
                );
                result
            }
            Err(err) => {
                tracing::error!(error = %err, "Alchemy failed, using fallback result");
                FusionResult::fallback()
            }
        }
    }
}
