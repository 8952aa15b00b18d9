//! Prompt construction for fusion requests.

use alchemy_core::error::{AlchemyError, Result};
use alchemy_core::fusion::FusionResult;
use alchemy_core::provider::FusionRequest;
use alchemy_core::symbol::Symbol;
use minijinja::{Environment, context};

/// Fixed creative framing sent with every fusion.
pub const SYSTEM_INSTRUCTION: &str = r#"你是一位拥有无尽智慧的炼金术大师。你的任务是将两个 Emoji（概念素材）融合，创造出一个全新的、虚构的、富有创意的“造物”。
它可以是一个生物、一件魔法神器、一个未来科技装置，或者一个哲学概念。

请发挥想象力！不要只是简单描述组合，要去发明创造！
例如：🔥 + ❄️ = "霜火水晶" (一种燃烧着冰冷火焰的水晶)。
例如：🤖 + 🧠 = "初醒芯片" (人工智能产生自我意识的瞬间)。

根据组合的强大程度或奇异程度来决定【稀有度】。
生成一个代表这个新造物本质的十六进制颜色代码。

请务必使用中文（简体）生成所有文本内容。"#;

const USER_TEMPLATE: &str = "融合这两个元素: {{ first }} 和 {{ second }}";

/// Builds the provider request for fusing `first` with `second`.
pub fn build_request(first: &Symbol, second: &Symbol) -> Result<FusionRequest> {
    let user_instruction = Environment::new()
        .render_str(
            USER_TEMPLATE,
            context! { first => first.as_str(), second => second.as_str() },
        )
        .map_err(|e| AlchemyError::internal(format!("Failed to render fusion prompt: {e}")))?;

    Ok(FusionRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        user_instruction,
        response_schema: FusionResult::response_schema(),
    })
}
