//! Built-in symbol grid.

use crate::error::{AlchemyError, Result};
use crate::symbol::Symbol;

/// Symbols offered for selection, in display order.
pub const SYMBOLS: [&str; 32] = [
    "🔥", "💧", "🌲", "⚡", "🌪️", "❄️", "🌞", "🌑", //
    "🦁", "🐲", "🦄", "👽", "🤖", "👻", "💀", "🧠", //
    "👁️", "💎", "⚔️", "🛡️", "🧪", "📜", "⚗️", "🔮", //
    "🚀", "🎨", "🎵", "🍔", "🌵", "🌋", "🍄", "🦠",
];

/// Looks up a symbol by its 1-based position in the grid.
pub fn by_index(index: usize) -> Option<&'static str> {
    index.checked_sub(1).and_then(|i| SYMBOLS.get(i).copied())
}

pub fn contains(symbol: &str) -> bool {
    SYMBOLS.contains(&symbol)
}

/// Turns user input into a symbol.
///
/// A bare number selects from the grid; anything else is taken literally,
/// so symbols outside the grid can still be fused.
pub fn resolve(input: &str) -> Result<Symbol> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(index) => by_index(index)
            .map(Symbol::new)
            .unwrap_or_else(|| {
                Err(AlchemyError::InvalidSymbol(format!(
                    "{input} (grid has {} symbols)",
                    SYMBOLS.len()
                )))
            }),
        Err(_) => Symbol::new(input),
    }
}
