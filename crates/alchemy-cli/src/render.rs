//! Terminal rendering for results, history and the symbol grid.

use alchemy_core::catalog::SYMBOLS;
use alchemy_core::fusion::{FusionResult, HistoryEntry, Rarity};
use alchemy_core::selection::SelectionSet;
use alchemy_core::symbol::Symbol;
use colored::{ColoredString, Colorize};

const CARD_BAR_WIDTH: usize = 20;
const HISTORY_BAR_WIDTH: usize = 10;
const GRID_COLUMNS: usize = 8;
const EMPTY_SLOT: &str = "?";

fn rarity_badge(rarity: Rarity) -> ColoredString {
    let badge = format!("[{}]", rarity.label());
    match rarity {
        Rarity::Common => badge.white().dimmed(),
        Rarity::Rare => badge.bright_blue(),
        Rarity::Epic => badge.bright_magenta(),
        Rarity::Legendary => badge.yellow().bold(),
        Rarity::Mythical => badge.bright_red().bold(),
    }
}

/// Filled/empty cells for a power level out of 100, rounded to the nearest cell.
pub fn power_bar(level: u8, width: usize) -> String {
    let filled = ((usize::from(level.min(100)) * width) + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn tinted(text: &str, result: &FusionResult) -> ColoredString {
    match result.rgb() {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

pub fn pair(first: &Symbol, second: &Symbol) -> String {
    format!("{first} + {second}")
}

pub fn result_card(result: &FusionResult) -> String {
    let rule = "─".repeat(32);
    let lines = [
        format!("╭{rule}╮"),
        format!(
            "  {}  ✨ {}",
            rarity_badge(result.rarity),
            result.category.bright_black()
        ),
        format!("  {} {}", tinted("●", result), result.name.bold()),
        format!(
            "  能量强度 {} {}/100",
            power_bar(result.power_level, CARD_BAR_WIDTH).bright_magenta(),
            result.power_level
        ),
        format!("  {}", format!("\"{}\"", result.description).italic()),
        format!("  ℹ {}", result.fun_fact.bright_black()),
        format!("  {}", result.color_hex.bright_black()),
        format!("╰{rule}╯"),
    ];
    lines.join("\n")
}

pub fn history(entries: &[HistoryEntry]) -> String {
    let mut out = vec!["探索日志".bold().to_string()];
    if entries.is_empty() {
        out.push("  暂无发现。".bright_black().to_string());
        out.push("  开始融合，填充你的炼金手记吧！".bright_black().to_string());
        return out.join("\n");
    }
    for entry in entries {
        let [first, second] = &entry.input_pair;
        out.push(format!(
            "  {} {} {}  {} {}",
            pair(first, second),
            rarity_badge(entry.result.rarity),
            entry.result.name.bold(),
            tinted(&power_bar(entry.result.power_level, HISTORY_BAR_WIDTH), &entry.result),
            entry.timestamp.format("%H:%M:%S").to_string().bright_black(),
        ));
    }
    out.join("\n")
}

/// The two fusion slots, `?` for an empty one.
pub fn slots(selection: &SelectionSet) -> String {
    let symbols = selection.symbols();
    let slot = |i: usize| symbols.get(i).map_or(EMPTY_SLOT, Symbol::as_str);
    format!("[ {} ] + [ {} ]   已选 {}/2", slot(0), slot(1), symbols.len())
}

pub fn catalog_grid() -> String {
    SYMBOLS
        .chunks(GRID_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(col, symbol)| format!("{:>2} {}", row * GRID_COLUMNS + col + 1, symbol))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
