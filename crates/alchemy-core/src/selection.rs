//! The two-slot selection set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbol::Symbol;

/// Maximum number of symbols that take part in one fusion.
pub const MAX_SELECTION: usize = 2;

/// Result of toggling a symbol in a [`SelectionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    /// The symbol was appended to the selection.
    Added,
    /// The symbol was already selected and has been removed.
    Removed,
    /// Both slots are taken; the selection is unchanged.
    Rejected,
    /// A fusion is in flight; selection changes are not accepted.
    Locked,
}

impl ToggleOutcome {
    /// Whether the selection changed.
    pub fn changed(self) -> bool {
        matches!(self, Self::Added | Self::Removed)
    }
}

/// A symbol list that cannot be a selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection holds {0} symbols, at most 2 allowed")]
    TooMany(usize),

    #[error("symbol {0} is selected twice")]
    Duplicate(Symbol),
}

/// Ordered set of at most two symbols, kept in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SelectionSet {
    symbols: Vec<Symbol>,
}

impl TryFrom<Vec<Symbol>> for SelectionSet {
    type Error = SelectionError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self, Self::Error> {
        if symbols.len() > MAX_SELECTION {
            return Err(SelectionError::TooMany(symbols.len()));
        }
        if let [first, second] = symbols.as_slice() {
            if first == second {
                return Err(SelectionError::Duplicate(first.clone()));
            }
        }
        Ok(Self { symbols })
    }
}

impl From<SelectionSet> for Vec<Symbol> {
    fn from(selection: SelectionSet) -> Self {
        selection.symbols
    }
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the selection rule to `symbol`.
    ///
    /// - already selected: removed
    /// - a free slot exists: appended
    /// - both slots taken: rejected silently
    pub fn toggle(&mut self, symbol: Symbol) -> ToggleOutcome {
        if let Some(pos) = self.symbols.iter().position(|s| *s == symbol) {
            self.symbols.remove(pos);
            ToggleOutcome::Removed
        } else if self.symbols.len() < MAX_SELECTION {
            self.symbols.push(symbol);
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Rejected
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.symbols.len() == MAX_SELECTION
    }

    /// The selected symbols in selection order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Returns both symbols, first selected first, when the set is full.
    pub fn pair(&self) -> Option<[Symbol; 2]> {
        match self.symbols.as_slice() {
            [first, second] => Some([first.clone(), second.clone()]),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn test_third_symbol_is_rejected() {
        let mut selection = SelectionSet::new();
        assert_eq!(selection.toggle(sym("🔥")), ToggleOutcome::Added);
        assert_eq!(selection.toggle(sym("❄️")), ToggleOutcome::Added);
        assert_eq!(selection.toggle(sym("🌲")), ToggleOutcome::Rejected);

        assert_eq!(selection.symbols(), &[sym("🔥"), sym("❄️")]);
    }

    #[test]
    fn test_reselect_removes() {
        let mut selection = SelectionSet::new();
        selection.toggle(sym("🔥"));
        selection.toggle(sym("❄️"));

        assert_eq!(selection.toggle(sym("🔥")), ToggleOutcome::Removed);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.symbols(), &[sym("❄️")]);
        assert!(selection.pair().is_none());
    }

    #[test]
    fn test_removed_slot_can_be_refilled() {
        let mut selection = SelectionSet::new();
        selection.toggle(sym("🔥"));
        selection.toggle(sym("❄️"));
        selection.toggle(sym("🔥"));
        assert_eq!(selection.toggle(sym("🌲")), ToggleOutcome::Added);

        assert_eq!(selection.pair(), Some([sym("❄️"), sym("🌲")]));
    }

    #[test]
    fn test_pair_preserves_selection_order() {
        let mut selection = SelectionSet::new();
        selection.toggle(sym("❄️"));
        selection.toggle(sym("🔥"));
        assert_eq!(selection.pair(), Some([sym("❄️"), sym("🔥")]));
        assert!(selection.is_full());

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_deserialize_keeps_selection_rules() {
        let selection: SelectionSet = serde_json::from_str(r#"["🔥","❄️"]"#).unwrap();
        assert_eq!(selection.pair(), Some([sym("🔥"), sym("❄️")]));

        assert!(serde_json::from_str::<SelectionSet>(r#"["a","b","c","a"]"#).is_err());
        assert!(serde_json::from_str::<SelectionSet>(r#"["a","a"]"#).is_err());
        assert_eq!(
            SelectionSet::try_from(vec![sym("a"), sym("b"), sym("c")]),
            Err(SelectionError::TooMany(3))
        );
        assert_eq!(
            SelectionSet::try_from(vec![sym("a"), sym("a")]),
            Err(SelectionError::Duplicate(sym("a")))
        );
    }

    #[test]
    fn test_serializes_as_symbol_list() {
        let mut selection = SelectionSet::new();
        selection.toggle(sym("🔥"));
        assert_eq!(serde_json::to_string(&selection).unwrap(), r#"["🔥"]"#);
    }

    #[test]
    fn test_outcome_changed() {
        assert!(ToggleOutcome::Added.changed());
        assert!(ToggleOutcome::Removed.changed());
        assert!(!ToggleOutcome::Rejected.changed());
        assert!(!ToggleOutcome::Locked.changed());
    }
}
