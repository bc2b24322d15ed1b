//! Line item identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a line item within an editing session.
/// Survives reordering and removal of sibling items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new random ItemId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an ItemId from its string form, as handed out to a UI shell
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ItemId::new(), ItemId::new());
    }

    #[test]
    fn test_parse_display_round_trip() {
        let id = ItemId::new();
        assert_eq!(ItemId::parse(&id.to_string()), Some(id));
        assert_eq!(ItemId::parse("not-an-id"), None);
    }
}
