//! Phecode rollup row.

use crate::Phecode;

/// A row of the phecode rollup table.
///
/// Column names follow the published rollup map: `code` holds the more
/// specific (child) phecode and `phecode_unrolled` the phecode it rolls up
/// into (parent). Identity rows, where both are equal, are common.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollupRow {
    /// Child phecode (`code` column).
    pub child: Phecode,
    /// Parent phecode (`phecode_unrolled` column).
    pub parent: Phecode,
}

impl RollupRow {
    /// Returns true if the row relates a phecode to itself.
    pub fn is_identity(&self) -> bool {
        self.child == self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_row() {
        let identity = RollupRow {
            child: "250".to_string(),
            parent: "250".to_string(),
        };
        let rollup = RollupRow {
            child: "250.2".to_string(),
            ..identity.clone()
        };
        assert!(identity.is_identity());
        assert!(!rollup.is_identity());
    }
}
