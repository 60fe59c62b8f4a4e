use serde::{Deserialize, Serialize};

/// How a node's range is resolved to its start and end tokens.
///
/// Every strategy binds identically; they differ only in cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenLookup {
    /// Scan the token list, O(tokens) per node.
    Linear,
    /// Binary search over the range-sorted token index, O(log tokens) per node.
    BinarySearch,
    /// Linear below [`IndexOptions::linear_threshold`] tokens, binary search above.
    #[default]
    Auto,
}

/// Knobs for [`SyntaxTree::build`](crate::SyntaxTree::build).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexOptions {
    pub token_lookup: TokenLookup,
    pub linear_threshold: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { token_lookup: TokenLookup::Auto, linear_threshold: 64 }
    }
}

impl IndexOptions {
    pub fn with_lookup(token_lookup: TokenLookup) -> Self {
        Self { token_lookup, ..Self::default() }
    }

    pub(crate) fn binary_search(&self, token_count: usize) -> bool {
        match self.token_lookup {
            TokenLookup::Linear => false,
            TokenLookup::BinarySearch => true,
            TokenLookup::Auto => token_count > self.linear_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let options: IndexOptions = serde_json::from_str(r#"{ "token_lookup": "linear" }"#).unwrap();
        assert_eq!(options.token_lookup, TokenLookup::Linear);
        assert_eq!(options.linear_threshold, 64);

        let options: IndexOptions = serde_json::from_str(r#"{ "linear_threshold": 2 }"#).unwrap();
        assert!(!options.binary_search(2));
        assert!(options.binary_search(3));
    }
}
