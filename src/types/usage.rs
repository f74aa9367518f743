//! Token usage tracking types.

use serde::{Deserialize, Serialize};

/// Token counts reported by a backend for one agent turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_both_counters() {
        let mut usage = TokenUsage::new(10, 5);
        usage.merge(&TokenUsage::new(3, 7));
        assert_eq!(usage, TokenUsage::new(13, 12));
        assert_eq!(usage.total(), 25);
    }

    #[test]
    fn default_is_zero() {
        assert!(TokenUsage::default().is_zero());
        assert!(!TokenUsage::new(1, 0).is_zero());
    }
}
