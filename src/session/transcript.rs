//! Ordered record of a session's exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TokenUsage;

/// One completed send with its reply text and reported token usage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    pub input: String,
    pub output: String,
    pub usage: TokenUsage,
    pub at: DateTime<Utc>,
}

/// Ordered history of a session's exchanges. Append-only during a session's
/// lifetime; dropped with it.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Exchange>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.entries.push(exchange);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(input: &str, output: &str) -> Exchange {
        Exchange {
            input: input.into(),
            output: output.into(),
            usage: TokenUsage::new(1, 1),
            at: Utc::now(),
        }
    }

    #[test]
    fn preserves_insertion_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.push(exchange("first", "a"));
        transcript.push(exchange("second", "b"));

        assert_eq!(transcript.len(), 2);
        let inputs: Vec<_> = transcript.iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, ["first", "second"]);
        assert_eq!(transcript.last().unwrap().output, "b");
    }

    #[test]
    fn clear_empties_the_record() {
        let mut transcript = Transcript::new();
        transcript.push(exchange("x", "y"));
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
