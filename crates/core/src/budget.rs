//! Context budget: how much chunk text fits in one model request.

use serde::{Deserialize, Serialize};

/// Approximate input-size limit of the rewriting model, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextBudget {
    pub model_context_chars: usize,
    /// Room left for the model's answer.
    pub reserved_output_chars: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            model_context_chars: 4097,
            reserved_output_chars: 1080,
        }
    }
}

impl ContextBudget {
    /// Largest piece submitted at once. Never zero.
    pub fn limit(&self) -> usize {
        self.model_context_chars
            .saturating_sub(self.reserved_output_chars)
            .max(1)
    }
}

/// Slice `chunk` into consecutive pieces of at most `budget.limit()`
/// characters. A chunk within the limit comes back as a single piece.
pub fn split_for_budget(chunk: &str, budget: &ContextBudget) -> Vec<String> {
    let limit = budget.limit();
    let chars: Vec<char> = chunk.chars().collect();
    if chars.len() <= limit {
        return vec![chunk.to_string()];
    }
    chars
        .chunks(limit)
        .map(|piece| piece.iter().collect())
        .collect()
}
