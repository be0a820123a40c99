use crate::core::config::COST_PER_1K_TOKENS_USD;
use serde::Serialize;

/// Token accounting reported by the embedding service for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub model: String,
}

/// Running token totals across all successful embedding calls of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageAccumulator {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub requests: u64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the usage of one successful call
    pub fn record(&mut self, usage: &Usage) {
        self.total_tokens += usage.total_tokens;
        self.prompt_tokens += usage.prompt_tokens;
        self.requests += 1;
    }

    /// Estimated cost in USD at the fixed per-1000-token price
    pub fn estimated_cost_usd(&self) -> f64 {
        (self.total_tokens as f64 / 1000.0) * COST_PER_1K_TOKENS_USD
    }
}
