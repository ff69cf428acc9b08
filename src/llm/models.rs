use serde::Deserialize;

/// Models available for planning and review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// Speed tier - fast, cheap model for per-file reviews (gpt-oss-120b)
    Speed,
    /// Smart tier - best reasoning for whole-repo planning (claude-sonnet-4.5)
    Smart,
}

/// Maximum tokens for all model tiers
const MODEL_MAX_TOKENS: u32 = 16384;

impl Model {
    pub fn id(&self) -> &'static str {
        match self {
            Model::Speed => "openai/gpt-oss-120b",
            Model::Smart => "anthropic/claude-sonnet-4.5",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        MODEL_MAX_TOKENS
    }
}

/// API usage information from OpenRouter
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    /// Actual cost in USD as reported by OpenRouter.
    /// OpenRouter returns this as `total_cost` in the usage object.
    #[serde(default, alias = "total_cost")]
    pub cost: Option<f64>,
}

impl Usage {
    /// Get the actual cost for this usage from OpenRouter.
    /// Returns the cost reported by OpenRouter, or 0.0 if not available.
    /// We don't estimate costs - hardcoded rates are always wrong.
    pub fn cost(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }
}
