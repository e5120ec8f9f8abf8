//! Usage records and their normalization before billing.

use serde::{Deserialize, Serialize};

use super::{WARN_CACHED_CLAMPED, WARN_TOKEN_OVERFLOW};

/// Per-call switches recognized by the calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculateOptions {
    /// Apply the model's batch multiplier per its batch/cache rule.
    #[serde(default)]
    pub batch_mode: bool,
}

impl CalculateOptions {
    pub fn batch() -> Self {
        Self { batch_mode: true }
    }
}

/// Raw counters as reported by a provider response.
///
/// Counters are signed so malformed upstream values can be accepted and
/// treated as zero instead of rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub tool_use_prompt_tokens: i64,
    /// Portion of the prompt served from cache.
    #[serde(default)]
    pub cached_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub thinking_tokens: i64,
    /// Grounding queries or prompts, per the entry's billing model.
    #[serde(default)]
    pub grounding_units: i64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: i64, output_tokens: i64) -> Self {
        Self {
            prompt_tokens,
            output_tokens,
            ..Default::default()
        }
    }

    pub fn with_tool_use_prompt_tokens(mut self, tokens: i64) -> Self {
        self.tool_use_prompt_tokens = tokens;
        self
    }

    pub fn with_cached_tokens(mut self, tokens: i64) -> Self {
        self.cached_tokens = tokens;
        self
    }

    pub fn with_thinking_tokens(mut self, tokens: i64) -> Self {
        self.thinking_tokens = tokens;
        self
    }

    pub fn with_grounding_units(mut self, units: i64) -> Self {
        self.grounding_units = units;
        self
    }

    /// Prompt plus tool-use prompt tokens, negatives as zero.
    ///
    /// Returns `None` when the sum does not fit in an `i64`.
    pub fn checked_input_total(&self) -> Option<i64> {
        non_negative(self.prompt_tokens).checked_add(non_negative(self.tool_use_prompt_tokens))
    }

    pub(crate) fn normalize(&self, warnings: &mut Vec<String>) -> NormalizedUsage {
        if self.has_negative() {
            tracing::debug!(usage = ?self, "negative usage counters clamped to zero");
        }

        let input = self.checked_input_total().unwrap_or_else(|| {
            tracing::debug!(
                prompt_tokens = self.prompt_tokens,
                tool_use_prompt_tokens = self.tool_use_prompt_tokens,
                "input token total overflowed"
            );
            warnings.push(WARN_TOKEN_OVERFLOW.to_string());
            i64::MAX
        });

        let requested_cached = non_negative(self.cached_tokens);
        if requested_cached > input {
            tracing::debug!(
                cached_tokens = requested_cached,
                input_tokens = input,
                "cached tokens clamped to input total"
            );
            warnings.push(WARN_CACHED_CLAMPED.to_string());
        }
        let cached = requested_cached.min(input);

        NormalizedUsage {
            input,
            standard: input - cached,
            cached,
            output: non_negative(self.output_tokens),
            thinking: non_negative(self.thinking_tokens),
            grounding: non_negative(self.grounding_units),
        }
    }

    fn has_negative(&self) -> bool {
        [
            self.prompt_tokens,
            self.tool_use_prompt_tokens,
            self.cached_tokens,
            self.output_tokens,
            self.thinking_tokens,
            self.grounding_units,
        ]
        .iter()
        .any(|v| *v < 0)
    }
}

/// Counters after clamping; `standard + cached == input` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizedUsage {
    pub input: i64,
    pub standard: i64,
    pub cached: i64,
    pub output: i64,
    pub thinking: i64,
    pub grounding: i64,
}

fn non_negative(value: i64) -> i64 {
    value.max(0)
}
