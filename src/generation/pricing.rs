// Deterministic cost accounting for generation calls
//
// Rates mirror the provider's documented per-million-token pricing. Cost is
// reproducible from {model, prompt_tokens, completion_tokens} alone.

use crate::models::TokenUsage;

/// Model used for text-only requests
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Model used when one or more images are attached
pub const VISION_MODEL: &str = "gpt-4o";

/// Per-million-token USD rates for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Rate table lookup. Unknown model identifiers fall back to the default
/// model's rates.
pub fn rates_for(model: &str) -> ModelRates {
    match model {
        VISION_MODEL => ModelRates {
            input_per_million: 2.50,
            output_per_million: 10.00,
        },
        _ => ModelRates {
            input_per_million: 0.15,
            output_per_million: 0.60,
        },
    }
}

/// Total cost in USD for one call:
/// `prompt_tokens * input_rate + completion_tokens * output_rate`,
/// rates expressed per single token.
pub fn compute_cost(model: &str, usage: &TokenUsage) -> f64 {
    let rates = rates_for(model);
    usage.prompt_tokens as f64 * rates.input_per_million / 1_000_000.0
        + usage.completion_tokens as f64 * rates.output_per_million / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(prompt: u64, completion: u64) -> TokenUsage {
        TokenUsage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        }
    }

    #[test]
    fn test_default_model_input_rate_fixture() {
        // 1M prompt tokens, no completion, on the default model
        let cost = compute_cost(DEFAULT_MODEL, &usage(1_000_000, 0));
        assert!((cost - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_default_model_output_rate_fixture() {
        let cost = compute_cost(DEFAULT_MODEL, &usage(0, 1_000_000));
        assert!((cost - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_vision_model_rate_fixtures() {
        let cost = compute_cost(VISION_MODEL, &usage(1_000_000, 0));
        assert!((cost - 2.50).abs() < 1e-9);

        let cost = compute_cost(VISION_MODEL, &usage(1_000_000, 500_000));
        assert!((cost - 7.50).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_usage_default_model() {
        // 2000 prompt + 1000 completion on gpt-4o-mini:
        // 2000 * 0.15/1M + 1000 * 0.60/1M = 0.0003 + 0.0006
        let cost = compute_cost(DEFAULT_MODEL, &usage(2_000, 1_000));
        assert!((cost - 0.0009).abs() < 1e-12);
    }

    #[test]
    fn test_zero_usage_costs_nothing() {
        assert_eq!(compute_cost(DEFAULT_MODEL, &usage(0, 0)), 0.0);
        assert_eq!(compute_cost(VISION_MODEL, &usage(0, 0)), 0.0);
    }

    #[test]
    fn test_cost_is_deterministic() {
        let u = usage(123_456, 78_910);
        let first = compute_cost(VISION_MODEL, &u);
        for _ in 0..10 {
            assert_eq!(compute_cost(VISION_MODEL, &u), first);
        }
    }

    #[test]
    fn test_unknown_model_uses_default_rates() {
        let u = usage(1_000_000, 0);
        assert_eq!(
            compute_cost("some-future-model", &u),
            compute_cost(DEFAULT_MODEL, &u)
        );
    }
}
