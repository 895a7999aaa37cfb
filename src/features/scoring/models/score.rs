use schemars::JsonSchema;
use serde::Deserialize;

use crate::shared::constants::{FALLBACK_AI_SCORE, MAX_AI_SCORE, MIN_AI_SCORE};
use crate::shared::llm::LlmResponse;

fn default_true() -> bool {
    true
}

/// Reply expected from the scoring model
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ScoreReply {
    /// Usefulness of the purchase for the company, 0 to 10
    pub score: f64,

    /// One or two sentences explaining the score
    pub rationale: Option<String>,

    #[serde(default = "default_true")]
    #[schemars(skip)]
    pub is_llm_success: bool,

    #[serde(default)]
    #[schemars(skip)]
    pub llm_error_message: Option<String>,
}

impl LlmResponse for ScoreReply {
    fn mark_as_fallback(&mut self, error_message: String) {
        self.is_llm_success = false;
        self.llm_error_message = Some(error_message);
    }

    fn is_success(&self) -> bool {
        self.is_llm_success
    }
}

/// The score stored for a request and whether it is the neutral fallback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    pub fallback: bool,
}

impl ScoreOutcome {
    /// Clamp an oracle value into range; anything unusable becomes the fallback
    pub fn resolve<E>(oracle_result: Result<f64, E>) -> Self {
        match oracle_result {
            Ok(score) if score.is_finite() => Self {
                score: score.clamp(MIN_AI_SCORE, MAX_AI_SCORE),
                fallback: false,
            },
            _ => Self {
                score: FALLBACK_AI_SCORE,
                fallback: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_score_is_kept() {
        let outcome = ScoreOutcome::resolve::<()>(Ok(7.25));
        assert_eq!(outcome, ScoreOutcome { score: 7.25, fallback: false });
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        assert_eq!(ScoreOutcome::resolve::<()>(Ok(14.0)).score, 10.0);
        assert_eq!(ScoreOutcome::resolve::<()>(Ok(-3.0)).score, 0.0);
        assert!(!ScoreOutcome::resolve::<()>(Ok(-3.0)).fallback);
    }

    #[test]
    fn test_failure_and_nan_use_fallback() {
        assert_eq!(
            ScoreOutcome::resolve(Err("timeout")),
            ScoreOutcome { score: 5.0, fallback: true }
        );
        assert!(ScoreOutcome::resolve::<()>(Ok(f64::NAN)).fallback);
    }

    #[test]
    fn test_reply_schema_mentions_score_only() {
        let schema = ScoreReply::json_schema_string();
        assert!(schema.contains("score"));
        assert!(!schema.contains("is_llm_success"));
    }
}
