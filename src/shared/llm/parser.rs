use lazy_static::lazy_static;
use regex::Regex;

use super::LlmResponse;

lazy_static! {
    /// `,` directly before a closing brace or bracket
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// `"a" + "b"` style concatenation
    static ref JS_STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

/// Longest prefix logged when a reply cannot be used
const PREVIEW_CHARS: usize = 200;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Body of the first fenced code block, skipping an optional language tag
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")? + 3;
    let body_start = open + text[open..].find('\n')? + 1;
    let body_len = text[body_start..].find("```")?;
    Some(text[body_start..body_start + body_len].trim())
}

/// Locate the JSON object in a model reply.
///
/// A fenced block wins over anything else in the text. Otherwise the reply is
/// either the object itself or prose around it, in which case the span from
/// the first `{` to the last `}` is taken.
pub fn extract_json_string(text: &str) -> Result<String, String> {
    if let Some(block) = fenced_block(text) {
        return Ok(block.to_string());
    }

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(text[start..=end].to_string()),
        (None, _) => Err("No JSON object found in reply".to_string()),
        _ => Err("Unbalanced JSON object in reply".to_string()),
    }
}

/// `{"score": 4,}` becomes `{"score": 4}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").into_owned()
}

/// `"a" + "b"` becomes `"ab"`
pub fn fix_js_string_concatenation(json_str: &str) -> String {
    JS_STRING_CONCAT_RE.replace_all(json_str, "").into_owned()
}

/// Full repair through llm_json. A panic inside the crate counts as a failed repair.
fn deep_repair(json_str: &str) -> Option<String> {
    let options = llm_json::RepairOptions::default();
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    })) {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("llm_json could not repair reply: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("llm_json panicked while repairing reply");
            None
        }
    }
}

/// Decode the reply, trying cheaper rewrites before the full repair
fn try_parse<T>(text: &str) -> Result<T, String>
where
    T: LlmResponse,
{
    let raw = extract_json_string(text)?;
    tracing::debug!("Model reply JSON: {}", preview(&raw));

    let decode = |candidate: &str| serde_json::from_str::<T>(candidate).ok();

    decode(&raw)
        .or_else(|| decode(&fix_trailing_commas(&fix_js_string_concatenation(&raw))))
        .or_else(|| deep_repair(&raw).and_then(|repaired| decode(&repaired)))
        .ok_or_else(|| format!("Reply is not usable JSON: {}", preview(&raw)))
}

/// Decode a model reply, never failing.
///
/// When nothing decodes, `T::default()` comes back marked as a fallback, so
/// callers must check `is_success()` before using the value.
pub fn parse_with_fallback<T>(text: &str) -> T
where
    T: LlmResponse,
{
    try_parse::<T>(text).unwrap_or_else(|error_msg| {
        tracing::warn!("Falling back on unparsable model reply: {}", error_msg);
        let mut fallback = T::default();
        fallback.mark_as_fallback(error_msg);
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
    struct Verdict {
        pub score: f64,
        pub rationale: Option<String>,

        #[serde(default = "default_true")]
        #[schemars(skip)]
        pub is_llm_success: bool,

        #[serde(skip_serializing_if = "Option::is_none")]
        #[schemars(skip)]
        pub llm_error_message: Option<String>,
    }

    impl LlmResponse for Verdict {
        fn mark_as_fallback(&mut self, error_message: String) {
            self.is_llm_success = false;
            self.llm_error_message = Some(error_message);
        }

        fn is_success(&self) -> bool {
            self.is_llm_success
        }
    }

    #[test]
    fn test_extract_json_from_fenced_block() {
        let reply = "Sure.\n\n```json\n{\"score\": 7.5}\n```\nHope that helps.";
        assert_eq!(extract_json_string(reply).unwrap(), r#"{"score": 7.5}"#);

        let reply = "```\n{\"score\": 3}\n```";
        assert_eq!(extract_json_string(reply).unwrap(), r#"{"score": 3}"#);
    }

    #[test]
    fn test_extract_json_embedded_in_prose() {
        let reply = r#"My rating is {"score": 8, "rationale": "needed"} overall."#;
        assert_eq!(
            extract_json_string(reply).unwrap(),
            r#"{"score": 8, "rationale": "needed"}"#
        );
        assert!(extract_json_string("I would give it an eight").is_err());
    }

    #[test]
    fn test_quick_fixes() {
        assert_eq!(
            fix_trailing_commas(r#"{"score": 4, "tags": [1, 2,],}"#),
            r#"{"score": 4, "tags": [1, 2]}"#
        );
        assert_eq!(
            fix_js_string_concatenation(r#"{"rationale": "cheap" + " and useful"}"#),
            r#"{"rationale": "cheap and useful"}"#
        );
    }

    #[test]
    fn test_parse_with_fallback_success_paths() {
        let plain: Verdict = parse_with_fallback(r#"{"score": 6.5, "rationale": "ok"}"#);
        assert!(plain.is_success());
        assert_eq!(plain.score, 6.5);

        let trailing: Verdict = parse_with_fallback(r#"{"score": 2,}"#);
        assert!(trailing.is_success());
        assert_eq!(trailing.score, 2.0);
    }

    #[test]
    fn test_parse_with_fallback_marks_failure() {
        let verdict: Verdict = parse_with_fallback("no idea, sorry");

        assert!(!verdict.is_success());
        assert!(verdict.llm_error_message.is_some());
        assert_eq!(verdict.score, 0.0);
    }

    #[test]
    fn test_schema_skips_internal_fields() {
        let schema = Verdict::json_schema_string();

        assert!(schema.contains("score"));
        assert!(!schema.contains("is_llm_success"));
        assert!(!schema.contains("llm_error_message"));
    }
}
