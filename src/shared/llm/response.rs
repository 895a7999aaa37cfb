use schemars::gen::SchemaGenerator;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

/// A typed LLM reply that can degrade to a marked default
pub trait LlmResponse: DeserializeOwned + Default + JsonSchema {
    /// Record that parsing failed and this value is the default
    fn mark_as_fallback(&mut self, error_message: String);

    fn is_success(&self) -> bool;

    /// JSON schema of the reply, embedded in prompts so the model knows the shape
    fn json_schema_string() -> String {
        let mut gen = SchemaGenerator::default();
        let schema = gen.root_schema_for::<Self>();
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
    }
}
