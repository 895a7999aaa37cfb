//! Prompt and email template rendering.
//!
//! Templates are stored in `templates/` and use Jinja2 syntax.
//!
//! # Usage
//!
//! ```ignore
//! use crate::shared::prompts::render_scoring_system_prompt;
//!
//! let prompt = render_scoring_system_prompt(Some("We build bikes"), &schema)?;
//! ```

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::context;
use rust_decimal::Decimal;

/// Render the scoring system prompt.
///
/// # Arguments
/// * `company_context` - Company description from settings, if any
/// * `json_schema` - JSON schema string for the expected reply
pub fn render_scoring_system_prompt(
    company_context: Option<&str>,
    json_schema: &str,
) -> Result<String, TemplateError> {
    let company_context = company_context.map(str::trim).filter(|c| !c.is_empty());

    render_template(
        "scoring/system.jinja",
        context! {
            company_context => company_context,
            json_schema => json_schema,
        },
    )
}

/// Render the user message describing one purchase request
pub fn render_scoring_request_prompt(
    title: &str,
    description: &str,
    reason: &str,
    amount: Decimal,
) -> Result<String, TemplateError> {
    render_template(
        "scoring/request.jinja",
        context! {
            title => title,
            description => description,
            reason => reason,
            amount => amount.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_includes_company_context() {
        let prompt = render_scoring_system_prompt(Some("We repair bicycles"), "{}").unwrap();
        assert!(prompt.contains("We repair bicycles"));

        let prompt = render_scoring_system_prompt(Some("   "), "{}").unwrap();
        assert!(prompt.contains("No company description"));
    }

    #[test]
    fn test_request_prompt_lists_fields() {
        let prompt = render_scoring_request_prompt(
            "Torque wrench",
            "Digital, 5-60 Nm",
            "Current one is broken",
            Decimal::new(34999, 2),
        )
        .unwrap();

        assert!(prompt.contains("Title: Torque wrench"));
        assert!(prompt.contains("Amount: 349.99"));
        assert!(prompt.contains("Current one is broken"));
    }
}
