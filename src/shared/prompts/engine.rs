//! Template engine for prompts and email bodies using Jinja2 syntax.
//!
//! Templates live under `templates/` and are compiled into the binary, so a
//! deployment needs no template files next to it.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Embedded templates as (name, source) pairs
const TEMPLATES: &[(&str, &str)] = &[
    (
        "scoring/system.jinja",
        include_str!("../../../templates/prompts/scoring/system.jinja"),
    ),
    (
        "scoring/request.jinja",
        include_str!("../../../templates/prompts/scoring/request.jinja"),
    ),
    (
        "emails/status_changed.jinja",
        include_str!("../../../templates/emails/status_changed.jinja"),
    ),
    (
        "emails/note_added.jinja",
        include_str!("../../../templates/emails/note_added.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with the given context.
///
/// # Example
/// ```ignore
/// use minijinja::context;
/// use crate::shared::prompts::render_template;
///
/// let body = render_template("emails/note_added.jinja", context! { title => "Laptop" })?;
/// ```
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map(|rendered| rendered.trim().to_string())
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_embedded_templates_load() {
        for (name, _) in TEMPLATES {
            assert!(
                get_environment().get_template(name).is_ok(),
                "template {} failed to load",
                name
            );
        }
    }

    #[test]
    fn test_missing_template() {
        let result = render_template("nonexistent.jinja", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_optional_block_is_skipped() {
        let body = render_template(
            "emails/status_changed.jinja",
            context! {
                recipient_name => "Jan",
                title => "Standing desk",
                status => "approved",
                actor_name => "Ewa",
                reason => None::<String>,
                link => "https://desk.example.com/requests/1",
            },
        )
        .unwrap();

        assert!(body.contains("\"Standing desk\" is now approved"));
        assert!(!body.contains("Reason:"));
    }
}
