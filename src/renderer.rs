//! Template renderer and rendering functionality for Sprout.
//! Expressions are evaluated with MiniJinja in strict mode: an undefined
//! variable is an error, never an empty string.
use crate::error::Result;
use minijinja::value::{Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind, Output, State, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new MiniJinjaRenderer with strict undefined handling.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_formatter(format_value);
        Self { env }
    }
}

/// Prints booleans as `true`/`false` so flags can be emitted into generated
/// source. Everything else goes through the default formatter.
fn format_value(out: &mut Output, state: &State, value: &Value) -> std::result::Result<(), Error> {
    if value.kind() == ValueKind::Bool {
        let text = if value.is_true() { "true" } else { "false" };
        return out
            .write_str(text)
            .map_err(|e| Error::new(ErrorKind::WriteFailure, "failed to write output").with_source(e));
    }
    minijinja::escape_formatter(out, state, value)
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if the template is malformed or references
    ///   a value missing from `context`
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        Ok(self.env.render_str(template, context)?)
    }
}

/// Renders every string inside `value`, recursing through arrays and objects.
///
/// Non-string scalars are returned as-is.
pub fn render_value(
    engine: &dyn TemplateRenderer,
    value: &serde_json::Value,
    context: &serde_json::Value,
) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::String(s) => Ok(serde_json::Value::String(engine.render(s, context)?)),
        serde_json::Value::Array(arr) => {
            let mut processed = Vec::with_capacity(arr.len());
            for item in arr {
                processed.push(render_value(engine, item, context)?);
            }
            Ok(serde_json::Value::Array(processed))
        }
        serde_json::Value::Object(obj) => {
            let mut processed = serde_json::Map::new();
            for (k, v) in obj {
                processed.insert(k.clone(), render_value(engine, v, context)?);
            }
            Ok(serde_json::Value::Object(processed))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_variable_is_an_error() {
        let engine = MiniJinjaRenderer::new();
        assert!(engine.render("{{ missing }}", &json!({})).is_err());
    }

    #[test]
    fn malformed_expression_is_an_error() {
        let engine = MiniJinjaRenderer::new();
        assert!(engine.render("{{ name ", &json!({"name": "x"})).is_err());
    }

    #[test]
    fn trailing_newline_is_kept() {
        let engine = MiniJinjaRenderer::new();
        assert_eq!(engine.render("{{ name }}\n", &json!({"name": "x"})).unwrap(), "x\n");
    }

    #[test]
    fn booleans_render_lowercase() {
        let engine = MiniJinjaRenderer::new();
        let context = json!({"on": true, "off": false});
        assert_eq!(engine.render("{{ on }} {{ off }}", &context).unwrap(), "true false");
        assert_eq!(engine.render("{{ on and not off }}", &context).unwrap(), "true");
    }

    #[test]
    fn render_value_only_touches_strings() {
        let engine = MiniJinjaRenderer::new();
        let value = json!({"port": 5173, "host": "{{ host }}", "list": ["{{ host }}", true]});
        let rendered = render_value(&engine, &value, &json!({"host": "localhost"})).unwrap();
        assert_eq!(rendered, json!({"port": 5173, "host": "localhost", "list": ["localhost", true]}));
    }
}
