//! Prompt template system.
//!
//! Templates pair a fixed system prompt with a Handlebars user template
//! rendered against a serializable context. Escaping is disabled: contexts
//! embed pre-serialized JSON fragments that must reach the model verbatim.

pub mod compute_analysis;
pub mod storage_analysis;

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while rendering a prompt template.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Template render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// A named prompt template: system prompt plus user-message template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: &'static str,
    system: &'static str,
    user: &'static str,
}

/// A rendered prompt ready to send to a provider.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    pub fn new(name: &'static str, system: &'static str, user: &'static str) -> Self {
        Self { name, system, user }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render the user template against `context`.
    pub fn render<T: Serialize>(&self, context: &T) -> Result<RenderedPrompt, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        let user = handlebars.render_template(self.user, context)?;
        Ok(RenderedPrompt {
            system: self.system.to_string(),
            user,
        })
    }
}
