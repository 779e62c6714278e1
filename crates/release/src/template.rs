//! Seam for the external templating engine.
//!
//! Release titles, target commitishes and service URLs arrive as templates.
//! Rendering them is the caller's concern; the publisher only asks a
//! [`TemplateRenderer`] for the final string.

use crate::error::Result;

/// Resolves a configuration template into its final string.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `template`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Template`] when the template is invalid.
    fn render(&self, template: &str) -> Result<String>;
}

/// Renderer that returns every template unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl TemplateRenderer for Verbatim {
    fn render(&self, template: &str) -> Result<String> {
        Ok(template.to_string())
    }
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn render(&self, template: &str) -> Result<String> {
        self(template)
    }
}
