//! Call context supplied by the request pipeline.

use serde::{Deserialize, Serialize};

/// Optional per-call context.
///
/// Everything here is advisory: classification itself is context-free,
/// and the crisis responder falls back to default resources when the
/// context carries nothing usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Declared user locale, e.g. `"es"` or `"fr-CA"`.
    pub locale: Option<String>,
    /// The user's message text, used for language heuristics when no
    /// locale is declared.
    pub message: Option<String>,
}

impl RequestContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declared locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the message text.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let ctx = RequestContext::new()
            .with_locale("es-MX")
            .with_message("hola");
        assert_eq!(ctx.locale.as_deref(), Some("es-MX"));
        assert_eq!(ctx.message.as_deref(), Some("hola"));
    }

    #[test]
    fn default_is_empty() {
        let ctx = RequestContext::default();
        assert!(ctx.locale.is_none());
        assert!(ctx.message.is_none());
    }
}
