//! Translation capability seam.
//!
//! The engine never speaks to a translation backend directly; it consumes
//! this trait. Real deployments implement it over their engine of choice,
//! tests and translation-less embeddings use [`EchoTranslator`].

use async_trait::async_trait;

/// Errors from the translation collaborator.
///
/// Policy is propagate-and-abort: a failed translation aborts the calling
/// operation, and no message is stored untranslated as a fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("translation failed: {0}")]
    Failed(String),
    #[error("locale detection failed: {0}")]
    Detection(String),
}

/// Best-effort text translation and locale detection.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Detects the locale tag of a text (e.g. "es-MX").
    async fn detect_locale(&self, text: &str) -> Result<String, TranslateError>;

    /// Renders `text` from `source_locale` into `target_locale`.
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, TranslateError>;
}

/// Pass-through translator: detection returns a fixed locale and translation
/// returns the input unchanged.
#[derive(Clone, Debug)]
pub struct EchoTranslator {
    default_locale: String,
}

impl EchoTranslator {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
        }
    }
}

impl Default for EchoTranslator {
    fn default() -> Self {
        Self::new("en")
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn detect_locale(&self, _text: &str) -> Result<String, TranslateError> {
        Ok(self.default_locale.clone())
    }

    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        _target_locale: &str,
    ) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}
