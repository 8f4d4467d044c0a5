use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::{Context, ContextKind, ContextOptions, OptionValue, keys};
use crate::dialect::Dialect;
use crate::error::EscapeError;
use crate::factory::EscaperFactory;

/// The usual entry point: one dialect plus a shared [`EscaperFactory`].
///
/// Every `escape_*` method has a `_with` twin taking per-call options.
/// Options set through [`with_defaults`](Self::with_defaults) sit underneath
/// per-call options for the same context name.
#[derive(Debug, Clone)]
pub struct MarkdownEscape {
    dialect: Arc<Dialect>,
    factory: Arc<EscaperFactory>,
    defaults: BTreeMap<String, ContextOptions>,
}

impl MarkdownEscape {
    pub fn new(dialect: Arc<Dialect>, factory: Arc<EscaperFactory>) -> Self {
        Self {
            dialect,
            factory,
            defaults: BTreeMap::new(),
        }
    }

    pub fn commonmark() -> Self {
        Self::new(Dialect::commonmark(), Arc::new(EscaperFactory::new()))
    }

    pub fn gfm() -> Self {
        Self::new(Dialect::gfm(), Arc::new(EscaperFactory::new()))
    }

    /// Same factory and defaults, different dialect.
    pub fn with_dialect(&self, dialect: Arc<Dialect>) -> Self {
        Self {
            dialect,
            factory: Arc::clone(&self.factory),
            defaults: self.defaults.clone(),
        }
    }

    /// Sets default options for a context name, replacing earlier ones.
    pub fn with_defaults(mut self, context_name: impl Into<String>, options: ContextOptions) -> Self {
        self.defaults.insert(context_name.into(), options);
        self
    }

    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    pub fn factory(&self) -> &Arc<EscaperFactory> {
        &self.factory
    }

    pub fn defaults(&self, context_name: &str) -> Option<&ContextOptions> {
        self.defaults.get(context_name)
    }

    pub fn escape_content(&self, content: &str) -> Result<String, EscapeError> {
        self.escape_content_with(content, ContextOptions::new())
    }

    pub fn escape_content_with(
        &self,
        content: &str,
        options: ContextOptions,
    ) -> Result<String, EscapeError> {
        self.escape_builtin(ContextKind::Prose, content, options)
    }

    pub fn escape_url(&self, url: &str) -> Result<String, EscapeError> {
        self.escape_url_with(url, ContextOptions::new())
    }

    pub fn escape_url_with(&self, url: &str, options: ContextOptions) -> Result<String, EscapeError> {
        self.escape_builtin(ContextKind::Url, url, options)
    }

    /// Returns the complete code span, delimiters included.
    pub fn escape_inline_code(&self, code: &str) -> Result<String, EscapeError> {
        self.escape_inline_code_with(code, ContextOptions::new())
    }

    pub fn escape_inline_code_with(
        &self,
        code: &str,
        options: ContextOptions,
    ) -> Result<String, EscapeError> {
        self.escape_builtin(ContextKind::InlineCode, code, options)
    }

    /// Indented by default; pass `use_fences` (and optionally `language`)
    /// for a fenced block.
    pub fn escape_code_block(&self, code: &str) -> Result<String, EscapeError> {
        self.escape_code_block_with(code, ContextOptions::new())
    }

    pub fn escape_code_block_with(
        &self,
        code: &str,
        options: ContextOptions,
    ) -> Result<String, EscapeError> {
        self.escape_builtin(ContextKind::CodeBlock, code, options)
    }

    /// Content for the body of a fenced block the caller already opened.
    pub fn escape_within_code_block(&self, code: &str) -> Result<String, EscapeError> {
        let mut options = ContextOptions::new();
        options.insert(keys::WITHIN.to_string(), OptionValue::Bool(true));
        self.escape_builtin(ContextKind::CodeBlock, code, options)
    }

    /// Escapes for an arbitrary (possibly custom) context.
    ///
    /// # Errors
    /// [`EscapeError::UnsupportedContext`] when the factory knows nothing
    /// about `context`, [`EscapeError::UnsupportedDialect`] when the
    /// resolved escaper rejects this facade's dialect.
    pub fn escape(&self, content: &str, context: &Context) -> Result<String, EscapeError> {
        let escaper = self.factory.create_escaper(context, &self.dialect)?;
        match self.defaults.get(context.name()) {
            Some(defaults) => {
                let mut merged = defaults.clone();
                merged.extend(context.options().clone());
                Ok(escaper.escape_in(&context.with_options(merged), content))
            }
            None => Ok(escaper.escape_in(context, content)),
        }
    }

    fn escape_builtin(
        &self,
        kind: ContextKind,
        content: &str,
        options: ContextOptions,
    ) -> Result<String, EscapeError> {
        self.escape(content, &Context::new(kind, options))
    }
}

impl Default for MarkdownEscape {
    fn default() -> Self {
        Self::commonmark()
    }
}
