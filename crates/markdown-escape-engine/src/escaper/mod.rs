//! # Escapers
//!
//! One algorithm per context, each bound to the (context, dialect) pair it
//! was built for.
//!
//! ## Variants
//!
//! - **`Prose`**: line-by-line cursor scan with start-of-line marker rules
//! - **`Url`**: structural re-encoding of valid URLs, token substitution otherwise
//! - **`InlineCode`**: delimiter-length selection, no substitution
//! - **`CodeBlock`**: raw / within / fenced / indented
//! - **`Custom`**: a caller-supplied function, the extension point used with
//!   [`EscaperFactory::register_escaper`](crate::EscaperFactory::register_escaper)
//!
//! ## Binding
//!
//! An escaper refuses dialects other than the one it was built with
//! (`supports_dialect` compares names). `escape` uses the bound context;
//! `escape_in` takes the options of another context with the same name, so a
//! cached escaper can serve calls that differ only in options.

mod code_block;
mod cursor;
mod custom;
mod fence;
mod inline_code;
mod prose;
mod query;
mod url;

pub use code_block::CodeBlockEscaper;
pub use custom::{CustomEscaper, DialectPolicy, EscapeFn};
pub use fence::{Fence, FenceKind};
pub use inline_code::InlineCodeEscaper;
pub use prose::ProseEscaper;
pub use url::UrlEscaper;

use std::sync::Arc;

use crate::context::Context;
use crate::dialect::Dialect;

/// The (context, dialect) pair an escaper is permanently bound to.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) context: Context,
    pub(crate) dialect: Arc<Dialect>,
}

impl Binding {
    pub(crate) fn new(context: Context, dialect: Arc<Dialect>) -> Self {
        Self { context, dialect }
    }

    pub(crate) fn supports_dialect(&self, dialect: &Dialect) -> bool {
        self.dialect.name() == dialect.name()
    }
}

#[derive(Debug, Clone)]
pub enum Escaper {
    Prose(ProseEscaper),
    Url(UrlEscaper),
    InlineCode(InlineCodeEscaper),
    CodeBlock(CodeBlockEscaper),
    Custom(CustomEscaper),
}

impl Escaper {
    /// Escapes `text` for the bound context.
    pub fn escape(&self, text: &str) -> String {
        self.escape_in(self.context(), text)
    }

    /// Escapes `text` using the options of `context` and the bound dialect.
    pub fn escape_in(&self, context: &Context, text: &str) -> String {
        match self {
            Escaper::Prose(e) => e.escape_in(context, text),
            Escaper::Url(e) => e.escape_in(context, text),
            Escaper::InlineCode(e) => e.escape_in(context, text),
            Escaper::CodeBlock(e) => e.escape_in(context, text),
            Escaper::Custom(e) => e.escape_in(context, text),
        }
    }

    pub fn context(&self) -> &Context {
        &self.binding().context
    }

    pub fn dialect(&self) -> &Arc<Dialect> {
        &self.binding().dialect
    }

    pub fn supports_dialect(&self, dialect: &Dialect) -> bool {
        match self {
            Escaper::Custom(e) => e.supports_dialect(dialect),
            _ => self.binding().supports_dialect(dialect),
        }
    }

    fn binding(&self) -> &Binding {
        match self {
            Escaper::Prose(e) => &e.binding,
            Escaper::Url(e) => &e.binding,
            Escaper::InlineCode(e) => &e.binding,
            Escaper::CodeBlock(e) => &e.binding,
            Escaper::Custom(e) => &e.binding,
        }
    }
}

impl From<ProseEscaper> for Escaper {
    fn from(e: ProseEscaper) -> Self {
        Escaper::Prose(e)
    }
}

impl From<UrlEscaper> for Escaper {
    fn from(e: UrlEscaper) -> Self {
        Escaper::Url(e)
    }
}

impl From<InlineCodeEscaper> for Escaper {
    fn from(e: InlineCodeEscaper) -> Self {
        Escaper::InlineCode(e)
    }
}

impl From<CodeBlockEscaper> for Escaper {
    fn from(e: CodeBlockEscaper) -> Self {
        Escaper::CodeBlock(e)
    }
}

impl From<CustomEscaper> for Escaper {
    fn from(e: CustomEscaper) -> Self {
        Escaper::Custom(e)
    }
}

/// The default token-substitution algorithm.
///
/// For each special character of `context` in dialect order, replaces every
/// occurrence in the whole string with its escape. Passes run one after
/// another over the previous pass's output, so a later token does match
/// text produced by an earlier replacement.
pub fn substitute(dialect: &Dialect, context: &Context, text: &str) -> String {
    let mut out = text.to_string();
    for token in dialect.special_characters(context) {
        if token.is_empty() || !out.contains(token) {
            continue;
        }
        let replacement = dialect.escape_character(token, context);
        out = out.replace(token, &replacement);
    }
    out
}
