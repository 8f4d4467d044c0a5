//! # Markdown Escaping Engine
//!
//! Escapes arbitrary text so it can be embedded verbatim in a Markdown
//! document without being read back as Markdown syntax.
//!
//! ## Pieces
//!
//! - **`context`**: `Context` - *where* the text is embedded (prose, URL,
//!   inline code, code block, or a custom name) plus per-call options
//! - **`dialect`**: `Dialect` - *which* Markdown flavor; owns the
//!   special-character tables per context
//! - **`escaper`**: `Escaper` - one algorithm per context, bound to a
//!   (context, dialect) pair
//! - **`factory`**: `EscaperFactory` - resolves and caches escapers
//! - **`facade`**: `MarkdownEscape` - one dialect + one factory, the usual
//!   entry point
//!
//! ```
//! use markdown_escape_engine::MarkdownEscape;
//!
//! let md = MarkdownEscape::commonmark();
//! assert_eq!(md.escape_content("1. *not* a list").unwrap(), r"1\. \*not\* a list");
//! assert_eq!(md.escape_inline_code("a`b").unwrap(), "``a`b``");
//! ```

pub mod context;
pub mod dialect;
pub mod error;
pub mod escaper;
pub mod facade;
pub mod factory;

// Re-export key types for easier usage
pub use context::{Context, ContextKind, ContextOptions, OptionValue, options};
pub use dialect::{Dialect, DialectBuilder};
pub use error::EscapeError;
pub use escaper::{
    CodeBlockEscaper, CustomEscaper, Escaper, InlineCodeEscaper, ProseEscaper, UrlEscaper,
    substitute,
};
pub use facade::MarkdownEscape;
pub use factory::{EscaperConstructor, EscaperFactory, constructor};
