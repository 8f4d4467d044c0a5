//! # Dialects
//!
//! A dialect is data, not behavior: a name, a feature set, and per-context
//! token tables. The two built-ins (`commonmark` and `gfm`) are built once
//! and shared; custom dialects come from [`DialectBuilder`].
//!
//! ## Lookup rules
//!
//! - `special_characters(ctx)`: the tokens registered for `ctx.name()`, in
//!   registration order. A context the dialect has never heard of gets the
//!   dialect-wide default list. A context registered with an empty table
//!   (code blocks) gets nothing.
//! - `escape_character(token, ctx)`: per-context replacement, else the
//!   dialect-wide default replacement, else `\` + token.
//!
//! Nothing here looks at surrounding text; position-sensitive rules belong
//! to the escapers.

mod builder;
mod builtin;

pub use builder::DialectBuilder;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use crate::context::Context;

/// An ordered token table: `(token, replacement)` in registration order.
pub(crate) type TokenTable = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    name: String,
    features: BTreeSet<String>,
    character_mappings: HashMap<String, TokenTable>,
    default_characters: Vec<String>,
    default_mappings: TokenTable,
}

impl Dialect {
    /// Name of the strict built-in dialect.
    pub const COMMONMARK: &'static str = "commonmark";
    /// Name of the extended built-in dialect.
    pub const GFM: &'static str = "gfm";

    /// The shared strict (CommonMark) dialect.
    pub fn commonmark() -> Arc<Dialect> {
        static COMMONMARK: OnceLock<Arc<Dialect>> = OnceLock::new();
        Arc::clone(COMMONMARK.get_or_init(|| Arc::new(builtin::commonmark())))
    }

    /// The shared extended (GitHub Flavored Markdown) dialect.
    pub fn gfm() -> Arc<Dialect> {
        static GFM: OnceLock<Arc<Dialect>> = OnceLock::new();
        Arc::clone(GFM.get_or_init(|| Arc::new(builtin::gfm())))
    }

    /// Looks up a built-in dialect by name.
    pub fn builtin(name: &str) -> Option<Arc<Dialect>> {
        match name {
            Self::COMMONMARK => Some(Self::commonmark()),
            Self::GFM => Some(Self::gfm()),
            _ => None,
        }
    }

    pub fn builder(name: impl Into<String>) -> DialectBuilder {
        DialectBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this dialect carries one of the built-in names.
    pub fn is_builtin(&self) -> bool {
        matches!(self.name.as_str(), Self::COMMONMARK | Self::GFM)
    }

    pub fn special_characters(&self, context: &Context) -> Vec<&str> {
        match self.character_mappings.get(context.name()) {
            Some(table) => table.iter().map(|(token, _)| token.as_str()).collect(),
            None => self.default_characters.iter().map(String::as_str).collect(),
        }
    }

    /// Whether `token` is in this dialect's special-character set for `context`.
    pub fn is_special(&self, token: &str, context: &Context) -> bool {
        self.special_characters(context).contains(&token)
    }

    pub fn escape_character(&self, token: &str, context: &Context) -> String {
        if let Some(replacement) = self
            .character_mappings
            .get(context.name())
            .and_then(|table| lookup(table, token))
        {
            return replacement.to_string();
        }

        if let Some(replacement) = lookup(&self.default_mappings, token) {
            return replacement.to_string();
        }

        format!("\\{token}")
    }

    pub fn supports_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }
}

fn lookup<'t>(table: &'t TokenTable, token: &str) -> Option<&'t str> {
    table
        .iter()
        .find(|(t, _)| t == token)
        .map(|(_, replacement)| replacement.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextKind, ContextOptions};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ctx(kind: ContextKind) -> Context {
        Context::new(kind, ContextOptions::new())
    }

    fn unknown() -> Context {
        Context::custom("unknown_context", Vec::<String>::new(), ContextOptions::new())
    }

    #[test]
    fn builtins_are_shared_singletons() {
        assert!(Arc::ptr_eq(&Dialect::commonmark(), &Dialect::commonmark()));
        assert!(Arc::ptr_eq(&Dialect::gfm(), &Dialect::gfm()));
        assert_eq!(Dialect::commonmark().name(), "commonmark");
        assert_eq!(Dialect::gfm().name(), "gfm");
        assert!(Dialect::builtin("gfm").is_some());
        assert!(Dialect::builtin("markdown-it").is_none());
    }

    #[test]
    fn commonmark_prose_characters_in_order() {
        let d = Dialect::commonmark();
        assert_eq!(
            d.special_characters(&ctx(ContextKind::Prose)),
            vec!["\\", "*", "_", "[", "]", "(", ")", "#", "+", "|", "{", "}", ">", "`"]
        );
    }

    #[test]
    fn position_sensitive_characters_are_not_in_tables() {
        let d = Dialect::commonmark();
        let chars = d.special_characters(&ctx(ContextKind::Prose));
        for c in ["-", ".", "!", "~", "@", ":"] {
            assert!(!chars.contains(&c), "{c} should not be a commonmark prose token");
        }
    }

    #[rstest]
    #[case(" ", "%20")]
    #[case("(", "%28")]
    #[case(")", "%29")]
    #[case("<", "%3C")]
    #[case(">", "%3E")]
    #[case("\"", "%22")]
    #[case("'", "%27")]
    #[case("\\", "%5C")]
    fn commonmark_url_mappings(#[case] token: &str, #[case] expected: &str) {
        let d = Dialect::commonmark();
        assert_eq!(d.escape_character(token, &ctx(ContextKind::Url)), expected);
    }

    #[test]
    fn code_block_has_no_tokens() {
        assert!(Dialect::commonmark()
            .special_characters(&ctx(ContextKind::CodeBlock))
            .is_empty());
        assert!(Dialect::gfm()
            .special_characters(&ctx(ContextKind::CodeBlock))
            .is_empty());
    }

    #[test]
    fn inline_code_escapes_backtick() {
        let d = Dialect::commonmark();
        let c = ctx(ContextKind::InlineCode);
        assert_eq!(d.special_characters(&c), vec!["`"]);
        assert_eq!(d.escape_character("`", &c), "\\`");
    }

    #[test]
    fn gfm_extends_prose_and_url() {
        let d = Dialect::gfm();
        let prose = d.special_characters(&ctx(ContextKind::Prose));
        for c in ["*", "_", "[", "]", "#", "`", "~", "@", ":"] {
            assert!(prose.contains(&c), "gfm prose should contain {c}");
        }
        assert_eq!(d.escape_character("~", &ctx(ContextKind::Prose)), "\\~");
        assert_eq!(d.escape_character("[", &ctx(ContextKind::Url)), "%5B");
        assert_eq!(d.escape_character("]", &ctx(ContextKind::Url)), "%5D");
        assert!(!Dialect::commonmark().is_special("[", &ctx(ContextKind::Url)));
    }

    #[test]
    fn unknown_context_uses_defaults() {
        let cm = Dialect::commonmark();
        assert_eq!(
            cm.special_characters(&unknown()),
            cm.special_characters(&ctx(ContextKind::Prose))
        );
        assert_eq!(cm.escape_character("*", &unknown()), "\\*");

        let gfm = Dialect::gfm();
        let defaults = gfm.special_characters(&unknown());
        assert!(defaults.contains(&"@"));
        assert_eq!(gfm.escape_character(":", &unknown()), "\\:");
    }

    #[test]
    fn fallback_prefixes_backslash() {
        let d = Dialect::commonmark();
        assert_eq!(d.escape_character("%", &ctx(ContextKind::Url)), "\\%");
        assert_eq!(d.escape_character("=>", &unknown()), "\\=>");
    }

    #[rstest]
    fn every_token_is_changed_by_its_escape(
        #[values(Dialect::commonmark(), Dialect::gfm())] dialect: Arc<Dialect>,
        #[values(
            ContextKind::Prose,
            ContextKind::Url,
            ContextKind::InlineCode,
            ContextKind::CodeBlock
        )]
        kind: ContextKind,
    ) {
        let c = ctx(kind);
        for token in dialect.special_characters(&c) {
            assert_ne!(dialect.escape_character(token, &c), token);
        }
    }

    #[test]
    fn features() {
        let cm = Dialect::commonmark();
        assert!(cm.supports_feature("emphasis"));
        assert!(cm.supports_feature("tables"));
        assert!(!cm.supports_feature("mentions"));
        assert!(!cm.supports_feature("Emphasis"));

        let gfm = Dialect::gfm();
        for f in ["task_lists", "mentions", "emoji", "autolinks", "strikethrough", "footnotes"] {
            assert!(gfm.supports_feature(f), "gfm should support {f}");
        }
        assert!(!gfm.supports_feature("non_existent_feature"));
    }

    #[test]
    fn is_builtin_checks_name() {
        assert!(Dialect::commonmark().is_builtin());
        assert!(Dialect::gfm().is_builtin());
        assert!(!Dialect::builder("custom").build().is_builtin());
    }
}
