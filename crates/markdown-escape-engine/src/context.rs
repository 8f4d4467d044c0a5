use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single context option value.
///
/// Options arrive from callers and from TOML config, so they are either a
/// flag or a piece of text (e.g. `language = "rust"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// Truthiness: `true`, or non-empty text other than `"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Text(s) => !s.is_empty() && s != "0",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

pub type ContextOptions = BTreeMap<String, OptionValue>;

/// Builds a [`ContextOptions`] map from `(key, value)` pairs.
///
/// ```
/// use markdown_escape_engine::{options, OptionValue};
///
/// let opts = options([("use_fences", OptionValue::from(true)), ("language", "rust".into())]);
/// assert_eq!(opts.len(), 2);
/// ```
pub fn options<I, K>(pairs: I) -> ContextOptions
where
    I: IntoIterator<Item = (K, OptionValue)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Well-known option keys read by the built-in escapers.
pub mod keys {
    /// Code block: content is already inside an external fence.
    pub const RAW: &str = "raw";
    /// Code block: content goes inside an existing fenced block.
    pub const WITHIN: &str = "within";
    /// Code block: wrap in a fence instead of indenting.
    pub const USE_FENCES: &str = "use_fences";
    /// Code block: info string written after the opening fence.
    pub const LANGUAGE: &str = "language";
    /// URL: percent-encode every non-ASCII code point.
    pub const ENCODE_UNICODE: &str = "encode_unicode";
}

/// The built-in embedding positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Ordinary Markdown prose.
    Prose,
    /// A link or image destination.
    Url,
    /// The body of an inline code span.
    InlineCode,
    /// A fenced or indented code block.
    CodeBlock,
}

impl ContextKind {
    pub const ALL: [ContextKind; 4] = [
        ContextKind::Prose,
        ContextKind::Url,
        ContextKind::InlineCode,
        ContextKind::CodeBlock,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ContextKind::Prose => "general_content",
            ContextKind::Url => "url",
            ContextKind::InlineCode => "inline_code",
            ContextKind::CodeBlock => "code_block",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    const fn escaping_types(self) -> &'static [&'static str] {
        match self {
            ContextKind::Prose => &[
                "emphasis",
                "strong",
                "link",
                "image",
                "code",
                "heading",
                "list",
                "blockquote",
                "horizontal_rule",
                "html",
            ],
            ContextKind::Url => &["parentheses", "spaces", "angle_brackets"],
            ContextKind::InlineCode => &["backtick"],
            ContextKind::CodeBlock => &["fence", "indentation"],
        }
    }
}

/// Where a piece of text is being embedded, plus caller options.
///
/// Contexts are cheap values: build a fresh one per escape call. The
/// escaping-type set is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    name: String,
    escaping_types: BTreeSet<String>,
    options: ContextOptions,
}

impl Context {
    pub fn new(kind: ContextKind, options: ContextOptions) -> Self {
        Self {
            name: kind.name().to_string(),
            escaping_types: kind.escaping_types().iter().map(|t| t.to_string()).collect(),
            options,
        }
    }

    pub fn prose(options: ContextOptions) -> Self {
        Self::new(ContextKind::Prose, options)
    }

    pub fn url(options: ContextOptions) -> Self {
        Self::new(ContextKind::Url, options)
    }

    pub fn inline_code(options: ContextOptions) -> Self {
        Self::new(ContextKind::InlineCode, options)
    }

    pub fn code_block(options: ContextOptions) -> Self {
        Self::new(ContextKind::CodeBlock, options)
    }

    /// A caller-defined context. A custom name that collides with a
    /// built-in name is looked up exactly like the built-in.
    pub fn custom<I, T>(name: impl Into<String>, escaping_types: I, options: ContextOptions) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            escaping_types: escaping_types.into_iter().map(Into::into).collect(),
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built-in kind this context's name refers to, if any.
    pub fn kind(&self) -> Option<ContextKind> {
        ContextKind::from_name(&self.name)
    }

    /// Exact membership test; no case folding or normalization.
    pub fn requires_escaping(&self, escaping_type: &str) -> bool {
        self.escaping_types.contains(escaping_type)
    }

    pub fn escaping_types(&self) -> impl Iterator<Item = &str> {
        self.escaping_types.iter().map(String::as_str)
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.option(key).is_some_and(OptionValue::is_truthy)
    }

    pub fn text_option(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(OptionValue::as_text)
    }

    /// Same name and escaping types, different options.
    pub fn with_options(&self, options: ContextOptions) -> Self {
        Self {
            name: self.name.clone(),
            escaping_types: self.escaping_types.clone(),
            options,
        }
    }
}
