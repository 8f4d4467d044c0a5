use crate::context::ContextKind;

use super::{Dialect, DialectBuilder};

// `-`, `.` and `!` are deliberately absent: they only matter at line start
// or before `[`, which the prose escaper decides.
const PROSE: &[(&str, &str)] = &[
    ("\\", "\\\\"),
    ("*", "\\*"),
    ("_", "\\_"),
    ("[", "\\["),
    ("]", "\\]"),
    ("(", "\\("),
    (")", "\\)"),
    ("#", "\\#"),
    ("+", "\\+"),
    ("|", "\\|"),
    ("{", "\\{"),
    ("}", "\\}"),
    (">", "\\>"),
    ("`", "\\`"),
];

/// Strikethrough, mentions, and autolink breaking.
const GFM_PROSE: &[(&str, &str)] = &[("~", "\\~"), ("@", "\\@"), (":", "\\:")];

const URL: &[(&str, &str)] = &[
    (" ", "%20"),
    ("(", "%28"),
    (")", "%29"),
    ("<", "%3C"),
    (">", "%3E"),
    ("\"", "%22"),
    ("'", "%27"),
    ("\\", "%5C"),
];

/// Footnote and reference-link collisions.
const GFM_URL: &[(&str, &str)] = &[("[", "%5B"), ("]", "%5D")];

const INLINE_CODE: &[(&str, &str)] = &[("`", "\\`")];

const FEATURES: &[&str] = &[
    "emphasis",
    "strong_emphasis",
    "strikethrough",
    "links",
    "images",
    "code_blocks",
    "inline_code",
    "lists",
    "blockquotes",
    "headings",
    "horizontal_rules",
    "html_blocks",
    "tables",
];

const GFM_FEATURES: &[&str] = &["task_lists", "mentions", "emoji", "autolinks", "footnotes"];

fn owned(table: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
    table.iter().map(|(t, r)| (t.to_string(), r.to_string()))
}

pub(super) fn commonmark() -> Dialect {
    DialectBuilder::new(Dialect::COMMONMARK)
        .features(FEATURES.iter().copied())
        .context_mappings(ContextKind::Prose.name(), owned(PROSE))
        .context_mappings(ContextKind::Url.name(), owned(URL))
        .context_mappings(ContextKind::InlineCode.name(), owned(INLINE_CODE))
        .context_mappings(ContextKind::CodeBlock.name(), std::iter::empty::<(String, String)>())
        .default_mappings(owned(PROSE))
        .build()
}

pub(super) fn gfm() -> Dialect {
    let prose = || owned(PROSE).chain(owned(GFM_PROSE));

    DialectBuilder::new(Dialect::GFM)
        .features(FEATURES.iter().chain(GFM_FEATURES).copied())
        .context_mappings(ContextKind::Prose.name(), prose())
        .context_mappings(ContextKind::Url.name(), owned(URL).chain(owned(GFM_URL)))
        .context_mappings(ContextKind::InlineCode.name(), owned(INLINE_CODE))
        .context_mappings(ContextKind::CodeBlock.name(), std::iter::empty::<(String, String)>())
        .default_mappings(prose())
        .build()
}
