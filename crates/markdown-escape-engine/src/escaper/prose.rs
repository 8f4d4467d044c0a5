use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::context::Context;
use crate::dialect::Dialect;

use super::Binding;
use super::cursor::Cursor;

/// Escapes ordinary Markdown prose.
///
/// Works line by line (`\n` only; line endings are never touched). Block
/// markers are only neutralized at the start of a line; inline punctuation
/// is neutralized anywhere. Escaping is not idempotent: running the output
/// through again escapes the backslashes it added.
#[derive(Debug, Clone)]
pub struct ProseEscaper {
    pub(crate) binding: Binding,
}

/// Block markers recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineMarker {
    Heading,
    BlockQuote,
    ListBullet,
    OrderedList,
}

impl LineMarker {
    const ORDER: [LineMarker; 4] = [
        LineMarker::Heading,
        LineMarker::BlockQuote,
        LineMarker::ListBullet,
        LineMarker::OrderedList,
    ];

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            // Leading whitespace is group 1, digits (ordered lists only) group 2,
            // the marker itself is the `marker` group.
            const WS: &str = r"[ \t\x0B\x0C\r]";
            [
                format!(r"^({WS}*)()(?P<marker>#+)"),
                format!(r"^({WS}*)()(?P<marker>>+)"),
                format!(r"^({WS}*)()(?P<marker>[-+*])"),
                format!(r"^({WS}*)([0-9]+)(?P<marker>\.){WS}"),
            ]
            .map(|p| Regex::new(&p).expect("line marker pattern is valid"))
        });
        &patterns[self as usize]
    }
}

/// Which dialect-dependent characters get escaped mid-line.
struct MidLine {
    hash: bool,
    at: bool,
    colon: bool,
    tilde: bool,
}

impl MidLine {
    fn for_dialect(dialect: &Dialect, context: &Context) -> Self {
        let specials = dialect.special_characters(context);
        let has = |c: &str| specials.contains(&c);
        Self {
            // Built-in dialects only escape `#` at line start.
            hash: has("#") && !dialect.is_builtin(),
            at: has("@"),
            colon: has(":"),
            tilde: has("~"),
        }
    }
}

impl ProseEscaper {
    pub fn new(context: Context, dialect: Arc<Dialect>) -> Self {
        Self {
            binding: Binding::new(context, dialect),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape_in(&self.binding.context, text)
    }

    pub fn escape_in(&self, context: &Context, text: &str) -> String {
        let mid_line = MidLine::for_dialect(&self.binding.dialect, context);
        let mut out = String::with_capacity(text.len() + text.len() / 4);

        for (n, line) in text.split('\n').enumerate() {
            if n > 0 {
                out.push('\n');
            }
            escape_line(line, &mid_line, &mut out);
        }

        out
    }
}

fn escape_line(line: &str, mid_line: &MidLine, out: &mut String) {
    let mut cur = Cursor::new(line);

    while let Some(c) = cur.peek() {
        // An existing backslash is doubled and the character after it is
        // copied through untouched.
        if c == '\\' {
            out.push_str("\\\\");
            cur.bump();
            if let Some(next) = cur.bump() {
                out.push(next);
            }
            continue;
        }

        if cur.at_line_start()
            && let Some(consumed) = escape_line_start(cur.rest(), out)
        {
            cur.bump_n(consumed);
            continue;
        }

        match c {
            '*' | '_' | '[' | ']' | '(' | ')' | '`' | '|' | '{' | '}' | '+' => {
                out.push('\\');
                out.push(c);
            }
            '!' if cur.peek_next() == Some('[') => out.push_str("\\!"),
            '#' if mid_line.hash => out.push_str("\\#"),
            '@' if mid_line.at => out.push_str("\\@"),
            ':' if mid_line.colon => out.push_str("\\:"),
            '~' if mid_line.tilde => out.push_str("\\~"),
            _ => out.push(c),
        }
        cur.bump();
    }
}

/// Neutralizes a block marker at the start of `line`, writing the escaped
/// prefix to `out` and returning how many bytes of `line` it covered.
///
/// Only the first marker character gets a backslash (`## x` becomes
/// `\## x`); leading whitespace and ordered-list digits are kept verbatim.
fn escape_line_start(line: &str, out: &mut String) -> Option<usize> {
    LineMarker::ORDER.into_iter().find_map(|marker| {
        let caps = marker.pattern().captures(line)?;
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let digits = caps.get(2).map_or("", |m| m.as_str());
        let m = caps.name("marker")?;

        out.push_str(indent);
        out.push_str(digits);
        out.push('\\');
        out.push_str(m.as_str());
        Some(m.end())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextOptions;
    use crate::dialect::DialectBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn escaper(dialect: Arc<Dialect>) -> ProseEscaper {
        ProseEscaper::new(Context::prose(ContextOptions::new()), dialect)
    }

    fn commonmark(text: &str) -> String {
        escaper(Dialect::commonmark()).escape(text)
    }

    fn gfm(text: &str) -> String {
        escaper(Dialect::gfm()).escape(text)
    }

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("***bold***", r"\*\*\*bold\*\*\*")]
    #[case("*emphasis*", r"\*emphasis\*")]
    #[case("_under_score_", r"\_under\_score\_")]
    #[case("[link](http://x)", r"\[link\]\(http://x\)")]
    #[case("a | b", r"a \| b")]
    #[case("{attr}", r"\{attr\}")]
    #[case("1 + 1", r"1 \+ 1")]
    #[case("`code`", r"\`code\`")]
    #[case("Use the `*` operator", r"Use the \`\*\` operator")]
    fn inline_punctuation(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(commonmark(input), expected);
    }

    #[rstest]
    #[case("# Heading", r"\# Heading")]
    #[case("### Heading", r"\### Heading")]
    #[case("  ## Indented", r"  \## Indented")]
    #[case("> quote", r"\> quote")]
    #[case(">> nested", r"\>> nested")]
    #[case("- item", r"\- item")]
    #[case("+ item", r"\+ item")]
    #[case("* item", r"\* item")]
    #[case("\t- tabbed", "\t\\- tabbed")]
    #[case("---", r"\---")]
    #[case("1. item", r"1\. item")]
    #[case("42. item", r"42\. item")]
    #[case("   3.\tstep", "   3\\.\tstep")]
    fn line_start_markers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(commonmark(input), expected);
    }

    #[rstest]
    #[case("1.item", "1.item")]
    #[case("1.", "1.")]
    #[case("version 1. not a list", "version 1. not a list")]
    #[case("a - b", "a - b")]
    #[case("issue #12", "issue #12")]
    #[case("a > b", "a > b")]
    #[case("-> arrow", r"\-> arrow")]
    fn markers_elsewhere_are_left_alone(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(commonmark(input), expected);
    }

    #[test]
    fn bang_only_before_bracket() {
        assert_eq!(commonmark("Hi!"), "Hi!");
        assert_eq!(commonmark("![alt](src)"), r"\!\[alt\]\(src\)");
        assert_eq!(commonmark("! ["), r"! \[");
    }

    #[test]
    fn backslash_escapes_then_skips_next() {
        assert_eq!(commonmark(r"\*"), r"\\*");
        assert_eq!(commonmark(r"a\b"), r"a\\b");
        assert_eq!(commonmark("trailing\\"), "trailing\\\\");
        assert_eq!(commonmark(r"\# not a heading"), r"\\# not a heading");
        assert_eq!(commonmark(r"\é"), r"\\é");
    }

    #[test]
    fn re_escaping_is_not_idempotent() {
        let once = commonmark("*");
        let twice = commonmark(&once);
        assert_eq!(once, r"\*");
        assert_eq!(twice, r"\\*");
        assert_ne!(once, twice);

        let thrice = commonmark(r"\*");
        assert_eq!(thrice, r"\\*");
    }

    #[test]
    fn lines_are_handled_independently() {
        assert_eq!(
            commonmark("# one\ntwo # three\n- four\n\n5. five"),
            "\\# one\ntwo # three\n\\- four\n\n5\\. five"
        );
    }

    #[test]
    fn line_endings_are_preserved() {
        assert_eq!(commonmark("a\n"), "a\n");
        assert_eq!(commonmark("\n\n"), "\n\n");
        assert_eq!(commonmark("a\r\n# b"), "a\r\n\\# b");
        assert_eq!(commonmark(""), "");
    }

    #[test]
    fn unicode_passes_through() {
        assert_eq!(commonmark("café *naïve* 日本語 🎉"), r"café \*naïve\* 日本語 🎉");
    }

    #[test]
    fn gfm_escapes_extension_characters() {
        assert_eq!(gfm("~~strike~~"), r"\~\~strike\~\~");
        assert_eq!(gfm("@mention"), r"\@mention");
        assert_eq!(gfm("https://example.com"), r"https\://example.com");
        assert_eq!(commonmark("~~strike~~ @mention a:b"), "~~strike~~ @mention a:b");
    }

    #[test]
    fn builtin_dialects_leave_mid_line_hash() {
        assert_eq!(gfm("issue #12"), "issue #12");
    }

    #[test]
    fn custom_dialect_with_hash_escapes_it_everywhere() {
        let custom = Arc::new(
            DialectBuilder::new("custom")
                .mapping("general_content", "#", "\\#")
                .build(),
        );
        assert_eq!(escaper(custom).escape("issue #12"), r"issue \#12");

        let without = Arc::new(DialectBuilder::new("plain").build());
        assert_eq!(escaper(without).escape("issue #12 @x"), "issue #12 @x");
    }

    #[test]
    fn rebinding_a_lookalike_builtin_name_changes_hash_rule() {
        // A custom dialect that reuses a built-in name is treated as built-in.
        let lookalike = Arc::new(
            DialectBuilder::new("gfm")
                .mapping("general_content", "#", "\\#")
                .build(),
        );
        assert_eq!(escaper(lookalike).escape("issue #12"), "issue #12");
    }
}
