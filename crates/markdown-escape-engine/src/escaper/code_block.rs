use std::sync::Arc;

use crate::context::{Context, keys};
use crate::dialect::Dialect;

use super::Binding;
use super::fence::Fence;

/// Makes text safe as the body of a code block.
///
/// Safety comes from structure (fence choice or indentation), never from
/// character substitution. Modes, highest priority first: `raw`, `within`,
/// `use_fences`, then indented.
#[derive(Debug, Clone)]
pub struct CodeBlockEscaper {
    pub(crate) binding: Binding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Caller already placed the text inside its own fence.
    Raw,
    /// Body of an existing fenced block: literal by definition. Choosing an
    /// enclosing fence that the body cannot close is the caller's job.
    Within,
    Fenced,
    Indented,
}

impl Mode {
    fn of(context: &Context) -> Self {
        if context.is_enabled(keys::RAW) {
            Mode::Raw
        } else if context.is_enabled(keys::WITHIN) {
            Mode::Within
        } else if context.is_enabled(keys::USE_FENCES) {
            Mode::Fenced
        } else {
            Mode::Indented
        }
    }
}

impl CodeBlockEscaper {
    /// Indentation that turns a line into indented-code content.
    pub const INDENT: &'static str = "    ";

    pub fn new(context: Context, dialect: Arc<Dialect>) -> Self {
        Self {
            binding: Binding::new(context, dialect),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape_in(&self.binding.context, text)
    }

    pub fn escape_in(&self, context: &Context, text: &str) -> String {
        match Mode::of(context) {
            Mode::Raw | Mode::Within => text.to_string(),
            Mode::Fenced => fenced(text, context.text_option(keys::LANGUAGE).unwrap_or("")),
            Mode::Indented => indented(text),
        }
    }
}

fn fenced(text: &str, language: &str) -> String {
    let fence = Fence::for_content(text);
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    format!("{fence}{language}\n{text}{newline}{fence}")
}

fn indented(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{line}", CodeBlockEscaper::INDENT)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
