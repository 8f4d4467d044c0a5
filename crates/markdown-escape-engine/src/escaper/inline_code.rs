use std::sync::Arc;

use crate::context::Context;
use crate::dialect::Dialect;

use super::Binding;
use super::fence::{Fence, longest_run};

/// Wraps text in a code span whose delimiter is longer than any backtick
/// run inside it. No character is altered; the dialect table is not used.
#[derive(Debug, Clone)]
pub struct InlineCodeEscaper {
    pub(crate) binding: Binding,
}

impl InlineCodeEscaper {
    pub fn new(context: Context, dialect: Arc<Dialect>) -> Self {
        Self {
            binding: Binding::new(context, dialect),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape_in(&self.binding.context, text)
    }

    pub fn escape_in(&self, _context: &Context, text: &str) -> String {
        let delimiter = Fence::TICK
            .to_string()
            .repeat(longest_run(text, Fence::TICK) + 1);
        // A leading or trailing backtick would otherwise merge with the delimiter.
        let pad = if text.starts_with(Fence::TICK) || text.ends_with(Fence::TICK) {
            " "
        } else {
            ""
        };

        format!("{delimiter}{pad}{text}{pad}{delimiter}")
    }
}
