use std::collections::{BTreeSet, HashMap};

use super::{Dialect, TokenTable};

/// Builds a [`Dialect`] from data.
///
/// Registering the same token twice keeps its original position and
/// replaces its replacement text.
///
/// ```
/// use markdown_escape_engine::{Context, ContextOptions, Dialect};
///
/// let slack = Dialect::builder("slack")
///     .feature("emphasis")
///     .mapping("general_content", "*", "\\*")
///     .mapping("general_content", "~", "\\~")
///     .build();
///
/// let prose = Context::prose(ContextOptions::new());
/// assert_eq!(slack.special_characters(&prose), vec!["*", "~"]);
/// ```
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    name: String,
    features: BTreeSet<String>,
    character_mappings: HashMap<String, TokenTable>,
    default_characters: Vec<String>,
    default_mappings: TokenTable,
}

impl DialectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: BTreeSet::new(),
            character_mappings: HashMap::new(),
            default_characters: Vec::new(),
            default_mappings: Vec::new(),
        }
    }

    /// Starts from a copy of `base` under a new name.
    pub fn extending(base: &Dialect, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: base.features.clone(),
            character_mappings: base.character_mappings.clone(),
            default_characters: base.default_characters.clone(),
            default_mappings: base.default_mappings.clone(),
        }
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn features<I, T>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Adds one token to a context's table, registering the context if new.
    pub fn mapping(
        mut self,
        context: impl Into<String>,
        token: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        let table = self.character_mappings.entry(context.into()).or_default();
        upsert(table, token.into(), replacement.into());
        self
    }

    /// Registers a context with the given tokens. An empty iterator still
    /// registers the context, which then has no special characters.
    pub fn context_mappings<I>(mut self, context: impl Into<String>, mappings: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let table = self.character_mappings.entry(context.into()).or_default();
        for (token, replacement) in mappings {
            upsert(table, token, replacement);
        }
        self
    }

    /// Adds tokens to both the default list and the default mapping.
    pub fn default_mappings<I>(mut self, mappings: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (token, replacement) in mappings {
            if !self.default_characters.contains(&token) {
                self.default_characters.push(token.clone());
            }
            upsert(&mut self.default_mappings, token, replacement);
        }
        self
    }

    /// Adds tokens to the default list only; they escape through the
    /// default mapping or the backslash fallback.
    pub fn default_characters<I, T>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for token in tokens.into_iter().map(Into::into) {
            if !self.default_characters.contains(&token) {
                self.default_characters.push(token);
            }
        }
        self
    }

    pub fn build(self) -> Dialect {
        Dialect {
            name: self.name,
            features: self.features,
            character_mappings: self.character_mappings,
            default_characters: self.default_characters,
            default_mappings: self.default_mappings,
        }
    }
}

fn upsert(table: &mut TokenTable, token: String, replacement: String) {
    match table.iter_mut().find(|(t, _)| *t == token) {
        Some(entry) => entry.1 = replacement,
        None => table.push((token, replacement)),
    }
}
