use markdown_escape_engine::{ContextOptions, Dialect, DialectBuilder, EscaperFactory, MarkdownEscape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown dialect \"{name}\"")]
    UnknownDialect { name: String },

    #[error("Dialect \"{name}\" is defined more than once")]
    DuplicateDialect { name: String },
}

/// A custom dialect declared in the config file.
///
/// ```toml
/// [[dialects]]
/// name = "slack"
/// extends = "commonmark"
/// features = ["emphasis"]
/// default_characters = ["*", "_"]
/// [dialects.mappings]
/// general_content = [["*", "\\*"], ["_", "\\_"]]
/// ```
///
/// Mapping tables are arrays of `[token, replacement]` pairs so that their
/// order, which decides substitution order, survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_characters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_mappings: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mappings: BTreeMap<String, Vec<(String, String)>>,
}

impl DialectConfig {
    fn build(&self, base: Option<&Dialect>) -> Dialect {
        let builder = match base {
            Some(base) => DialectBuilder::extending(base, &self.name),
            None => DialectBuilder::new(&self.name),
        };
        let builder = builder
            .features(self.features.iter().cloned())
            .default_mappings(self.default_mappings.iter().cloned())
            .default_characters(self.default_characters.iter().cloned());

        self.mappings.iter().fold(builder, |builder, (context, table)| {
            builder.context_mappings(context, table.iter().cloned())
        })
        .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `commonmark`, `gfm`, or the name of a dialect in `dialects`.
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Default options per context name, merged under per-call options.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, ContextOptions>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialects: Vec<DialectConfig>,
}

fn default_dialect() -> String {
    Dialect::COMMONMARK.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            context: BTreeMap::new(),
            dialects: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let config_path = Self::expand_path(config_path).unwrap_or_else(|| config_path.to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-escape");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Builds every custom dialect, in declaration order.
    ///
    /// `extends` may name a built-in dialect or one declared earlier in the
    /// file. Names must be unique and must not shadow a built-in.
    pub fn custom_dialects(&self) -> Result<BTreeMap<String, Arc<Dialect>>, ConfigError> {
        let mut built: BTreeMap<String, Arc<Dialect>> = BTreeMap::new();

        for declared in &self.dialects {
            if built.contains_key(&declared.name) || Dialect::builtin(&declared.name).is_some() {
                return Err(ConfigError::DuplicateDialect {
                    name: declared.name.clone(),
                });
            }

            let base = match &declared.extends {
                Some(name) => Some(lookup(name, &built)?),
                None => None,
            };
            let dialect = declared.build(base.as_deref());
            built.insert(declared.name.clone(), Arc::new(dialect));
        }

        Ok(built)
    }

    /// The dialect named by `dialect`.
    pub fn resolve_dialect(&self) -> Result<Arc<Dialect>, ConfigError> {
        lookup(&self.dialect, &self.custom_dialects()?)
    }

    /// Configured default options for a context name; empty if none.
    pub fn options_for(&self, context_name: &str) -> ContextOptions {
        self.context.get(context_name).cloned().unwrap_or_default()
    }

    /// A facade using the configured dialect with the configured per-context
    /// defaults.
    pub fn build_escape(&self) -> Result<MarkdownEscape, ConfigError> {
        let dialect = self.resolve_dialect()?;
        let escape = MarkdownEscape::new(dialect, Arc::new(EscaperFactory::new()));
        Ok(self
            .context
            .iter()
            .fold(escape, |escape, (name, options)| {
                escape.with_defaults(name.clone(), options.clone())
            }))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

fn lookup(name: &str, custom: &BTreeMap<String, Arc<Dialect>>) -> Result<Arc<Dialect>, ConfigError> {
    Dialect::builtin(name)
        .or_else(|| custom.get(name).cloned())
        .ok_or_else(|| ConfigError::UnknownDialect {
            name: name.to_string(),
        })
}
