use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::context::{Context, ContextKind};
use crate::dialect::Dialect;
use crate::error::EscapeError;
use crate::escaper::{CodeBlockEscaper, Escaper, InlineCodeEscaper, ProseEscaper, UrlEscaper};

/// Builds an escaper bound to a (context, dialect) pair.
pub type EscaperConstructor = Arc<dyn Fn(Context, Arc<Dialect>) -> Escaper + Send + Sync>;

/// Wraps a closure as an [`EscaperConstructor`].
///
/// ```
/// use markdown_escape_engine::{CustomEscaper, EscaperFactory, constructor};
///
/// let factory = EscaperFactory::new();
/// factory.register_default_escaper(
///     "table_cell",
///     constructor(|c, d| CustomEscaper::new(c, d, |_, _, t| t.replace('|', "\\|")).into()),
/// );
/// ```
pub fn constructor<F>(f: F) -> EscaperConstructor
where
    F: Fn(Context, Arc<Dialect>) -> Escaper + Send + Sync + 'static,
{
    Arc::new(f)
}

/// `(context name, dialect name)`.
type PairKey = (String, String);

fn key(context: &Context, dialect: &Dialect) -> PairKey {
    (context.name().to_string(), dialect.name().to_string())
}

/// Resolves and caches escapers per (context name, dialect name).
///
/// The cache only grows. Concurrent first requests for the same pair may
/// both construct an escaper, but only the first one inserted is ever
/// handed out, so repeated lookups return the same `Arc`.
pub struct EscaperFactory {
    escapers: RwLock<HashMap<PairKey, Arc<Escaper>>>,
    overrides: RwLock<HashMap<PairKey, Arc<Escaper>>>,
    constructors: RwLock<HashMap<String, EscaperConstructor>>,
}

impl EscaperFactory {
    /// A factory with the four built-in escapers registered.
    pub fn new() -> Self {
        let factory = Self::empty();
        factory.register_default_escaper(
            ContextKind::Prose.name(),
            constructor(|c, d| ProseEscaper::new(c, d).into()),
        );
        factory.register_default_escaper(
            ContextKind::Url.name(),
            constructor(|c, d| UrlEscaper::new(c, d).into()),
        );
        factory.register_default_escaper(
            ContextKind::InlineCode.name(),
            constructor(|c, d| InlineCodeEscaper::new(c, d).into()),
        );
        factory.register_default_escaper(
            ContextKind::CodeBlock.name(),
            constructor(|c, d| CodeBlockEscaper::new(c, d).into()),
        );
        factory
    }

    /// A factory that knows no contexts at all.
    pub fn empty() -> Self {
        Self {
            escapers: RwLock::new(HashMap::new()),
            overrides: RwLock::new(HashMap::new()),
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the escaper for `(context, dialect)`, building and caching it
    /// on first use.
    ///
    /// # Errors
    /// - [`EscapeError::UnsupportedContext`] if nothing is registered for the
    ///   context name.
    /// - [`EscapeError::UnsupportedDialect`] if the resolved escaper rejects
    ///   `dialect`.
    pub fn create_escaper(
        &self,
        context: &Context,
        dialect: &Arc<Dialect>,
    ) -> Result<Arc<Escaper>, EscapeError> {
        let key = key(context, dialect);

        let overridden = read(&self.overrides).get(&key).cloned();
        if let Some(escaper) = overridden {
            check_dialect(&escaper, context, dialect)?;
            let cached = read(&self.escapers)
                .get(&key)
                .is_some_and(|c| Arc::ptr_eq(c, &escaper));
            if !cached {
                log::debug!("caching escaper override for {key:?}");
                write(&self.escapers).insert(key, Arc::clone(&escaper));
            }
            return Ok(escaper);
        }

        let cached = read(&self.escapers).get(&key).cloned();
        if let Some(escaper) = cached {
            log::trace!("escaper cache hit for {key:?}");
            return Ok(escaper);
        }

        let constructor = read(&self.constructors)
            .get(context.name())
            .cloned()
            .ok_or_else(|| EscapeError::UnsupportedContext {
                context: context.name().to_string(),
            })?;

        let escaper = Arc::new(constructor(context.clone(), Arc::clone(dialect)));
        check_dialect(&escaper, context, dialect)?;

        log::debug!("created escaper for {key:?}");
        Ok(self.install(key, escaper))
    }

    /// Installs `escaper` for the pair without any validation. Overrides win
    /// over default constructors and are never evicted.
    pub fn register_escaper(
        &self,
        context_name: impl Into<String>,
        dialect_name: impl Into<String>,
        escaper: impl Into<Arc<Escaper>>,
    ) {
        let key = (context_name.into(), dialect_name.into());
        log::debug!("registered escaper override for {key:?}");
        write(&self.overrides).insert(key, escaper.into());
    }

    /// True if the pair is cached or overridden, or a default constructor
    /// exists for the context name. Dialect support is not checked.
    pub fn has_escaper(&self, context: &Context, dialect: &Dialect) -> bool {
        let key = key(context, dialect);
        read(&self.overrides).contains_key(&key)
            || read(&self.escapers).contains_key(&key)
            || read(&self.constructors).contains_key(context.name())
    }

    /// Sets the constructor for a context name. Pairs already cached keep
    /// their escaper.
    pub fn register_default_escaper(
        &self,
        context_name: impl Into<String>,
        constructor: EscaperConstructor,
    ) {
        write(&self.constructors).insert(context_name.into(), constructor);
    }

    /// Number of cached (context, dialect) pairs.
    pub fn cached_len(&self) -> usize {
        read(&self.escapers).len()
    }

    /// Insert-if-absent; returns whichever escaper ended up cached.
    fn install(&self, key: PairKey, escaper: Arc<Escaper>) -> Arc<Escaper> {
        Arc::clone(write(&self.escapers).entry(key).or_insert(escaper))
    }
}

impl Default for EscaperFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EscaperFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut contexts: Vec<String> = read(&self.constructors).keys().cloned().collect();
        contexts.sort();
        f.debug_struct("EscaperFactory")
            .field("contexts", &contexts)
            .field("cached", &self.cached_len())
            .field("overrides", &read(&self.overrides).len())
            .finish()
    }
}

fn check_dialect(escaper: &Escaper, context: &Context, dialect: &Dialect) -> Result<(), EscapeError> {
    if escaper.supports_dialect(dialect) {
        Ok(())
    } else {
        Err(EscapeError::UnsupportedDialect {
            dialect: dialect.name().to_string(),
            context: context.name().to_string(),
        })
    }
}

// The maps are only ever inserted into, so a panic mid-insert cannot leave
// them inconsistent; recover from poisoning.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
