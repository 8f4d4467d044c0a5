use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::dialect::Dialect;

use super::{Binding, substitute};

/// Caller-supplied escaping function: `(bound dialect, call context, text)`.
pub type EscapeFn = dyn Fn(&Dialect, &Context, &str) -> String + Send + Sync;

/// Caller-supplied dialect compatibility check.
pub type DialectPolicy = dyn Fn(&Dialect) -> bool + Send + Sync;

/// An escaper whose algorithm is a closure.
///
/// Without a policy it supports exactly the dialect it was built with, like
/// the built-in escapers.
#[derive(Clone)]
pub struct CustomEscaper {
    pub(crate) binding: Binding,
    escape_fn: Arc<EscapeFn>,
    policy: Option<Arc<DialectPolicy>>,
}

impl CustomEscaper {
    pub fn new<F>(context: Context, dialect: Arc<Dialect>, escape_fn: F) -> Self
    where
        F: Fn(&Dialect, &Context, &str) -> String + Send + Sync + 'static,
    {
        Self {
            binding: Binding::new(context, dialect),
            escape_fn: Arc::new(escape_fn),
            policy: None,
        }
    }

    /// An escaper running the plain token-substitution algorithm, for
    /// contexts that need nothing position-sensitive.
    pub fn substitution(context: Context, dialect: Arc<Dialect>) -> Self {
        Self::new(context, dialect, substitute)
    }

    /// Replaces the name-equality dialect check with `policy`.
    pub fn with_dialect_policy<P>(mut self, policy: P) -> Self
    where
        P: Fn(&Dialect) -> bool + Send + Sync + 'static,
    {
        self.policy = Some(Arc::new(policy));
        self
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape_in(&self.binding.context, text)
    }

    pub fn escape_in(&self, context: &Context, text: &str) -> String {
        (self.escape_fn)(&self.binding.dialect, context, text)
    }

    pub fn supports_dialect(&self, dialect: &Dialect) -> bool {
        match &self.policy {
            Some(policy) => policy(dialect),
            None => self.binding.supports_dialect(dialect),
        }
    }
}

impl fmt::Debug for CustomEscaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEscaper")
            .field("context", &self.binding.context.name())
            .field("dialect", &self.binding.dialect.name())
            .field("has_policy", &self.policy.is_some())
            .finish()
    }
}
