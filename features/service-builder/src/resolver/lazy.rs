use std::{cell::OnceCell, fmt::Debug, sync::Arc};

use crate::{
    errors::ResolveError,
    resolver::Resolver,
    types::{Injectable, Resolved},
};

/// Lazily resolved service
///
/// Nothing is resolved until the first access. A successful result is kept,
/// a failed one is not and the next access tries again.
pub struct Lazy {
    resolver: Resolver,
    name: String,
    once: OnceCell<Resolved>,
}

impl Debug for Lazy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Lazy")
            .field(&self.name)
            .field(&self.once.get())
            .finish()
    }
}

impl Lazy {
    pub(crate) fn new(resolver: Resolver, name: impl Into<String>) -> Self {
        Lazy {
            resolver,
            name: name.into(),
            once: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accesses the service, resolving it on first access
    pub fn get(&self) -> Result<&Resolved, ResolveError> {
        if let Some(resolved) = self.once.get() {
            return Ok(resolved);
        }

        let resolved = self.resolver.resolve(&self.name)?;
        Ok(self.once.get_or_init(|| resolved))
    }

    /// True once an access has succeeded
    pub fn is_resolved(&self) -> bool {
        self.once.get().is_some()
    }

    /// Resolves as soon as the value is available
    pub async fn wait_for<T: Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        self.get()?.clone().wait_for().await
    }
}
