use std::{fmt::Debug, sync::Arc};

use crate::{
    errors::ResolveError,
    resolver::{Resolver, WeakResolver},
    types::{downcast, Injectable, Instance},
};

/// The resolved dependencies handed to a provider, in declared order
pub struct Dependencies {
    service: String,
    values: Vec<(String, Instance)>,
    resolver: WeakResolver,
}

impl Dependencies {
    pub(crate) fn new(
        service: String,
        values: Vec<(String, Instance)>,
        resolver: WeakResolver,
    ) -> Self {
        Dependencies {
            service,
            values,
            resolver,
        }
    }

    /// Name of the service being provided, `$` for ad-hoc providers
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Gets a dependency by name
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>, ResolveError> {
        let instance = self
            .instance(name)
            .ok_or_else(|| ResolveError::NotADependency {
                name: name.to_string(),
            })?;

        downcast(instance)
    }

    /// Gets a dependency by its position in the declared list
    pub fn at<T: Injectable>(&self, index: usize) -> Result<Arc<T>, ResolveError> {
        let (_, instance) = self
            .values
            .get(index)
            .ok_or_else(|| ResolveError::NotADependency {
                name: format!("#{index}"),
            })?;

        downcast(instance)
    }

    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.values
            .iter()
            .find(|(dependency, _)| dependency == name)
            .map(|(_, instance)| instance)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Handle for resolving further providers against the same context
    ///
    /// Once the context is dropped, a detached one over the same registry and
    /// supplied values is returned. A pending value holding on to the handle
    /// keeps the context alive until it settles.
    pub fn resolver(&self) -> Resolver {
        self.resolver.upgrade()
    }
}

impl Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, instance) in &self.values {
            map.entry(name, &instance.type_name);
        }
        map.finish()
    }
}
