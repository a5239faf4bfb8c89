use std::{
    collections::{BTreeSet, HashMap},
    fmt::Debug,
    future::Future,
    sync::Arc,
};

use crate::{
    dependency_graph::DependencyGraphErrors,
    errors::ResolveError,
    factories::ProviderSpec,
    registry::Registry,
    resolver::{Lazy, Resolver},
    types::{DynError, Injectable, Resolved},
};

//////////////////////////////////////////////////////////////////////
///
/// A builder is an immutable snapshot of supplied values over a registry.
/// 1. Setters supply one more name and return a new builder
/// 2. Getters resolve registered services within this snapshot

#[derive(Clone)]
pub struct Builder {
    resolver: Resolver,
}

impl Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Builder");
        for name in self.free_names() {
            map.field(&name, &"free");
        }
        for name in self.service_names() {
            map.field(&name, &"service");
        }
        map.finish()
    }
}

impl Builder {
    pub fn new(registry: Arc<Registry>, supplied: HashMap<String, Resolved>) -> Self {
        Builder {
            resolver: Resolver::new(registry, supplied),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.resolver.registry()
    }

    /// The resolver backing this snapshot
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Returns a new builder with `name` supplied, `self` is left as is
    pub fn set<T: Injectable>(&self, name: impl Into<String>, value: T) -> Builder {
        self.set_resolved(name, Resolved::ready(value))
    }

    /// Returns a new builder with `name` supplied by a future
    pub fn set_future<F, T, E>(&self, name: impl Into<String>, future: F) -> Builder
    where
        F: Future<Output = Result<T, E>> + 'static,
        T: Injectable,
        E: Into<DynError>,
    {
        self.set_resolved(name, Resolved::pending(future))
    }

    pub fn set_resolved(&self, name: impl Into<String>, value: Resolved) -> Builder {
        let name = name.into();
        tracing::debug!("Deriving builder with {name} supplied");

        let mut supplied = self.resolver.supplied().clone();
        supplied.insert(name, value);
        Builder::new(self.registry().clone(), supplied)
    }

    /// Resolves a name within this snapshot
    ///
    /// A supplied value overrides a registered service of the same name.
    pub fn get(&self, name: &str) -> Result<Resolved, ResolveError> {
        self.resolver.resolve(name)
    }

    /// Lazy accessor for a name, nothing is resolved until it is accessed
    pub fn service(&self, name: impl Into<String>) -> Lazy {
        Lazy::new(self.resolver.clone(), name)
    }

    /// Resolves a one-off provider against this snapshot without registering it
    pub fn resolve_adhoc(&self, spec: impl Into<ProviderSpec>) -> Result<Resolved, ResolveError> {
        self.resolver.resolve_adhoc(spec)
    }

    /// Dependency names that are not supplied yet
    pub fn free_names(&self) -> BTreeSet<String> {
        self.resolver.free_names()
    }

    pub fn service_names(&self) -> Vec<String> {
        self.registry().service_names().map(String::from).collect()
    }

    /// True when every dependency name is supplied
    pub fn is_complete(&self) -> bool {
        self.free_names().is_empty()
    }

    /// Derived setter names, one per free name
    pub fn setters(&self) -> Vec<String> {
        let naming = self.registry().naming();
        self.free_names()
            .iter()
            .map(|name| naming.setter_name(name))
            .collect()
    }

    /// Derived getter names, one per registered service
    pub fn getters(&self) -> Vec<String> {
        let naming = self.registry().naming();
        self.registry()
            .service_names()
            .map(|name| naming.getter_name(name))
            .collect()
    }

    /// Setters, getters and the bare service names
    pub fn entry_points(&self) -> BTreeSet<String> {
        let mut entry_points: BTreeSet<String> = self.setters().into_iter().collect();
        entry_points.extend(self.getters());
        entry_points.extend(self.service_names());
        entry_points
    }

    /// Calls a setter by its derived name, `None` if there is no such setter
    pub fn call_setter<T: Injectable>(&self, method: &str, value: T) -> Option<Builder> {
        let naming = self.registry().naming();
        let name = self
            .free_names()
            .into_iter()
            .find(|name| naming.setter_name(name) == method)?;

        Some(self.set(name, value))
    }

    /// Calls a getter by its derived name, `None` if there is no such getter
    pub fn call_getter(&self, method: &str) -> Option<Result<Resolved, ResolveError>> {
        let naming = self.registry().naming();
        let name = self
            .registry()
            .service_names()
            .find(|name| naming.getter_name(name) == method)?;

        Some(self.get(name))
    }

    /// Checks the graph for cycles and for names that can't be resolved
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        self.registry()
            .graph()
            .check(|name| self.resolver.is_supplied(name))
    }
}
