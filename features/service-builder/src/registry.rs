use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

use crate::{
    builder::Builder,
    config::Naming,
    dependency_graph::DependencyGraph,
    errors::RegisterError,
    factories::{Provider, ProviderSpec},
    resolver::Resolver,
    types::Resolved,
};

/// Name of the resolver handle, can't be registered as a service
pub const RESERVED_NAME: &str = "$";

/// Derives dependency names for providers registered without an explicit list
pub trait IntrospectNames: Send + Sync {
    /// Returns the ordered dependency names of `provider`, or `None` if unknown
    fn names_of(&self, provider: &Provider) -> Option<Vec<String>>;
}

/// A named service: its dependency names and its provider
#[derive(Debug)]
pub struct ServiceDefinition {
    name: String,
    dependencies: Vec<String>,
    provider: Provider,
}

impl ServiceDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}

/// Holds all service definitions
///
/// Cloning is cheap, definitions are shared between clones.
#[derive(Clone, Default)]
pub struct Registry {
    definitions: BTreeMap<String, Arc<ServiceDefinition>>,
    introspector: Option<Arc<dyn IntrospectNames>>,
    naming: Naming,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for definition in self.definitions.values() {
            map.entry(&definition.name, &definition.dependencies);
        }
        map.finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the adapter used for [`ProviderSpec::Introspected`]
    pub fn with_introspector(mut self, introspector: impl IntrospectNames + 'static) -> Self {
        self.introspector = Some(Arc::new(introspector));
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Registers a single service
    pub fn register<I, S>(
        &mut self,
        name: impl Into<String>,
        dependencies: I,
        provider: Provider,
    ) -> Result<&mut Self, RegisterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.check_name(&name)?;

        let definition = ServiceDefinition {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            name,
            provider,
        };
        self.insert(definition);
        Ok(self)
    }

    /// Registers a batch of services
    ///
    /// Either the whole batch is registered, or none of it.
    pub fn define<I, N>(&mut self, services: I) -> Result<&mut Self, RegisterError>
    where
        I: IntoIterator<Item = (N, ProviderSpec)>,
        N: Into<String>,
    {
        let mut batch = Vec::new();
        let mut seen = HashSet::new();
        for (name, spec) in services {
            let name = name.into();
            self.check_name(&name)?;
            if !seen.insert(name.clone()) {
                return Err(RegisterError::DuplicateService(name));
            }
            batch.push(self.specify(name, spec)?);
        }

        for definition in batch {
            self.insert(definition);
        }
        Ok(self)
    }

    /// Derives a registry with the same services, later registrations don't affect `self`
    pub fn extend(&self) -> Registry {
        self.clone()
    }

    /// Derives a registry with the same services plus `services`
    pub fn extend_with<I, N>(&self, services: I) -> Result<Registry, RegisterError>
    where
        I: IntoIterator<Item = (N, ProviderSpec)>,
        N: Into<String>,
    {
        let mut extended = self.extend();
        extended.define(services)?;
        Ok(extended)
    }

    /// Turns a spec into a definition without registering it
    pub fn specify(
        &self,
        name: impl Into<String>,
        spec: ProviderSpec,
    ) -> Result<ServiceDefinition, RegisterError> {
        let name = name.into();
        let (dependencies, provider) = match spec {
            ProviderSpec::Explicit {
                dependencies,
                provider,
            } => (dependencies, provider),
            ProviderSpec::Introspected(provider) => {
                let dependencies = self
                    .introspector
                    .as_ref()
                    .and_then(|introspector| introspector.names_of(&provider))
                    .ok_or_else(|| RegisterError::MissingDependencyList(name.clone()))?;
                (dependencies, provider)
            }
            ProviderSpec::Factory(factory) => {
                let dependencies = factory.dependencies();
                let provider = Provider::new(move |deps| factory.construct(deps));
                (dependencies, provider)
            }
            ProviderSpec::Value(instance) => (Vec::new(), Provider::constant(instance)),
        };

        Ok(ServiceDefinition {
            name,
            dependencies,
            provider,
        })
    }

    pub fn definition(&self, name: &str) -> Option<&Arc<ServiceDefinition>> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<ServiceDefinition>> {
        self.definitions.values()
    }

    /// Union of the dependency names of every definition
    pub fn dependency_names(&self) -> BTreeSet<&str> {
        self.definitions
            .values()
            .flat_map(|definition| definition.dependencies.iter())
            .map(String::as_str)
            .filter(|name| *name != RESERVED_NAME)
            .collect()
    }

    /// Dependency names which `is_supplied` doesn't cover
    pub fn free_names(&self, is_supplied: impl Fn(&str) -> bool) -> BTreeSet<String> {
        self.dependency_names()
            .into_iter()
            .filter(|name| !is_supplied(name))
            .map(String::from)
            .collect()
    }

    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(self)
    }

    /// Creates a builder without supplied values
    pub fn builder(&self) -> Builder {
        self.construct(HashMap::<String, Resolved>::new())
    }

    /// Creates a builder with `input` supplied
    pub fn construct<I, N>(&self, input: I) -> Builder
    where
        I: IntoIterator<Item = (N, Resolved)>,
        N: Into<String>,
    {
        Builder::new(Arc::new(self.clone()), collect_input(input))
    }

    #[deprecated(note = "use `Registry::construct` instead")]
    pub fn dsl<I, N>(&self, input: I) -> Builder
    where
        I: IntoIterator<Item = (N, Resolved)>,
        N: Into<String>,
    {
        tracing::warn!("Registry::dsl is deprecated. Use construct instead");
        self.construct(input)
    }

    /// Creates a bare resolver with `input` supplied
    pub fn factory<I, N>(&self, input: I) -> Resolver
    where
        I: IntoIterator<Item = (N, Resolved)>,
        N: Into<String>,
    {
        Resolver::new(Arc::new(self.clone()), collect_input(input))
    }

    fn check_name(&self, name: &str) -> Result<(), RegisterError> {
        if name == RESERVED_NAME {
            return Err(RegisterError::ReservedName);
        }
        if self.contains(name) {
            return Err(RegisterError::DuplicateService(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, definition: ServiceDefinition) {
        tracing::debug!(
            "Registered service {} depending on [{}]",
            definition.name,
            definition.dependencies.join(", ")
        );
        self.definitions
            .insert(definition.name.clone(), Arc::new(definition));
    }
}

fn collect_input<I, N>(input: I) -> HashMap<String, Resolved>
where
    I: IntoIterator<Item = (N, Resolved)>,
    N: Into<String>,
{
    input
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResolveError;

    fn constant(value: &'static str) -> ProviderSpec {
        ProviderSpec::value(value.to_string())
    }

    struct ParamNames;
    impl IntrospectNames for ParamNames {
        fn names_of(&self, provider: &Provider) -> Option<Vec<String>> {
            let signature = provider.signature()?;
            Some(
                signature
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = Registry::new();
        registry.define([("foo", constant("foo"))]).unwrap();

        let err = registry.define([("foo", constant("bar"))]).unwrap_err();
        assert_eq!(err, RegisterError::DuplicateService("foo".into()));
        assert_eq!(err.to_string(), "Already have foo registered");

        let err = registry
            .register("foo", ["bar"], Provider::value(1_u8))
            .unwrap_err();
        assert_eq!(err, RegisterError::DuplicateService("foo".into()));
    }

    #[test]
    fn rejects_reserved_name() {
        let mut registry = Registry::new();
        let err = registry
            .register(RESERVED_NAME, Vec::<String>::new(), Provider::value(1_u8))
            .unwrap_err();
        assert_eq!(err, RegisterError::ReservedName);

        let err = registry.define([("$", constant("foo"))]).unwrap_err();
        assert_eq!(err, RegisterError::ReservedName);
    }

    #[test]
    fn failed_batch_registers_nothing() {
        let mut registry = Registry::new();
        let err = registry
            .define([("foo", constant("foo")), ("foo", constant("again"))])
            .unwrap_err();

        assert_eq!(err, RegisterError::DuplicateService("foo".into()));
        assert!(!registry.contains("foo"));
    }

    #[test]
    fn introspection_needs_an_introspector() {
        let provider = crate::provide!(|meat: String| meat.len());

        let err = Registry::new()
            .define([("size", ProviderSpec::introspected(provider.clone()))])
            .unwrap_err();
        assert_eq!(err, RegisterError::MissingDependencyList("size".into()));

        let mut registry = Registry::new().with_introspector(ParamNames);
        registry
            .define([("size", ProviderSpec::from(provider))])
            .unwrap();
        assert_eq!(
            registry.definition("size").unwrap().dependencies(),
            &["meat".to_string()]
        );
    }

    #[test]
    fn dependency_names_are_a_union() {
        let mut registry = Registry::new();
        registry
            .register("breakfast", ["meat", "egg", "juice"], Provider::value(()))
            .unwrap()
            .register("solids", ["meat", "egg", "$"], Provider::value(()))
            .unwrap();

        let names: Vec<_> = registry.dependency_names().into_iter().collect();
        assert_eq!(names, ["egg", "juice", "meat"]);

        let free = registry.free_names(|name| name == "egg");
        assert_eq!(
            free.into_iter().collect::<Vec<_>>(),
            ["juice".to_string(), "meat".to_string()]
        );
    }

    #[test]
    fn extending_leaves_the_base_untouched() {
        let mut base = Registry::new();
        base.define([("foo", constant("foo"))]).unwrap();

        let extended = base.extend_with([("bar", constant("bar"))]).unwrap();
        let other = base.extend_with([("baz", constant("baz"))]).unwrap();

        assert!(extended.contains("foo") && extended.contains("bar"));
        assert!(!extended.contains("baz"));
        assert!(other.contains("baz") && !other.contains("bar"));
        assert!(!base.contains("bar") && !base.contains("baz"));
    }

    #[test]
    fn factory_gives_a_bare_resolver() {
        let mut registry = Registry::new();
        registry.define([("foo", constant("foo"))]).unwrap();

        let resolver = registry.factory(HashMap::<String, Resolved>::new());
        let foo = resolver
            .resolve_adhoc(ProviderSpec::explicit(
                ["foo"],
                Provider::sync(|deps| {
                    let foo = deps.get::<String>("foo")?;
                    Ok::<_, ResolveError>(foo.to_uppercase())
                }),
            ))
            .unwrap();

        assert_eq!(*foo.value::<String>().unwrap().unwrap(), "FOO");
    }
}
