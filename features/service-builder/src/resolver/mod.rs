use std::{
    cell::RefCell,
    collections::{BTreeSet, HashMap},
    fmt::{Debug, Display},
    rc::{Rc, Weak},
    sync::Arc,
};

use crate::{
    errors::ResolveError,
    factories::ProviderSpec,
    registry::{Registry, ServiceDefinition, RESERVED_NAME},
    types::Resolved,
};

mod dependencies;
mod lazy;
mod unify;

pub use dependencies::Dependencies;
pub use lazy::Lazy;

/// Names being resolved in the current call stack, most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPath(Vec<String>);

impl DependencyPath {
    pub fn root(name: &str) -> Self {
        DependencyPath(vec![name.to_string()])
    }

    /// Path one level deeper, at `name`
    pub fn push(&self, name: &str) -> Self {
        let mut names = Vec::with_capacity(self.0.len() + 1);
        names.push(name.to_string());
        names.extend(self.0.iter().cloned());
        DependencyPath(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn into_names(self) -> Vec<String> {
        self.0
    }
}

impl Display for DependencyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" => "))
    }
}

/// Resolution state of one service within one context
#[derive(Default)]
struct Slot {
    /// Set while the service's own synchronous resolution runs
    loading: bool,
    singleton: Option<Resolved>,
}

#[derive(Default)]
struct ResolutionState {
    slots: HashMap<String, Slot>,
}

struct ResolverInner {
    registry: Arc<Registry>,
    supplied: Rc<HashMap<String, Resolved>>,
    state: RefCell<ResolutionState>,
}

/// Resolver handle which doesn't keep the memoized state alive
///
/// Pending values hold this instead of a [`Resolver`], as they are memoized
/// within the very state a strong handle would keep alive.
#[derive(Clone)]
pub(crate) struct WeakResolver {
    inner: Weak<ResolverInner>,
    registry: Arc<Registry>,
    supplied: Rc<HashMap<String, Resolved>>,
}

impl WeakResolver {
    /// The original context while it is alive, otherwise a fresh one over the same inputs
    pub(crate) fn upgrade(&self) -> Resolver {
        match self.inner.upgrade() {
            Some(inner) => Resolver(inner),
            None => {
                tracing::trace!("Resolution context was dropped, continuing in a detached one");
                Resolver::from_parts(self.registry.clone(), self.supplied.clone())
            }
        }
    }
}

/// Resolves names against a registry and a set of supplied values
///
/// Every service is computed at most once per resolver, clones share that state.
/// A resolver is bound to the thread that created it.
#[derive(Clone)]
pub struct Resolver(Rc<ResolverInner>);

impl Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.borrow();
        let mut map = f.debug_map();
        for name in self.0.supplied.keys() {
            map.entry(name, &"supplied");
        }
        for (name, slot) in &state.slots {
            let val = match (&slot.singleton, slot.loading) {
                (Some(_), _) => "resolved",
                (None, true) => "loading",
                (None, false) => "unresolved",
            };
            map.entry(name, &val);
        }
        map.finish()
    }
}

impl Resolver {
    pub fn new(registry: Arc<Registry>, supplied: HashMap<String, Resolved>) -> Self {
        Self::from_parts(registry, Rc::new(supplied))
    }

    fn from_parts(registry: Arc<Registry>, supplied: Rc<HashMap<String, Resolved>>) -> Self {
        Resolver(Rc::new(ResolverInner {
            registry,
            supplied,
            state: RefCell::new(ResolutionState::default()),
        }))
    }

    pub(crate) fn downgrade(&self) -> WeakResolver {
        WeakResolver {
            inner: Rc::downgrade(&self.0),
            registry: self.0.registry.clone(),
            supplied: self.0.supplied.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.0.registry
    }

    pub fn supplied(&self) -> &HashMap<String, Resolved> {
        &self.0.supplied
    }

    pub fn is_supplied(&self, name: &str) -> bool {
        self.0.supplied.contains_key(name)
    }

    /// Dependency names of the registry which are not supplied
    pub fn free_names(&self) -> BTreeSet<String> {
        self.0.registry.free_names(|name| self.is_supplied(name))
    }

    /// The memoized value of a service, if it has been resolved
    pub fn memoized(&self, name: &str) -> Option<Resolved> {
        let state = self.0.state.borrow();
        state.slots.get(name)?.singleton.clone()
    }

    /// Resolves a name
    ///
    /// A supplied value takes precedence over a registered service of the same name.
    pub fn resolve(&self, name: &str) -> Result<Resolved, ResolveError> {
        if let Some(value) = self.0.supplied.get(name) {
            return Ok(value.clone());
        }

        self.resolve_service(name, DependencyPath::root(name))
    }

    /// Resolves several names, in order
    pub fn resolve_many<I, S>(&self, names: I) -> Result<Vec<Resolved>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.resolve(name.as_ref()))
            .collect()
    }

    /// Resolves a one-off provider which is not registered
    ///
    /// The result is not memoized, its dependencies are. A provider asking for
    /// its own service while it runs gets a cycle error, whether it runs right
    /// away or once its pending dependencies settle.
    pub fn resolve_adhoc(&self, spec: impl Into<ProviderSpec>) -> Result<Resolved, ResolveError> {
        let definition = self.0.registry.specify(RESERVED_NAME, spec.into())?;
        self.invoke(&definition, &DependencyPath::root(RESERVED_NAME))
    }

    fn resolve_service(&self, name: &str, path: DependencyPath) -> Result<Resolved, ResolveError> {
        let Some(definition) = self.0.registry.definition(name).cloned() else {
            return Err(self.unresolved(vec![name.to_string()], &path));
        };

        {
            let mut state = self.0.state.borrow_mut();
            let slot = state.slots.entry(name.to_string()).or_default();

            // Checked first, a pending singleton is memoized while its provider still runs
            if slot.loading {
                return Err(ResolveError::CircularDependency {
                    name: name.to_string(),
                    path: path.into_names(),
                });
            }

            if let Some(singleton) = &slot.singleton {
                return Ok(singleton.clone());
            }

            slot.loading = true;
        }

        tracing::trace!("Resolving {name} at {path}");
        let result = self
            .invoke(&definition, &path)
            .map(|resolved| self.forget_on_failure(name, resolved));

        let mut state = self.0.state.borrow_mut();
        let slot = state.slots.entry(name.to_string()).or_default();
        slot.loading = false;

        match result {
            Ok(resolved) => {
                slot.singleton = Some(resolved.clone());
                Ok(resolved)
            }
            Err(e) => {
                tracing::debug!("Failed to resolve {name}: {e}");
                Err(e)
            }
        }
    }

    /// Looks up every dependency of `definition`, then runs its provider
    fn invoke(
        &self,
        definition: &ServiceDefinition,
        path: &DependencyPath,
    ) -> Result<Resolved, ResolveError> {
        let mut values = Vec::with_capacity(definition.dependencies().len());
        let mut missing = Vec::new();

        for dependency in definition.dependencies() {
            if let Some(value) = self.0.supplied.get(dependency) {
                values.push((dependency.clone(), value.clone()));
            } else if dependency == RESERVED_NAME {
                // Available to the provider as `Dependencies::resolver`
                continue;
            } else if self.0.registry.contains(dependency) {
                let value = self.resolve_service(dependency, path.push(dependency))?;
                values.push((dependency.clone(), value));
            } else {
                missing.push(dependency.clone());
            }
        }

        if !missing.is_empty() {
            return Err(self.unresolved(missing, path));
        }

        unify::unify(definition, values, self)
    }

    /// Runs `provide` with `name` flagged as loading, so asking for `name` again is a cycle
    pub(crate) fn providing<T>(&self, name: &str, provide: impl FnOnce() -> T) -> T {
        self.set_loading(name, true);
        let result = provide();
        self.set_loading(name, false);
        result
    }

    fn set_loading(&self, name: &str, loading: bool) {
        let mut state = self.0.state.borrow_mut();
        if let Some(slot) = state.slots.get_mut(name) {
            slot.loading = loading;
        }
    }

    /// Clears the memoized handle once it fails, so the next request tries again
    fn forget_on_failure(&self, name: &str, resolved: Resolved) -> Resolved {
        let pending = match resolved {
            Resolved::Ready(_) => return resolved,
            Resolved::Pending(pending) => pending,
        };

        let inner = Rc::downgrade(&self.0);
        let name = name.to_string();
        Resolved::from_future(async move {
            let result = pending.await;
            if let (Err(e), Some(inner)) = (&result, inner.upgrade()) {
                tracing::warn!("Pending {name} failed and will be resolved again: {e}");
                if let Some(slot) = inner.state.borrow_mut().slots.get_mut(&name) {
                    slot.singleton = None;
                }
            }
            result
        })
    }

    fn unresolved(&self, missing: Vec<String>, path: &DependencyPath) -> ResolveError {
        let mut available: Vec<String> = self.0.supplied.keys().cloned().collect();
        available.sort();

        ResolveError::UnresolvedDependency {
            missing,
            available,
            path: path.names().to_vec(),
        }
    }
}
