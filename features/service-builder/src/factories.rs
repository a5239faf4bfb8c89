use std::{borrow::Cow, fmt::Debug, future::Future, sync::Arc};

use crate::{
    errors::ResolveError,
    resolver::Dependencies,
    types::{DynError, Injectable, Instance, Resolved},
};

type ProvideFn = dyn Fn(Dependencies) -> Result<Resolved, DynError> + Send + Sync;

/// A function producing a service's value from its resolved dependencies
#[derive(Clone)]
pub struct Provider {
    provide: Arc<ProvideFn>,
    signature: Option<Cow<'static, str>>,
}

impl Provider {
    /// Provider returning a [`Resolved`] directly, either ready or pending
    pub fn new<F>(provide: F) -> Self
    where
        F: Fn(Dependencies) -> Result<Resolved, DynError> + Send + Sync + 'static,
    {
        Provider {
            provide: Arc::new(provide),
            signature: None,
        }
    }

    /// Provider computing its value synchronously
    pub fn sync<F, T, E>(provide: F) -> Self
    where
        F: Fn(Dependencies) -> Result<T, E> + Send + Sync + 'static,
        T: Injectable,
        E: Into<DynError>,
    {
        Provider::new(move |deps| {
            provide(deps)
                .map(Resolved::ready)
                .map_err(Into::into)
        })
    }

    /// Provider computing its value asynchronously
    pub fn future<F, Fut, T, E>(provide: F) -> Self
    where
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        T: Injectable,
        E: Into<DynError>,
    {
        Provider::new(move |deps| {
            let service = deps.service().to_string();
            let construction_fut = provide(deps);

            Ok(Resolved::from_future(async move {
                construction_fut
                    .await
                    .map(Instance::new)
                    .map_err(|e| ResolveError::from_provider(&service, e))
            }))
        })
    }

    /// Provider always returning the same value
    pub fn value<T: Injectable>(value: T) -> Self {
        Provider::constant(Instance::new(value))
    }

    pub(crate) fn constant(instance: Instance) -> Self {
        Provider::new(move |_| Ok(Resolved::Ready(instance.clone())))
    }

    /// Records the parameter list as source text, e.g. `"meat, egg, juice"`
    ///
    /// Only read by name introspection
    pub fn with_signature(mut self, signature: impl Into<Cow<'static, str>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Runs the provider, errors are attributed to `deps.service()`
    pub(crate) fn provide(&self, deps: Dependencies) -> Result<Resolved, ResolveError> {
        let service = deps.service().to_string();
        (self.provide)(deps).map_err(|e| ResolveError::from_provider(&service, e))
    }
}

impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A provider object carrying its own list of dependency names
pub trait ServiceFactory: Send + Sync + 'static {
    type Provides: Injectable;
    type Error: Into<DynError>;

    /// Names of the dependencies, in the order `construct` expects them
    fn dependencies(&self) -> Vec<String>;

    /// Constructs the provided value
    fn construct(&self, deps: Dependencies) -> Result<Self::Provides, Self::Error>;
}

/// Wrapper Trait for factories, providing instances of Any
pub trait DynFactory: Send + Sync {
    fn dependencies(&self) -> Vec<String>;

    fn construct(&self, deps: Dependencies) -> Result<Resolved, DynError>;
}
// Impl DynFactory for any ServiceFactory
impl<SpecificFactory: ServiceFactory> DynFactory for SpecificFactory {
    fn dependencies(&self) -> Vec<String> {
        ServiceFactory::dependencies(self)
    }

    fn construct(&self, deps: Dependencies) -> Result<Resolved, DynError> {
        ServiceFactory::construct(self, deps)
            .map(Resolved::ready)
            .map_err(Into::into)
    }
}

/// How a service is handed to [`crate::Registry::define`]
#[derive(Clone)]
pub enum ProviderSpec {
    /// Dependency names come from the registry's name introspector
    Introspected(Provider),
    /// Dependency names given up front
    Explicit {
        dependencies: Vec<String>,
        provider: Provider,
    },
    /// A factory object declaring its own dependency names
    Factory(Arc<dyn DynFactory>),
    /// A constant without dependencies
    Value(Instance),
}

impl ProviderSpec {
    pub fn explicit<I, S>(dependencies: I, provider: Provider) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProviderSpec::Explicit {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            provider,
        }
    }

    pub fn introspected(provider: Provider) -> Self {
        ProviderSpec::Introspected(provider)
    }

    pub fn factory<F: ServiceFactory>(factory: F) -> Self {
        ProviderSpec::Factory(Arc::new(factory))
    }

    pub fn value<T: Injectable>(value: T) -> Self {
        ProviderSpec::Value(Instance::new(value))
    }
}

impl From<Provider> for ProviderSpec {
    fn from(provider: Provider) -> Self {
        ProviderSpec::Introspected(provider)
    }
}

impl Debug for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderSpec::Introspected(provider) => {
                f.debug_tuple("Introspected").field(provider).finish()
            }
            ProviderSpec::Explicit {
                dependencies,
                provider,
            } => f
                .debug_struct("Explicit")
                .field("dependencies", dependencies)
                .field("provider", provider)
                .finish(),
            ProviderSpec::Factory(factory) => f
                .debug_tuple("Factory")
                .field(&factory.dependencies())
                .finish(),
            ProviderSpec::Value(instance) => f.debug_tuple("Value").field(instance).finish(),
        }
    }
}

/// Builds a synchronous [`Provider`] whose arguments are fetched by name
///
/// The parameter list is recorded as the provider's signature, so the provider
/// can be registered with [`ProviderSpec::Introspected`].
///
/// ```rust
/// use service_builder::provide;
///
/// let breakfast = provide!(|meat: String, egg: String| format!("{meat} and {egg}"));
/// assert_eq!(breakfast.signature(), Some("meat, egg"));
/// ```
#[macro_export]
macro_rules! provide {
    (|| $body:expr) => {
        $crate::Provider::sync(move |_: $crate::Dependencies| {
            ::std::result::Result::Ok::<_, $crate::DynError>($body)
        })
        .with_signature("")
    };
    (|$($dep:ident : $ty:ty),+ $(,)?| $body:expr) => {
        $crate::Provider::sync(move |deps: $crate::Dependencies| {
            $(let $dep: ::std::sync::Arc<$ty> = deps.get::<$ty>(stringify!($dep))?;)+
            ::std::result::Result::Ok::<_, $crate::DynError>($body)
        })
        .with_signature(stringify!($($dep),+))
    };
}
