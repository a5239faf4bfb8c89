use std::{
    any::Any,
    fmt::Debug,
    future::{Future, IntoFuture},
    sync::Arc,
};

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::errors::ResolveError;

/// All errors must be shareable between threads
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution itself is single threaded, but resolved values may leave the context
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A type-erased value produced by a provider or supplied from outside
#[derive(Clone)]
pub struct Instance {
    pub type_name: &'static str,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Instance {
            type_name: std::any::type_name::<T>(),
            instance,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    /// True if both instances point at the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.instance), Arc::as_ptr(&other.instance))
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

/// A shared handle to a value which is still being computed
pub type PendingInstance = Shared<LocalBoxFuture<'static, Result<Instance, ResolveError>>>;

/// The outcome of resolving a name: either the value itself or a handle settling to it
#[derive(Clone)]
pub enum Resolved {
    Ready(Instance),
    Pending(PendingInstance),
}

impl Resolved {
    pub fn ready<T: Injectable>(value: T) -> Self {
        Resolved::Ready(Instance::new(value))
    }

    /// Wraps any future as a pending value
    ///
    /// Errors which are not already a [`ResolveError`] become [`ResolveError::PendingFailed`]
    pub fn pending<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
        T: Injectable,
        E: Into<DynError>,
    {
        Self::from_future(async move {
            future
                .await
                .map(Instance::new)
                .map_err(ResolveError::from_pending)
        })
    }

    pub(crate) fn from_future(
        future: impl Future<Output = Result<Instance, ResolveError>> + 'static,
    ) -> Self {
        Resolved::Pending(future.boxed_local().shared())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resolved::Pending(_))
    }

    pub fn as_ready(&self) -> Option<&Instance> {
        match self {
            Resolved::Ready(instance) => Some(instance),
            Resolved::Pending(_) => None,
        }
    }

    pub(crate) fn into_ready(self) -> Option<Instance> {
        match self {
            Resolved::Ready(instance) => Some(instance),
            Resolved::Pending(_) => None,
        }
    }

    /// Synchronous peek at the value
    ///
    /// Returns `None` while a pending value has not settled yet
    pub fn value<T: Injectable>(&self) -> Option<Result<Arc<T>, ResolveError>> {
        let instance = match self {
            Resolved::Ready(instance) => instance.clone(),
            Resolved::Pending(pending) => match pending.peek()? {
                Ok(instance) => instance.clone(),
                Err(e) => return Some(Err(e.clone())),
            },
        };

        Some(downcast(&instance))
    }

    /// Waits until the value is available
    pub async fn wait(self) -> Result<Instance, ResolveError> {
        match self {
            Resolved::Ready(instance) => Ok(instance),
            Resolved::Pending(pending) => pending.await,
        }
    }

    /// Waits until the value is available and downcasts it
    pub async fn wait_for<T: Injectable>(self) -> Result<Arc<T>, ResolveError> {
        let instance = self.wait().await?;
        downcast(&instance)
    }
}

impl IntoFuture for Resolved {
    type Output = Result<Instance, ResolveError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait().boxed_local()
    }
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolved::Ready(instance) => f.debug_tuple("Ready").field(instance).finish(),
            Resolved::Pending(pending) => match pending.peek() {
                Some(settled) => f.debug_tuple("Pending").field(settled).finish(),
                None => f.debug_tuple("Pending").field(&"..").finish(),
            },
        }
    }
}

pub(crate) fn downcast<T: Injectable>(instance: &Instance) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| ResolveError::DowncastFailed {
            required_type: std::any::type_name::<T>(),
            actual_type,
        })
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn ready_value_peeks_and_waits() {
        let resolved = Resolved::ready("ham".to_string());
        assert!(!resolved.is_pending());

        let peeked = resolved.value::<String>().unwrap().unwrap();
        assert_eq!(*peeked, "ham");

        let waited = block_on(resolved.wait_for::<String>()).unwrap();
        assert_eq!(*waited, "ham");
    }

    #[test]
    fn pending_value_settles_through_await() {
        let resolved = Resolved::pending(async { Ok::<_, DynError>(6_u8) });
        assert!(resolved.is_pending());
        assert!(resolved.value::<u8>().is_none());

        let instance = block_on(resolved.clone().into_future()).unwrap();
        assert_eq!(*instance.downcast::<u8>().unwrap(), 6);

        // Settled handles can be peeked afterwards
        assert_eq!(*resolved.value::<u8>().unwrap().unwrap(), 6);
    }

    #[test]
    fn pending_failure_is_shared() {
        let resolved = Resolved::pending(async { Err::<u8, _>("ham") });
        let first = block_on(resolved.clone().wait());
        let second = block_on(resolved.wait());

        assert!(matches!(first, Err(ResolveError::PendingFailed(_))));
        assert!(matches!(second, Err(ResolveError::PendingFailed(_))));
    }

    #[test]
    fn wrong_type_fails_downcast() {
        let resolved = Resolved::ready(1_u32);
        match resolved.value::<String>() {
            Some(Err(ResolveError::DowncastFailed { actual_type, .. })) => {
                assert_eq!(actual_type, "u32")
            }
            other => panic!("expected downcast failure, got {other:?}"),
        }
    }

    #[test]
    fn clones_share_the_allocation() {
        let instance = Instance::new(String::from("egg"));
        assert!(instance.ptr_eq(&instance.clone()));
        assert!(!instance.ptr_eq(&Instance::new(String::from("egg"))));
    }
}
