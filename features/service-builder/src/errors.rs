use std::sync::Arc;

use thiserror::Error;

use crate::types::DynError;

/// Errors when registering services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// A service with this name is already registered
    #[error("Already have {0} registered")]
    DuplicateService(String),
    /// `$` is reserved for the resolver handle
    #[error("$ is a reserved internal dependency for factory functions")]
    ReservedName,
    /// No dependency names were given and none could be introspected
    #[error("No dependency list for '{0}' - declare one explicitly or configure a name introspector")]
    MissingDependencyList(String),
}

/// Errors while resolving a name
///
/// Must be `Clone`, pending values hand the same failure to every waiter
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// A service was requested again while it was still loading
    ///
    /// `path` lists the most recent request first
    #[error("Circular dependency error with {name} at {}", .path.join(" => "))]
    CircularDependency { name: String, path: Vec<String> },

    /// Dependencies which are neither supplied nor registered
    #[error(
        "Failed to resolve {} from [{}] at {}",
        .missing.join(", "),
        .available.join(", "),
        .path.join(" => ")
    )]
    UnresolvedDependency {
        missing: Vec<String>,
        available: Vec<String>,
        path: Vec<String>,
    },

    /// A provider asked for a name it never declared
    #[error("'{name}' is not a declared dependency")]
    NotADependency { name: String },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// A provider returned an error
    #[error("Provider for '{service}' failed - error: {error}")]
    ProviderFailed {
        service: String,
        error: Arc<DynError>,
    },

    /// A supplied pending value failed
    #[error("Pending value failed - error: {0}")]
    PendingFailed(Arc<DynError>),

    /// An ad-hoc provider could not be turned into a definition
    #[error(transparent)]
    InvalidProvider(#[from] RegisterError),
}

impl ResolveError {
    /// All missing names, if this is an [`ResolveError::UnresolvedDependency`]
    pub fn missing_dependencies(&self) -> Option<&[String]> {
        match self {
            ResolveError::UnresolvedDependency { missing, .. } => Some(missing),
            _ => None,
        }
    }

    /// Wraps a provider error, unless it already is a [`ResolveError`]
    pub(crate) fn from_provider(service: &str, error: impl Into<DynError>) -> Self {
        let error: DynError = error.into();
        match error.downcast::<ResolveError>() {
            Ok(resolve_error) => *resolve_error,
            Err(error) => ResolveError::ProviderFailed {
                service: service.to_string(),
                error: Arc::new(error),
            },
        }
    }

    pub(crate) fn from_pending(error: impl Into<DynError>) -> Self {
        let error: DynError = error.into();
        match error.downcast::<ResolveError>() {
            Ok(resolve_error) => *resolve_error,
            Err(error) => ResolveError::PendingFailed(Arc::new(error)),
        }
    }
}
