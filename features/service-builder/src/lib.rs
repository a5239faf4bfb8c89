//! Service Builder resolves named services lazily, computing each of them at most once.
//!
//! Service Builder is split into three major parts:
//! 1. Registry: Holds every service, its dependency names and its provider
//! 2. Resolver: Resolves names within one context, memoizing what it computes
//! 3. Builder: Immutable snapshots of supplied values, deriving setters and getters
//!
//! Values may be ready or pending. A service stays synchronous as long as all of its
//! dependencies are, and becomes pending as soon as one of them is.
//!
//! # Examples
//!
//! ```rust
//! use service_builder::{Provider, Registry, ResolveError};
//!
//! let mut registry = Registry::new();
//! registry
//!     .register("breakfast", ["meat", "egg"], {
//!         Provider::sync(|deps| {
//!             let meat = deps.get::<String>("meat")?;
//!             let egg = deps.get::<String>("egg")?;
//!             Ok::<_, ResolveError>(format!("{meat} with {egg} eggs"))
//!         })
//!     })
//!     .unwrap();
//!
//! let builder = registry.builder();
//! assert_eq!(builder.setters(), ["withEgg", "withMeat"]);
//!
//! let breakfast = builder
//!     .set("meat", "ham".to_string())
//!     .set("egg", "scrambled".to_string())
//!     .get("breakfast")
//!     .unwrap();
//!
//! let breakfast = breakfast.value::<String>().unwrap().unwrap();
//! assert_eq!(*breakfast, "ham with scrambled eggs");
//! ```

pub mod builder;
pub mod config;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod registry;
pub mod resolver;
pub mod types;

pub use builder::Builder;
pub use config::Naming;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::{RegisterError, ResolveError};
pub use factories::{DynFactory, Provider, ProviderSpec, ServiceFactory};
pub use registry::{IntrospectNames, Registry, ServiceDefinition, RESERVED_NAME};
pub use resolver::{Dependencies, DependencyPath, Lazy, Resolver};
pub use types::{DynError, Injectable, Instance, PendingInstance, Resolved};
