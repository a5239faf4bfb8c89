//! Service Builder Names lets services be registered without spelling out their
//! dependency names, reading them from the provider's parameter list instead.
//!
//! Service Builder Names is split into two major parts:
//! 1. Parser: Reads ordered parameter names out of a signature
//! 2. SignatureIntrospector: Plugs the parser into a [`service_builder::Registry`]
//!
//! # Examples
//!
//! ```rust
//! use service_builder::{provide, ProviderSpec};
//! use service_builder_names::introspecting_registry;
//!
//! let mut registry = introspecting_registry();
//! registry
//!     .define([(
//!         "solids",
//!         ProviderSpec::from(provide!(|meat: String, egg: String| format!("{meat} {egg}"))),
//!     )])
//!     .unwrap();
//!
//! let solids = registry
//!     .builder()
//!     .set("meat", "ham".to_string())
//!     .set("egg", "fried".to_string())
//!     .get("solids")
//!     .unwrap();
//! assert_eq!(*solids.value::<String>().unwrap().unwrap(), "ham fried");
//! ```

pub mod errors;
pub mod introspector;
pub mod parser;

pub use errors::SignatureError;
pub use introspector::{introspecting_registry, SignatureIntrospector};
pub use parser::parse_parameter_names;
