use service_builder::{IntrospectNames, Provider, Registry};

use crate::parser::parse_parameter_names;

/// Derives dependency names from the signature recorded on a [`Provider`]
///
/// Providers built with [`service_builder::provide!`] carry their parameter list.
/// Providers without a signature, or with one that can't be read, have no names
/// and registering them fails with a missing dependency list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureIntrospector;

impl IntrospectNames for SignatureIntrospector {
    fn names_of(&self, provider: &Provider) -> Option<Vec<String>> {
        let signature = provider.signature()?;

        match parse_parameter_names(signature) {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::warn!("Could not read parameter names from '{signature}': {e}");
                None
            }
        }
    }
}

/// A registry which introspects the parameter names of its providers
pub fn introspecting_registry() -> Registry {
    Registry::new().with_introspector(SignatureIntrospector)
}

#[cfg(test)]
mod tests {
    use service_builder::{provide, ProviderSpec, RegisterError};

    use super::*;

    #[test]
    fn registers_by_parameter_names() {
        let mut registry = introspecting_registry();
        registry
            .define([
                (
                    "breakfast",
                    ProviderSpec::from(provide!(|meat: String, egg: String, juice: String| {
                        format!("{meat} {egg} eggs {juice} juice")
                    })),
                ),
                ("egg", ProviderSpec::from(provide!(|| "scrambled".to_string()))),
            ])
            .unwrap();

        assert_eq!(
            registry.definition("breakfast").unwrap().dependencies(),
            ["meat", "egg", "juice"]
        );
        assert!(registry.definition("egg").unwrap().dependencies().is_empty());

        let breakfast = registry
            .builder()
            .set("meat", "ham".to_string())
            .set("juice", "orange".to_string())
            .get("breakfast")
            .unwrap();
        assert_eq!(
            *breakfast.value::<String>().unwrap().unwrap(),
            "ham scrambled eggs orange juice"
        );
    }

    #[test]
    fn unreadable_signatures_have_no_names() {
        let provider = Provider::value(1_u8).with_signature("|meat");
        assert_eq!(SignatureIntrospector.names_of(&provider), None);
        assert_eq!(SignatureIntrospector.names_of(&Provider::value(1_u8)), None);

        let err = introspecting_registry()
            .define([("size", ProviderSpec::from(provider))])
            .unwrap_err();
        assert_eq!(err, RegisterError::MissingDependencyList("size".into()));
    }
}
