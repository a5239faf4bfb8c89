use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::registry::{Registry, RESERVED_NAME};

/// Graph of every registered service and the names it depends on
/// Used to find cycles and unresolvable names before anything is resolved
pub struct DependencyGraph {
    map: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new(registry: &Registry) -> Self {
        let map = registry
            .definitions()
            .map(|definition| {
                let dependencies = definition
                    .dependencies()
                    .iter()
                    .filter(|name| *name != RESERVED_NAME)
                    .cloned()
                    .collect();
                (definition.name().to_string(), dependencies)
            })
            .collect();

        Self { map }
    }

    /// Dependency names of a service, `None` if it is not registered
    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.map.get(name).map(Vec::as_slice)
    }

    /// Validate the graph
    ///
    /// Names for which `is_supplied` returns true are leaves, they override services.
    /// Returns a list of all issues
    pub fn check(&self, is_supplied: impl Fn(&str) -> bool) -> Result<(), DependencyGraphErrors> {
        let mut checker = Checker {
            graph: self,
            is_supplied: &is_supplied,
            checked: HashSet::new(),
            errors: Vec::new(),
            chain: Vec::new(),
        };

        for name in self.map.keys() {
            if !is_supplied(name) {
                checker.visit(name);
            }
        }

        if !checker.errors.is_empty() {
            return Err(DependencyGraphErrors {
                errors: checker.errors,
            });
        }

        Ok(())
    }
}

struct Checker<'a> {
    graph: &'a DependencyGraph,
    is_supplied: &'a dyn Fn(&str) -> bool,
    checked: HashSet<&'a str>,
    errors: Vec<DependencyGraphError>,
    chain: Vec<&'a str>,
}

impl<'a> Checker<'a> {
    fn visit(&mut self, name: &'a str) {
        // Circular Dependency Check
        if let Some(start) = self.chain.iter().position(|entry| *entry == name) {
            let mut chain: Vec<String> = self.chain[start..].iter().map(|s| s.to_string()).collect();
            chain.push(name.to_string());

            self.errors.push(DependencyGraphError::CircularDependency {
                from: self.chain[start].to_string(),
                to: self.chain[self.chain.len() - 1].to_string(),
                chain,
            });
            return;
        }

        // Skip other checks if already checked
        if !self.checked.insert(name) {
            return;
        }

        let graph = self.graph;
        let Some(dependencies) = graph.map.get(name) else {
            return;
        };

        self.chain.push(name);
        for dependency in dependencies {
            if (self.is_supplied)(dependency) {
                continue;
            }

            if !graph.map.contains_key(dependency) {
                self.errors.push(DependencyGraphError::MissingDependency {
                    dependency: dependency.clone(),
                    required_by: name.to_string(),
                });
                continue;
            }

            self.visit(dependency);
        }
        self.chain.pop();
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is neither registered nor supplied")]
    MissingDependency {
        dependency: String,
        required_by: String,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {}", chain.join(" => "))]
    CircularDependency {
        from: String,
        to: String,
        chain: Vec<String>,
    },
}

impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factories::Provider;

    fn registry(services: &[(&str, &[&str])]) -> Registry {
        let mut registry = Registry::new();
        for (name, dependencies) in services {
            registry
                .register(*name, dependencies.iter().copied(), Provider::value(()))
                .unwrap();
        }
        registry
    }

    #[test]
    fn finds_cycles_with_their_chain() {
        let graph = registry(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]).graph();
        let errors = graph.check(|_| false).unwrap_err().errors;

        assert_eq!(
            errors,
            [DependencyGraphError::CircularDependency {
                from: "a".into(),
                to: "c".into(),
                chain: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "A Circular Dependency exists between 'a' and 'c' through a => b => c => a"
        );
    }

    #[test]
    fn supplied_names_break_cycles() {
        let graph = registry(&[("a", &["b"]), ("b", &["a"])]).graph();
        assert!(graph.check(|_| false).is_err());
        assert!(graph.check(|name| name == "b").is_ok());
    }

    #[test]
    fn reports_missing_names_once_per_service() {
        let graph = registry(&[
            ("breakfast", &["meat", "egg", "$"]),
            ("lunch", &["meat"]),
        ])
        .graph();
        let errors = graph.check(|name| name == "egg").unwrap_err().errors;

        assert_eq!(
            errors,
            [
                DependencyGraphError::MissingDependency {
                    dependency: "meat".into(),
                    required_by: "breakfast".into(),
                },
                DependencyGraphError::MissingDependency {
                    dependency: "meat".into(),
                    required_by: "lunch".into(),
                },
            ]
        );
        assert_eq!(graph.dependencies("breakfast").unwrap(), ["meat", "egg"]);
    }

    #[test]
    fn shared_dependencies_are_not_cycles() {
        let graph = registry(&[
            ("meal", &["meat", "veggie"]),
            ("meat", &["salt"]),
            ("veggie", &["salt"]),
            ("salt", &[]),
        ])
        .graph();
        assert!(graph.check(|_| false).is_ok());
    }
}
