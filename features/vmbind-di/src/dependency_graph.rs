use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
};

use thiserror::Error;

use crate::types::{DependencyInfo, TypeInfo};

/// Graph of one registration batch
///
/// Used to find missing and circular dependencies before anything gets constructed,
/// and to order construction so dependencies are built before their dependents.
#[derive(Default)]
pub struct DependencyGraph {
    entries: Vec<DependencyGraphEntry>,
    index: HashMap<TypeId, usize>,
}
impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider to the batch
    ///
    /// Returns false if the type is already part of the batch - the first declaration wins.
    pub fn add(&mut self, info: TypeInfo, dependencies: Vec<DependencyInfo>) -> bool {
        if self.index.contains_key(&info.type_id) {
            return false;
        }

        self.index.insert(info.type_id, self.entries.len());
        self.entries.push(DependencyGraphEntry { info, dependencies });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the graph
    ///
    /// `resolvable` answers whether a type outside the batch can already be resolved.
    /// Returns a list of all issues
    pub fn check(
        &self,
        resolvable: impl Fn(&TypeInfo) -> bool,
    ) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in &self.entries {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &resolvable,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            resolvable: &impl Fn(&TypeInfo) -> bool,
            checked: &mut HashSet<TypeId>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|info| *info == entry.info) {
                let mut chain = dependency_chain[start..].to_vec();
                chain.push(entry.info);

                errors.push(DependencyGraphError::CircularDependency {
                    from: chain[0],
                    to: chain[chain.len() - 2],
                    chain,
                });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(entry.info.type_id) {
                return;
            };

            dependency_chain.push(entry.info);

            for dependency in &entry.dependencies {
                let Some(next_entry) = graph.get(&dependency.type_info) else {
                    if !dependency.optional && !resolvable(&dependency.type_info) {
                        errors.push(DependencyGraphError::MissingDependency {
                            dependency: dependency.type_info,
                            required_by: entry.info,
                        });
                    }

                    continue;
                };

                check_recurse(graph, resolvable, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }

    /// Order in which the batch has to be constructed
    ///
    /// Declaration order, except that a dependency declared later in the batch is pulled
    /// in front of its first dependent. Only meaningful on a graph which passed [Self::check].
    pub fn construction_order(&self) -> Vec<TypeInfo> {
        let mut visited = HashSet::new();
        let mut order = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            visit(self, &mut visited, &mut order, entry);
        }
        return order;

        fn visit(
            graph: &DependencyGraph,
            visited: &mut HashSet<TypeId>,
            order: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            if !visited.insert(entry.info.type_id) {
                return;
            }
            for dependency in &entry.dependencies {
                if let Some(next_entry) = graph.get(&dependency.type_info) {
                    visit(graph, visited, order, next_entry);
                }
            }
            order.push(entry.info);
        }
    }

    fn get(&self, info: &TypeInfo) -> Option<&DependencyGraphEntry> {
        self.index.get(&info.type_id).map(|i| &self.entries[*i])
    }
}

struct DependencyGraphEntry {
    info: TypeInfo,
    dependencies: Vec<DependencyInfo>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: TypeInfo,
    },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency {
        from: TypeInfo,
        to: TypeInfo,
        chain: Vec<TypeInfo>,
    },
}

#[derive(Error, Debug, Clone)]
#[error("The dependency graph had one or more errors:{}", list_errors(.errors))]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

fn list_errors(errors: &[DependencyGraphError]) -> String {
    errors.iter().map(|error| format!("\n- {error}")).collect()
}
