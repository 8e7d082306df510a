//! Dependency graph over patch names

use rvx_errors::CatalogError;
use rvx_types::PatchDescriptor;
use std::collections::{HashMap, HashSet};

/// Name-keyed view of patches and their dependency edges
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    nodes: HashMap<&'a str, &'a PatchDescriptor>,
    order: Vec<&'a str>,
}

impl<'a> DependencyGraph<'a> {
    /// Build a graph from patches; later duplicates of a name are ignored
    pub fn new<I>(patches: I) -> Self
    where
        I: IntoIterator<Item = &'a PatchDescriptor>,
    {
        let mut nodes = HashMap::new();
        let mut order = Vec::new();
        for patch in patches {
            if nodes.insert(patch.name.as_str(), patch).is_none() {
                order.push(patch.name.as_str());
            }
        }
        Self { nodes, order }
    }

    /// Look up a node by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a PatchDescriptor> {
        self.nodes.get(name).copied()
    }

    /// Verify every edge points at a known node
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedDependency` for the first dangling edge.
    pub fn check_references(&self) -> Result<(), CatalogError> {
        for name in &self.order {
            let patch = self.nodes[name];
            if let Some(missing) = patch
                .dependencies
                .iter()
                .find(|dep| !self.nodes.contains_key(dep.as_str()))
            {
                return Err(CatalogError::UnresolvedDependency {
                    patch: patch.name.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Verify the graph has no cycles
    ///
    /// # Errors
    ///
    /// Returns `DependencyCycle` naming the first cycle found.
    pub fn check_acyclic(&self) -> Result<(), CatalogError> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        for name in &self.order {
            self.visit(
                self.nodes[name],
                &|_: &PatchDescriptor| false,
                &mut visited,
                &mut path,
            )?;
        }
        Ok(())
    }

    /// True if a root or anything it transitively depends on satisfies `predicate`.
    ///
    /// Stops at the first match.
    ///
    /// # Errors
    ///
    /// Returns `DependencyCycle` if traversal runs into a cycle before a match,
    /// or `UnresolvedDependency` for an edge to an unknown patch.
    pub fn any_reachable<I, P>(&self, roots: I, predicate: P) -> Result<bool, CatalogError>
    where
        I: IntoIterator<Item = &'a PatchDescriptor>,
        P: Fn(&PatchDescriptor) -> bool,
    {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        for root in roots {
            if self.visit(root, &predicate, &mut visited, &mut path)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn visit<P>(
        &self,
        node: &'a PatchDescriptor,
        predicate: &P,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<bool, CatalogError>
    where
        P: Fn(&PatchDescriptor) -> bool,
    {
        let name = node.name.as_str();
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle: Vec<&str> = path[start..].to_vec();
            cycle.push(name);
            return Err(CatalogError::DependencyCycle {
                cycle: cycle.join(" -> "),
            });
        }
        if !visited.insert(name) {
            return Ok(false);
        }
        if predicate(node) {
            return Ok(true);
        }

        path.push(name);
        for dep in &node.dependencies {
            let child = self
                .get(dep)
                .ok_or_else(|| CatalogError::UnresolvedDependency {
                    patch: node.name.clone(),
                    dependency: dep.clone(),
                })?;
            if self.visit(child, predicate, visited, path)? {
                return Ok(true);
            }
        }
        path.pop();
        Ok(false)
    }
}
