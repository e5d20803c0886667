//! Dependency planning
//!
//! Turns a package and its transitive `installDependencies` into an install
//! order: dependencies before dependents, each package once, the requested
//! package last. Uses iterative DFS with node state tracking (no recursion,
//! so deep graphs cannot overflow the stack) and fails on cycles.
//!
//! Recipes are resolved lazily while walking, so a name reached through two
//! paths is fetched only once.

use std::collections::HashMap;

use crate::core::error::{InstallError, Result};
use crate::recipe::PackageDescriptor;
use crate::resolver::RecipeSource;

/// Node state for DFS traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    /// On the current DFS path
    Processing,
    /// Fully processed (all dependencies planned)
    Processed,
}

/// Compute the install order for `root`.
///
/// Every strategy in the graph is validated while planning, so an unknown
/// strategy anywhere aborts before anything is installed. Failures tied to
/// a dependency are reported as `DependencyInstallFailed`.
pub fn plan<S: RecipeSource + ?Sized>(
    root: PackageDescriptor,
    source: &S,
) -> Result<Vec<PackageDescriptor>> {
    root.strategy.ensure_supported()?;

    let root_name = root.name.clone();
    let mut state: HashMap<String, NodeState> = HashMap::new();
    let mut descriptors: HashMap<String, PackageDescriptor> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    state.insert(root_name.clone(), NodeState::Processing);
    descriptors.insert(root_name.clone(), root);

    // Stack holds (node_name, index_of_next_dependency_to_visit)
    let mut stack: Vec<(String, usize)> = vec![(root_name.clone(), 0)];

    while let Some((node, next)) = stack.pop() {
        let dep = descriptors
            .get(&node)
            .and_then(|d| d.install_dependencies.get(next))
            .cloned();

        let Some(dep) = dep else {
            // All dependencies planned - finalize this node
            state.insert(node.clone(), NodeState::Processed);
            order.push(node);
            continue;
        };

        stack.push((node, next + 1));

        match state.get(&dep) {
            Some(NodeState::Processed) => {}
            Some(NodeState::Processing) => {
                let start = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|(n, _)| n.clone()).collect();
                path.push(dep);
                return Err(InstallError::DependencyCycle { path });
            }
            None => {
                let descriptor = source
                    .resolve(&dep)
                    .and_then(|d| d.strategy.ensure_supported().map(|()| d))
                    .map_err(|e| InstallError::DependencyInstallFailed {
                        package: root_name.clone(),
                        dependency: dep.clone(),
                        source: Box::new(e),
                    })?;

                tracing::debug!(
                    "planned dependency '{}' ({} dependencies)",
                    dep,
                    descriptor.install_dependencies.len()
                );
                state.insert(dep.clone(), NodeState::Processing);
                descriptors.insert(dep.clone(), descriptor);
                stack.push((dep, 0));
            }
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|name| descriptors.remove(&name))
        .collect())
}
