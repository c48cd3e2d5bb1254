//! Sprint graph construction.
//!
//! Sprints are stored in an arena and addressed by their position in the
//! phase's declared list. Dependency ids are resolved to indices once, here,
//! so the scheduler works on plain integers.

use crate::errors::GraphError;
use crate::project::Sprint;
use std::collections::{HashMap, HashSet};

/// Index into the phase's sprint list.
pub type SprintIndex = usize;

/// A dependency graph over the sprints of one phase.
#[derive(Debug)]
pub struct SprintGraph {
    /// Sprint ids in declared order
    ids: Vec<String>,
    /// Sprint names in declared order, for diagnostics
    names: Vec<String>,
    /// Index -> sprints it depends on
    dependencies: Vec<Vec<SprintIndex>>,
}

impl SprintGraph {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: SprintIndex) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn name(&self, index: SprintIndex) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Sprints the given sprint depends on.
    pub fn dependencies(&self, index: SprintIndex) -> &[SprintIndex] {
        self.dependencies.get(index).map_or(&[], |v| v.as_slice())
    }

    pub fn dependencies_satisfied(
        &self,
        index: SprintIndex,
        completed: &HashSet<SprintIndex>,
    ) -> bool {
        self.dependencies(index)
            .iter()
            .all(|dep| completed.contains(dep))
    }
}

/// Builder for sprint graphs.
///
/// Building validates ids and edges only. Cycles are left for
/// the scheduler to discover at execution time, when no sprint is ready.
pub struct GraphBuilder<'a> {
    sprints: &'a [Sprint],
}

impl<'a> GraphBuilder<'a> {
    pub fn new(sprints: &'a [Sprint]) -> Self {
        Self { sprints }
    }

    pub fn build(self) -> Result<SprintGraph, GraphError> {
        let mut index_map = HashMap::new();
        for (i, sprint) in self.sprints.iter().enumerate() {
            if index_map.insert(sprint.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateSprint {
                    id: sprint.id.clone(),
                });
            }
        }

        let mut dependencies: Vec<Vec<SprintIndex>> = vec![Vec::new(); self.sprints.len()];

        for (to_idx, sprint) in self.sprints.iter().enumerate() {
            for dep in &sprint.dependencies {
                let from_idx =
                    *index_map
                        .get(dep)
                        .ok_or_else(|| GraphError::UnknownDependency {
                            sprint: sprint.name.clone(),
                            dependency: dep.clone(),
                        })?;

                if !dependencies[to_idx].contains(&from_idx) {
                    dependencies[to_idx].push(from_idx);
                }
            }
        }

        Ok(SprintGraph {
            ids: self.sprints.iter().map(|s| s.id.clone()).collect(),
            names: self.sprints.iter().map(|s| s.name.clone()).collect(),
            dependencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprint(id: &str, deps: Vec<&str>) -> Sprint {
        Sprint::new(id, &format!("Sprint {}", id), "test")
            .with_dependencies(deps.into_iter().map(String::from).collect())
    }

    #[test]
    fn test_build_simple_graph() {
        let sprints = vec![
            sprint("a", vec![]),
            sprint("b", vec!["a"]),
            sprint("c", vec!["a"]),
            sprint("d", vec!["b", "c"]),
        ];

        let graph = GraphBuilder::new(&sprints).build().unwrap();

        assert_eq!(graph.len(), 4);
        assert!(graph.dependencies(0).is_empty());
        assert_eq!(graph.dependencies(3), &[1, 2]);
        assert_eq!(graph.id(2), Some("c"));
        assert_eq!(graph.name(3), Some("Sprint d"));
    }

    #[test]
    fn test_cycles_are_not_rejected_at_build_time() {
        let sprints = vec![sprint("a", vec!["b"]), sprint("b", vec!["a"])];
        assert!(GraphBuilder::new(&sprints).build().is_ok());
    }

    #[test]
    fn test_unknown_dependency() {
        let sprints = vec![sprint("a", vec!["ghost"])];
        let err = GraphBuilder::new(&sprints).build().unwrap_err();
        assert!(matches!(err, GraphError::UnknownDependency { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_duplicate_sprint_id() {
        let sprints = vec![sprint("a", vec![]), sprint("a", vec![])];
        let err = GraphBuilder::new(&sprints).build().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_repeated_dependency_collapses_to_one_edge() {
        let sprints = vec![sprint("a", vec![]), sprint("b", vec!["a", "a"])];
        let graph = GraphBuilder::new(&sprints).build().unwrap();
        assert_eq!(graph.dependencies(1), &[0]);
    }

    #[test]
    fn test_dependencies_satisfied() {
        let sprints = vec![
            sprint("a", vec![]),
            sprint("b", vec!["a"]),
            sprint("c", vec!["a", "b"]),
        ];
        let graph = GraphBuilder::new(&sprints).build().unwrap();
        let mut completed = HashSet::new();

        assert!(graph.dependencies_satisfied(0, &completed));
        assert!(!graph.dependencies_satisfied(1, &completed));

        completed.insert(0);
        assert!(graph.dependencies_satisfied(1, &completed));
        assert!(!graph.dependencies_satisfied(2, &completed));

        completed.insert(1);
        assert!(graph.dependencies_satisfied(2, &completed));
    }
}
