//! Sprint scheduler: ready sets, completion tracking and wave preview.
//!
//! A ready set is every sprint that is not yet completed and whose
//! dependencies are all completed. Ready sets are returned in declared list
//! order; callers process them sequentially in that order.

use crate::dag::builder::{GraphBuilder, SprintGraph, SprintIndex};
use crate::errors::GraphError;
use crate::project::Sprint;
use std::collections::HashSet;

/// Tracks which sprints of one phase have completed and which are ready.
#[derive(Debug)]
pub struct SprintScheduler {
    graph: SprintGraph,
    completed: HashSet<SprintIndex>,
}

impl SprintScheduler {
    /// Build a scheduler from a phase's sprint list.
    ///
    /// Sprints already marked completed (from an earlier, interrupted run)
    /// seed the completed set, so they are never scheduled again.
    pub fn from_sprints(sprints: &[Sprint]) -> Result<Self, GraphError> {
        let graph = GraphBuilder::new(sprints).build()?;
        let completed = sprints
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_completed())
            .map(|(i, _)| i)
            .collect();

        Ok(Self { graph, completed })
    }

    pub fn sprint_count(&self) -> usize {
        self.graph.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_finished(&self) -> bool {
        self.completed.len() >= self.graph.len()
    }

    /// Sprints ready to run now, in declared order.
    pub fn ready_set(&self) -> Vec<SprintIndex> {
        (0..self.graph.len())
            .filter(|i| !self.completed.contains(i))
            .filter(|&i| self.graph.dependencies_satisfied(i, &self.completed))
            .collect()
    }

    /// Next batch to execute.
    ///
    /// Returns an empty batch once everything is completed. If incomplete
    /// sprints remain but none is ready, the graph is structurally invalid
    /// and a `Cycle` error names the blocked sprints.
    pub fn next_batch(&self) -> Result<Vec<SprintIndex>, GraphError> {
        if self.is_finished() {
            return Ok(Vec::new());
        }

        let ready = self.ready_set();
        if ready.is_empty() {
            let blocked = (0..self.graph.len())
                .filter(|i| !self.completed.contains(i))
                .filter_map(|i| self.graph.name(i).map(str::to_string))
                .collect();
            return Err(GraphError::Cycle { blocked });
        }

        Ok(ready)
    }

    pub fn mark_completed(&mut self, index: SprintIndex) {
        if index < self.graph.len() {
            self.completed.insert(index);
        }
    }

    /// Preview of execution batches from the current state.
    ///
    /// Each wave holds sprint ids that would become ready together. Sprints
    /// stuck behind a cycle never appear.
    pub fn compute_waves(&self) -> Vec<Vec<String>> {
        let mut waves = Vec::new();
        let mut completed = self.completed.clone();

        loop {
            let ready: Vec<SprintIndex> = (0..self.graph.len())
                .filter(|i| !completed.contains(i))
                .filter(|&i| self.graph.dependencies_satisfied(i, &completed))
                .collect();

            if ready.is_empty() {
                break;
            }

            completed.extend(ready.iter().copied());
            waves.push(
                ready
                    .iter()
                    .filter_map(|&i| self.graph.id(i).map(str::to_string))
                    .collect(),
            );
        }

        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SprintStatus;

    fn sprint(id: &str, deps: Vec<&str>) -> Sprint {
        Sprint::new(id, id, "test").with_dependencies(deps.into_iter().map(String::from).collect())
    }

    #[test]
    fn test_wave_computation_linear() {
        let sprints = vec![sprint("a", vec![]), sprint("b", vec!["a"]), sprint("c", vec!["b"])];
        let scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        let waves = scheduler.compute_waves();
        assert_eq!(waves, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn test_wave_computation_fan_out() {
        let sprints = vec![sprint("a", vec![]), sprint("b", vec!["a"]), sprint("c", vec!["a"])];
        let scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        let waves = scheduler.compute_waves();
        assert_eq!(waves, vec![vec!["a".to_string()], vec!["b".into(), "c".into()]]);
    }

    #[test]
    fn test_ready_set_follows_list_order() {
        let sprints = vec![
            sprint("a", vec![]),
            sprint("c", vec!["a"]),
            sprint("b", vec!["a"]),
        ];
        let mut scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        assert_eq!(scheduler.next_batch().unwrap(), vec![0]);

        scheduler.mark_completed(0);
        assert_eq!(scheduler.next_batch().unwrap(), vec![1, 2]);

        scheduler.mark_completed(1);
        scheduler.mark_completed(2);
        assert!(scheduler.is_finished());
        assert!(scheduler.next_batch().unwrap().is_empty());
    }

    #[test]
    fn test_cycle_detected_when_nothing_ready() {
        let sprints = vec![sprint("a", vec!["b"]), sprint("b", vec!["a"])];
        let scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        let err = scheduler.next_batch().unwrap_err();
        match err {
            GraphError::Cycle { blocked } => assert_eq!(blocked, vec!["a", "b"]),
            other => panic!("Expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_behind_valid_prefix() {
        let sprints = vec![
            sprint("a", vec![]),
            sprint("b", vec!["a", "c"]),
            sprint("c", vec!["b"]),
        ];
        let mut scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        assert_eq!(scheduler.next_batch().unwrap(), vec![0]);
        scheduler.mark_completed(0);
        assert!(matches!(
            scheduler.next_batch(),
            Err(GraphError::Cycle { .. })
        ));
        assert_eq!(scheduler.compute_waves(), Vec::<Vec<String>>::new());
    }

    #[test]
    fn test_seeded_with_completed_sprints() {
        let mut sprints = vec![sprint("a", vec![]), sprint("b", vec!["a"]), sprint("c", vec!["a"])];
        sprints[0].status = SprintStatus::Completed;
        let scheduler = SprintScheduler::from_sprints(&sprints).unwrap();
        assert_eq!(scheduler.completed_count(), 1);
        assert_eq!(scheduler.next_batch().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_empty_sprint_list_is_finished() {
        let scheduler = SprintScheduler::from_sprints(&[]).unwrap();
        assert!(scheduler.is_finished());
        assert!(scheduler.next_batch().unwrap().is_empty());
        assert!(scheduler.compute_waves().is_empty());
    }
}
