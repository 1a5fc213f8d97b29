//! Cycle detection.

use crate::graph::StepGraph;
use recovery_core::StepId;
use std::collections::HashSet;

impl StepGraph {
    /// Find dependency cycles with a depth-first walk along `dependency -> dependent` edges.
    ///
    /// Each cycle is the recursion-stack segment from the first occurrence of
    /// the repeated step up to and including the repeat, so it starts and ends
    /// on the same id. Every back edge yields one cycle.
    pub fn detect_cycles(&self) -> Vec<Vec<StepId>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<&StepId> = HashSet::new();

        for start in self.ids() {
            if !visited.insert(start) {
                continue;
            }

            let mut path: Vec<&StepId> = vec![start];
            let mut on_stack: HashSet<&StepId> = HashSet::from([start]);
            let mut frames: Vec<(&StepId, usize)> = vec![(start, 0)];

            while let Some(&(node, next)) = frames.last() {
                let Some(child) = self.dependents(node).get(next) else {
                    on_stack.remove(node);
                    path.pop();
                    frames.pop();
                    continue;
                };

                if let Some(top) = frames.last_mut() {
                    top.1 += 1;
                }

                if on_stack.contains(child) {
                    let begin = path.iter().position(|id| *id == child).unwrap_or(0);
                    let mut cycle: Vec<StepId> = path[begin..].iter().map(|id| (*id).clone()).collect();
                    cycle.push(child.clone());
                    cycles.push(cycle);
                } else if visited.insert(child) {
                    on_stack.insert(child);
                    path.push(child);
                    frames.push((child, 0));
                }
            }
        }

        cycles
    }
}
