//! Dependency ordering
//!
//! Kahn's algorithm over `depends_on` edges. Among cases whose dependencies
//! are all placed, the earliest declared goes first, so the same registry
//! always yields the same order.

use std::collections::BTreeSet;

use crate::registry::{RegistryError, TestRegistry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("dependency cycle among cases: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Resolve a valid linear execution order (indices into `registry.cases()`).
///
/// # Errors
///
/// Returns [`ScheduleError::Registry`] for unknown dependencies and
/// [`ScheduleError::Cycle`] when the graph is not a DAG.
pub fn order(registry: &TestRegistry) -> Result<Vec<usize>, ScheduleError> {
    registry.validate()?;

    let cases = registry.cases();
    let n = cases.len();
    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, case) in cases.iter().enumerate() {
        // depends_on is a set; repeated ids count once
        let deps: BTreeSet<usize> = case
            .depends_on
            .iter()
            .filter_map(|d| registry.position(d))
            .collect();
        indegree[i] = deps.len();
        for d in deps {
            dependents[d].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dep in &dependents[next] {
            indegree[dep] -= 1;
            if indegree[dep] == 0 {
                ready.insert(dep);
            }
        }
    }

    if order.len() < n {
        return Err(ScheduleError::Cycle(find_cycle(registry, &indegree)));
    }
    Ok(order)
}

/// Group an execution order from [`order`] into dependency depths.
///
/// Depth 0 holds cases without dependencies; every other case sits one level
/// below its deepest dependency. Cases within a level are independent.
#[must_use]
pub fn levels(registry: &TestRegistry, order: &[usize]) -> Vec<Vec<usize>> {
    let cases = registry.cases();
    let mut depth = vec![0usize; cases.len()];
    let mut levels: Vec<Vec<usize>> = Vec::new();

    for &i in order {
        let d = cases[i]
            .depends_on
            .iter()
            .filter_map(|dep| registry.position(dep))
            .map(|p| depth[p] + 1)
            .max()
            .unwrap_or(0);
        depth[i] = d;
        if levels.len() <= d {
            levels.resize_with(d + 1, Vec::new);
        }
        levels[d].push(i);
    }
    levels
}

/// Walk unresolved dependency edges until a case repeats.
fn find_cycle(registry: &TestRegistry, indegree: &[usize]) -> Vec<String> {
    let cases = registry.cases();
    let Some(start) = (0..cases.len()).find(|&i| indegree[i] > 0) else {
        return Vec::new();
    };

    let mut path: Vec<usize> = vec![start];
    let mut current = start;
    loop {
        // every unplaced case has at least one unplaced dependency
        let Some(next) = cases[current]
            .depends_on
            .iter()
            .filter_map(|d| registry.position(d))
            .find(|&p| indegree[p] > 0)
        else {
            return path.iter().map(|&i| cases[i].id.clone()).collect();
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&i| cases[i].id.clone())
                .collect();
            cycle.push(cases[next].id.clone());
            return cycle;
        }
        path.push(next);
        current = next;
    }
}
