//! Dependency ordering and cycle detection for planned sessions.
//!
//! Sessions refer to each other by name, so names must be unique within a
//! plan. Ordering tolerates cycles and dangling references; reporting them is
//! left to the validator.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use sessionplan_core::PlannedSession;
use tracing::warn;
use crate::{PlanError, Result, TaskCatalog};

/// Order sessions so every session follows the sessions it depends on.
///
/// Works in batches: each round places every session whose dependencies are
/// all placed, highest priority first (ties keep input order). When no
/// session is ready (a cycle, or a dependency that is not in the plan) the
/// highest-priority remaining session is forced in. The forced pick is a
/// best-effort way to guarantee progress, not a policy that minimizes how
/// many dependencies end up violated.
pub fn order_sessions(sessions: Vec<PlannedSession>) -> Vec<PlannedSession> {
    let mut ordered = Vec::with_capacity(sessions.len());
    let mut placed: HashSet<String> = HashSet::new();
    let mut remaining = sessions;

    while !remaining.is_empty() {
        let (mut ready, mut rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|s| s.dependencies.iter().all(|d| placed.contains(d)));

        if ready.is_empty() {
            let forced = rest
                .iter()
                .enumerate()
                .min_by_key(|(i, s)| (Reverse(s.priority), *i))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let session = rest.remove(forced);
            warn!(
                "No session has all dependencies placed; forcing '{}' (priority {})",
                session.name, session.priority
            );
            ready.push(session);
        }

        ready.sort_by(|a, b| b.priority.cmp(&a.priority));
        placed.extend(ready.iter().map(|s| s.name.clone()));
        ordered.extend(ready);
        remaining = rest;
    }

    ordered
}

/// Whether every in-plan dependency of each session appears before it.
///
/// Dependencies on names outside the plan are ignored.
pub fn is_dependency_order(sessions: &[PlannedSession]) -> bool {
    let names: HashSet<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for session in sessions {
        let satisfied = session
            .dependencies
            .iter()
            .filter(|d| names.contains(d.as_str()))
            .all(|d| seen.contains(d.as_str()));
        if !satisfied {
            return false;
        }
        seen.insert(session.name.as_str());
    }
    true
}

/// Find dependency cycles with a depth-first search.
///
/// Every back-edge into a session that is still on the recursion stack is
/// reported as the path from that session around to itself, e.g.
/// `["A", "B", "C", "A"]`.
pub fn find_cycles(sessions: &[PlannedSession]) -> Vec<Vec<String>> {
    let graph: HashMap<&str, &PlannedSession> =
        sessions.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut visiting: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();

    for session in sessions {
        if !visited.contains(session.name.as_str()) {
            visit(session.name.as_str(), &graph, &mut visited, &mut visiting, &mut path, &mut cycles);
        }
    }

    cycles
}

fn visit<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, &'a PlannedSession>,
    visited: &mut HashSet<&'a str>,
    visiting: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    visiting.insert(node);
    path.push(node);

    if let Some(session) = graph.get(node) {
        for dep in &session.dependencies {
            let Some((&dep, _)) = graph.get_key_value(dep.as_str()) else {
                continue;
            };
            if visiting.contains(dep) {
                if let Some(start) = path.iter().position(|n| *n == dep) {
                    let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(dep.to_string());
                    cycles.push(cycle);
                }
            } else if !visited.contains(dep) {
                visit(dep, graph, visited, visiting, path, cycles);
            }
        }
    }

    path.pop();
    visiting.remove(node);
}

/// Reject plans where two sessions share a name.
pub fn ensure_unique_names(sessions: &[PlannedSession]) -> Result<()> {
    let mut seen = HashSet::new();
    for session in sessions {
        if !seen.insert(session.name.as_str()) {
            return Err(PlanError::DuplicateTask(session.name.clone()));
        }
    }
    Ok(())
}

/// Reject sessions that depend on names known neither to the catalog nor to the plan.
pub fn ensure_known_dependencies(sessions: &[PlannedSession], catalog: &TaskCatalog) -> Result<()> {
    let in_plan: HashSet<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
    for session in sessions {
        for dep in &session.dependencies {
            if !in_plan.contains(dep.as_str()) && !catalog.contains(dep) {
                return Err(PlanError::UnknownDependency {
                    session: session.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}
