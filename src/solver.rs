//! Weighted A* search over sliding-block states.
//!
//! Frontier entries are ordered by `f = g + W·h`. With `W > 1` the search
//! leans greedily toward the goal: it finds solutions far faster on real
//! layouts, but the classical A* optimality argument no longer holds and the
//! returned path may be longer than the shortest one.
//!
//! States live in an arena. Each node stores its parent's handle and the
//! action that produced it, so path reconstruction is an index walk. The
//! signature → handle map doubles as the visited set and the best-g table:
//! a signature is pushed onto the frontier at most once, and a cheaper route
//! to a discovered but not yet expanded node re-parents it in place.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::board::Label;
use crate::heuristic::manhattan;
use crate::state::{Action, Rules, State};

/// Weight applied to the heuristic unless configured otherwise.
pub const DEFAULT_WEIGHT: u32 = 100;

/// Expansions between progress reports unless configured otherwise.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10_000;

/// Handle of a node in the search arena.
type NodeId = u32;

/// Frontier key: f-score, then insertion order, then the node it refers to.
type FrontierEntry = Reverse<(u64, u64, NodeId)>;

/// Shared flag a caller sets to stop an in-progress search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tuning and stop conditions for one search.
#[derive(Clone, Debug)]
pub struct SolveConfig {
    /// Heuristic weight `W`. Values below 1 are treated as 1.
    pub weight: u32,
    /// Stop after this many expansions.
    pub max_expansions: Option<usize>,
    /// Stop once this instant has passed.
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelToken>,
    /// Expansions between progress callbacks.
    pub progress_interval: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            max_expansions: None,
            deadline: None,
            cancel: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Counters describing a search, reported while it runs and when it ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States popped from the frontier and expanded.
    pub expanded: usize,
    /// Successor states produced by move generation.
    pub generated: usize,
    /// Distinct signatures seen.
    pub discovered: usize,
    /// Current frontier size.
    pub frontier: usize,
}

/// Why a search stopped before exhausting the frontier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    Cancelled,
    DeadlineExceeded,
    ExpansionLimit,
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Root-to-goal actions. Empty when the root already satisfies the goal.
    Solved(Vec<Action>),
    /// The frontier ran dry without reaching the goal.
    Exhausted,
    Aborted(AbortReason),
}

struct Node {
    state: State,
    parent: Option<NodeId>,
    action: Option<Action>,
    g: u32,
    expanded: bool,
}

/// Runs weighted A* from `root`, calling `progress` every
/// `config.progress_interval` expansions.
pub fn search(
    rules: &Rules,
    root: State,
    config: &SolveConfig,
    progress: &mut dyn FnMut(&SearchStats),
) -> (SearchOutcome, SearchStats) {
    let weight = u64::from(config.weight.max(1));
    let priority = |g: u32, state: &State| {
        u64::from(g) + weight * u64::from(manhattan(rules.goal(), state.board()))
    };

    let mut nodes: Vec<Node> = Vec::new();
    let mut handles: FxHashMap<Box<[Label]>, NodeId> = FxHashMap::default();
    let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::new();
    let mut sequence: u64 = 0;
    let mut stats = SearchStats::default();

    debug!(weight, "starting search");

    frontier.push(Reverse((priority(0, &root), sequence, 0)));
    sequence += 1;
    handles.insert(root.signature().into(), 0);
    nodes.push(Node {
        state: root,
        parent: None,
        action: None,
        g: 0,
        expanded: false,
    });

    while let Some(Reverse((_, _, current))) = frontier.pop() {
        let current_g = nodes[current as usize].g;

        if nodes[current as usize].state.is_terminal(rules) {
            stats.discovered = handles.len();
            stats.frontier = frontier.len();
            debug!(?stats, steps = current_g, "goal reached");
            return (SearchOutcome::Solved(reconstruct_path(&nodes, current)), stats);
        }

        if let Some(reason) = stop_reason(config, &stats) {
            stats.discovered = handles.len();
            stats.frontier = frontier.len() + 1;
            debug!(?stats, ?reason, "search aborted");
            return (SearchOutcome::Aborted(reason), stats);
        }

        stats.expanded += 1;
        nodes[current as usize].expanded = true;
        let tentative_g = current_g + 1;

        // successors are collected first: the arena grows while they are recorded
        let successors: Vec<(Action, State)> =
            nodes[current as usize].state.enumerate_moves(rules).collect();
        stats.generated += successors.len();

        for (action, next) in successors {
            match handles.get(next.signature()) {
                Some(&known) => {
                    let node = &mut nodes[known as usize];
                    // expanded nodes keep their parent: their children were
                    // generated from the board they hold now
                    if !node.expanded && tentative_g < node.g {
                        node.g = tentative_g;
                        node.parent = Some(current);
                        node.action = Some(action);
                        node.state = next;
                    }
                }
                None => {
                    let id = nodes.len() as NodeId;
                    frontier.push(Reverse((priority(tentative_g, &next), sequence, id)));
                    sequence += 1;
                    handles.insert(next.signature().into(), id);
                    nodes.push(Node {
                        state: next,
                        parent: Some(current),
                        action: Some(action),
                        g: tentative_g,
                        expanded: false,
                    });
                }
            }
        }

        if config.progress_interval > 0 && stats.expanded % config.progress_interval == 0 {
            stats.discovered = handles.len();
            stats.frontier = frontier.len();
            progress(&stats);
        }
    }

    stats.discovered = handles.len();
    stats.frontier = 0;
    debug!(?stats, "frontier exhausted");
    (SearchOutcome::Exhausted, stats)
}

/// Checks the configured stop conditions before an expansion.
pub(crate) fn stop_reason(config: &SolveConfig, stats: &SearchStats) -> Option<AbortReason> {
    if config.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
        return Some(AbortReason::Cancelled);
    }
    if config.max_expansions.is_some_and(|limit| stats.expanded >= limit) {
        return Some(AbortReason::ExpansionLimit);
    }
    if config.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Some(AbortReason::DeadlineExceeded);
    }
    None
}

/// Walks parent links from `goal` back to the root and returns the actions
/// in root-to-goal order.
fn reconstruct_path(nodes: &[Node], goal: NodeId) -> Vec<Action> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);

    while let Some(id) = cursor {
        let node = &nodes[id as usize];
        match node.action {
            Some(action) => path.push(action),
            None => break,
        }
        cursor = node.parent;
    }

    path.reverse();
    path
}
