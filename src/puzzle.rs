//! Public puzzle facade: construction, interactive moves and solving.

use std::fmt;

use tracing::{debug, info, warn};

use crate::board::{Board, Label};
use crate::bridge::{AlternateLimits, AlternateOutcome, AlternateSolver};
use crate::error::PuzzleError;
use crate::solver::{search, stop_reason, AbortReason, SearchOutcome, SearchStats, SolveConfig};
use crate::state::{Action, Rules, State};

/// Final answer of [`Puzzle::solve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolutionResult {
    /// Ordered actions from the puzzle's current board to a goal board.
    Solved(Vec<Action>),
    NoSolution,
    /// The search stopped early on a configured limit or cancellation.
    Aborted(AbortReason),
}

impl SolutionResult {
    pub fn actions(&self) -> Option<&[Action]> {
        match self {
            SolutionResult::Solved(actions) => Some(actions),
            _ => None,
        }
    }
}

/// Which implementation produced a result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Internal,
    Alternate(String),
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Internal => write!(f, "built-in engine"),
            Backend::Alternate(name) => write!(f, "alternate solver {name}"),
        }
    }
}

/// A solve result together with the work it took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveReport {
    pub result: SolutionResult,
    pub stats: SearchStats,
    pub backend: Backend,
}

/// A sliding-block puzzle: its rules, where it started and where it is now.
pub struct Puzzle {
    rules: Rules,
    initial: State,
    state: State,
    history: Vec<Action>,
    alternate: Option<Box<dyn AlternateSolver>>,
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("board", self.state.board())
            .field("history", &self.history)
            .field("alternate", &self.alternate.as_ref().map(|a| a.name()))
            .finish_non_exhaustive()
    }
}

/// Builds a puzzle from nested rows, validating both grids.
pub fn new_puzzle(
    board: Vec<Vec<Label>>,
    goal_pattern: Vec<Vec<Label>>,
    empty: Label,
) -> Result<Puzzle, PuzzleError> {
    Puzzle::new(Board::new(board)?, Board::new(goal_pattern)?, empty)
}

impl Puzzle {
    /// Validates the definition and builds the block catalog and goal mask.
    pub fn new(board: Board, goal_pattern: Board, empty: Label) -> Result<Self, PuzzleError> {
        let rules = Rules::new(&board, goal_pattern, empty)?;
        let initial = State::new(&rules, board);
        debug!(
            blocks = rules.catalog().len(),
            classes = rules.catalog().class_count(),
            "puzzle built"
        );
        Ok(Self {
            state: initial.clone(),
            initial,
            rules,
            history: Vec::new(),
            alternate: None,
        })
    }

    /// Configures the alternate solver tried first by `solve(true)`.
    pub fn with_alternate(mut self, alternate: Box<dyn AlternateSolver>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn empty(&self) -> Label {
        self.rules.empty()
    }

    #[inline]
    pub fn current_board(&self) -> &Board {
        self.state.board()
    }

    #[inline]
    pub fn initial_board(&self) -> &Board {
        self.initial.board()
    }

    #[inline]
    pub fn goal_pattern(&self) -> &Board {
        self.rules.goal().pattern()
    }

    /// Actions applied through [`Puzzle::apply_move`] since construction or reset.
    #[inline]
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_terminal(&self.rules)
    }

    /// Attempts a slide on the current board. Leaves the puzzle unchanged
    /// and returns false when the slide is illegal.
    pub fn apply_move(&mut self, label: Label, dr: i32, dc: i32) -> bool {
        match self.state.slide(&self.rules, label, dr, dc) {
            Some(next) => {
                self.state = next;
                self.history.push(Action::new(label, dr, dc));
                true
            }
            None => false,
        }
    }

    /// Returns to the initial board and clears the history.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.history.clear();
    }

    /// Replays `actions` from the initial board.
    ///
    /// Fails with the index of the first illegal action.
    pub fn replay(&self, actions: &[Action]) -> Result<State, usize> {
        replay_from(&self.rules, &self.initial, actions)
    }

    /// Solves from the current board with the default configuration.
    ///
    /// States are merged by block shape while the goal compares exact
    /// labels. A goal that can only be met by swapping two same-shaped
    /// blocks is therefore reported as [`SolutionResult::NoSolution`].
    pub fn solve(&self, use_alternate: bool) -> SolveReport {
        self.solve_with(use_alternate, &SolveConfig::default(), &mut |_| {})
    }

    /// Solves from the current board.
    ///
    /// With `use_alternate`, the configured alternate solver is tried first
    /// under the same deadline and cancellation token. If it is missing, fails,
    /// runs out of time, or returns a path that does not replay to the goal,
    /// the built-in engine runs instead.
    pub fn solve_with(
        &self,
        use_alternate: bool,
        config: &SolveConfig,
        progress: &mut dyn FnMut(&SearchStats),
    ) -> SolveReport {
        if use_alternate {
            if let Some(report) = self.try_alternate(config) {
                return report;
            }
        }

        let (outcome, stats) = search(&self.rules, self.state.clone(), config, progress);
        let result = match outcome {
            SearchOutcome::Solved(actions) => SolutionResult::Solved(actions),
            SearchOutcome::Exhausted => SolutionResult::NoSolution,
            SearchOutcome::Aborted(reason) => SolutionResult::Aborted(reason),
        };
        info!(
            expanded = stats.expanded,
            steps = ?result.actions().map(<[Action]>::len),
            "built-in engine finished"
        );

        SolveReport {
            result,
            stats,
            backend: Backend::Internal,
        }
    }

    /// Runs the alternate solver. `None` means fall back to the built-in engine.
    fn try_alternate(&self, config: &SolveConfig) -> Option<SolveReport> {
        let Some(alternate) = self.alternate.as_deref() else {
            debug!("no alternate solver configured");
            return None;
        };
        if let Some(reason) = stop_reason(config, &SearchStats::default()) {
            debug!(?reason, "skipping alternate solver");
            return None;
        }
        let backend = Backend::Alternate(alternate.name().to_owned());
        let limits = AlternateLimits {
            deadline: config.deadline,
            cancel: config.cancel.clone(),
        };

        let outcome = match alternate.solve(
            self.state.board(),
            self.rules.goal().pattern(),
            self.rules.empty(),
            &limits,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%e, "alternate solver failed, using built-in engine");
                return None;
            }
        };

        let AlternateOutcome { steps, actions } = outcome;
        let stats = SearchStats {
            expanded: steps,
            ..SearchStats::default()
        };

        let Some(actions) = actions else {
            info!(steps, "alternate solver found no solution");
            return Some(SolveReport {
                result: SolutionResult::NoSolution,
                stats,
                backend,
            });
        };

        match replay_from(&self.rules, &self.state, &actions) {
            Ok(end) if end.is_terminal(&self.rules) => {
                info!(steps, moves = actions.len(), "alternate solver finished");
                Some(SolveReport {
                    result: SolutionResult::Solved(actions),
                    stats,
                    backend,
                })
            }
            Ok(_) => {
                warn!("alternate solver path does not reach the goal, using built-in engine");
                None
            }
            Err(index) => {
                warn!(index, "alternate solver path has an illegal move, using built-in engine");
                None
            }
        }
    }
}

fn replay_from(rules: &Rules, start: &State, actions: &[Action]) -> Result<State, usize> {
    let mut state = start.clone();
    for (index, action) in actions.iter().enumerate() {
        state = state
            .slide(rules, action.label, action.dr, action.dc)
            .ok_or(index)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::bridge::ExternalSolver;
    use crate::error::BridgeError;
    use crate::solver::CancelToken;

    fn classic() -> Puzzle {
        new_puzzle(
            vec![
                vec![10, 1, 1, 2],
                vec![10, 1, 1, 2],
                vec![3, 4, 4, 5],
                vec![3, 6, 7, 5],
                vec![8, 0, 0, 9],
            ],
            vec![
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
                vec![0, 1, 1, 0],
                vec![0, 1, 1, 0],
            ],
            0,
        )
        .unwrap()
    }

    /// Alternate that returns a fixed answer and counts its calls.
    struct Scripted {
        reply: Result<Option<Vec<Action>>, ()>,
        calls: Rc<Cell<usize>>,
    }

    impl AlternateSolver for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn solve(
            &self,
            _: &Board,
            _: &Board,
            _: Label,
            _: &AlternateLimits,
        ) -> Result<AlternateOutcome, BridgeError> {
            self.calls.set(self.calls.get() + 1);
            match &self.reply {
                Ok(actions) => Ok(AlternateOutcome {
                    steps: 7,
                    actions: actions.clone(),
                }),
                Err(()) => Err(BridgeError::Failed("scripted failure".into())),
            }
        }
    }

    fn scripted(reply: Result<Option<Vec<Action>>, ()>) -> (Box<dyn AlternateSolver>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let solver = Scripted {
            reply,
            calls: Rc::clone(&calls),
        };
        (Box::new(solver), calls)
    }

    #[test]
    fn test_new_puzzle_validates_input() {
        let err = new_puzzle(vec![vec![1, 0]], vec![vec![0], vec![1]], 0).err();
        assert_eq!(
            err,
            Some(PuzzleError::ShapeMismatch {
                board: (1, 2),
                goal: (2, 1)
            })
        );

        let err = new_puzzle(vec![vec![1, 0, 1]], vec![vec![0, 0, 0]], 0).err();
        assert_eq!(err, Some(PuzzleError::DisconnectedBlock { label: 1, regions: 2 }));

        let err = new_puzzle(vec![vec![1, 0], vec![1]], vec![vec![0, 0], vec![0, 0]], 0).err();
        assert!(matches!(err, Some(PuzzleError::RaggedRow { row: 1, .. })));
    }

    #[test]
    fn test_apply_move_and_inverse() {
        let mut puzzle = classic();
        let before = puzzle.current_board().clone();

        assert!(puzzle.apply_move(6, 1, 0));
        assert_ne!(puzzle.current_board(), &before);
        assert!(puzzle.apply_move(6, -1, 0));
        assert_eq!(puzzle.current_board(), &before);
        assert_eq!(puzzle.history(), &[Action::new(6, 1, 0), Action::new(6, -1, 0)]);
    }

    #[test]
    fn test_illegal_move_leaves_puzzle_unchanged() {
        let mut puzzle = classic();
        let before = puzzle.current_board().clone();
        assert!(!puzzle.apply_move(1, 1, 0));
        assert!(!puzzle.apply_move(6, 1, 1));
        assert!(!puzzle.apply_move(99, 1, 0));
        assert_eq!(puzzle.current_board(), &before);
        assert!(puzzle.history().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_board() {
        let mut puzzle = classic();
        assert!(puzzle.apply_move(8, 0, 1));
        puzzle.reset();
        assert_eq!(puzzle.current_board(), puzzle.initial_board());
        assert!(puzzle.history().is_empty());
    }

    #[test]
    fn test_solves_classic_layout() {
        let puzzle = classic();
        let report = puzzle.solve(false);
        assert_eq!(report.backend, Backend::Internal);
        assert!(report.stats.expanded > 0);

        let SolutionResult::Solved(actions) = report.result else {
            panic!("expected a solution, got {:?}", report.result);
        };
        assert!(!actions.is_empty());

        let mut player = classic();
        for action in &actions {
            assert!(player.apply_move(action.label, action.dr, action.dc), "illegal {action}");
        }
        assert!(player.is_solved());
    }

    #[test]
    fn test_solve_is_deterministic() {
        let puzzle = classic();
        let first = puzzle.solve(false);
        let second = puzzle.solve(false);
        assert_eq!(first.result, second.result);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn test_already_solved_returns_empty_path() {
        let puzzle = new_puzzle(
            vec![vec![2, 0, 0], vec![0, 1, 1]],
            vec![vec![0, 0, 0], vec![0, 1, 1]],
            0,
        )
        .unwrap();
        let report = puzzle.solve(false);
        assert_eq!(report.result, SolutionResult::Solved(vec![]));
        assert_eq!(report.stats.expanded, 0);
    }

    #[test]
    fn test_boxed_goal_block_has_no_solution() {
        let puzzle = new_puzzle(
            vec![
                vec![9, 9, 9, 9, 0],
                vec![9, 1, 1, 9, 0],
                vec![9, 1, 1, 9, 0],
                vec![9, 9, 9, 9, 0],
                vec![0, 0, 0, 0, 5],
            ],
            vec![
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 1, 1, 0, 0],
                vec![0, 1, 1, 0, 0],
            ],
            0,
        )
        .unwrap();
        let report = puzzle.solve(false);
        assert_eq!(report.result, SolutionResult::NoSolution);
        // block 5 roams the nine free cells; nothing else ever moves
        assert_eq!(report.stats.discovered, 9);
        assert_eq!(report.stats.expanded, 9);
    }

    #[test]
    fn test_solve_starts_from_current_board() {
        let mut puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0).unwrap();
        assert!(puzzle.apply_move(1, 0, 1));
        let report = puzzle.solve(false);
        assert_eq!(report.result, SolutionResult::Solved(vec![Action::new(1, 0, 1)]));
    }

    #[test]
    fn test_alternate_result_is_used() {
        let path = vec![Action::new(1, 0, 1), Action::new(1, 0, 1)];
        let (alternate, calls) = scripted(Ok(Some(path.clone())));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);

        let report = puzzle.solve(true);
        assert_eq!(report.result, SolutionResult::Solved(path));
        assert_eq!(report.backend, Backend::Alternate("scripted".into()));
        assert_eq!(report.stats.expanded, 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_alternate_no_solution_is_reported() {
        let (alternate, _) = scripted(Ok(None));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);
        assert_eq!(puzzle.solve(true).result, SolutionResult::NoSolution);
    }

    #[test]
    fn test_alternate_failure_falls_back() {
        let (alternate, calls) = scripted(Err(()));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);

        let report = puzzle.solve(true);
        assert_eq!(report.backend, Backend::Internal);
        assert_eq!(report.result.actions().map(<[Action]>::len), Some(2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_invalid_alternate_path_falls_back() {
        // the path stops one slide short of the goal
        let (alternate, _) = scripted(Ok(Some(vec![Action::new(1, 0, 1)])));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);
        let report = puzzle.solve(true);
        assert_eq!(report.backend, Backend::Internal);
        assert!(matches!(report.result, SolutionResult::Solved(ref a) if a.len() == 2));

        // the path contains an illegal slide
        let (alternate, _) = scripted(Ok(Some(vec![Action::new(1, 0, -1)])));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);
        assert_eq!(puzzle.solve(true).backend, Backend::Internal);
    }

    #[test]
    fn test_missing_external_solver_falls_back() {
        let puzzle = classic().with_alternate(Box::new(ExternalSolver::new(
            "/nonexistent/klotski-accelerator",
        )));
        let report = puzzle.solve(true);
        assert_eq!(report.backend, Backend::Internal);
        assert!(matches!(report.result, SolutionResult::Solved(_)));
    }

    #[test]
    fn test_alternate_skipped_unless_requested() {
        let (alternate, calls) = scripted(Err(()));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);
        puzzle.solve(false);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_swapping_same_shaped_blocks_is_not_searched() {
        // 6 and 7 share a shape, so every board reachable here has the
        // signature of the start and the goal is never popped
        let mut puzzle = new_puzzle(vec![vec![6, 7], vec![0, 0]], vec![vec![7, 6], vec![0, 0]], 0)
            .unwrap();
        let report = puzzle.solve(false);
        assert_eq!(report.result, SolutionResult::NoSolution);

        // the swap is still reachable by hand
        for (label, dr, dc) in [(6, 1, 0), (7, 0, -1), (6, 0, 1), (6, -1, 0)] {
            assert!(puzzle.apply_move(label, dr, dc));
        }
        assert!(puzzle.is_solved());
    }

    #[test]
    fn test_cancelled_solve_skips_alternate() {
        let (alternate, calls) = scripted(Ok(None));
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(alternate);
        let token = CancelToken::new();
        token.cancel();
        let config = SolveConfig {
            cancel: Some(token),
            ..SolveConfig::default()
        };

        let report = puzzle.solve_with(true, &config, &mut |_| {});
        assert_eq!(report.result, SolutionResult::Aborted(AbortReason::Cancelled));
        assert_eq!(report.backend, Backend::Internal);
        assert_eq!(calls.get(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_external_solver_respects_deadline() {
        let alternate = ExternalSolver::new("sh").with_args(["-c", "cat > /dev/null; exec sleep 5"]);
        let puzzle = new_puzzle(vec![vec![1, 0, 0]], vec![vec![0, 0, 1]], 0)
            .unwrap()
            .with_alternate(Box::new(alternate));
        let config = SolveConfig {
            deadline: Some(Instant::now() + Duration::from_millis(100)),
            ..SolveConfig::default()
        };

        let started = Instant::now();
        let report = puzzle.solve_with(true, &config, &mut |_| {});
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
        assert_eq!(report.backend, Backend::Internal);
        assert_eq!(
            report.result,
            SolutionResult::Aborted(AbortReason::DeadlineExceeded)
        );
    }

    #[test]
    fn test_replay_reports_first_illegal_action() {
        let puzzle = classic();
        let actions = [Action::new(6, 1, 0), Action::new(1, 1, 0)];
        assert_eq!(puzzle.replay(&actions).err(), Some(1));
        assert!(puzzle.replay(&actions[..1]).is_ok());
    }
}
