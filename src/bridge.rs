//! Seam for alternate search implementations.
//!
//! An alternate solver receives the same three inputs as puzzle construction
//! (initial board, goal pattern, empty label) and answers with a step count
//! and an ordered action list, or no list when it proved there is no
//! solution. [`ExternalSolver`] talks to a separately built executable over
//! stdin/stdout using JSON:
//!
//! - request: `{"board": [[..]], "goal": [[..]], "empty": 0}`
//! - reply: `{"steps": 81, "actions": [[label, dr, dc], ..]}` or
//!   `{"steps": 0, "actions": null}`
//!
//! The child is polled against the caller's [`AlternateLimits`] and killed
//! once they expire.

use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Label};
use crate::error::BridgeError;
use crate::solver::CancelToken;
use crate::state::Action;

/// How often a running external solver is checked against its limits.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What an alternate solver reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternateOutcome {
    /// Work counter reported by the alternate (its notion of states visited).
    pub steps: usize,
    /// Root-to-goal actions, or `None` when there is no solution.
    pub actions: Option<Vec<Action>>,
}

/// Stop conditions an alternate solver must honour.
#[derive(Clone, Debug, Default)]
pub struct AlternateLimits {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelToken>,
}

impl AlternateLimits {
    /// Whether the deadline has passed or the token was cancelled.
    pub fn expired(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A drop-in replacement for the built-in search engine.
pub trait AlternateSolver {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Solves the puzzle, giving up with an error once `limits` expire.
    fn solve(
        &self,
        board: &Board,
        goal: &Board,
        empty: Label,
        limits: &AlternateLimits,
    ) -> Result<AlternateOutcome, BridgeError>;
}

#[derive(Serialize)]
struct Request {
    board: Vec<Vec<Label>>,
    goal: Vec<Vec<Label>>,
    empty: Label,
}

#[derive(Deserialize)]
struct Reply {
    steps: usize,
    actions: Option<Vec<(Label, i32, i32)>>,
}

impl From<Reply> for AlternateOutcome {
    fn from(reply: Reply) -> Self {
        AlternateOutcome {
            steps: reply.steps,
            actions: reply.actions.map(|actions| {
                actions
                    .into_iter()
                    .map(|(label, dr, dc)| Action::new(label, dr, dc))
                    .collect()
            }),
        }
    }
}

/// Decodes a JSON reply from an alternate solver.
pub fn decode_reply(bytes: &[u8]) -> Result<AlternateOutcome, BridgeError> {
    let reply: Reply = serde_json::from_slice(bytes)?;
    Ok(reply.into())
}

/// Encodes the request sent to an alternate solver.
pub fn encode_request(board: &Board, goal: &Board, empty: Label) -> Result<Vec<u8>, BridgeError> {
    let request = Request {
        board: board.to_rows(),
        goal: goal.to_rows(),
        empty,
    };
    Ok(serde_json::to_vec(&request)?)
}

/// Runs an external executable as the alternate solver.
#[derive(Clone, Debug)]
pub struct ExternalSolver {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalSolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl AlternateSolver for ExternalSolver {
    fn name(&self) -> &str {
        self.program.to_str().unwrap_or("external")
    }

    fn solve(
        &self,
        board: &Board,
        goal: &Board,
        empty: Label,
        limits: &AlternateLimits,
    ) -> Result<AlternateOutcome, BridgeError> {
        let request = encode_request(board, goal, empty)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    BridgeError::Unavailable(format!("{} not found", self.program.display()))
                }
                _ => BridgeError::Unavailable(format!("{}: {e}", self.program.display())),
            })?;

        // drained on their own threads so a chatty child never blocks on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // stdin is closed when dropped, which ends the request
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&request) {
                stop(&mut child);
                return Err(BridgeError::Failed(format!("writing request: {e}")));
            }
        }

        let status = wait_within(&mut child, limits)?;
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(BridgeError::Failed(format!(
                "exited with {}: {}",
                status,
                stderr.trim()
            )));
        }

        decode_reply(&stdout)
    }
}

/// Reads a pipe to the end on a separate thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn collect(reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, BridgeError> {
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };
    reader
        .join()
        .map_err(|_| BridgeError::Failed("output reader panicked".into()))?
        .map_err(|e| BridgeError::Failed(format!("reading output: {e}")))
}

/// Polls the child until it exits, killing it once `limits` expire.
fn wait_within(child: &mut Child, limits: &AlternateLimits) -> Result<ExitStatus, BridgeError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if limits.expired() => {
                stop(child);
                return Err(BridgeError::Failed("stopped at deadline or cancellation".into()));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                stop(child);
                return Err(BridgeError::Failed(format!("waiting for solver: {e}")));
            }
        }
    }
}

fn stop(child: &mut Child) {
    // the child may already have exited; either way it must be reaped
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boards() -> (Board, Board) {
        (
            Board::new(vec![vec![1, 0]]).unwrap(),
            Board::new(vec![vec![0, 1]]).unwrap(),
        )
    }

    #[test]
    fn test_encode_request() {
        let (board, goal) = boards();
        let bytes = encode_request(&board, &goal, 0).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"board":[[1,0]],"goal":[[0,1]],"empty":0}"#
        );
    }

    #[test]
    fn test_decode_solved_reply() {
        let outcome = decode_reply(br#"{"steps": 3, "actions": [[1, 0, 1], [2, -1, 0]]}"#).unwrap();
        assert_eq!(
            outcome,
            AlternateOutcome {
                steps: 3,
                actions: Some(vec![Action::new(1, 0, 1), Action::new(2, -1, 0)]),
            }
        );
    }

    #[test]
    fn test_decode_no_solution_reply() {
        let outcome = decode_reply(br#"{"steps": 12, "actions": null}"#).unwrap();
        assert_eq!(outcome.actions, None);
        assert_eq!(outcome.steps, 12);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_reply(b"not json"),
            Err(BridgeError::Protocol(_))
        ));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let (board, goal) = boards();
        let solver = ExternalSolver::new("/nonexistent/klotski-accelerator");
        let err = solver.solve(&board, &goal, 0, &AlternateLimits::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Unavailable(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_external_program() {
        let (board, goal) = boards();
        let solver = ExternalSolver::new("sh").with_args([
            "-c",
            r#"cat > /dev/null; echo '{"steps": 1, "actions": [[1, 0, 1]]}'"#,
        ]);
        let outcome = solver.solve(&board, &goal, 0, &AlternateLimits::default()).unwrap();
        assert_eq!(outcome.actions, Some(vec![Action::new(1, 0, 1)]));
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_program_is_stopped_at_deadline() {
        let (board, goal) = boards();
        let solver = ExternalSolver::new("sh").with_args(["-c", "cat > /dev/null; exec sleep 5"]);
        let limits = AlternateLimits {
            deadline: Some(Instant::now() + Duration::from_millis(100)),
            cancel: None,
        };

        let started = Instant::now();
        let err = solver.solve(&board, &goal, 0, &limits).unwrap_err();
        assert!(matches!(err, BridgeError::Failed(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[cfg(unix)]
    #[test]
    fn test_cancelled_program_is_stopped() {
        let (board, goal) = boards();
        let solver = ExternalSolver::new("sh").with_args(["-c", "cat > /dev/null; exec sleep 5"]);
        let token = CancelToken::new();
        token.cancel();
        let limits = AlternateLimits {
            deadline: None,
            cancel: Some(token),
        };

        let started = Instant::now();
        assert!(solver.solve(&board, &goal, 0, &limits).is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_output_does_not_block() {
        let (board, goal) = boards();
        // far more stderr than a pipe buffer holds, then a normal reply
        let solver = ExternalSolver::new("sh").with_args([
            "-c",
            r#"cat > /dev/null; head -c 200000 /dev/zero >&2; echo '{"steps": 0, "actions": null}'"#,
        ]);
        let outcome = solver.solve(&board, &goal, 0, &AlternateLimits::default()).unwrap();
        assert_eq!(outcome.actions, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_reports_failure() {
        let (board, goal) = boards();
        let solver = ExternalSolver::new("sh").with_args(["-c", "cat > /dev/null; exit 3"]);
        let err = solver.solve(&board, &goal, 0, &AlternateLimits::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Failed(_)), "got {err:?}");
    }
}
