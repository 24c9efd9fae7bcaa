//! Text formats for puzzle definitions and solutions.
//!
//! Puzzle file (`#` starts a comment, blank lines are ignored):
//!
//! ```text
//! empty 0
//! board
//! 10 1 1 2
//! 10 1 1 2
//! goal
//! 0 0 0 0
//! 0 1 1 0
//! ```
//!
//! `empty` is optional and defaults to 0. Rows are whitespace-separated labels.
//!
//! Solution file: one action per line as `label dr dc`, preceded by a comment
//! with the move count.

use std::fs;
use std::path::Path;

use crate::board::{Board, Label};
use crate::error::LoadError;
use crate::puzzle::Puzzle;
use crate::state::Action;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Board,
    Goal,
}

/// Parses a puzzle definition.
pub fn parse_puzzle(text: &str) -> Result<Puzzle, LoadError> {
    let mut empty: Label = 0;
    let mut section = Section::Header;
    let mut board_rows: Vec<Vec<Label>> = Vec::new();
    let mut goal_rows: Vec<Vec<Label>> = Vec::new();

    for (line_index, raw) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "board" => section = Section::Board,
            "goal" => section = Section::Goal,
            _ if line.starts_with("empty") => {
                if section != Section::Header {
                    return Err(LoadError::parse(line_number, "`empty` must come before the grids"));
                }
                let value = line["empty".len()..].trim();
                empty = parse_label(value, line_number)?;
            }
            _ => {
                let row = line
                    .split_whitespace()
                    .map(|token| parse_label(token, line_number))
                    .collect::<Result<Vec<Label>, LoadError>>()?;
                match section {
                    Section::Board => board_rows.push(row),
                    Section::Goal => goal_rows.push(row),
                    Section::Header => {
                        return Err(LoadError::parse(
                            line_number,
                            "grid row outside a `board` or `goal` section",
                        ))
                    }
                }
            }
        }
    }

    let board = Board::new(board_rows)?;
    let goal = Board::new(goal_rows)?;
    Ok(Puzzle::new(board, goal, empty)?)
}

fn parse_label(token: &str, line: usize) -> Result<Label, LoadError> {
    token
        .parse::<Label>()
        .map_err(|e| LoadError::parse(line, format!("bad label `{token}`: {e}")))
}

/// Reads and parses a puzzle file.
pub fn load_puzzle(path: &Path) -> Result<Puzzle, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_puzzle(&text)
}

/// Renders a board, goal and empty label in the puzzle file format.
pub fn format_puzzle(board: &Board, goal: &Board, empty: Label) -> String {
    format!("empty {empty}\nboard\n{board}goal\n{goal}")
}

/// Renders a solution in the solution file format.
pub fn format_solution(actions: &[Action]) -> String {
    let mut output = format!("# {} moves\n", actions.len());
    for action in actions {
        output.push_str(&format!("{} {} {}\n", action.label, action.dr, action.dc));
    }
    output
}

/// Parses a solution file.
pub fn parse_solution(text: &str) -> Result<Vec<Action>, LoadError> {
    let mut actions = Vec::new();

    for (line_index, raw) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [label, dr, dc] = fields.as_slice() else {
            return Err(LoadError::parse(line_number, "expected `label dr dc`"));
        };
        let label = parse_label(label, line_number)?;
        let delta = |token: &str| {
            token
                .parse::<i32>()
                .map_err(|e| LoadError::parse(line_number, format!("bad delta `{token}`: {e}")))
        };
        actions.push(Action::new(label, delta(*dr)?, delta(*dc)?));
    }

    Ok(actions)
}

/// Writes a solution file.
pub fn save_solution(path: &Path, actions: &[Action]) -> Result<(), LoadError> {
    fs::write(path, format_solution(actions))?;
    Ok(())
}

/// Reads a solution file.
pub fn load_solution(path: &Path) -> Result<Vec<Action>, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_solution(&text)
}
