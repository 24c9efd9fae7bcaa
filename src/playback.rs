//! Step-by-step terminal playback of a solution.

use std::thread;
use std::time::Duration;

use klotski::board::format_board;
use klotski::{Action, Puzzle};

/// Applies `actions` to `puzzle` one at a time, printing the board after
/// each slide and pausing `delay` between steps.
///
/// Stops at the first illegal action and returns its index.
pub fn play(puzzle: &mut Puzzle, actions: &[Action], delay: Duration) -> Result<(), usize> {
    let empty = puzzle.empty();
    println!("start:");
    print!("{}", format_board(puzzle.current_board(), empty));

    for (index, action) in actions.iter().enumerate() {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if !puzzle.apply_move(action.label, action.dr, action.dc) {
            return Err(index);
        }
        println!("\nstep {}: {}", index + 1, action);
        print!("{}", format_board(puzzle.current_board(), empty));
    }

    Ok(())
}
