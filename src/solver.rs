//! This module contains the logic for solving Sudoku.
//!
//! Most importantly, this module contains the [BacktrackingSolver], which
//! visits cells in row-major order and tries every legal digit for each empty
//! cell, in ascending order. Since the traversal and the digit order are
//! fixed, solving is fully deterministic: for grids with more than one
//! completion, [BacktrackingSolver::solve] always yields the same, first
//! solution in search order.
//!
//! Besides plain solving, the solver can record a [MoveTrace] of every
//! placement and retraction for step-by-step replay, decide between
//! unsolvable, uniquely solvable, and ambiguous grids (see
//! [BacktrackingSolver::check_solvability]), and be interrupted from another
//! thread through a [CancelToken].

use crate::{next_coordinate, SudokuGrid};
use crate::constraint;
use crate::error::Interrupted;

use serde::{Deserialize, Serialize};

use std::slice::Iter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::vec::IntoIter;

/// A single step taken by the solver: either the placement of a digit into a
/// cell or the retraction of a previously placed digit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Move {

    /// The row (y-coordinate) of the affected cell.
    pub row: usize,

    /// The column (x-coordinate) of the affected cell.
    pub column: usize,

    /// The placed digit, or `None` if this move retracts the digit placed by
    /// an earlier move on the same cell.
    pub number: Option<usize>
}

/// An ordered log of the [Move]s performed by a solver run, produced by
/// [BacktrackingSolver::solve_with_trace]. The trace is append-only while
/// the search runs and immutable once it is returned; consumers only iterate
/// or [replay](MoveTrace::replay) it. Every top-level solver call constructs
/// a fresh trace, so traces of unrelated runs can never mix.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MoveTrace {
    moves: Vec<Move>
}

impl MoveTrace {

    /// Creates a new, empty move trace.
    pub fn new() -> MoveTrace {
        MoveTrace {
            moves: Vec::new()
        }
    }

    fn push(&mut self, m: Move) {
        self.moves.push(m);
    }

    /// Gets the recorded moves in the order they were performed.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Gets the number of recorded moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Indicates whether this trace contains no moves. This is the case for
    /// solver runs which never entered an empty cell, e.g. on a grid that is
    /// already full.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns an iterator over the recorded moves.
    pub fn iter(&self) -> Iter<'_, Move> {
        self.moves.iter()
    }

    /// Applies all recorded moves, in order, to a clone of the given grid
    /// and returns the result. Replaying the trace of a successful solver
    /// run onto the grid that was solved reproduces the solved grid.
    pub fn replay(&self, grid: &SudokuGrid) -> SudokuGrid {
        let mut result = grid.clone();

        for m in &self.moves {
            match m.number {
                Some(number) => result.set_cell(m.row, m.column, number),
                None => result.clear_cell(m.row, m.column)
            }
        }

        result
    }
}

impl IntoIterator for MoveTrace {
    type Item = Move;
    type IntoIter = IntoIter<Move>;

    fn into_iter(self) -> IntoIter<Move> {
        self.moves.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveTrace {
    type Item = &'a Move;
    type IntoIter = Iter<'a, Move>;

    fn into_iter(self) -> Iter<'a, Move> {
        self.moves.iter()
    }
}

/// A cheaply clonable flag with which a long-running search can be abandoned
/// from outside, typically from another thread while the search runs on a
/// worker. The solver checks the token periodically during its recursion;
/// once [CancelToken::cancel] has been called, the interruptible solver
/// entry points return [Interrupted].
///
/// A token cannot be reset. Start each new search with a fresh token.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>
}

impl CancelToken {

    /// Creates a new token which has not been cancelled.
    pub fn new() -> CancelToken {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false))
        }
    }

    /// Raises the flag. All current and future searches observing this token
    /// will abandon their work at the next periodic check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Indicates whether [CancelToken::cancel] has been called on this token
    /// or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// The outcome of a [BacktrackingSolver] run on a single grid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Solution {

    /// Indicates that a completion of the grid was found, which is wrapped
    /// in this instance. If the grid has multiple completions, this is the
    /// first one in search order.
    Solved(SudokuGrid),

    /// Indicates that the grid has no completion. This is a normal search
    /// outcome, not an error.
    Unsolvable
}

/// An enumeration of the ways a grid can be solvable, as determined by
/// [BacktrackingSolver::check_solvability].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Solvability {

    /// Indicates that the grid is not solvable at all.
    Impossible,

    /// Indicates that the grid has exactly one completion, which is wrapped
    /// in this instance.
    Unique(SudokuGrid),

    /// Indicates that the grid has more than one completion.
    Ambiguous
}

impl Solvability {

    /// Computes the union of two solvability results, i.e. the solvability
    /// of a cell whose candidate branches yielded the two operands. This is
    /// defined as follows:
    ///
    /// * If one operand is `Solvability::Impossible`, the other one is
    /// returned.
    /// * If one operand is `Solvability::Ambiguous`, the result is also
    /// ambiguous.
    /// * If both operands are `Solvability::Unique` with solution grids `g1`
    /// and `g2`, then the result is `Solvability::Unique(g1)` if `g1 == g2`
    /// and `Solvability::Ambiguous` otherwise.
    pub fn union(self, other: Solvability) -> Solvability {
        match self {
            Solvability::Impossible => other,
            Solvability::Unique(g) =>
                match other {
                    Solvability::Impossible => Solvability::Unique(g),
                    Solvability::Unique(other_g) =>
                        if g == other_g {
                            Solvability::Unique(g)
                        }
                        else {
                            Solvability::Ambiguous
                        }
                    Solvability::Ambiguous => Solvability::Ambiguous
                }
            Solvability::Ambiguous => Solvability::Ambiguous
        }
    }
}

/// The number of recursive calls between two checks of the [CancelToken] in
/// the interruptible solver entry points.
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

struct Search<'a> {
    grid: &'a mut SudokuGrid,
    trace: Option<MoveTrace>,
    cancel: Option<&'a CancelToken>,
    calls: u64
}

impl<'a> Search<'a> {

    fn new(grid: &'a mut SudokuGrid, with_trace: bool,
            cancel: Option<&'a CancelToken>) -> Search<'a> {
        let trace = if with_trace {
            Some(MoveTrace::new())
        }
        else {
            None
        };

        Search {
            grid,
            trace,
            cancel,
            calls: 0
        }
    }

    fn into_trace(self) -> MoveTrace {
        self.trace.unwrap_or_default()
    }

    fn check_cancelled(&mut self) -> Result<(), Interrupted> {
        if self.calls % CANCEL_CHECK_INTERVAL == 0 {
            if let Some(token) = self.cancel {
                if token.is_cancelled() {
                    return Err(Interrupted);
                }
            }
        }

        self.calls += 1;
        Ok(())
    }

    fn place(&mut self, row: usize, column: usize, number: usize) {
        self.grid.set_cell(row, column, number);

        if let Some(trace) = &mut self.trace {
            trace.push(Move {
                row,
                column,
                number: Some(number)
            });
        }
    }

    fn retract(&mut self, row: usize, column: usize) {
        self.grid.clear_cell(row, column);

        if let Some(trace) = &mut self.trace {
            trace.push(Move {
                row,
                column,
                number: None
            });
        }
    }

    fn first_solution(&mut self, row: usize, column: usize)
            -> Result<Solution, Interrupted> {
        self.check_cancelled()?;

        if row == SudokuGrid::SIZE {
            return Ok(Solution::Solved(self.grid.clone()));
        }

        let (next_row, next_column) = next_coordinate((row, column));

        if self.grid.get_cell(row, column).is_some() {
            return self.first_solution(next_row, next_column);
        }

        for number in 1..=SudokuGrid::SIZE {
            if constraint::is_legal(self.grid, row, column, number) {
                self.place(row, column, number);
                let solution = self.first_solution(next_row, next_column)?;

                if let Solution::Solved(grid) = solution {
                    return Ok(Solution::Solved(grid));
                }

                self.retract(row, column);
            }
        }

        Ok(Solution::Unsolvable)
    }

    fn enumerate(&mut self, row: usize, column: usize)
            -> Result<Solvability, Interrupted> {
        self.check_cancelled()?;

        if row == SudokuGrid::SIZE {
            return Ok(Solvability::Unique(self.grid.clone()));
        }

        let (next_row, next_column) = next_coordinate((row, column));

        if self.grid.get_cell(row, column).is_some() {
            return self.enumerate(next_row, next_column);
        }

        let mut solvability = Solvability::Impossible;

        for number in 1..=SudokuGrid::SIZE {
            if constraint::is_legal(self.grid, row, column, number) {
                self.grid.set_cell(row, column, number);
                let branch = self.enumerate(next_row, next_column);
                self.grid.clear_cell(row, column);
                solvability = solvability.union(branch?);

                if solvability == Solvability::Ambiguous {
                    break;
                }
            }
        }

        Ok(solvability)
    }
}

/// A perfect solver which solves Sudoku by recursively testing all legal
/// digits for each cell in row-major order. This means two things:
///
/// * Its worst-case runtime is exponential, i.e. it may be very slow if the
/// grid has many missing digits. Callers on interactive threads should use
/// the `_interruptible` entry points with a [CancelToken] on a worker.
/// * It finds a solution for every solvable grid and proves unsolvability
/// for every unsolvable one.
///
/// Every run operates on its own clone of the input grid, so concurrent runs
/// never share mutable state and the caller's grid is never modified.
///
/// Grids that already contain a duplicate digit (see [constraint::validate])
/// are reported as unsolvable without entering the search.
pub struct BacktrackingSolver;

fn statically_invalid(grid: &SudokuGrid) -> bool {
    !constraint::validate(grid).is_valid()
}

impl BacktrackingSolver {

    /// Solves the given grid, returning the first completion in search order
    /// or [Solution::Unsolvable] if none exists. The input grid is not
    /// modified.
    pub fn solve(&self, grid: &SudokuGrid) -> Solution {
        if statically_invalid(grid) {
            return Solution::Unsolvable;
        }

        let mut working = grid.clone();
        Search::new(&mut working, false, None).first_solution(0, 0).unwrap()
    }

    /// Like [BacktrackingSolver::solve], but additionally records a
    /// [MoveTrace] of every placement and retraction the search performed,
    /// for step-by-step replay. The trace is freshly constructed for this
    /// call. For performance-sensitive callers that run many solves, such as
    /// puzzle generation, prefer [BacktrackingSolver::solve], which performs
    /// no trace allocation.
    pub fn solve_with_trace(&self, grid: &SudokuGrid)
            -> (Solution, MoveTrace) {
        if statically_invalid(grid) {
            return (Solution::Unsolvable, MoveTrace::new());
        }

        let mut working = grid.clone();
        let mut search = Search::new(&mut working, true, None);
        let solution = search.first_solution(0, 0).unwrap();
        (solution, search.into_trace())
    }

    /// Like [BacktrackingSolver::solve], but checks the given [CancelToken]
    /// every [CANCEL_CHECK_INTERVAL] recursive calls.
    ///
    /// # Errors
    ///
    /// [Interrupted], if the token fired before the search finished.
    pub fn solve_interruptible(&self, grid: &SudokuGrid, cancel: &CancelToken)
            -> Result<Solution, Interrupted> {
        if statically_invalid(grid) {
            return Ok(Solution::Unsolvable);
        }

        let mut working = grid.clone();
        Search::new(&mut working, false, Some(cancel)).first_solution(0, 0)
    }

    /// Like [BacktrackingSolver::solve_with_trace], but checks the given
    /// [CancelToken] every [CANCEL_CHECK_INTERVAL] recursive calls. A
    /// cancelled search yields no trace.
    ///
    /// # Errors
    ///
    /// [Interrupted], if the token fired before the search finished.
    pub fn solve_with_trace_interruptible(&self, grid: &SudokuGrid,
            cancel: &CancelToken) -> Result<(Solution, MoveTrace), Interrupted> {
        if statically_invalid(grid) {
            return Ok((Solution::Unsolvable, MoveTrace::new()));
        }

        let mut working = grid.clone();
        let mut search = Search::new(&mut working, true, Some(cancel));
        let solution = search.first_solution(0, 0)?;
        Ok((solution, search.into_trace()))
    }

    /// Determines whether the given grid is unsolvable, uniquely solvable,
    /// or ambiguous. The search enumerates completions but stops as soon as
    /// two distinct ones have been seen, so at most two solutions are ever
    /// materialized.
    ///
    /// Grids that already contain a duplicate digit are reported
    /// [Solvability::Impossible] without entering the search, so it is safe
    /// to pass unvetted user input here.
    pub fn check_solvability(&self, grid: &SudokuGrid) -> Solvability {
        if statically_invalid(grid) {
            return Solvability::Impossible;
        }

        let mut working = grid.clone();
        Search::new(&mut working, false, None).enumerate(0, 0).unwrap()
    }

    /// Like [BacktrackingSolver::check_solvability], but checks the given
    /// [CancelToken] every [CANCEL_CHECK_INTERVAL] recursive calls.
    ///
    /// # Errors
    ///
    /// [Interrupted], if the token fired before the search finished.
    pub fn check_solvability_interruptible(&self, grid: &SudokuGrid,
            cancel: &CancelToken) -> Result<Solvability, Interrupted> {
        if statically_invalid(grid) {
            return Ok(Solvability::Impossible);
        }

        let mut working = grid.clone();
        Search::new(&mut working, false, Some(cancel)).enumerate(0, 0)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::constraint::ValidationResult;

    // Taken from the World Puzzle Federation Sudoku GP 2020 Round 8,
    // Puzzle 2.

    const CLASSIC_PUZZLE: &str = "\
        0,0,0,0,8,1,0,0,0,\
        0,0,2,0,0,7,8,0,0,\
        0,5,3,0,0,0,1,7,0,\
        3,7,0,0,0,0,0,0,0,\
        6,0,0,0,0,0,0,0,3,\
        0,0,0,0,0,0,0,2,4,\
        0,6,9,0,0,0,2,3,0,\
        0,0,5,9,0,0,4,0,0,\
        0,0,0,6,5,0,0,0,0";

    const CLASSIC_SOLUTION: &str = "\
        7,4,6,2,8,1,3,5,9,\
        9,1,2,5,3,7,8,4,6,\
        8,5,3,4,9,6,1,7,2,\
        3,7,4,1,2,5,6,9,8,\
        6,2,8,7,4,9,5,1,3,\
        5,9,1,3,6,8,7,2,4,\
        1,6,9,8,7,4,2,3,5,\
        2,8,5,9,1,3,4,6,7,\
        4,3,7,6,5,2,9,8,1";

    fn classic_puzzle() -> SudokuGrid {
        SudokuGrid::parse(CLASSIC_PUZZLE).unwrap()
    }

    fn classic_solution() -> SudokuGrid {
        SudokuGrid::parse(CLASSIC_SOLUTION).unwrap()
    }

    #[test]
    fn backtracking_solves_classic_sudoku() {
        assert_eq!(Solution::Solved(classic_solution()),
            BacktrackingSolver.solve(&classic_puzzle()));
    }

    #[test]
    fn solving_is_idempotent_on_solved_grid() {
        let solution = classic_solution();
        assert_eq!(Solution::Solved(solution.clone()),
            BacktrackingSolver.solve(&solution));
    }

    #[test]
    fn empty_grid_solves_to_valid_full_grid() {
        let solution = BacktrackingSolver.solve(&SudokuGrid::new());

        if let Solution::Solved(grid) = solution {
            assert!(grid.is_full());
            assert!(constraint::validate(&grid).is_valid());

            // Ascending digit order fills the untouched top row with 1 to 9.
            for column in 0..SudokuGrid::SIZE {
                assert_eq!(Some(column + 1), grid.get_cell(0, column));
            }
        }
        else {
            panic!("empty grid reported as unsolvable");
        }
    }

    #[test]
    fn solving_is_deterministic() {
        let first = BacktrackingSolver.solve(&SudokuGrid::new());
        let second = BacktrackingSolver.solve(&SudokuGrid::new());
        assert_eq!(first, second);
    }

    #[test]
    fn solution_keeps_given_digits() {
        let puzzle = classic_puzzle();

        if let Solution::Solved(grid) = BacktrackingSolver.solve(&puzzle) {
            assert!(puzzle.is_subset(&grid));
        }
        else {
            panic!("solvable puzzle reported as unsolvable");
        }
    }

    #[test]
    fn single_blank_recovers_solution() {
        let mut puzzle = classic_solution();
        puzzle.clear_cell(4, 4);

        assert_eq!(Solution::Solved(classic_solution()),
            BacktrackingSolver.solve(&puzzle));
        assert_eq!(Solvability::Unique(classic_solution()),
            BacktrackingSolver.check_solvability(&puzzle));
    }

    /// A grid without any duplicate whose top-left cell nevertheless has no
    /// legal digit left: the rest of row 0 consumes 2 to 9, and the 1 in
    /// column 0 blocks the only remaining candidate.
    fn conflict_free_unsolvable() -> SudokuGrid {
        let mut grid = SudokuGrid::new();

        for column in 1..SudokuGrid::SIZE {
            grid.set_cell(0, column, column + 1);
        }

        grid.set_cell(3, 0, 1);
        grid
    }

    #[test]
    fn unsolvable_grid_detected() {
        let grid = conflict_free_unsolvable();

        assert_eq!(ValidationResult::Valid, constraint::validate(&grid));
        assert_eq!(Solution::Unsolvable, BacktrackingSolver.solve(&grid));
        assert_eq!(Solvability::Impossible,
            BacktrackingSolver.check_solvability(&grid));
    }

    #[test]
    fn conflicting_grid_unsolvable_without_search() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5);
        grid.set_cell(0, 1, 5);

        assert_eq!(Solution::Unsolvable, BacktrackingSolver.solve(&grid));
        assert_eq!(Solvability::Impossible,
            BacktrackingSolver.check_solvability(&grid));
    }

    #[test]
    fn unique_puzzle_reported_with_its_solution() {
        assert_eq!(Solvability::Unique(classic_solution()),
            BacktrackingSolver.check_solvability(&classic_puzzle()));
    }

    #[test]
    fn empty_grid_ambiguous() {
        assert_eq!(Solvability::Ambiguous,
            BacktrackingSolver.check_solvability(&SudokuGrid::new()));
    }

    #[test]
    fn deadly_rectangle_ambiguous() {
        // Clearing the cells (0, 4), (0, 6), (1, 4) and (1, 6) of the
        // solution leaves a rectangle of two 8s and two 3s whose digits can
        // be swapped, so exactly two completions remain.
        let mut puzzle = classic_solution();
        puzzle.clear_cell(0, 4);
        puzzle.clear_cell(0, 6);
        puzzle.clear_cell(1, 4);
        puzzle.clear_cell(1, 6);

        assert_eq!(Solvability::Ambiguous,
            BacktrackingSolver.check_solvability(&puzzle));
    }

    #[test]
    fn solvability_union() {
        let unique_1 = Solvability::Unique(classic_solution());
        let unique_2 = Solvability::Unique(SudokuGrid::new());

        assert_eq!(unique_1.clone(),
            Solvability::Impossible.union(unique_1.clone()));
        assert_eq!(unique_1.clone(),
            unique_1.clone().union(Solvability::Impossible));
        assert_eq!(Solvability::Impossible,
            Solvability::Impossible.union(Solvability::Impossible));
        assert_eq!(unique_1.clone(), unique_1.clone().union(unique_1.clone()));
        assert_eq!(Solvability::Ambiguous,
            unique_1.clone().union(unique_2));
        assert_eq!(Solvability::Ambiguous,
            Solvability::Ambiguous.union(unique_1));
    }

    #[test]
    fn trace_replays_to_solution() {
        let puzzle = classic_puzzle();
        let (solution, trace) = BacktrackingSolver.solve_with_trace(&puzzle);

        assert_eq!(Solution::Solved(classic_solution()), solution);
        assert!(!trace.is_empty());
        assert_eq!(classic_solution(), trace.replay(&puzzle));
    }

    #[test]
    fn trace_agrees_with_plain_solver() {
        let puzzle = classic_puzzle();
        let (solution, _) = BacktrackingSolver.solve_with_trace(&puzzle);

        assert_eq!(BacktrackingSolver.solve(&puzzle), solution);
    }

    #[test]
    fn trace_starts_at_first_empty_cell() {
        let (_, trace) = BacktrackingSolver.solve_with_trace(&classic_puzzle());
        let first = trace.moves()[0];

        assert_eq!(0, first.row);
        assert_eq!(0, first.column);
        assert!(first.number.is_some());
    }

    #[test]
    fn trace_records_retractions() {
        let (_, trace) = BacktrackingSolver.solve_with_trace(&classic_puzzle());

        assert!(trace.iter().any(|m| m.number.is_none()));
    }

    #[test]
    fn trace_empty_for_solved_grid() {
        let (solution, trace) =
            BacktrackingSolver.solve_with_trace(&classic_solution());

        assert_eq!(Solution::Solved(classic_solution()), solution);
        assert!(trace.is_empty());
    }

    #[test]
    fn trace_fresh_per_call() {
        let puzzle = classic_puzzle();
        let (_, first) = BacktrackingSolver.solve_with_trace(&puzzle);
        let (_, second) = BacktrackingSolver.solve_with_trace(&puzzle);

        assert_eq!(first, second);
    }

    #[test]
    fn trace_serde_round_trip() {
        let (_, trace) = BacktrackingSolver.solve_with_trace(&classic_puzzle());
        let json = serde_json::to_string(&trace).unwrap();
        let parsed: MoveTrace = serde_json::from_str(json.as_str()).unwrap();

        assert_eq!(trace, parsed);
    }

    #[test]
    fn cancelled_token_interrupts_solving() {
        let cancel = CancelToken::new();
        cancel.cancel();

        assert_eq!(Err(Interrupted),
            BacktrackingSolver.solve_interruptible(&SudokuGrid::new(),
                &cancel));
        assert_eq!(Err(Interrupted),
            BacktrackingSolver.check_solvability_interruptible(
                &SudokuGrid::new(), &cancel));
    }

    #[test]
    fn fresh_token_does_not_interrupt() {
        let cancel = CancelToken::new();
        let puzzle = classic_puzzle();

        assert_eq!(Ok(BacktrackingSolver.solve(&puzzle)),
            BacktrackingSolver.solve_interruptible(&puzzle, &cancel));
        assert_eq!(Ok(BacktrackingSolver.check_solvability(&puzzle)),
            BacktrackingSolver.check_solvability_interruptible(&puzzle,
                &cancel));
    }

    #[test]
    fn token_observed_through_clones() {
        let cancel = CancelToken::new();
        let observer = cancel.clone();
        cancel.cancel();

        assert!(observer.is_cancelled());
    }
}
