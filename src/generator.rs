//! This module contains logic for generating random Sudoku puzzles.
//!
//! Generation is done in two steps: a [Generator] first produces a fully
//! solved grid by seeding the three diagonal blocks with random permutations
//! and completing the rest with the backtracking solver. It then removes
//! clues in a random order until the hint budget of the requested
//! [Difficulty] is reached. Every removal is verified with a solvability
//! check, and removals that would make the puzzle ambiguous are reverted, so
//! generated puzzles always have exactly one solution.

use crate::SudokuGrid;
use crate::constraint;
use crate::error::Interrupted;
use crate::solver::{BacktrackingSolver, CancelToken, Solution, Solvability};

use rand::Rng;
use rand::rngs::ThreadRng;

// Hint bands as fractions of the 81 cells: normal keeps 45-55 % of them,
// hard 30-35 %.
const NORMAL_MIN_HINTS: usize = 36;
const NORMAL_MAX_HINTS: usize = 44;
const HARD_MIN_HINTS: usize = 24;
const HARD_MAX_HINTS: usize = 28;

/// The probability that [Generator::generate] picks [Difficulty::Hard].
const HARD_PROBABILITY: f64 = 0.2;

/// An enumeration of the difficulty bands a [Generator] can produce. The
/// difficulty is controlled by the number of hints that remain in the
/// puzzle. Note that the hint count is a budget, not a guarantee: removal
/// never sacrifices uniqueness of the solution, so a puzzle may keep more
/// hints than its band asks for if no further clue can be removed safely.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Difficulty {

    /// Keeps between 36 and 44 of the 81 cells (45-55 %) as hints.
    Normal,

    /// Keeps between 24 and 28 of the 81 cells (30-35 %) as hints.
    Hard
}

impl Difficulty {
    fn sample_hints(self, rng: &mut impl Rng) -> usize {
        match self {
            Difficulty::Normal =>
                rng.gen_range(NORMAL_MIN_HINTS..=NORMAL_MAX_HINTS),
            Difficulty::Hard =>
                rng.gen_range(HARD_MIN_HINTS..=HARD_MAX_HINTS)
        }
    }
}

fn shuffle<T>(rng: &mut impl Rng, values: impl Iterator<Item = T>)
        -> Vec<T> {
    let mut vec: Vec<T> = values.collect();
    let len = vec.len();

    for i in 0..(len - 1) {
        let j = rng.gen_range(i..len);
        vec.swap(i, j);
    }

    vec
}

fn all_coordinates() -> impl Iterator<Item = (usize, usize)> {
    (0..SudokuGrid::SIZE).flat_map(|row|
        (0..SudokuGrid::SIZE).map(move |column| (row, column)))
}

/// A generator randomly generates Sudoku puzzles with a unique solution. It
/// uses a random number generator to decide the content. For most cases,
/// sensible defaults are provided by [Generator::new_default]; tests that
/// need reproducible puzzles can inject a seeded `Rng` via [Generator::new].
///
/// ```
/// use sudoku_engine::generator::Generator;
///
/// let mut generator = Generator::new_default();
/// let solution = generator.generate_solution();
///
/// assert!(solution.is_full());
/// ```
pub struct Generator<R: Rng> {
    rng: R
}

impl Generator<ThreadRng> {

    /// Creates a new generator that uses a [ThreadRng] to generate the
    /// random digits.
    pub fn new_default() -> Generator<ThreadRng> {
        Generator::new(rand::thread_rng())
    }
}

impl<R: Rng> Generator<R> {

    /// Creates a new generator that uses the given random number generator
    /// to generate random digits.
    pub fn new(rng: R) -> Generator<R> {
        Generator {
            rng
        }
    }

    /// Fills the block whose top-left cell is at the given coordinate with a
    /// random permutation of 1 to 9, skipping any placement that is not
    /// legal with respect to the already seeded content.
    fn seed_block(&mut self, grid: &mut SudokuGrid, block_row: usize,
            block_column: usize) {
        let block_size = SudokuGrid::BLOCK_SIZE;
        let numbers = shuffle(&mut self.rng, 1..=SudokuGrid::SIZE);
        let cells = (0..block_size).flat_map(move |row_offset|
            (0..block_size).map(move |column_offset|
                (block_row + row_offset, block_column + column_offset)));

        for ((row, column), number) in cells.zip(numbers) {
            if constraint::is_legal(grid, row, column, number) {
                grid.set_cell(row, column, number);
            }
        }
    }

    /// Seeds the three diagonal blocks. They share no row or column, so
    /// their permutations cannot conflict and the result is guaranteed to be
    /// completable.
    fn seeded_grid(&mut self) -> SudokuGrid {
        let mut grid = SudokuGrid::new();

        for band in 0..SudokuGrid::BLOCK_SIZE {
            let origin = band * SudokuGrid::BLOCK_SIZE;
            self.seed_block(&mut grid, origin, origin);
        }

        grid
    }

    fn full_solution(&mut self, cancel: &CancelToken)
            -> Result<SudokuGrid, Interrupted> {
        loop {
            let seeded = self.seeded_grid();
            let solved =
                BacktrackingSolver.solve_interruptible(&seeded, cancel)?;

            if let Solution::Solved(solution) = solved {
                return Ok(solution);
            }
        }
    }

    /// Generates a random, fully solved grid. It is guaranteed that the
    /// result [is_full](SudokuGrid::is_full) and matches
    /// [validate](crate::constraint::validate).
    pub fn generate_solution(&mut self) -> SudokuGrid {
        self.full_solution(&CancelToken::new()).unwrap()
    }

    /// Removes random clues from the given full grid until only
    /// `target_hints` remain or no clue can be removed without making the
    /// puzzle ambiguous. Removals that lose uniqueness are reverted and the
    /// affected cell is not considered again.
    fn remove_clues(&mut self, puzzle: &mut SudokuGrid, target_hints: usize,
            cancel: &CancelToken) -> Result<(), Interrupted> {
        let order = shuffle(&mut self.rng, all_coordinates());
        let mut hints = puzzle.count_clues();

        for (row, column) in order {
            if hints == target_hints {
                break;
            }

            let number = puzzle.get_cell(row, column).unwrap();
            puzzle.clear_cell(row, column);
            let solvability = BacktrackingSolver
                .check_solvability_interruptible(puzzle, cancel)?;

            if let Solvability::Unique(_) = solvability {
                hints -= 1;
            }
            else {
                puzzle.set_cell(row, column, number);
            }
        }

        Ok(())
    }

    fn roll_difficulty(&mut self) -> Difficulty {
        if self.rng.gen::<f64>() < HARD_PROBABILITY {
            Difficulty::Hard
        }
        else {
            Difficulty::Normal
        }
    }

    fn generate_with(&mut self, difficulty: Difficulty, cancel: &CancelToken)
            -> Result<SudokuGrid, Interrupted> {
        let mut puzzle = self.full_solution(cancel)?;
        let target_hints = difficulty.sample_hints(&mut self.rng);
        self.remove_clues(&mut puzzle, target_hints, cancel)?;
        Ok(puzzle)
    }

    /// Generates a new random puzzle, rolling the difficulty first:
    /// [Difficulty::Hard] is picked with probability 0.2 and
    /// [Difficulty::Normal] otherwise.
    ///
    /// It is guaranteed that the result matches
    /// [validate](crate::constraint::validate) and has exactly one solution.
    pub fn generate(&mut self) -> SudokuGrid {
        let difficulty = self.roll_difficulty();
        self.generate_with_difficulty(difficulty)
    }

    /// Generates a new random puzzle in the given difficulty band.
    ///
    /// It is guaranteed that the result matches
    /// [validate](crate::constraint::validate) and has exactly one solution.
    pub fn generate_with_difficulty(&mut self, difficulty: Difficulty)
            -> SudokuGrid {
        self.generate_with(difficulty, &CancelToken::new()).unwrap()
    }

    /// Like [Generator::generate], but checks the given
    /// [CancelToken] periodically inside the solver runs that generation
    /// performs.
    ///
    /// # Errors
    ///
    /// [Interrupted], if the token fired before generation finished.
    pub fn generate_interruptible(&mut self, cancel: &CancelToken)
            -> Result<SudokuGrid, Interrupted> {
        let difficulty = self.roll_difficulty();
        self.generate_with(difficulty, cancel)
    }

    /// Like [Generator::generate_with_difficulty], but checks the given
    /// [CancelToken] periodically inside the solver runs that generation
    /// performs.
    ///
    /// # Errors
    ///
    /// [Interrupted], if the token fired before generation finished.
    pub fn generate_with_difficulty_interruptible(&mut self,
            difficulty: Difficulty, cancel: &CancelToken)
            -> Result<SudokuGrid, Interrupted> {
        self.generate_with(difficulty, cancel)
    }
}
