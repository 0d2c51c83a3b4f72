// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_codeblock_attributes)]

//! This crate implements an easy-to-understand engine for classic 9x9 Sudoku.
//! It supports the following key features:
//!
//! * Parsing and printing Sudoku grids
//! * Checking the legality of individual placements as well as validating
//! entire grids, reporting the first row, column, or block conflict
//! * Solving Sudoku using a perfect backtracking algorithm, optionally
//! recording a move trace for step-by-step replay
//! * Deciding whether a puzzle is unsolvable, uniquely solvable, or
//! ambiguous
//! * Generating random puzzles in two difficulty bands while guaranteeing a
//! unique solution
//!
//! # Parsing and printing Sudoku
//!
//! See [SudokuGrid::parse] for the exact format of a grid code.
//!
//! Codes can be used to exchange grids, while pretty prints can be used to
//! display a grid in a clearer manner. An example of how to parse and display
//! a grid is provided below.
//!
//! ```
//! use sudoku_engine::SudokuGrid;
//!
//! let grid = SudokuGrid::parse("\
//!     0,2,0,0,0,4,3,0,0,\
//!     9,0,0,0,2,0,0,0,8,\
//!     0,0,0,6,0,9,0,5,0,\
//!     0,0,0,0,0,0,0,0,1,\
//!     0,7,2,5,0,3,6,8,0,\
//!     6,0,0,0,0,0,0,0,0,\
//!     0,8,0,2,0,0,0,0,0,\
//!     1,0,0,0,9,0,0,0,3,\
//!     0,0,9,8,0,0,0,6,0").unwrap();
//! println!("{}", grid);
//! ```
//!
//! # Checking validity
//!
//! The [constraint] module decides legality questions. [constraint::is_legal]
//! checks a hypothetical placement against its row, column, and block peers,
//! while [constraint::validate] scans a whole grid for duplicate digits and
//! reports the first conflict it finds.
//!
//! ```
//! use sudoku_engine::SudokuGrid;
//! use sudoku_engine::constraint;
//!
//! // Two 5s in the top row.
//! let grid = SudokuGrid::parse("\
//!     5,5,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0,\
//!     0,0,0,0,0,0,0,0,0").unwrap();
//! assert!(!constraint::validate(&grid).is_valid());
//! ```
//!
//! # Solving Sudoku
//!
//! The [BacktrackingSolver](solver::BacktrackingSolver) tests all legal
//! digits for each empty cell in row-major order and is therefore able to
//! solve every solvable grid. As it is a zero-sized struct, no instantiation
//! is required.
//!
//! ```
//! use sudoku_engine::SudokuGrid;
//! use sudoku_engine::solver::{BacktrackingSolver, Solution};
//!
//! let solution = BacktrackingSolver.solve(&SudokuGrid::new());
//!
//! if let Solution::Solved(grid) = solution {
//!     assert!(grid.is_full());
//! }
//! else {
//!     panic!("empty grid not solved");
//! }
//! ```
//!
//! For replay or animation purposes,
//! [solve_with_trace](solver::BacktrackingSolver::solve_with_trace)
//! additionally returns the ordered log of placements and retractions the
//! search performed. Callers which may need to abandon a long-running search
//! can use the `_interruptible` variants together with a
//! [CancelToken](solver::CancelToken).
//!
//! # Generating Sudoku
//!
//! A [Generator](generator::Generator) first produces a fully solved grid
//! from randomly seeded diagonal blocks and then removes clues in a random
//! order, backing off whenever a removal would destroy the uniqueness of the
//! solution. The number of remaining clues is controlled by a
//! [Difficulty](generator::Difficulty) band.
//!
//! ```no_run
//! use sudoku_engine::constraint;
//! use sudoku_engine::generator::Generator;
//! use sudoku_engine::solver::{BacktrackingSolver, Solvability};
//!
//! // new_default yields a generator backed by rand::thread_rng()
//! let mut generator = Generator::new_default();
//! let puzzle = generator.generate();
//!
//! assert!(constraint::validate(&puzzle).is_valid());
//!
//! let unique = match BacktrackingSolver.check_solvability(&puzzle) {
//!     Solvability::Unique(_) => true,
//!     _ => false
//! };
//! assert!(unique);
//! ```
//!
//! # Note regarding performance
//!
//! Backtracking search is exponential in the worst case, and puzzle
//! generation runs a solvability check after every removed clue. It is
//! strongly recommended to use at least `opt-level = 2`, even in tests that
//! use Sudoku generation.

pub mod constraint;
pub mod error;
pub mod generator;
pub mod solver;


use error::{GridParseError, GridParseResult};

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// A Sudoku grid is composed of 81 cells, organized into 9 rows, 9 columns,
/// and 9 non-overlapping 3x3 blocks. Each cell may or may not be occupied by
/// a digit from 1 to 9.
///
/// Coordinates are always given as `(row, column)` pairs in the range
/// `[0, 9)`, with `(0, 0)` being the top-left cell. Blocks are indexed 0 to 8
/// in row-major order, so the block containing cell `(row, column)` has the
/// index `row - row % 3 + column / 3`.
///
/// A grid is an owned value: searches and edits operate on their own clone,
/// so a puzzle committed as the original can never be corrupted by a solver
/// working on a copy.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct SudokuGrid {
    cells: Vec<Option<usize>>
}

fn to_char(cell: Option<usize>) -> char {
    if let Some(n) = cell {
        (b'0' + n as u8) as char
    }
    else {
        ' '
    }
}

fn line(start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char, newline: bool)
        -> String {
    let mut result = String::new();

    for column in 0..SudokuGrid::SIZE {
        if column == 0 {
            result.push(start);
        }
        else if column % SudokuGrid::BLOCK_SIZE == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(column));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row() -> String {
    line('╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line() -> String {
    line('╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line() -> String {
    line('╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row() -> String {
    line('╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(grid: &SudokuGrid, row: usize) -> String {
    line('║', '║', '│', |column| to_char(grid.get_cell(row, column)), ' ',
        '║', true)
}

impl Display for SudokuGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let thin_separator_line = thin_separator_line();
        let thick_separator_line = thick_separator_line();

        for row in 0..SudokuGrid::SIZE {
            if row == 0 {
                f.write_str(top_row().as_str())?;
            }
            else if row % SudokuGrid::BLOCK_SIZE == 0 {
                f.write_str(thick_separator_line.as_str())?;
            }
            else {
                f.write_str(thin_separator_line.as_str())?;
            }

            f.write_str(content_row(self, row).as_str())?;
        }

        f.write_str(bottom_row().as_str())?;
        Ok(())
    }
}

fn cell_to_string(cell: &Option<usize>) -> String {
    if let Some(number) = cell {
        number.to_string()
    }
    else {
        String::from("0")
    }
}

pub(crate) fn index(row: usize, column: usize) -> usize {
    row * SudokuGrid::SIZE + column
}

/// Computes the row-major successor of the given `(row, column)` coordinate.
/// Within a row, the column advances; at the end of a row, the coordinate
/// wraps to the start of the next row. This ordering is the backbone of the
/// deterministic search in this crate.
///
/// The successor of the last cell, `(8, 8)`, is `(9, 0)`: the search
/// boundary, whose row is never dereferenced.
///
/// ```
/// use sudoku_engine::next_coordinate;
///
/// assert_eq!((4, 6), next_coordinate((4, 5)));
/// assert_eq!((5, 0), next_coordinate((4, 8)));
/// ```
pub fn next_coordinate(coordinate: (usize, usize)) -> (usize, usize) {
    let (row, column) = coordinate;

    if column == SudokuGrid::SIZE - 1 {
        (row + 1, 0)
    }
    else {
        (row, column + 1)
    }
}

impl SudokuGrid {

    /// The number of rows and columns of a grid, i.e. 9.
    pub const SIZE: usize = 9;

    /// The number of rows and columns of a single block, i.e. 3.
    pub const BLOCK_SIZE: usize = 3;

    /// The total number of cells of a grid, i.e. 81.
    pub const CELL_COUNT: usize = SudokuGrid::SIZE * SudokuGrid::SIZE;

    /// Creates a new, empty Sudoku grid.
    pub fn new() -> SudokuGrid {
        SudokuGrid {
            cells: vec![None; SudokuGrid::CELL_COUNT]
        }
    }

    /// Parses a code encoding a Sudoku grid. The code is a comma-separated
    /// list of 81 entries, which are assigned left-to-right, top-to-bottom,
    /// where each row is completed before the next one is started. An entry
    /// is either a digit from 1 to 9, or `0` or empty for a blank cell.
    /// Whitespace around entries is ignored to allow for more intuitive
    /// formatting.
    ///
    /// As an example, the code `5,3,0,0,7,0,0,0,0,6,...` will parse to a grid
    /// whose top row starts with a 5 and a 3.
    ///
    /// # Errors
    ///
    /// Any specialization of `GridParseError` (see that documentation).
    pub fn parse(code: &str) -> GridParseResult<SudokuGrid> {
        let entries: Vec<&str> = code.split(',').collect();

        if entries.len() != SudokuGrid::CELL_COUNT {
            return Err(GridParseError::WrongNumberOfCells);
        }

        let mut grid = SudokuGrid::new();

        for (i, entry) in entries.iter().enumerate() {
            let entry = entry.trim();

            if entry.is_empty() {
                continue;
            }

            let number = entry.parse::<usize>()?;

            if number > SudokuGrid::SIZE {
                return Err(GridParseError::InvalidNumber);
            }

            if number != 0 {
                grid.cells[i] = Some(number);
            }
        }

        Ok(grid)
    }

    /// Converts the grid into a `String` in a way that is consistent with
    /// [SudokuGrid::parse]. That is, a grid that is converted to a string and
    /// parsed again will not change, as is illustrated below. Empty cells are
    /// encoded as `0`.
    ///
    /// ```
    /// use sudoku_engine::SudokuGrid;
    ///
    /// let mut grid = SudokuGrid::new();
    ///
    /// // Just some arbitrary changes to create some content.
    /// grid.set_cell(1, 1, 4);
    /// grid.set_cell(2, 1, 5);
    ///
    /// let grid_str = grid.to_parseable_string();
    /// let grid_parsed = SudokuGrid::parse(grid_str.as_str()).unwrap();
    /// assert_eq!(grid, grid_parsed);
    /// ```
    pub fn to_parseable_string(&self) -> String {
        self.cells.iter()
            .map(cell_to_string)
            .collect::<Vec<String>>()
            .join(",")
    }

    fn assert_in_bounds(row: usize, column: usize) {
        if row >= SudokuGrid::SIZE || column >= SudokuGrid::SIZE {
            panic!("coordinate ({}, {}) out of bounds", row, column);
        }
    }

    /// Gets the content of the cell at the specified position.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the desired cell. Must be in the
    /// range `[0, 9)`.
    /// * `column`: The column (x-coordinate) of the desired cell. Must be in
    /// the range `[0, 9)`.
    ///
    /// # Panics
    ///
    /// If either `row` or `column` is not in the specified range. Coordinates
    /// are fixed at compile time, so violations are caller programming
    /// errors, not recoverable conditions.
    pub fn get_cell(&self, row: usize, column: usize) -> Option<usize> {
        SudokuGrid::assert_in_bounds(row, column);
        self.cells[index(row, column)]
    }

    /// Indicates whether the cell at the specified position contains the
    /// given number. This will return `false` if there is a different number
    /// in that cell or it is empty.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the checked cell. Must be in the
    /// range `[0, 9)`.
    /// * `column`: The column (x-coordinate) of the checked cell. Must be in
    /// the range `[0, 9)`.
    /// * `number`: The number to check for. If it is *not* in the range
    /// `[1, 9]`, `false` will always be returned.
    ///
    /// # Panics
    ///
    /// If either `row` or `column` is not in the specified range.
    pub fn has_number(&self, row: usize, column: usize, number: usize)
            -> bool {
        if let Some(content) = self.get_cell(row, column) {
            number == content
        }
        else {
            false
        }
    }

    /// Sets the content of the cell at the specified position to the given
    /// number. If the cell was not empty, the old number will be overwritten.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the assigned cell. Must be in the
    /// range `[0, 9)`.
    /// * `column`: The column (x-coordinate) of the assigned cell. Must be in
    /// the range `[0, 9)`.
    /// * `number`: The number to assign to the specified cell. Must be in the
    /// range `[1, 9]`.
    ///
    /// # Panics
    ///
    /// If `row` or `column` is not in the specified range, or `number` is 0
    /// or greater than 9.
    pub fn set_cell(&mut self, row: usize, column: usize, number: usize) {
        SudokuGrid::assert_in_bounds(row, column);

        if number == 0 || number > SudokuGrid::SIZE {
            panic!("number {} out of range [1, {}]", number, SudokuGrid::SIZE);
        }

        self.cells[index(row, column)] = Some(number);
    }

    /// Clears the content of the cell at the specified position, that is, if
    /// it contains a number, that number is removed. If the cell is already
    /// empty, it will be left that way.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the cleared cell. Must be in the
    /// range `[0, 9)`.
    /// * `column`: The column (x-coordinate) of the cleared cell. Must be in
    /// the range `[0, 9)`.
    ///
    /// # Panics
    ///
    /// If either `row` or `column` is not in the specified range.
    pub fn clear_cell(&mut self, row: usize, column: usize) {
        SudokuGrid::assert_in_bounds(row, column);
        self.cells[index(row, column)] = None;
    }

    /// Counts the number of clues given by this grid. This is the number of
    /// non-empty cells. While on average Sudoku with less clues are harder,
    /// this is *not* a reliable measure of difficulty.
    pub fn count_clues(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Indicates whether this grid is full, i.e. every cell is filled with a
    /// number. In this case, [SudokuGrid::count_clues] returns 81.
    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|c| c == &None)
    }

    /// Indicates whether this grid is empty, i.e. no cell is filled with a
    /// number. In this case, [SudokuGrid::count_clues] returns 0.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c == &None)
    }

    /// Indicates whether this grid configuration is a subset of another one.
    /// That is, all cells filled in this grid with some number must be filled
    /// in `other` with the same number. If this condition is met, `true` is
    /// returned, and `false` otherwise.
    pub fn is_subset(&self, other: &SudokuGrid) -> bool {
        self.cells.iter()
            .zip(other.cells.iter())
            .all(|(self_cell, other_cell)| {
                match self_cell {
                    Some(self_number) =>
                        match other_cell {
                            Some(other_number) => self_number == other_number,
                            None => false
                        },
                    None => true
                }
            })
    }

    /// Indicates whether this grid configuration is a superset of another
    /// one. That is, all cells filled in the `other` grid with some number
    /// must be filled in this one with the same number. If this condition is
    /// met, `true` is returned, and `false` otherwise.
    pub fn is_superset(&self, other: &SudokuGrid) -> bool {
        other.is_subset(self)
    }

    /// Gets a slice of the cells of this grid. They are in left-to-right,
    /// top-to-bottom order, where rows are together.
    pub fn cells(&self) -> &[Option<usize>] {
        &self.cells
    }
}

impl Default for SudokuGrid {
    fn default() -> SudokuGrid {
        SudokuGrid::new()
    }
}

impl From<SudokuGrid> for String {
    fn from(grid: SudokuGrid) -> String {
        grid.to_parseable_string()
    }
}

impl TryFrom<String> for SudokuGrid {
    type Error = GridParseError;

    fn try_from(code: String) -> GridParseResult<SudokuGrid> {
        SudokuGrid::parse(code.as_str())
    }
}
