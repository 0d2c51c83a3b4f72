//! This module contains the logic for checking the classic Sudoku rules: no
//! duplicate digits in any row, column, or block.
//!
//! Two distinct questions are answered here. [is_legal] decides whether a
//! *hypothetical* placement into an empty cell would conflict with any of its
//! peers; it is the pruning check used by the solver. [validate] scans an
//! entire grid, which may already be arbitrarily invalid, and reports the
//! first duplicate it finds as a [ValidationResult::Conflict]. The former is
//! used during search, the latter to vet grids before they are committed as
//! puzzles.

use crate::SudokuGrid;

/// The kind of constraint group in which a duplicate digit was found by
/// [validate].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConflictKind {

    /// A digit occurs more than once in a row.
    Row,

    /// A digit occurs more than once in a column.
    Column,

    /// A digit occurs more than once in a 3x3 block.
    Block
}

/// The result of checking an entire grid with [validate].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationResult {

    /// Indicates that no row, column, or block contains a duplicate digit.
    /// Note this makes no statement about solvability.
    Valid,

    /// Indicates that some digit occurs more than once within a single
    /// constraint group. Only the first conflict in scan order is reported.
    Conflict {

        /// The kind of constraint group containing the duplicate.
        kind: ConflictKind,

        /// The index of the violated group: the row index, the column index,
        /// or the row-major block index, each in `[0, 9)`.
        index: usize,

        /// The duplicated digit.
        number: usize
    }
}

impl ValidationResult {

    /// Indicates whether this result is [ValidationResult::Valid].
    pub fn is_valid(&self) -> bool {
        self == &ValidationResult::Valid
    }
}

fn assert_number_in_range(number: usize) {
    if number == 0 || number > SudokuGrid::SIZE {
        panic!("number {} out of range [1, {}]", number, SudokuGrid::SIZE);
    }
}

/// Computes the top-left coordinate of the block with the given row-major
/// block index.
fn block_origin(block: usize) -> (usize, usize) {
    let block_size = SudokuGrid::BLOCK_SIZE;
    (block / block_size * block_size, block % block_size * block_size)
}

fn row_numbers(grid: &SudokuGrid, row: usize)
        -> impl Iterator<Item = Option<usize>> + '_ {
    (0..SudokuGrid::SIZE).map(move |column| grid.get_cell(row, column))
}

fn column_numbers(grid: &SudokuGrid, column: usize)
        -> impl Iterator<Item = Option<usize>> + '_ {
    (0..SudokuGrid::SIZE).map(move |row| grid.get_cell(row, column))
}

fn block_numbers(grid: &SudokuGrid, block: usize)
        -> impl Iterator<Item = Option<usize>> + '_ {
    let block_size = SudokuGrid::BLOCK_SIZE;
    let (block_row, block_column) = block_origin(block);
    (0..block_size).flat_map(move |row_offset|
        (0..block_size).map(move |column_offset|
            grid.get_cell(block_row + row_offset,
                block_column + column_offset)))
}

/// Finds the first digit that occurs more than once among the given cell
/// contents, if any. Empty cells are ignored.
fn duplicate(numbers: impl Iterator<Item = Option<usize>>) -> Option<usize> {
    let mut counts = [0u32; SudokuGrid::SIZE + 1];

    for number in numbers.flatten() {
        counts[number] += 1;

        if counts[number] > 1 {
            return Some(number);
        }
    }

    None
}

/// Indicates whether the given `number` could be placed in the cell at the
/// specified position without causing a duplicate in the cell's row, column,
/// or 3x3 block. The block containing the cell starts at
/// `(row - row % 3, column - column % 3)`.
///
/// This tests a *hypothetical* placement: the content of the checked cell
/// itself is treated like any peer, so querying a cell for the number it
/// already contains yields `false`. Use [validate] to judge an already-filled
/// grid.
///
/// # Arguments
///
/// * `grid`: The grid into which the placement is proposed.
/// * `row`: The row (y-coordinate) of the checked cell. Must be in the range
/// `[0, 9)`.
/// * `column`: The column (x-coordinate) of the checked cell. Must be in the
/// range `[0, 9)`.
/// * `number`: The proposed digit. Must be in the range `[1, 9]`.
///
/// # Panics
///
/// If `row` or `column` is not in the specified range, or `number` is 0 or
/// greater than 9. These are caller programming errors, not recoverable
/// conditions.
pub fn is_legal(grid: &SudokuGrid, row: usize, column: usize, number: usize)
        -> bool {
    assert_number_in_range(number);

    for i in 0..SudokuGrid::SIZE {
        if grid.has_number(row, i, number) ||
                grid.has_number(i, column, number) {
            return false;
        }
    }

    let block_size = SudokuGrid::BLOCK_SIZE;
    let block_row = row - row % block_size;
    let block_column = column - column % block_size;

    for r in block_row..(block_row + block_size) {
        for c in block_column..(block_column + block_size) {
            if grid.has_number(r, c, number) {
                return false;
            }
        }
    }

    true
}

/// Checks the entire grid for duplicate digits. Filled cells only are
/// considered; emptiness is irrelevant here, so both puzzles and full
/// solutions can be validated.
///
/// The scan is deterministic: for each index 0 to 8, the row with that index
/// is checked, then the column with that index, then, at every third index,
/// the three blocks of the block band starting at that row. The first
/// conflict found is returned; [ValidationResult::Valid] is returned if and
/// only if no conflict exists.
pub fn validate(grid: &SudokuGrid) -> ValidationResult {
    let block_size = SudokuGrid::BLOCK_SIZE;

    for i in 0..SudokuGrid::SIZE {
        if let Some(number) = duplicate(row_numbers(grid, i)) {
            return ValidationResult::Conflict {
                kind: ConflictKind::Row,
                index: i,
                number
            };
        }

        if let Some(number) = duplicate(column_numbers(grid, i)) {
            return ValidationResult::Conflict {
                kind: ConflictKind::Column,
                index: i,
                number
            };
        }

        if i % block_size == 0 {
            for block in i..(i + block_size) {
                if let Some(number) = duplicate(block_numbers(grid, block)) {
                    return ValidationResult::Conflict {
                        kind: ConflictKind::Block,
                        index: block,
                        number
                    };
                }
            }
        }
    }

    ValidationResult::Valid
}

#[cfg(test)]
mod tests {

    use super::*;

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

    #[test]
    fn empty_grid_valid() {
        assert_eq!(ValidationResult::Valid, validate(&SudokuGrid::new()));
    }

    #[test]
    fn full_solution_valid() {
        let grid = SudokuGrid::parse(CLASSIC_SOLUTION).unwrap();
        assert_eq!(ValidationResult::Valid, validate(&grid));
    }

    #[test]
    fn partial_grid_valid() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();
        assert_eq!(ValidationResult::Valid, validate(&grid));
    }

    #[test]
    fn duplicate_in_row_reported() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5);
        grid.set_cell(0, 1, 5);

        assert_eq!(ValidationResult::Conflict {
            kind: ConflictKind::Row,
            index: 0,
            number: 5
        }, validate(&grid));
    }

    #[test]
    fn duplicate_in_column_reported() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 4, 8);
        grid.set_cell(7, 4, 8);

        assert_eq!(ValidationResult::Conflict {
            kind: ConflictKind::Column,
            index: 4,
            number: 8
        }, validate(&grid));
    }

    #[test]
    fn duplicate_in_block_reported() {
        // (4, 4) and (5, 5) share neither row nor column, but lie in the
        // central block, which has the row-major index 4.
        let mut grid = SudokuGrid::new();
        grid.set_cell(4, 4, 2);
        grid.set_cell(5, 5, 2);

        assert_eq!(ValidationResult::Conflict {
            kind: ConflictKind::Block,
            index: 4,
            number: 2
        }, validate(&grid));
    }

    #[test]
    fn row_conflict_takes_precedence_in_shared_band() {
        // The two 5s conflict both as a row and as a block; the scan order
        // reports the row.
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5);
        grid.set_cell(0, 1, 5);

        if let ValidationResult::Conflict { kind, .. } = validate(&grid) {
            assert_eq!(ConflictKind::Row, kind);
        }
        else {
            panic!("conflicting grid reported as valid");
        }
    }

    #[test]
    fn legal_placement_accepted() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        // The solution places 7 in the top-left corner.
        assert!(is_legal(&grid, 0, 0, 7));
    }

    #[test]
    fn row_conflict_rejected() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        // Row 0 already contains an 8 at column 4.
        assert!(!is_legal(&grid, 0, 0, 8));
    }

    #[test]
    fn column_conflict_rejected() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        // Column 0 already contains a 3 at row 3.
        assert!(!is_legal(&grid, 0, 0, 3));
    }

    #[test]
    fn block_conflict_rejected() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        // The top-left block contains a 2 at (1, 2), which shares neither
        // row nor column with (0, 0).
        assert!(!is_legal(&grid, 0, 0, 2));
    }

    #[test]
    fn occupied_cell_rejects_its_own_number() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        assert!(!is_legal(&grid, 0, 4, 8));
    }

    #[test]
    fn legality_agrees_with_validation() {
        let grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();

        for row in 0..SudokuGrid::SIZE {
            for column in 0..SudokuGrid::SIZE {
                if grid.get_cell(row, column).is_some() {
                    continue;
                }

                for number in 1..=SudokuGrid::SIZE {
                    let mut forced = grid.clone();
                    forced.set_cell(row, column, number);

                    assert_eq!(is_legal(&grid, row, column, number),
                        validate(&forced).is_valid(),
                        "disagreement at ({}, {}) for {}", row, column,
                        number);
                }
            }
        }
    }

    #[test]
    #[should_panic]
    fn is_legal_rejects_zero() {
        is_legal(&SudokuGrid::new(), 0, 0, 0);
    }

    #[test]
    #[should_panic]
    fn is_legal_rejects_out_of_bounds() {
        is_legal(&SudokuGrid::new(), 9, 0, 1);
    }
}
