//! This module contains some error and result definitions used in this crate.

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;

/// An enumeration of the errors that may occur when parsing a
/// [SudokuGrid](crate::SudokuGrid) from its string code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GridParseError {

    /// Indicates that the number of cells (which are separated by commas)
    /// does not equal the amount of cells in a grid, i.e. 81.
    WrongNumberOfCells,

    /// Indicates that one of the cell entries could not be parsed as a
    /// number.
    NumberFormatError,

    /// Indicates that a cell is filled with a number greater than 9. Note
    /// that 0 is valid and denotes an empty cell.
    InvalidNumber
}

impl From<ParseIntError> for GridParseError {
    fn from(_: ParseIntError) -> Self {
        GridParseError::NumberFormatError
    }
}

impl Display for GridParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GridParseError::WrongNumberOfCells =>
                write!(f, "wrong number of cells"),
            GridParseError::NumberFormatError =>
                write!(f, "malformed cell entry"),
            GridParseError::InvalidNumber =>
                write!(f, "cell number out of range")
        }
    }
}

/// Syntactic sugar for `Result<V, GridParseError>`.
pub type GridParseResult<V> = Result<V, GridParseError>;

/// Indicates that an interruptible search was abandoned because its
/// [CancelToken](crate::solver::CancelToken) fired. This is a normal outcome
/// for callers that cancel long-running work, not an exceptional condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interrupted;
