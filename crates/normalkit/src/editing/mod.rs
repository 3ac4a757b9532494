//! # Editing collaborators
//!
//! ## Overview
//!
//! Commands never touch text directly. Everything they do to the buffer goes through the two
//! traits in this module:
//!
//! - [Selection], a handle to one anchor+cursor region, which can be moved, extended, cut,
//!   copied and deleted.
//! - [Editor], the buffer-level service for operations that create new lines.
//!
//! Both are expected to absorb out-of-bounds motions by clamping them, so that a cursor at the
//! start of the buffer moving left is a no-op rather than a failure. Errors returned from these
//! traits abort the current keystroke according to the dispatcher's
//! [FailurePolicy](crate::dispatch::FailurePolicy).
//!
//! The [document] module provides an implementation of both traits on top of a rope.
use crate::errors::CommandResult;

pub mod context;
pub mod document;

/// A direction to move or extend by one unit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MoveDir {
    /// Previous line, same column.
    Up,

    /// Next line, same column.
    Down,

    /// Previous character.
    Left,

    /// Next character.
    Right,
}

/// A destination within the cursor's current line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinePosition {
    /// The first column.
    Start,

    /// After the last character, before the line terminator.
    End,

    /// The first character that isn't a space or tab.
    FirstNonBlank,
}

/// Operations that produce a selected range, rather than a cursor position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SelectionOp {
    /// Select up to the beginning of the next word.
    NextWordStart,

    /// Select up to the end of the current or next word.
    WordEnd,

    /// Select back to the beginning of the current or previous word.
    PreviousWordStart,

    /// Select the rest of the cursor's line, including its terminator.
    Line,

    /// Select from the next bracket on the line to its matching bracket.
    MatchingPair,
}

/// A handle to a single selection in a buffer.
///
/// A selection consists of an anchor and a cursor. It is empty when both are at the same
/// position, in which case it represents a bare cursor.
pub trait Selection {
    /// Whether the anchor and cursor are at the same position.
    fn is_empty(&self) -> bool;

    /// Move the anchor onto the cursor.
    fn collapse(&mut self) -> CommandResult;

    /// Move both the anchor and cursor to the start of the selected range.
    fn collapse_to_start(&mut self) -> CommandResult;

    /// Move the cursor by one unit, bringing the anchor along with it.
    fn move_cursor(&mut self, dir: MoveDir) -> CommandResult;

    /// Move the cursor by one unit, leaving the anchor in place.
    fn extend(&mut self, dir: MoveDir) -> CommandResult;

    /// Move the cursor within its line, bringing the anchor along with it.
    fn move_to_line(&mut self, pos: LinePosition) -> CommandResult;

    /// Move the cursor within its line, leaving the anchor in place.
    fn extend_to_line(&mut self, pos: LinePosition) -> CommandResult;

    /// Move the cursor to the destination of a [SelectionOp], leaving the anchor in place.
    ///
    /// Implementations may move the anchor of an empty selection onto the start of the range
    /// the operation selects.
    fn select(&mut self, op: SelectionOp) -> CommandResult;

    /// Copy the selected text, and then remove it from the buffer.
    fn cut(&mut self) -> CommandResult;

    /// Copy the selected text without changing the selection.
    fn copy(&mut self) -> CommandResult;

    /// Remove the selected text from the buffer.
    fn delete(&mut self) -> CommandResult;
}

/// Buffer-level operations that act relative to a selection.
pub trait Editor<S: Selection> {
    /// Open an empty line below the selection's cursor, and move the selection onto it.
    fn insert_newline_below(&mut self, selection: &mut S) -> CommandResult;

    /// Open an empty line above the selection's cursor, and move the selection onto it.
    fn insert_newline_above(&mut self, selection: &mut S) -> CommandResult;
}
