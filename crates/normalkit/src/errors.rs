//! # Error Types
//!
//! ## Overview
//!
//! The engine defines no failures of its own: motions that run into the edge of the buffer are
//! clamped by the collaborators instead of failing. What remains are failures raised by
//! collaborators or command bodies, which are surfaced to the host along with where they
//! happened, and errors from parsing key notation.
use crate::key::NormalKey;

/// Errors returned by a [Command](crate::commands::Command) or by the collaborators it calls.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum CommandError {
    /// The selection handle no longer refers to a live selection.
    #[error("No current selection")]
    NoSelection,

    /// The buffer cannot be modified.
    #[error("Buffer is read-only")]
    ReadOnly,

    /// Generic failure.
    #[error("Error: {0}")]
    Failure(String),
}

/// Errors returned while dispatching a keystroke.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum DispatchError {
    /// A command failed while processing one of the selections.
    ///
    /// When this is returned under [FailurePolicy::AbortKeystroke], the selections after `index`
    /// were not processed.
    ///
    /// [FailurePolicy::AbortKeystroke]: crate::dispatch::FailurePolicy::AbortKeystroke
    #[error("Command for key {key} failed on selection {index}: {source}")]
    Command {
        /// The key whose command failed.
        key: NormalKey,

        /// The position of the failing selection in the dispatch order.
        index: usize,

        /// The underlying failure.
        #[source]
        source: CommandError,
    },
}

/// Errors returned when interpreting key notation.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// Empty key string.
    #[error("Empty key string")]
    Empty,

    /// Failure to interpret key string.
    #[error("Invalid key string: {0:?}")]
    Invalid(String),

    /// A host key that has no normal mode counterpart.
    #[error("Unsupported key: {0}")]
    Unsupported(String),
}

/// Common result type for commands.
pub type CommandResult = Result<(), CommandError>;

/// Common result type for dispatching keys.
pub type DispatchResult<T> = Result<T, DispatchError>;
