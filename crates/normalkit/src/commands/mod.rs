//! # Commands
//!
//! ## Overview
//!
//! A [Command] is the unit of behaviour that a key resolves to. It gets invoked once for each
//! active selection during a keystroke, receiving the selection and the keystroke's shared
//! [EditingContext].
//!
//! Commands are built by wrapping base operations with the functions in [combinators], which
//! add support for counts, goto prefixes and extending selections. The commands bound by the
//! default normal mode keymap that don't fit a combinator live in [normal].
//!
//! ```
//! use normalkit::commands::{combinators::{movement, with_count}, Command};
//! use normalkit::editing::{context::EditingContext, document::*, MoveDir};
//! use normalkit::instance::Instance;
//!
//! let right: Command<DocumentSelection, DocumentEditor> = with_count(movement(MoveDir::Right));
//!
//! let doc = SharedDocument::from("hello");
//! let mut editor = doc.editor();
//! let mut instance = Instance::new();
//! instance.update_count(4);
//!
//! let mut ctx = EditingContext::new(&mut editor, &mut instance);
//! for mut sel in doc.selections() {
//!     right.invoke(&mut sel, &mut ctx).unwrap();
//! }
//!
//! assert_eq!(doc.ranges(), vec![4..4]);
//! assert_eq!(instance.count(), 0);
//! ```
use std::fmt;
use std::rc::Rc;

use crate::editing::context::EditingContext;
use crate::errors::CommandResult;

pub mod combinators;
pub mod normal;

/// The signature shared by all commands.
pub type CommandFn<S, E> = dyn Fn(&mut S, &mut EditingContext<'_, E>) -> CommandResult;

/// A behaviour applied to each selection when its key is pressed.
///
/// Cloning a command is cheap, and the clones share the same underlying function.
pub struct Command<S, E> {
    f: Rc<CommandFn<S, E>>,
}

impl<S: 'static, E: 'static> Command<S, E> {
    /// Create a command from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut S, &mut EditingContext<'_, E>) -> CommandResult + 'static,
    {
        Command { f: Rc::new(f) }
    }

    /// A command that does nothing.
    pub fn noop() -> Self {
        Command::new(|_, _| Ok(()))
    }

    /// Run this command on a single selection.
    pub fn invoke(&self, selection: &mut S, ctx: &mut EditingContext<'_, E>) -> CommandResult {
        (self.f)(selection, ctx)
    }
}

impl<S, E> Clone for Command<S, E> {
    fn clone(&self) -> Self {
        Command { f: Rc::clone(&self.f) }
    }
}

impl<S, E> fmt::Debug for Command<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command(..)")
    }
}
