//! # Command combinators
//!
//! ## Overview
//!
//! These functions take a base [Command] or a named operation, and return a new [Command] that
//! adds a single axis of behaviour on top of it:
//!
//! - [with_count] repeats the base command according to the count typed before the key.
//! - [with_goto] and [without_goto] pick between a key's ordinary behaviour and its goto
//!   destination, depending on whether a goto prefix is pending.
//! - [movement], [selection] and [jump] pick between moving a bare cursor and extending the
//!   selection, depending on whether the keystroke extends.
//!
//! Combinators are the only place where commands branch on the count, goto prefix or extend
//! state, and the only place that consumes the count and goto prefix.
use tracing::trace;

use super::Command;
use crate::editing::{LinePosition, MoveDir, Selection, SelectionOp};

/// Options for [with_goto].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GotoOptions {
    /// Whether the goto destination should extend selections when the keystroke extends.
    ///
    /// By default, goto destinations always move a bare cursor.
    pub extend: bool,
}

/// Repeat a command according to the pending count.
///
/// With no count, or a count of 0, the command runs once. Otherwise it runs `n` times, each
/// repetition seeing the effects of the previous ones. The pending count is consumed afterwards,
/// even if a repetition fails.
pub fn with_count<S, E>(cmd: Command<S, E>) -> Command<S, E>
where
    S: 'static,
    E: 'static,
{
    Command::new(move |sel, ctx| {
        let times = ctx.count().max(1);
        let res = (0..times).try_for_each(|_| cmd.invoke(sel, ctx));

        ctx.consume_count();

        return res;
    })
}

/// Run `goto` when a goto prefix is pending, and `fallback` otherwise.
///
/// The goto prefix is cleared after the goto command runs, whether or not it succeeds. To add a
/// goto destination to a key while keeping its existing binding as the `fallback`, use
/// [KeymapBuilder::goto](crate::keymap::KeymapBuilder::goto).
pub fn with_goto<S, E>(
    goto: Command<S, E>,
    options: GotoOptions,
    fallback: Command<S, E>,
) -> Command<S, E>
where
    S: 'static,
    E: 'static,
{
    Command::new(move |sel, ctx| {
        if ctx.is_goto_pending() {
            trace!("running goto destination");

            let res = if options.extend {
                goto.invoke(sel, ctx)
            } else {
                ctx.without_extend(|ctx| goto.invoke(sel, ctx))
            };

            ctx.clear_goto();

            return res;
        }

        fallback.invoke(sel, ctx)
    })
}

/// Mark a command as having no goto destination.
///
/// If a goto prefix is pending, it gets cleared and the command's ordinary behaviour runs.
pub fn without_goto<S, E>(cmd: Command<S, E>) -> Command<S, E>
where
    S: 'static,
    E: 'static,
{
    Command::new(move |sel, ctx| {
        if ctx.is_goto_pending() {
            ctx.clear_goto();
        }

        cmd.invoke(sel, ctx)
    })
}

/// Move or extend by one unit in a direction.
///
/// When extending, the anchor stays in place. Otherwise the selection is collapsed onto its
/// cursor, which then moves.
pub fn movement<S, E>(dir: MoveDir) -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(move |sel: &mut S, ctx| {
        if ctx.is_extending() {
            sel.extend(dir)
        } else {
            sel.collapse()?;
            sel.move_cursor(dir)
        }
    })
}

/// Perform a selection-producing operation.
///
/// When extending, the operation grows the current selection from its anchor. Otherwise the
/// selection is first collapsed onto its cursor, so that the new range starts there.
pub fn selection<S, E>(op: SelectionOp) -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(move |sel: &mut S, ctx| {
        if !ctx.is_extending() {
            sel.collapse()?;
        }

        sel.select(op)
    })
}

/// Move or extend to a position within the cursor's line.
pub fn jump<S, E>(pos: LinePosition) -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(move |sel: &mut S, ctx| {
        if ctx.is_extending() {
            sel.extend_to_line(pos)
        } else {
            sel.move_to_line(pos)
        }
    })
}
