//! # Normal mode commands
//!
//! ## Overview
//!
//! Commands bound in the default [Keymap](crate::keymap::Keymap) that are built directly instead
//! of through a single combinator. The ones that enter Insert mode do so as their final step.
use tracing::trace;

use super::combinators::{selection, with_count, without_goto};
use super::Command;
use crate::editing::{Editor, LinePosition, MoveDir, Selection, SelectionOp};
use crate::instance::truncate_count;

/// Move to the end of the line, and start inserting there.
pub fn append_at_line_end<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(|sel: &mut S, ctx| {
        sel.move_to_line(LinePosition::End)?;
        ctx.change_mode_to_insert();

        Ok(())
    })
}

/// Collapse to the start of the selection, and start inserting there.
pub fn insert_before<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(|sel: &mut S, ctx| {
        sel.collapse_to_start()?;
        ctx.change_mode_to_insert();

        Ok(())
    })
}

/// Open a new line below the cursor and start inserting on it.
///
/// With a count, the whole operation is repeated, so that the cursor ends up on the last of the
/// newly opened lines.
pub fn open_below<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: Editor<S> + 'static,
{
    with_count(Command::<S, E>::new(|sel, ctx| {
        ctx.editor().insert_newline_below(sel)?;
        ctx.change_mode_to_insert();

        Ok(())
    }))
}

/// Open a new line above the cursor and start inserting on it.
///
/// With a count, the whole operation is repeated.
pub fn open_above<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: Editor<S> + 'static,
{
    with_count(Command::<S, E>::new(|sel, ctx| {
        ctx.editor().insert_newline_above(sel)?;
        ctx.change_mode_to_insert();

        Ok(())
    }))
}

/// Remove the selected text, saving it in the register.
pub fn cut<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(|sel: &mut S, _| sel.cut())
}

/// Remove the selected text and start inserting in its place.
pub fn change<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    without_goto(Command::new(|sel: &mut S, ctx| {
        sel.cut()?;
        ctx.change_mode_to_insert();

        Ok(())
    }))
}

/// Copy the selected text into the register.
pub fn yank<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(|sel: &mut S, _| sel.copy())
}

/// Select up to the bracket matching the next one on the line.
pub fn matching_char<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    without_goto(selection(SelectionOp::MatchingPair))
}

/// Edit the pending count, or delete backwards.
///
/// When a count has been typed, its last digit is removed, and no text is changed. Otherwise, an
/// empty selection is first extended over the previous character, and then the selection is
/// deleted.
pub fn backspace<S, E>() -> Command<S, E>
where
    S: Selection + 'static,
    E: 'static,
{
    Command::new(|sel: &mut S, ctx| {
        let count = ctx.count();

        if count > 0 {
            let count = truncate_count(count);
            trace!(count, "truncated pending count");
            ctx.update_count(count);

            return Ok(());
        }

        if sel.is_empty() {
            sel.extend(MoveDir::Left)?;
        }

        sel.delete()
    })
}
