//! # Editing Context
//!
//! ## Overview
//!
//! An [EditingContext] is built once per keystroke and handed to the command for every
//! selection that the keystroke is applied to.
//!
//! The pending count and goto prefix are read when the context is built, and commands see those
//! values for the whole keystroke. When a combinator consumes the count or the goto prefix, the
//! change is written through to the [Instance], but later selections in the same keystroke still
//! observe the original values. This way every selection is repeated the same number of times,
//! and a goto prefix applies to all of them.
use crate::instance::{EditorMode, Instance, SelectionMode};

/// The count and goto prefix as they were when the keystroke arrived.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pending {
    count: usize,
    goto: bool,
    extend: bool,
}

impl Pending {
    /// Take a snapshot of an [Instance]'s pending state.
    pub fn of(instance: &Instance) -> Self {
        Pending {
            count: instance.count(),
            goto: instance.is_goto_pending(),
            extend: false,
        }
    }

    /// Extend selections for this keystroke, regardless of the [SelectionMode].
    pub fn extend(mut self, extend: bool) -> Self {
        self.extend = extend;
        self
    }
}

/// Context shared by the invocations of a command during a single keystroke.
pub struct EditingContext<'a, E> {
    editor: &'a mut E,
    instance: &'a mut Instance,
    pending: Pending,
    suppress_extend: bool,
}

impl<'a, E> EditingContext<'a, E> {
    /// Create a context, snapshotting the instance's pending state.
    pub fn new(editor: &'a mut E, instance: &'a mut Instance) -> Self {
        let pending = Pending::of(instance);

        EditingContext::with_pending(editor, instance, pending)
    }

    /// Create a context with an explicit snapshot.
    pub fn with_pending(editor: &'a mut E, instance: &'a mut Instance, pending: Pending) -> Self {
        EditingContext { editor, instance, pending, suppress_extend: false }
    }

    /// The editor service.
    pub fn editor(&mut self) -> &mut E {
        &mut *self.editor
    }

    /// The persistent instance state.
    pub fn instance(&self) -> &Instance {
        &*self.instance
    }

    /// The count typed before this keystroke, or 0 if there wasn't one.
    pub fn count(&self) -> usize {
        self.pending.count
    }

    /// Mark the pending count as used.
    pub fn consume_count(&mut self) {
        self.instance.update_count(0);
    }

    /// Replace the pending count that the next keystroke will see.
    pub fn update_count(&mut self, count: usize) {
        self.instance.update_count(count);
    }

    /// Whether this keystroke is the destination of a goto prefix.
    pub fn is_goto_pending(&self) -> bool {
        self.pending.goto
    }

    /// Mark the goto prefix as used.
    pub fn clear_goto(&mut self) {
        self.instance.clear_goto();
    }

    /// Whether movements should extend selections during this keystroke.
    pub fn is_extending(&self) -> bool {
        if self.suppress_extend {
            return false;
        }

        self.pending.extend || self.instance.selection_mode() == SelectionMode::Extend
    }

    /// Run `f` with [EditingContext::is_extending] reporting false.
    pub fn without_extend<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let prev = std::mem::replace(&mut self.suppress_extend, true);
        let res = f(self);
        self.suppress_extend = prev;

        return res;
    }

    /// Switch the editor to Insert mode.
    pub fn change_mode_to_insert(&mut self) {
        self.instance.change_mode_to_insert();
    }

    /// The editor's current mode.
    pub fn mode(&self) -> EditorMode {
        self.instance.mode()
    }
}
