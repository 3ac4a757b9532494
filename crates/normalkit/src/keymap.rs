//! # Keymaps
//!
//! ## Overview
//!
//! A [Keymap] maps each [NormalKey] to the [Command] it runs. It holds no logic of its own: the
//! behaviour that depends on counts, goto prefixes and extending selections comes from the
//! [combinators](crate::commands::combinators) each command is built with.
//!
//! [Keymap::normal] provides the default bindings:
//!
//! | Key | Behaviour | Goto behaviour |
//! |-----|-----------|----------------|
//! | `j` | Move or extend down | Same as normal |
//! | `k` | Move or extend up | |
//! | `h` | Move or extend left | Go to line start |
//! | `l` | Move or extend right | Go to line end |
//! | `i` | Insert before the selection | Go to the first non-blank character |
//! | `m` | Select to the matching bracket | Same as normal |
//! | `A` | Insert at line end | |
//! | `o` | Open a line below and insert | |
//! | `O` | Open a line above and insert | |
//! | `w` | Select to next word start | |
//! | `e` | Select to next word end | Same as normal |
//! | `b` | Select to previous word start | Same as normal |
//! | `d` | Cut | |
//! | `c` | Cut and insert | Same as normal |
//! | `x` | Select line | |
//! | `y` | Copy | |
//! | `<BS>` | Edit the count, or delete backwards | |
//!
//! All motions and selections besides `m` accept a count. Custom keymaps can be created with
//! [KeymapBuilder]:
//!
//! ```
//! use normalkit::commands::combinators::{jump, GotoOptions};
//! use normalkit::editing::document::{DocumentEditor, DocumentSelection};
//! use normalkit::editing::LinePosition;
//! use normalkit::key::NormalKey;
//! use normalkit::keymap::Keymap;
//!
//! let keymap = Keymap::<DocumentSelection, DocumentEditor>::builder()
//!     .normal()
//!     .unbind('y')
//!     .goto('j', jump(LinePosition::End), GotoOptions::default())
//!     .build();
//!
//! assert!(keymap.get(&NormalKey::Char('y')).is_none());
//! assert!(keymap.get(&NormalKey::Char('j')).is_some());
//! ```
use std::collections::HashMap;
use std::fmt;

use crate::commands::combinators::{
    jump,
    movement,
    selection,
    with_count,
    with_goto,
    without_goto,
    GotoOptions,
};
use crate::commands::normal;
use crate::commands::Command;
use crate::editing::{Editor, LinePosition, MoveDir, Selection, SelectionOp};
use crate::key::NormalKey;

/// A mapping from keys to the commands they run.
pub struct Keymap<S, E> {
    bindings: HashMap<NormalKey, Command<S, E>>,
}

impl<S, E> Keymap<S, E> {
    /// Create a keymap with no bindings.
    pub fn empty() -> Self {
        Keymap { bindings: HashMap::new() }
    }

    /// Start building a keymap with no bindings.
    pub fn builder() -> KeymapBuilder<S, E> {
        KeymapBuilder { keymap: Keymap::empty() }
    }

    /// Look up the command bound to a key.
    pub fn get(&self, key: &NormalKey) -> Option<&Command<S, E>> {
        self.bindings.get(key)
    }

    /// Whether a key has a binding.
    pub fn contains(&self, key: &NormalKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// The number of bound keys.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Iterate over the bound keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &NormalKey> {
        self.bindings.keys()
    }
}

impl<S, E> Keymap<S, E>
where
    S: Selection + 'static,
    E: Editor<S> + 'static,
{
    /// The default normal mode bindings.
    pub fn normal() -> Self {
        Keymap::builder().normal().build()
    }
}

impl<S, E> Clone for Keymap<S, E> {
    fn clone(&self) -> Self {
        Keymap { bindings: self.bindings.clone() }
    }
}

impl<S, E> Default for Keymap<S, E> {
    fn default() -> Self {
        Keymap::empty()
    }
}

impl<S, E> fmt::Debug for Keymap<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.bindings.keys().map(ToString::to_string).collect::<Vec<_>>();
        keys.sort();

        f.debug_struct("Keymap").field("keys", &keys).finish()
    }
}

/// Build a [Keymap] one binding at a time.
pub struct KeymapBuilder<S, E> {
    keymap: Keymap<S, E>,
}

impl<S: 'static, E: 'static> KeymapBuilder<S, E> {
    /// Bind a key to a command, replacing any previous binding.
    pub fn bind(mut self, key: impl Into<NormalKey>, cmd: Command<S, E>) -> Self {
        self.keymap.bindings.insert(key.into(), cmd);
        self
    }

    /// Give a key a goto destination.
    ///
    /// The key's current binding keeps running when no goto prefix is pending. A key without a
    /// binding does nothing outside of goto mode.
    pub fn goto(
        mut self,
        key: impl Into<NormalKey>,
        goto: Command<S, E>,
        options: GotoOptions,
    ) -> Self {
        let key = key.into();
        let fallback = self.keymap.bindings.remove(&key).unwrap_or_else(Command::noop);

        self.keymap.bindings.insert(key, with_goto(goto, options, fallback));
        self
    }

    /// Remove a key's binding.
    pub fn unbind(mut self, key: impl Into<NormalKey>) -> Self {
        self.keymap.bindings.remove(&key.into());
        self
    }

    /// Finish building the keymap.
    pub fn build(self) -> Keymap<S, E> {
        self.keymap
    }
}

impl<S, E> KeymapBuilder<S, E>
where
    S: Selection + 'static,
    E: Editor<S> + 'static,
{
    /// Add the default normal mode bindings.
    pub fn normal(self) -> Self {
        let left = with_count(movement(MoveDir::Left));
        let right = with_count(movement(MoveDir::Right));

        self.bind('j', without_goto(with_count(movement(MoveDir::Down))))
            .bind('k', with_count(movement(MoveDir::Up)))
            .bind('h', with_goto(jump(LinePosition::Start), GotoOptions::default(), left))
            .bind('l', with_goto(jump(LinePosition::End), GotoOptions::default(), right))
            .bind('i', normal::insert_before())
            .goto('i', jump(LinePosition::FirstNonBlank), GotoOptions::default())
            .bind('m', normal::matching_char())
            .bind('A', normal::append_at_line_end())
            .bind('o', normal::open_below())
            .bind('O', normal::open_above())
            .bind('w', with_count(selection(SelectionOp::NextWordStart)))
            .bind('e', without_goto(with_count(selection(SelectionOp::WordEnd))))
            .bind('b', without_goto(with_count(selection(SelectionOp::PreviousWordStart))))
            .bind('d', normal::cut())
            .bind('c', normal::change())
            .bind('x', with_count(selection(SelectionOp::Line)))
            .bind('y', normal::yank())
            .bind(NormalKey::Backspace, normal::backspace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::{DocumentEditor, DocumentSelection};
    use crate::instance::{EditorMode, Instance, SelectionMode};
    use crate::util::testing::{apply, DocCommand};

    type DocKeymap = Keymap<DocumentSelection, DocumentEditor>;

    fn cmd(keymap: &DocKeymap, c: char) -> DocCommand {
        keymap.get(&NormalKey::Char(c)).cloned().unwrap()
    }

    #[test]
    fn test_normal_bindings() {
        let keymap = DocKeymap::normal();
        let keys = keys!("jkhlimAoOwebdcxy<BS>");

        assert_eq!(keymap.len(), keys.len());

        for key in keys {
            assert!(keymap.contains(&key), "{key} should be bound");
        }
    }

    #[test]
    fn test_h_goto() {
        let keymap = DocKeymap::normal();
        let h = cmd(&keymap, 'h');
        let doc = doc!("  abc\n", 4..4);
        let mut instance = Instance::new();

        apply(&h, &doc, &mut instance).unwrap();
        assert_eq!(doc.ranges(), vec![3..3]);

        instance.set_selection_mode(SelectionMode::Extend);
        instance.enter_goto();
        apply(&h, &doc, &mut instance).unwrap();
        assert_eq!(doc.ranges(), vec![0..0]);
        assert!(!instance.is_goto_pending());
    }

    #[test]
    fn test_i_goto() {
        let keymap = DocKeymap::normal();
        let i = cmd(&keymap, 'i');
        let doc = doc!("  abc\n", 4..4);
        let mut instance = Instance::new();

        instance.enter_goto();
        apply(&i, &doc, &mut instance).unwrap();
        assert_eq!(doc.ranges(), vec![2..2]);
        assert_eq!(instance.mode(), EditorMode::Normal);

        apply(&i, &doc, &mut instance).unwrap();
        assert_eq!(instance.mode(), EditorMode::Insert);
    }

    #[test]
    fn test_builder() {
        let keymap = DocKeymap::builder()
            .bind('q', Command::noop())
            .goto('z', jump(LinePosition::End), GotoOptions::default())
            .bind(NormalKey::Esc, Command::noop())
            .unbind(NormalKey::Esc)
            .build();

        assert_eq!(keymap.len(), 2);
        assert!(keymap.contains(&NormalKey::Char('q')));
        assert!(!keymap.contains(&NormalKey::Esc));

        // A goto with nothing to fall back on does nothing outside of goto mode.
        let z = cmd(&keymap, 'z');
        let doc = doc!("abc", 1..1);
        let mut instance = Instance::new();

        apply(&z, &doc, &mut instance).unwrap();
        assert_eq!(doc.ranges(), vec![1..1]);

        instance.enter_goto();
        apply(&z, &doc, &mut instance).unwrap();
        assert_eq!(doc.ranges(), vec![3..3]);
    }
}
