//! # Dispatching keys
//!
//! ## Overview
//!
//! The [Dispatcher] owns a [Keymap] and the [Instance] state, and turns each key typed in normal
//! mode into a single keystroke: it resolves the key's [Command], builds an [EditingContext] once,
//! and then runs the command for every selection, in the order given.
//!
//! Some keys are handled by the dispatcher itself when they have no binding in the keymap:
//!
//! - Digits accumulate into the pending count.
//! - The goto key (`g` by default) makes the next key run its goto destination.
//! - `<Esc>` forgets the pending count and goto prefix, and leaves Insert mode.
//! - Uppercase letters run the command for their lowercase counterparts, extending selections.
//!
//! In Insert mode, every key besides `<Esc>` is left for the host to handle.
//!
//! ## Example
//!
//! ```
//! use normalkit::dispatch::{Dispatched, DispatchConfig, Dispatcher, FailurePolicy};
//! use normalkit::editing::document::SharedDocument;
//! use normalkit::keymap::Keymap;
//! use normalkit::key::NormalKey;
//!
//! let doc = SharedDocument::from("one two three\n");
//! doc.set_ranges(&[0..0, 8..8]);
//!
//! let config = DispatchConfig::builder()
//!     .failure_policy(FailurePolicy::SkipSelection)
//!     .build();
//! let mut dispatcher = Dispatcher::new(Keymap::normal(), config);
//! let mut editor = doc.editor();
//! let mut selections = doc.selections();
//!
//! let res = dispatcher.input_key(&NormalKey::Char('e'), &mut editor, &mut selections);
//! assert_eq!(res, Ok(Dispatched::Command { selections: 2, failed: 0 }));
//! assert_eq!(doc.selected_text(0).as_deref(), Some("one"));
//! assert_eq!(doc.selected_text(1).as_deref(), Some("three"));
//! ```
use tracing::{debug, trace, warn};

use crate::commands::Command;
use crate::editing::context::{EditingContext, Pending};
use crate::editing::{Editor, Selection};
use crate::errors::{DispatchError, DispatchResult};
use crate::instance::{EditorMode, Instance};
use crate::key::NormalKey;
use crate::keymap::Keymap;

/// What to do when a command fails on one of the selections.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FailurePolicy {
    /// Stop processing the keystroke, leaving the remaining selections untouched, and return
    /// a [DispatchError].
    #[default]
    AbortKeystroke,

    /// Log the failure, and continue with the next selection.
    SkipSelection,
}

/// How a [Dispatcher] interprets keys.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DispatchConfig {
    failure_policy: FailurePolicy,
    goto_key: NormalKey,
    extend_on_shift: bool,
    count_keys: bool,
    discard_unused_count: bool,
}

impl DispatchConfig {
    /// Start building a new [DispatchConfig].
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }

    /// What to do when a command fails.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// The key that starts a goto prefix.
    pub fn goto_key(&self) -> NormalKey {
        self.goto_key
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            failure_policy: FailurePolicy::default(),
            goto_key: NormalKey::Char('g'),
            extend_on_shift: true,
            count_keys: true,
            discard_unused_count: true,
        }
    }
}

/// Build a new [DispatchConfig].
#[derive(Default)]
pub struct DispatchConfigBuilder(DispatchConfig);

impl DispatchConfigBuilder {
    /// Finish building the [DispatchConfig].
    pub fn build(self) -> DispatchConfig {
        self.0
    }

    /// Set the [FailurePolicy].
    pub fn failure_policy(mut self, v: FailurePolicy) -> Self {
        self.0.failure_policy = v;
        self
    }

    /// Set the key that starts a goto prefix.
    pub fn goto_key(mut self, v: impl Into<NormalKey>) -> Self {
        self.0.goto_key = v.into();
        self
    }

    /// Set whether unbound uppercase letters run their lowercase commands while extending.
    pub fn extend_on_shift(mut self, v: bool) -> Self {
        self.0.extend_on_shift = v;
        self
    }

    /// Set whether unbound digits accumulate into a count.
    pub fn count_keys(mut self, v: bool) -> Self {
        self.0.count_keys = v;
        self
    }

    /// Set whether a count left unused by a command gets discarded after the keystroke.
    ///
    /// When this is disabled, a count typed before a command that ignores it remains pending
    /// for the next key.
    pub fn discard_unused_count(mut self, v: bool) -> Self {
        self.0.discard_unused_count = v;
        self
    }
}

/// The outcome of a successfully dispatched key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatched {
    /// The key's command ran.
    Command {
        /// How many selections the command ran for.
        selections: usize,

        /// How many of those selections failed, under [FailurePolicy::SkipSelection].
        failed: usize,
    },

    /// The key was added to the pending count.
    Count,

    /// The key started a goto prefix.
    GotoPending,

    /// The key has no binding. Any goto prefix was dropped, and the count was left as it was.
    Unmapped,

    /// The key was typed in Insert mode, and is left for the host to handle.
    Ignored,

    /// The pending state was cleared, and the editor is back in Normal mode.
    Reset,
}

/// Interprets normal mode keys, and applies their commands to selections.
pub struct Dispatcher<S, E> {
    keymap: Keymap<S, E>,
    instance: Instance,
    config: DispatchConfig,
}

impl<S, E> Dispatcher<S, E>
where
    S: 'static,
    E: 'static,
{
    /// Create a new dispatcher with a fresh [Instance].
    pub fn new(keymap: Keymap<S, E>, config: DispatchConfig) -> Self {
        Dispatcher { keymap, instance: Instance::new(), config }
    }

    /// The keymap that keys are resolved in.
    pub fn keymap(&self) -> &Keymap<S, E> {
        &self.keymap
    }

    /// Replace the keymap.
    pub fn set_keymap(&mut self, keymap: Keymap<S, E>) {
        self.keymap = keymap;
    }

    /// The state persisting between keystrokes.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Mutable access to the state persisting between keystrokes.
    pub fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }

    /// How keys are interpreted.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn resolve(&self, key: &NormalKey) -> Option<(Command<S, E>, bool)> {
        if let Some(cmd) = self.keymap.get(key) {
            return Some((cmd.clone(), false));
        }

        if !self.config.extend_on_shift {
            return None;
        }

        let lower = key.unshifted()?;
        let cmd = self.keymap.get(&lower)?;

        return Some((cmd.clone(), true));
    }

    /// Handle keys that aren't bound in the keymap.
    fn input_unmapped(&mut self, key: &NormalKey) -> Dispatched {
        if let Some(digit) = key.digit().filter(|_| self.config.count_keys) {
            self.instance.push_digit(digit);
            trace!(count = self.instance.count(), "pending count");

            return Dispatched::Count;
        }

        if *key == self.config.goto_key {
            self.instance.enter_goto();

            return Dispatched::GotoPending;
        }

        if *key == NormalKey::Esc {
            self.instance.reset_pending();

            return Dispatched::Reset;
        }

        // A goto prefix only applies to the key right after it.
        if self.instance.is_goto_pending() {
            debug!(%key, "unmapped key, dropping goto prefix");
            self.instance.clear_goto();
        } else {
            debug!(%key, "unmapped key");
        }

        return Dispatched::Unmapped;
    }

    /// Process a typed key, applying its command to each of the `selections`.
    ///
    /// When the command fails on a selection under [FailurePolicy::AbortKeystroke], the later
    /// selections are left untouched and the failure is returned. Either way, the pending count
    /// and goto prefix are settled as if the keystroke had succeeded.
    pub fn input_key(
        &mut self,
        key: &NormalKey,
        editor: &mut E,
        selections: &mut [S],
    ) -> DispatchResult<Dispatched> {
        if self.instance.mode() == EditorMode::Insert {
            if *key == NormalKey::Esc {
                self.instance.change_mode_to_normal();

                return Ok(Dispatched::Reset);
            }

            return Ok(Dispatched::Ignored);
        }

        let Some((cmd, extend)) = self.resolve(key) else {
            return Ok(self.input_unmapped(key));
        };

        let pending = Pending::of(&self.instance).extend(extend);
        let count = self.instance.count();
        let policy = self.config.failure_policy;

        debug!(
            %key,
            count,
            goto = self.instance.is_goto_pending(),
            extend,
            selections = selections.len(),
            "dispatching key"
        );

        let mut failed = 0;
        let mut res = Ok(());
        let mut ctx = EditingContext::with_pending(editor, &mut self.instance, pending);

        for (index, sel) in selections.iter_mut().enumerate() {
            trace!(index, "running command");

            let Err(source) = cmd.invoke(sel, &mut ctx) else {
                continue;
            };

            warn!(%key, index, error = %source, "command failed");

            match policy {
                FailurePolicy::AbortKeystroke => {
                    res = Err(DispatchError::Command { key: *key, index, source });
                    break;
                },
                FailurePolicy::SkipSelection => {
                    failed += 1;
                },
            }
        }

        self.settle(count);

        return res.map(|_| Dispatched::Command { selections: selections.len(), failed });
    }

    /// Clear the goto prefix, and any count that the keystroke's command didn't use.
    fn settle(&mut self, count: usize) {
        self.instance.clear_goto();

        if self.config.discard_unused_count && count > 0 && self.instance.count() == count {
            trace!(count, "discarding unused count");
            self.instance.update_count(0);
        }
    }
}

impl<S, E> Default for Dispatcher<S, E>
where
    S: Selection + 'static,
    E: Editor<S> + 'static,
{
    fn default() -> Self {
        Dispatcher::new(Keymap::normal(), DispatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::combinators::{movement, with_count};
    use crate::editing::document::{DocumentEditor, DocumentSelection, SharedDocument};
    use crate::editing::MoveDir;
    use crate::errors::CommandError;
    use crate::instance::SelectionMode;

    type DocDispatcher = Dispatcher<DocumentSelection, DocumentEditor>;

    /// Type keys into a document, stopping at the first failure.
    fn type_keys(
        dispatcher: &mut DocDispatcher,
        doc: &SharedDocument,
        keys: &str,
    ) -> DispatchResult<Dispatched> {
        let mut editor = doc.editor();
        let mut res = Ok(Dispatched::Unmapped);

        for key in keys!(keys) {
            let mut selections = doc.selections();
            res = Ok(dispatcher.input_key(&key, &mut editor, &mut selections)?);
        }

        return res;
    }

    fn setup(text: &str) -> (DocDispatcher, SharedDocument) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        (Dispatcher::default(), SharedDocument::from(text))
    }

    #[test]
    fn test_count_movement() {
        let (mut dispatcher, doc) = setup("a\nb\nc\nd\ne\nf\n");

        type_keys(&mut dispatcher, &doc, "3j").unwrap();
        assert_eq!(doc.ranges(), vec![6..6]);
        assert_eq!(dispatcher.instance().count(), 0);

        // The count doesn't carry over to the next key.
        type_keys(&mut dispatcher, &doc, "k").unwrap();
        assert_eq!(doc.ranges(), vec![4..4]);
    }

    #[test]
    fn test_count_equals_repeated_keys() {
        let counted = SharedDocument::from("hello world\nfoo bar baz\n");
        let repeated = SharedDocument::from("hello world\nfoo bar baz\n");
        let mut dispatcher = DocDispatcher::default();

        for (counted_keys, repeated_keys) in [("3l", "lll"), ("2w", "ww"), ("2j4h", "jjhhhh")] {
            counted.set_ranges(&[1..1]);
            repeated.set_ranges(&[1..1]);

            type_keys(&mut dispatcher, &counted, counted_keys).unwrap();
            type_keys(&mut dispatcher, &repeated, repeated_keys).unwrap();

            assert_eq!(counted.ranges(), repeated.ranges(), "{counted_keys} vs {repeated_keys}");
        }
    }

    #[test]
    fn test_count_same_for_all_selections() {
        let (mut dispatcher, doc) = setup("abcdef\nghijkl\n");
        doc.set_ranges(&[0..0, 7..7]);

        let res = type_keys(&mut dispatcher, &doc, "2l").unwrap();
        assert_eq!(res, Dispatched::Command { selections: 2, failed: 0 });
        assert_eq!(doc.ranges(), vec![2..2, 9..9]);
        assert_eq!(dispatcher.instance().count(), 0);
    }

    #[test]
    fn test_unused_count_discarded() {
        let (mut dispatcher, doc) = setup("hello world");
        doc.set_ranges(&[0..5]);

        type_keys(&mut dispatcher, &doc, "5y").unwrap();
        assert_eq!(dispatcher.instance().count(), 0);

        let config = DispatchConfig::builder().discard_unused_count(false).build();
        let mut dispatcher = DocDispatcher::new(Keymap::normal(), config);
        type_keys(&mut dispatcher, &doc, "5y").unwrap();
        assert_eq!(dispatcher.instance().count(), 5);
    }

    #[test]
    fn test_backspace_count() {
        let (mut dispatcher, doc) = setup("abc");
        doc.set_ranges(&[2..2]);

        assert_eq!(type_keys(&mut dispatcher, &doc, "12"), Ok(Dispatched::Count));
        type_keys(&mut dispatcher, &doc, "<BS>").unwrap();
        assert_eq!(dispatcher.instance().count(), 1);

        type_keys(&mut dispatcher, &doc, "<BS>").unwrap();
        assert_eq!(dispatcher.instance().count(), 0);
        assert_eq!(doc.text(), "abc");

        // With no count, the previous character is deleted.
        type_keys(&mut dispatcher, &doc, "<BS>").unwrap();
        assert_eq!(doc.text(), "ac");
        assert_eq!(doc.ranges(), vec![1..1]);
    }

    #[test]
    fn test_backspace_count_many_selections() {
        let (mut dispatcher, doc) = setup("abc def");
        doc.set_ranges(&[1..1, 5..5]);

        type_keys(&mut dispatcher, &doc, "123<BS>").unwrap();
        assert_eq!(dispatcher.instance().count(), 12);

        type_keys(&mut dispatcher, &doc, "<BS><BS>").unwrap();
        assert_eq!(dispatcher.instance().count(), 0);
        assert_eq!(doc.text(), "abc def");
        assert_eq!(doc.ranges(), vec![1..1, 5..5]);
    }

    #[test]
    fn test_goto_h() {
        let (mut dispatcher, doc) = setup("  hello\n");
        doc.set_ranges(&[5..5]);
        dispatcher.instance_mut().set_selection_mode(SelectionMode::Extend);

        assert_eq!(type_keys(&mut dispatcher, &doc, "g"), Ok(Dispatched::GotoPending));
        assert!(dispatcher.instance().is_goto_pending());

        type_keys(&mut dispatcher, &doc, "h").unwrap();
        assert_eq!(doc.ranges(), vec![0..0]);
        assert!(!dispatcher.instance().is_goto_pending());

        // Without the prefix, `l` extends one character at a time.
        type_keys(&mut dispatcher, &doc, "ll").unwrap();
        assert_eq!(doc.ranges(), vec![0..2]);
    }

    #[test]
    fn test_goto_without_destination() {
        let (mut dispatcher, doc) = setup("f(x) + y");

        type_keys(&mut dispatcher, &doc, "gm").unwrap();
        assert_eq!(doc.selected_text(0).as_deref(), Some("(x)"));
        assert!(!dispatcher.instance().is_goto_pending());

        // Keys that have no goto behaviour at all still clear the prefix.
        doc.set_ranges(&[0..3]);
        type_keys(&mut dispatcher, &doc, "gy").unwrap();
        assert_eq!(doc.register().as_deref(), Some("f(x"));
        assert!(!dispatcher.instance().is_goto_pending());
    }

    #[test]
    fn test_goto_count() {
        let (mut dispatcher, doc) = setup("abcdef\n");
        doc.set_ranges(&[4..4]);

        type_keys(&mut dispatcher, &doc, "3gh").unwrap();
        assert_eq!(doc.ranges(), vec![0..0]);
        assert_eq!(dispatcher.instance().count(), 0);
        assert!(!dispatcher.instance().is_goto_pending());
    }

    #[test]
    fn test_open_below_count() {
        let (mut dispatcher, doc) = setup("ab\ncd\n");

        type_keys(&mut dispatcher, &doc, "3o").unwrap();
        assert_eq!(doc.text(), "ab\n\n\n\ncd\n");
        assert_eq!(doc.ranges(), vec![5..5]);
        assert_eq!(dispatcher.instance().mode(), EditorMode::Insert);

        // Keys typed in Insert mode belong to the host.
        assert_eq!(type_keys(&mut dispatcher, &doc, "x"), Ok(Dispatched::Ignored));
        assert_eq!(type_keys(&mut dispatcher, &doc, "<Esc>"), Ok(Dispatched::Reset));
        assert_eq!(dispatcher.instance().mode(), EditorMode::Normal);
    }

    #[test]
    fn test_shift_extends() {
        let (mut dispatcher, doc) = setup("hello world\n");
        doc.set_ranges(&[1..1]);

        type_keys(&mut dispatcher, &doc, "3L").unwrap();
        assert_eq!(doc.ranges(), vec![1..4]);

        type_keys(&mut dispatcher, &doc, "l").unwrap();
        assert_eq!(doc.ranges(), vec![5..5]);

        type_keys(&mut dispatcher, &doc, "W").unwrap();
        assert_eq!(doc.ranges(), vec![5..6]);

        // Bound uppercase keys keep their own meaning.
        type_keys(&mut dispatcher, &doc, "A").unwrap();
        assert_eq!(doc.ranges(), vec![11..11]);
        assert_eq!(dispatcher.instance().mode(), EditorMode::Insert);
    }

    #[test]
    fn test_shift_disabled() {
        let doc = SharedDocument::from("hello");
        let config = DispatchConfig::builder().extend_on_shift(false).build();
        let mut dispatcher = DocDispatcher::new(Keymap::normal(), config);

        assert_eq!(type_keys(&mut dispatcher, &doc, "L"), Ok(Dispatched::Unmapped));
        assert_eq!(doc.ranges(), vec![0..0]);
    }

    #[test]
    fn test_unmapped_keeps_count() {
        let (mut dispatcher, doc) = setup("hello");

        type_keys(&mut dispatcher, &doc, "4").unwrap();
        assert_eq!(type_keys(&mut dispatcher, &doc, "z"), Ok(Dispatched::Unmapped));
        assert_eq!(dispatcher.instance().count(), 4);

        assert_eq!(type_keys(&mut dispatcher, &doc, "<Esc>"), Ok(Dispatched::Reset));
        assert_eq!(dispatcher.instance().count(), 0);
    }

    #[test]
    fn test_unmapped_ends_goto() {
        let (mut dispatcher, doc) = setup("abcdef\n");
        doc.set_ranges(&[4..4]);

        type_keys(&mut dispatcher, &doc, "g").unwrap();
        assert_eq!(type_keys(&mut dispatcher, &doc, "z"), Ok(Dispatched::Unmapped));
        assert!(!dispatcher.instance().is_goto_pending());

        // `h` is back to its ordinary behaviour.
        type_keys(&mut dispatcher, &doc, "h").unwrap();
        assert_eq!(doc.ranges(), vec![3..3]);

        // A count typed before the prefix survives the unmapped key.
        type_keys(&mut dispatcher, &doc, "2gzh").unwrap();
        assert_eq!(doc.ranges(), vec![1..1]);
        assert_eq!(dispatcher.instance().count(), 0);
    }

    #[test]
    fn test_custom_goto_and_count_keys() {
        let doc = SharedDocument::from("abc\n");
        let config = DispatchConfig::builder().goto_key(';').count_keys(false).build();
        let keymap = Keymap::builder()
            .bind('1', with_count(movement(MoveDir::Right)))
            .build();
        let mut dispatcher = DocDispatcher::new(keymap, config);

        assert_eq!(type_keys(&mut dispatcher, &doc, ";"), Ok(Dispatched::GotoPending));
        assert_eq!(type_keys(&mut dispatcher, &doc, "2"), Ok(Dispatched::Unmapped));
        type_keys(&mut dispatcher, &doc, "1").unwrap();
        assert_eq!(doc.ranges(), vec![1..1]);
        assert!(!dispatcher.instance().is_goto_pending());
    }

    #[test]
    fn test_abort_keystroke() {
        let (mut dispatcher, doc) = setup("abc\ndef\n");
        doc.set_ranges(&[0..1, 4..5]);
        doc.set_read_only(true);

        let err = type_keys(&mut dispatcher, &doc, "2d").unwrap_err();
        assert_eq!(err, DispatchError::Command {
            key: NormalKey::Char('d'),
            index: 0,
            source: CommandError::ReadOnly,
        });
        assert_eq!(dispatcher.instance().count(), 0);

        // The failure aborted the keystroke before the second selection.
        doc.set_read_only(false);
        doc.set_ranges(&[0..0, 4..4]);
        let keymap = Keymap::builder()
            .bind(
                'q',
                Command::new(|sel: &mut DocumentSelection, _| {
                    if sel.id() == 0 {
                        return Err(CommandError::Failure("first".into()));
                    }

                    sel.extend(MoveDir::Right)
                }),
            )
            .build();
        dispatcher.set_keymap(keymap);

        let err = type_keys(&mut dispatcher, &doc, "q").unwrap_err();
        assert!(matches!(err, DispatchError::Command { index: 0, .. }));
        assert_eq!(doc.ranges(), vec![0..0, 4..4]);
    }

    #[test]
    fn test_skip_selection() {
        let doc = SharedDocument::from("abc\ndef\n");
        doc.set_ranges(&[0..0, 4..4]);

        let config = DispatchConfig::builder()
            .failure_policy(FailurePolicy::SkipSelection)
            .build();
        let keymap = Keymap::builder()
            .bind(
                'q',
                Command::new(|sel: &mut DocumentSelection, _| {
                    if sel.id() == 0 {
                        return Err(CommandError::Failure("first".into()));
                    }

                    sel.extend(MoveDir::Right)
                }),
            )
            .build();
        let mut dispatcher = DocDispatcher::new(keymap, config);

        let res = type_keys(&mut dispatcher, &doc, "q");
        assert_eq!(res, Ok(Dispatched::Command { selections: 2, failed: 1 }));
        assert_eq!(doc.ranges(), vec![0..0, 4..5]);
    }
}
