//! # Instance State
//!
//! ## Overview
//!
//! The [Instance] holds the editing state that persists between keystrokes: which mode the
//! editor is in, whether movements extend selections, whether a goto prefix is waiting for its
//! destination key, and the count typed so far.
use tracing::debug;

/// The editing modes that normal mode commands can switch between.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EditorMode {
    /// Keys are interpreted as commands.
    #[default]
    Normal,

    /// Keys type text; handled by the host.
    Insert,
}

/// Whether movements relocate a bare cursor or grow the current selection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectionMode {
    /// Movements collapse the selection and move the cursor.
    #[default]
    Move,

    /// Movements keep the anchor in place and move the cursor.
    Extend,
}

/// State that persists across keystrokes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Instance {
    mode: EditorMode,
    selection_mode: SelectionMode,
    goto_pending: bool,
    count: usize,
}

impl Instance {
    /// Create a new [Instance] in Normal mode with no pending count.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current [EditorMode].
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Switch to Insert mode.
    pub fn change_mode_to_insert(&mut self) {
        if self.mode != EditorMode::Insert {
            debug!("entering insert mode");
        }

        self.mode = EditorMode::Insert;
    }

    /// Switch back to Normal mode.
    pub fn change_mode_to_normal(&mut self) {
        if self.mode != EditorMode::Normal {
            debug!("entering normal mode");
        }

        self.mode = EditorMode::Normal;
    }

    /// The current [SelectionMode].
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    /// Set whether movements extend selections.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
    }

    /// Whether the next key is the destination of a goto prefix.
    pub fn is_goto_pending(&self) -> bool {
        self.goto_pending
    }

    /// Wait for a goto destination on the next key.
    pub fn enter_goto(&mut self) {
        debug!("goto pending");
        self.goto_pending = true;
    }

    /// Stop waiting for a goto destination.
    pub fn clear_goto(&mut self) {
        self.goto_pending = false;
    }

    /// The pending count, where 0 means that no count has been typed.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Replace the pending count.
    pub fn update_count(&mut self, count: usize) {
        self.count = count;
    }

    /// Append a decimal digit to the pending count.
    ///
    /// Counts that would overflow saturate at [usize::MAX].
    pub fn push_digit(&mut self, digit: usize) {
        self.count = self.count.saturating_mul(10).saturating_add(digit);
    }

    /// Forget any pending count and goto prefix.
    pub fn reset_pending(&mut self) {
        self.count = 0;
        self.goto_pending = false;
    }
}

/// Remove the last decimal digit of a count.
///
/// Removing the only digit leaves no count (0), rather than a count of "0".
pub(crate) fn truncate_count(count: usize) -> usize {
    let digits = count.to_string();
    let remaining = &digits[..digits.len().saturating_sub(1)];

    remaining.parse::<usize>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_digit() {
        let mut instance = Instance::new();

        instance.push_digit(1);
        instance.push_digit(2);
        assert_eq!(instance.count(), 12);

        instance.update_count(usize::MAX / 2);
        instance.push_digit(9);
        assert_eq!(instance.count(), usize::MAX);
    }

    #[test]
    fn test_leading_zero() {
        let mut instance = Instance::new();

        instance.push_digit(0);
        assert_eq!(instance.count(), 0);

        instance.push_digit(4);
        assert_eq!(instance.count(), 4);
    }

    #[test]
    fn test_truncate_count() {
        assert_eq!(truncate_count(123), 12);
        assert_eq!(truncate_count(12), 1);
        assert_eq!(truncate_count(1), 0);
        assert_eq!(truncate_count(10), 1);
        assert_eq!(truncate_count(0), 0);
    }

    #[test]
    fn test_modes() {
        let mut instance = Instance::new();
        assert_eq!(instance.mode(), EditorMode::Normal);
        assert_eq!(instance.selection_mode(), SelectionMode::Move);

        instance.change_mode_to_insert();
        assert_eq!(instance.mode(), EditorMode::Insert);

        instance.change_mode_to_normal();
        assert_eq!(instance.mode(), EditorMode::Normal);

        instance.enter_goto();
        instance.update_count(5);
        assert!(instance.is_goto_pending());

        instance.reset_pending();
        assert!(!instance.is_goto_pending());
        assert_eq!(instance.count(), 0);
    }
}
