//! # Reference document
//!
//! ## Overview
//!
//! This module provides an in-memory buffer with multiple selections, implementing the
//! [Selection] and [Editor] traits on top of a [Rope].
//!
//! A [SharedDocument] owns the text and every selection's position. The handles returned by
//! [SharedDocument::selections] and [SharedDocument::editor] refer back to it, so that an edit
//! made through one selection shifts all of the others.
//!
//! Positions are character offsets that sit between characters, so a selection covers the
//! characters from its start up to, but not including, its end. Motions that would leave the
//! buffer are clamped.
//!
//! ```
//! use normalkit::editing::{document::SharedDocument, MoveDir, Selection};
//!
//! let doc = SharedDocument::from("abc\ndef\n");
//! let mut sel = doc.selections().remove(0);
//!
//! sel.extend(MoveDir::Down).unwrap();
//! sel.extend(MoveDir::Right).unwrap();
//! assert_eq!(doc.ranges(), vec![0..5]);
//! assert_eq!(doc.selected_text(0).as_deref(), Some("abc\nd"));
//! ```
use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use ropey::Rope;

use super::{Editor, LinePosition, MoveDir, Selection, SelectionOp};
use crate::errors::{CommandError, CommandResult};

/// Character offset into a [Document].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::Sub,
    derive_more::From,
    derive_more::Into,
)]
pub struct CharOff(usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

fn bracket_pair(c: char) -> Option<(char, char, bool)> {
    match c {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        '<' => Some(('<', '>', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        '>' => Some(('<', '>', false)),
        _ => None,
    }
}

/// The anchor and cursor of one selection.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Span {
    anchor: CharOff,
    head: CharOff,

    /// Column to aim for when moving vertically through shorter lines.
    goal: Option<usize>,
}

impl Span {
    fn new(anchor: usize, head: usize) -> Self {
        Span { anchor: anchor.into(), head: head.into(), goal: None }
    }

    fn start(&self) -> CharOff {
        self.anchor.min(self.head)
    }

    fn end(&self) -> CharOff {
        self.anchor.max(self.head)
    }

    fn place(&mut self, off: CharOff) {
        self.anchor = off;
        self.head = off;
    }

    fn range(&self) -> Range<usize> {
        usize::from(self.anchor)..usize::from(self.head)
    }
}

/// Text plus the selections placed in it.
#[derive(Clone, Debug, Default)]
pub struct Document {
    rope: Rope,
    spans: Vec<Span>,
    register: Option<String>,
    read_only: bool,
}

impl Document {
    /// Create a document containing `text`, with a single cursor at its start.
    pub fn new(text: &str) -> Self {
        Document {
            rope: Rope::from_str(text),
            spans: vec![Span::default()],
            register: None,
            read_only: false,
        }
    }

    fn span(&self, id: usize) -> Result<&Span, CommandError> {
        self.spans.get(id).ok_or(CommandError::NoSelection)
    }

    fn span_mut(&mut self, id: usize) -> Result<&mut Span, CommandError> {
        self.spans.get_mut(id).ok_or(CommandError::NoSelection)
    }

    fn writable(&self) -> CommandResult {
        if self.read_only {
            Err(CommandError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn len(&self) -> CharOff {
        CharOff(self.rope.len_chars())
    }

    fn char_at(&self, off: CharOff) -> Option<char> {
        self.rope.get_char(off.0)
    }

    fn line_of(&self, off: CharOff) -> usize {
        self.rope
            .try_char_to_line(off.0)
            .unwrap_or_else(|_| self.rope.len_lines().saturating_sub(1))
    }

    fn line_start(&self, line: usize) -> CharOff {
        CharOff(self.rope.line_to_char(line))
    }

    /// Number of characters on a line, not counting its terminator.
    fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();

        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn line_end(&self, line: usize) -> CharOff {
        self.line_start(line) + CharOff(self.line_len(line))
    }

    fn first_nonblank(&self, line: usize) -> CharOff {
        let start = self.line_start(line);
        let end = self.line_end(line);
        let mut off = start;

        while off < end && matches!(self.char_at(off), Some(' ' | '\t')) {
            off = off + CharOff(1);
        }

        return off;
    }

    fn class_at(&self, off: CharOff) -> Option<CharClass> {
        self.char_at(off).map(classify)
    }

    fn class_before(&self, off: CharOff) -> Option<CharClass> {
        if off.0 == 0 {
            None
        } else {
            self.class_at(CharOff(off.0 - 1))
        }
    }

    fn skip_forward(&self, mut off: CharOff, class: CharClass) -> CharOff {
        while self.class_at(off) == Some(class) {
            off = off + CharOff(1);
        }

        return off;
    }

    fn skip_backward(&self, mut off: CharOff, class: CharClass) -> CharOff {
        while self.class_before(off) == Some(class) {
            off = off - CharOff(1);
        }

        return off;
    }

    /// Where the cursor lands after moving one unit in `dir`, along with its new goal column.
    fn step(&self, span: &Span, dir: MoveDir) -> (CharOff, Option<usize>) {
        let head = span.head;

        match dir {
            MoveDir::Left => (CharOff(head.0.saturating_sub(1)), None),
            MoveDir::Right => ((head + CharOff(1)).min(self.len()), None),
            MoveDir::Up | MoveDir::Down => {
                let line = self.line_of(head);
                let col = span.goal.unwrap_or((head - self.line_start(line)).0);

                let target = match dir {
                    MoveDir::Up if line > 0 => line - 1,
                    MoveDir::Down if line + 1 < self.rope.len_lines() => line + 1,
                    _ => return (head, span.goal),
                };

                let off = self.line_start(target) + CharOff(col.min(self.line_len(target)));

                (off, Some(col))
            },
        }
    }

    fn line_target(&self, head: CharOff, pos: LinePosition) -> CharOff {
        let line = self.line_of(head);

        match pos {
            LinePosition::Start => self.line_start(line),
            LinePosition::End => self.line_end(line),
            LinePosition::FirstNonBlank => self.first_nonblank(line),
        }
    }

    fn find_match(&self, off: CharOff, c: char) -> Option<CharOff> {
        let (open, close, forward) = bracket_pair(c)?;
        let mut depth = 0usize;

        if forward {
            let mut idx = off.0;

            for ch in self.rope.chars_at(off.0) {
                if ch == open {
                    depth += 1;
                } else if ch == close {
                    depth -= 1;

                    if depth == 0 {
                        return Some(CharOff(idx));
                    }
                }

                idx += 1;
            }
        } else {
            let mut idx = off.0 + 1;
            let mut chars = self.rope.chars_at(idx);

            while let Some(ch) = chars.prev() {
                idx -= 1;

                if ch == close {
                    depth += 1;
                } else if ch == open {
                    depth -= 1;

                    if depth == 0 {
                        return Some(CharOff(idx));
                    }
                }
            }
        }

        return None;
    }

    /// Compute the new anchor and head for a [SelectionOp].
    fn select_target(&self, span: &Span, op: SelectionOp) -> Option<(CharOff, CharOff)> {
        let head = span.head;
        let empty = span.anchor == span.head;

        match op {
            SelectionOp::NextWordStart => {
                let class = self.class_at(head)?;
                let off = if class == CharClass::Blank {
                    head
                } else {
                    self.skip_forward(head, class)
                };
                let off = self.skip_forward(off, CharClass::Blank);

                Some((span.anchor, off))
            },
            SelectionOp::WordEnd => {
                let off = self.skip_forward(head, CharClass::Blank);
                let class = self.class_at(off)?;

                Some((span.anchor, self.skip_forward(off, class)))
            },
            SelectionOp::PreviousWordStart => {
                let off = self.skip_backward(head, CharClass::Blank);
                let class = self.class_before(off)?;

                Some((span.anchor, self.skip_backward(off, class)))
            },
            SelectionOp::Line => {
                if head >= self.len() {
                    return None;
                }

                let line = self.line_of(head);
                let anchor = if empty { self.line_start(line) } else { span.anchor };
                let end = if line + 1 < self.rope.len_lines() {
                    self.line_start(line + 1)
                } else {
                    self.len()
                };

                Some((anchor, end))
            },
            SelectionOp::MatchingPair => {
                let line_end = self.line_end(self.line_of(head));
                let mut off = head;

                while off < line_end {
                    let c = self.char_at(off)?;

                    if let Some((_, _, forward)) = bracket_pair(c) {
                        let target = self.find_match(off, c)?;

                        return match (forward, empty) {
                            (true, true) => Some((off, target + CharOff(1))),
                            (false, true) => Some((off + CharOff(1), target)),
                            (true, false) => Some((span.anchor, target + CharOff(1))),
                            (false, false) => Some((span.anchor, target)),
                        };
                    }

                    off = off + CharOff(1);
                }

                None
            },
        }
    }

    /// Remove a range of text, and shift every selection to account for it.
    fn remove(&mut self, start: CharOff, end: CharOff) {
        if start >= end {
            return;
        }

        self.rope.remove(start.0..end.0);

        let removed = end - start;
        let adjust = |off: CharOff| {
            if off <= start {
                off
            } else if off < end {
                start
            } else {
                off - removed
            }
        };

        for span in self.spans.iter_mut() {
            span.anchor = adjust(span.anchor);
            span.head = adjust(span.head);
        }
    }

    /// Insert text, and shift every selection at or after the insertion point.
    fn insert(&mut self, at: CharOff, text: &str) {
        self.rope.insert(at.0, text);

        let added = CharOff(text.chars().count());

        for span in self.spans.iter_mut() {
            if span.anchor >= at {
                span.anchor = span.anchor + added;
            }

            if span.head >= at {
                span.head = span.head + added;
            }
        }
    }

    fn selected(&self, span: &Span) -> String {
        self.rope.slice(span.start().0..span.end().0).to_string()
    }

    fn collapse(&mut self, id: usize) -> CommandResult {
        let span = self.span_mut(id)?;
        span.anchor = span.head;

        Ok(())
    }

    fn collapse_to_start(&mut self, id: usize) -> CommandResult {
        let span = self.span_mut(id)?;
        let start = span.start();
        span.place(start);
        span.goal = None;

        Ok(())
    }

    fn shift(&mut self, id: usize, dir: MoveDir, extend: bool) -> CommandResult {
        let (head, goal) = self.step(self.span(id)?, dir);
        let span = self.span_mut(id)?;

        span.head = head;
        span.goal = goal;

        if !extend {
            span.anchor = head;
        }

        Ok(())
    }

    fn to_line(&mut self, id: usize, pos: LinePosition, extend: bool) -> CommandResult {
        let head = self.line_target(self.span(id)?.head, pos);
        let span = self.span_mut(id)?;

        span.head = head;
        span.goal = None;

        if !extend {
            span.anchor = head;
        }

        Ok(())
    }

    fn select(&mut self, id: usize, op: SelectionOp) -> CommandResult {
        if let Some((anchor, head)) = self.select_target(self.span(id)?, op) {
            let span = self.span_mut(id)?;
            span.anchor = anchor;
            span.head = head;
            span.goal = None;
        }

        Ok(())
    }

    fn copy(&mut self, id: usize) -> CommandResult {
        let span = self.span(id)?;

        if span.anchor != span.head {
            self.register = Some(self.selected(span));
        }

        Ok(())
    }

    fn delete(&mut self, id: usize) -> CommandResult {
        let span = self.span(id)?;
        let (start, end) = (span.start(), span.end());

        if start == end {
            return Ok(());
        }

        self.writable()?;
        self.remove(start, end);

        let span = self.span_mut(id)?;
        span.place(start);
        span.goal = None;

        Ok(())
    }

    fn open_line(&mut self, id: usize, below: bool) -> CommandResult {
        self.writable()?;

        let line = self.line_of(self.span(id)?.head);
        let at = if below {
            self.line_end(line)
        } else {
            self.line_start(line)
        };

        self.insert(at, "\n");

        let cursor = if below { at + CharOff(1) } else { at };
        let span = self.span_mut(id)?;
        span.place(cursor);
        span.goal = None;

        Ok(())
    }
}

/// A [Document] that can be shared between selection handles and an editor.
#[derive(Clone, Debug, Default)]
pub struct SharedDocument(Rc<RefCell<Document>>);

impl SharedDocument {
    /// Create a document containing `text`, with a single cursor at its start.
    pub fn new(text: &str) -> Self {
        SharedDocument(Rc::new(RefCell::new(Document::new(text))))
    }

    /// Get the [Editor] for this document.
    pub fn editor(&self) -> DocumentEditor {
        DocumentEditor { doc: self.clone() }
    }

    /// Get handles to every selection, ordered by their starting positions.
    pub fn selections(&self) -> Vec<DocumentSelection> {
        let doc = self.0.borrow();
        let mut ids = (0..doc.spans.len()).collect::<Vec<_>>();
        ids.sort_by_key(|id| (doc.spans[*id].start(), *id));

        ids.into_iter()
            .map(|id| DocumentSelection { doc: self.clone(), id })
            .collect()
    }

    /// Replace the selections with the given anchor and cursor pairs.
    ///
    /// If `ranges` is empty, a single cursor is placed at the start of the document.
    pub fn set_ranges(&self, ranges: &[Range<usize>]) {
        let mut doc = self.0.borrow_mut();
        let len = doc.len().0;

        doc.spans = ranges
            .iter()
            .map(|r| Span::new(r.start.min(len), r.end.min(len)))
            .collect();

        if doc.spans.is_empty() {
            doc.spans.push(Span::default());
        }
    }

    /// The anchor and cursor of each selection, in the order they were created.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.0.borrow().spans.iter().map(Span::range).collect()
    }

    /// The text covered by a selection.
    pub fn selected_text(&self, id: usize) -> Option<String> {
        let doc = self.0.borrow();
        let span = doc.spans.get(id)?;

        Some(doc.selected(span))
    }

    /// The full contents of the document.
    pub fn text(&self) -> String {
        self.0.borrow().rope.to_string()
    }

    /// The text most recently copied or cut.
    pub fn register(&self) -> Option<String> {
        self.0.borrow().register.clone()
    }

    /// Prevent or allow modifying the document's text.
    pub fn set_read_only(&self, read_only: bool) {
        self.0.borrow_mut().read_only = read_only;
    }
}

impl From<&str> for SharedDocument {
    fn from(text: &str) -> Self {
        SharedDocument::new(text)
    }
}

/// A handle to one of a [SharedDocument]'s selections.
#[derive(Clone, Debug)]
pub struct DocumentSelection {
    doc: SharedDocument,
    id: usize,
}

impl DocumentSelection {
    /// The index of this selection within the document.
    pub fn id(&self) -> usize {
        self.id
    }

    fn with<T>(&self, f: impl FnOnce(&mut Document, usize) -> T) -> T {
        f(&mut self.doc.0.borrow_mut(), self.id)
    }
}

impl Selection for DocumentSelection {
    fn is_empty(&self) -> bool {
        let doc = self.doc.0.borrow();

        doc.spans.get(self.id).map(|s| s.anchor == s.head).unwrap_or(true)
    }

    fn collapse(&mut self) -> CommandResult {
        self.with(|doc, id| doc.collapse(id))
    }

    fn collapse_to_start(&mut self) -> CommandResult {
        self.with(|doc, id| doc.collapse_to_start(id))
    }

    fn move_cursor(&mut self, dir: MoveDir) -> CommandResult {
        self.with(|doc, id| doc.shift(id, dir, false))
    }

    fn extend(&mut self, dir: MoveDir) -> CommandResult {
        self.with(|doc, id| doc.shift(id, dir, true))
    }

    fn move_to_line(&mut self, pos: LinePosition) -> CommandResult {
        self.with(|doc, id| doc.to_line(id, pos, false))
    }

    fn extend_to_line(&mut self, pos: LinePosition) -> CommandResult {
        self.with(|doc, id| doc.to_line(id, pos, true))
    }

    fn select(&mut self, op: SelectionOp) -> CommandResult {
        self.with(|doc, id| doc.select(id, op))
    }

    fn cut(&mut self) -> CommandResult {
        self.with(|doc, id| {
            doc.writable()?;
            doc.copy(id)?;
            doc.delete(id)
        })
    }

    fn copy(&mut self) -> CommandResult {
        self.with(|doc, id| doc.copy(id))
    }

    fn delete(&mut self) -> CommandResult {
        self.with(|doc, id| doc.delete(id))
    }
}

/// The [Editor] service for a [SharedDocument].
#[derive(Clone, Debug)]
pub struct DocumentEditor {
    doc: SharedDocument,
}

impl DocumentEditor {
    /// The document this editor modifies.
    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }
}

impl Editor<DocumentSelection> for DocumentEditor {
    fn insert_newline_below(&mut self, selection: &mut DocumentSelection) -> CommandResult {
        self.doc.0.borrow_mut().open_line(selection.id, true)
    }

    fn insert_newline_above(&mut self, selection: &mut DocumentSelection) -> CommandResult {
        self.doc.0.borrow_mut().open_line(selection.id, false)
    }
}
