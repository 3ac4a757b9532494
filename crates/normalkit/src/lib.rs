//! # normalkit
//!
//! ## Overview
//!
//! This crate implements the normal mode of a Kakoune-style modal editor, where selections
//! instead of a single cursor are the primary thing being manipulated, and every keystroke is
//! applied to each active selection.
//!
//! Keys are mapped to [commands](commands::Command) in a [Keymap](keymap::Keymap). The keymap
//! itself contains no control flow: the behaviour that depends on the pending count, on whether
//! selections are being extended, and on whether a goto prefix was typed lives in the
//! [combinators](commands::combinators) that wrap each base command.
//!
//! The [Dispatcher](dispatch::Dispatcher) resolves a key, builds an
//! [EditingContext](editing::context::EditingContext) for the keystroke, and then runs the
//! command once for each selection.
//!
//! Text and selections are consumed through the [Selection](editing::Selection) and
//! [Editor](editing::Editor) traits. A rope-backed implementation of both is available in
//! [editing::document].
//!
//! ## Example
//!
//! ```
//! use normalkit::dispatch::Dispatcher;
//! use normalkit::editing::document::SharedDocument;
//! use normalkit::key::NormalKey;
//!
//! let doc = SharedDocument::from("hello world\n");
//! let mut editor = doc.editor();
//! let mut selections = doc.selections();
//! let mut dispatcher = Dispatcher::default();
//!
//! // "3l" moves the cursor three characters to the right.
//! for key in NormalKey::parse_seq("3l").unwrap() {
//!     dispatcher.input_key(&key, &mut editor, &mut selections).unwrap();
//! }
//!
//! assert_eq!(doc.ranges(), vec![3..3]);
//! assert_eq!(dispatcher.instance().count(), 0);
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

#[macro_use]
mod util;

pub mod commands;
pub mod dispatch;
pub mod editing;
pub mod errors;
pub mod instance;
pub mod key;
pub mod keymap;

pub use crossterm;
