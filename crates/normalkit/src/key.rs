//! # Normal mode keys
//!
//! ## Overview
//!
//! This module contains [NormalKey], the identifier that the [Keymap](crate::keymap::Keymap) is
//! indexed by, along with parsing of key notation and conversion from terminal key events.
//!
//! Key notation follows the usual conventions: printable characters stand for themselves, and
//! special keys are written in angle brackets.
//!
//! ```
//! use normalkit::key::NormalKey;
//!
//! let keys = NormalKey::parse_seq("12<BS>x").unwrap();
//!
//! assert_eq!(keys, vec![
//!     NormalKey::Char('1'),
//!     NormalKey::Char('2'),
//!     NormalKey::Backspace,
//!     NormalKey::Char('x'),
//! ]);
//! ```
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{anychar, char},
    combinator::{eof, value},
    multi::many1,
    IResult,
};

use crate::errors::KeyError;

/// A key that can be bound in normal mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NormalKey {
    /// A printable character, with any Shift already applied.
    Char(char),

    /// The Backspace key.
    Backspace,

    /// The Escape key.
    Esc,
}

impl NormalKey {
    /// Parse a series of keypresses written in key notation.
    pub fn parse_seq(input: &str) -> Result<Vec<Self>, KeyError> {
        if input.is_empty() {
            return Err(KeyError::Empty);
        }

        match parse_keys(input) {
            Ok((_, keys)) => Ok(keys),
            Err(_) => Err(KeyError::Invalid(input.to_string())),
        }
    }

    /// Return the decimal digit this key types, if it is one.
    pub fn digit(&self) -> Option<usize> {
        match self {
            NormalKey::Char(c) => c.to_digit(10).map(|d| d as usize),
            _ => None,
        }
    }

    /// If this is an uppercase letter, return the key for its lowercase counterpart.
    pub(crate) fn unshifted(&self) -> Option<NormalKey> {
        match self {
            NormalKey::Char(c) if c.is_uppercase() => {
                let mut lower = c.to_lowercase();

                match (lower.next(), lower.next()) {
                    (Some(l), None) => Some(NormalKey::Char(l)),
                    _ => None,
                }
            },
            _ => None,
        }
    }
}

impl From<char> for NormalKey {
    fn from(c: char) -> Self {
        NormalKey::Char(c)
    }
}

impl fmt::Display for NormalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalKey::Char('<') => write!(f, "<lt>"),
            NormalKey::Char(c) => write!(f, "{c}"),
            NormalKey::Backspace => write!(f, "<BS>"),
            NormalKey::Esc => write!(f, "<Esc>"),
        }
    }
}

impl FromStr for NormalKey {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(KeyError::Empty);
        } else if let Ok((_, key)) = parse_single(input) {
            return Ok(key);
        } else {
            return Err(KeyError::Invalid(input.to_string()));
        }
    }
}

impl TryFrom<KeyEvent> for NormalKey {
    type Error = KeyError;

    fn try_from(ke: KeyEvent) -> Result<Self, Self::Error> {
        match ke.code {
            KeyCode::Char(c) => {
                // Terminals disagree on whether SHIFT gets reported for characters, so ignore it.
                if (ke.modifiers - KeyModifiers::SHIFT).is_empty() {
                    Ok(NormalKey::Char(c))
                } else {
                    Err(KeyError::Unsupported(format!("{:?}+{c}", ke.modifiers)))
                }
            },
            KeyCode::Backspace => Ok(NormalKey::Backspace),
            KeyCode::Esc => Ok(NormalKey::Esc),
            code => Err(KeyError::Unsupported(format!("{code:?}"))),
        }
    }
}

fn parse_special(input: &str) -> IResult<&str, NormalKey> {
    let (input, _) = char('<')(input)?;
    let (input, key) = alt((
        value(NormalKey::Backspace, tag_no_case("backspace")),
        value(NormalKey::Backspace, tag_no_case("bs")),
        value(NormalKey::Esc, tag_no_case("escape")),
        value(NormalKey::Esc, tag_no_case("esc")),
        value(NormalKey::Char('<'), tag("lt")),
        value(NormalKey::Char(' '), tag_no_case("space")),
    ))(input)?;
    let (input, _) = char('>')(input)?;

    Ok((input, key))
}

fn parse_simple(input: &str) -> IResult<&str, NormalKey> {
    let (input, c) = anychar(input)?;

    Ok((input, NormalKey::Char(c)))
}

fn parse_key(input: &str) -> IResult<&str, NormalKey> {
    alt((parse_special, parse_simple))(input)
}

fn parse_single(input: &str) -> IResult<&str, NormalKey> {
    let (input, key) = parse_key(input)?;
    let (input, _) = eof(input)?;

    Ok((input, key))
}

fn parse_keys(input: &str) -> IResult<&str, Vec<NormalKey>> {
    let (input, keys) = many1(parse_key)(input)?;
    let (input, _) = eof(input)?;

    Ok((input, keys))
}
