//! # Regular expression front end
//! Scans a regex source string into tokens and builds an [Nfa](crate::nfa::Nfa)
//! with the Thompson construction, one small fragment per grammar production.
//!
//! ## Syntax
//! The recognized metacharacters are `( ) [ ] ^ - . $ | + ? *`. A backslash
//! escapes the following character, with `\t`, `\n` and `\r` mapping to the
//! usual control codes and anything else passing through literally. A section
//! between double quotes (`"..."`) disables all metacharacters; inside it,
//! `\"` is a literal quote. Character classes support ranges (`[0-9A-Fa-f]`)
//! and complement (`[^...]`, which also excludes the line enders `\n` and
//! `\r`), and `.` matches any character except the line enders. A leading `^`
//! anchors a rule to line start and a trailing `$` to line end.
//!
//! A source may hold several rules: after a `$`-terminated rule, the next
//! character starts a new rule, and the machines are joined into one NFA so
//! that any rule may accept.
//!
//! Input must be printable ASCII (codes 1 through 126); anything else is
//! rejected with the offending offset.
//!
//! ## Example
//! ```
//! use relex::regex;
//!
//! let nfa = regex::parse("[A-Za-z_][A-Za-z0-9_]*").unwrap();
//! let dfa = nfa.to_dfa();
//! assert!(dfa.accepts("ident_1"));
//! assert!(!dfa.accepts("1dent"));
//! ```

mod lexer;
mod parser;

pub use lexer::Token;
pub use parser::parse;

use thiserror::Error;

/// A fatal compilation error, carrying the byte offset of the offending
/// character in the source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{symbol}' must follow an expression (offset {offset})")]
    MisplacedPostfix { symbol: char, offset: usize },
    #[error("encountered a stray ']' (offset {offset})")]
    StrayRightBracket { offset: usize },
    #[error("encountered a stray '^' (offset {offset})")]
    StrayCaret { offset: usize },
    #[error("expected ')' (offset {offset})")]
    MissingRightParen { offset: usize },
    #[error("encountered an unmatched ')' (offset {offset})")]
    UnmatchedRightParen { offset: usize },
    #[error("the character class opened at offset {offset} is never closed")]
    UnterminatedClass { offset: usize },
    #[error("the quote opened at offset {offset} is never closed")]
    UnterminatedQuote { offset: usize },
    #[error("code point {code:#x} at offset {offset} is outside printable ascii")]
    UnsupportedByte { code: u32, offset: usize },
}
