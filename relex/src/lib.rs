//!# relex
//!
//! `relex` compiles a regular expression into the state-transition table of a
//! lexical scanner. The pipeline is the classical one: the source is scanned
//! and parsed into an NFA by Thompson's construction, determinized by the
//! subset construction, minimized by partition refinement, and finally
//! flattened into a dense `states × ascii` table ready for embedding in a
//! host program.
//!
//! ## Usage
//!
//! The one-call entry point runs the whole pipeline:
//!
//! ```rust
//! let table = relex::compile("[0-9]+").unwrap();
//!
//! // Drive the table by hand: rows are state ids, cell values are the next
//! // row (0 = no transition, row 0 is the reserved error row).
//! let mut row = table.start_row();
//! for byte in "2024".bytes() {
//!     row = table.next_state(row, byte) as usize;
//! }
//! assert!(table.is_accepting(row));
//! ```
//!
//! The stages are also available individually, which is useful for
//! inspecting the intermediate automata:
//!
//! ```rust
//! use relex::regex;
//!
//! let nfa = regex::parse("(ab)*c").unwrap();
//! let mut dfa = nfa.to_dfa();
//! dfa.minimize();
//! assert!(dfa.accepts("c"));
//! assert!(dfa.accepts("ababc"));
//! assert!(!dfa.accepts("abab"));
//! println!("{}", dfa.to_dot()); // graphviz rendering of the result
//! ```
//!
//! ## Scope
//!
//! The input alphabet is printable ASCII (codes 1 through 126). The syntax
//! covers literals, escapes, `"..."` quoting, character classes with ranges
//! and complement, `.`, grouping, alternation, the `*`/`+`/`?` postfix
//! operators, and the `^`/`$` line anchors; see [regex] for details. There
//! are no backreferences, no lookaround, no counted repetition and no
//! capture groups: the output is a plain finite automaton.
//!
//! Compilation is deterministic: the same source always yields byte-identical
//! DOT and table output.
//!
//! ## Operations
//!
//! * [Parsing a regex into an NFA](regex::parse)
//! * [Converting the NFA to a DFA](nfa::Nfa::to_dfa)
//! * [Minimizing the DFA](dfa::Dfa::minimize)
//! * [Rendering the DFA as graphviz](dfa::Dfa::to_dot)
//! * [Materializing the scanner table](dfa::Dfa::to_table)

pub mod bitset;
pub mod dfa;
pub mod nfa;
pub mod regex;
pub mod table;

pub use regex::ParseError;

/// Compiles a regex source into the scanner table: parse, determinize,
/// minimize, materialize.
pub fn compile(source: &str) -> Result<table::TransitionTable, ParseError> {
    let nfa = regex::parse(source)?;
    let mut dfa = nfa.to_dfa();
    dfa.minimize();
    Ok(dfa.to_table())
}

#[cfg(test)]
mod tests;
