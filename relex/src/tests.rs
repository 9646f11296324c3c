use crate::bitset::Bitset;
use crate::dfa::Dfa;
use crate::nfa::{Anchor, Edge};
use crate::regex::{self, ParseError};
use crate::table::{ASCII_COLUMNS, ERROR_SENTINEL};
use ::regex::Regex as LibRegex;
use proptest::prelude::*;

fn compiled(pattern: &str) -> Dfa {
    let mut dfa = regex::parse(pattern).unwrap().to_dfa();
    dfa.minimize();
    dfa
}

/// Walks the DFA from an arbitrary state, for distinguishability probes
fn accepts_from(dfa: &Dfa, mut state: usize, input: &str) -> bool {
    for byte in input.bytes() {
        match dfa.goto_on(state, byte) {
            Some(next) => state = next,
            None => return false,
        }
    }
    dfa.states()[state].is_accepting()
}

#[test]
fn literal_word() {
    let dfa = compiled("abc");
    assert_eq!(dfa.states().len(), 4);
    assert!(dfa.accepts("abc"));
    assert!(!dfa.accepts("ab"));
    assert!(!dfa.accepts("abcd"));
    assert!(!dfa.accepts(""));
}

#[test]
fn alternation_merges_labels() {
    let dfa = compiled("a|b");
    assert_eq!(dfa.states().len(), 2);

    let start = &dfa.states()[dfa.start_index()];
    assert!(!start.is_accepting());
    assert_eq!(start.transitions().len(), 1);

    let transition = &start.transitions()[0];
    let expected: Bitset = [b'a' as usize, b'b' as usize].into_iter().collect();
    assert_eq!(transition.chars(), &expected);
    assert!(dfa.states()[transition.target()].is_accepting());
}

#[test]
fn kleene_star_start_state_accepts() {
    let dfa = compiled("a*");
    assert!(dfa.states()[dfa.start_index()].is_accepting());
    assert!(dfa.accepts(""));
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("aaaa"));
    assert!(!dfa.accepts("ab"));
    assert_eq!(dfa.states().len(), 1);
}

#[test]
fn digit_class_with_self_loop() {
    let dfa = compiled("[0-9]+");
    assert_eq!(dfa.states().len(), 2);

    let digits: Bitset = (b'0'..=b'9').map(usize::from).collect();
    let start = &dfa.states()[dfa.start_index()];
    assert_eq!(start.transitions().len(), 1);
    assert_eq!(start.transitions()[0].chars(), &digits);

    let accept = start.transitions()[0].target();
    assert!(dfa.states()[accept].is_accepting());
    let back = &dfa.states()[accept].transitions()[0];
    assert_eq!(back.target(), accept);
    assert_eq!(back.chars(), &digits);

    assert!(dfa.accepts("2024"));
    assert!(!dfa.accepts(""));
    assert!(!dfa.accepts("12a"));
}

#[test]
fn dot_excludes_line_enders() {
    let dfa = compiled(".");
    assert!(dfa.accepts("x"));
    assert!(dfa.accepts(" "));
    assert!(dfa.accepts("~"));
    assert!(!dfa.accepts("\n"));
    assert!(!dfa.accepts("\r"));
    assert!(!dfa.accepts("xy"));
    assert!(!dfa.accepts(""));
}

#[test]
fn anchored_rule_shape() {
    let nfa = regex::parse("^a$").unwrap();

    // The terminal carries both anchor flags
    let terminal = nfa
        .nodes()
        .iter()
        .find(|node| node.is_terminal())
        .unwrap();
    assert_eq!(terminal.anchor(), Anchor::BOTH);

    // A literal newline head for the line-start anchor
    assert!(nfa
        .nodes()
        .iter()
        .any(|node| matches!(node.edge(), Edge::Char(b'\n'))));

    // A {'\n','\r'} class tail for the line-end anchor
    let line_enders: Bitset = [b'\n' as usize, b'\r' as usize].into_iter().collect();
    assert!(nfa.nodes().iter().any(|node| matches!(
        node.edge(),
        Edge::Class { set, complement: false } if set == &line_enders
    )));

    // Unanchored rules carry no flags
    let plain = regex::parse("a").unwrap();
    let terminal = plain
        .nodes()
        .iter()
        .find(|node| node.is_terminal())
        .unwrap();
    assert_eq!(terminal.anchor(), Anchor::NONE);
}

#[test]
fn anchor_survives_to_the_table() {
    let table = crate::compile("^ab$").unwrap();
    let accepting_rows: Vec<usize> = (1..=table.num_states())
        .filter(|&row| table.is_accepting(row))
        .collect();
    assert_eq!(accepting_rows.len(), 1);
    assert_eq!(table.anchor(accepting_rows[0]), Anchor::BOTH);
    assert_eq!(table.anchor(0), Anchor::NONE);
}

#[test]
fn multiple_rules_share_one_machine() {
    // Two rules, `a$` and `b`; the machine accepts via either
    let dfa = compiled("a$b");
    assert!(dfa.accepts("a\n"));
    assert!(dfa.accepts("a\r"));
    assert!(dfa.accepts("b"));
    assert!(!dfa.accepts("a"));
    assert!(!dfa.accepts("ab"));
}

#[test]
fn quoted_metacharacters_are_literal() {
    let dfa = compiled("\"a+b\"");
    assert!(dfa.accepts("a+b"));
    assert!(!dfa.accepts("ab"));
    assert!(!dfa.accepts("aab"));
}

#[test]
fn escapes_in_patterns() {
    assert!(compiled(r"a\tb").accepts("a\tb"));
    assert!(compiled(r"\*\+").accepts("*+"));
    assert!(compiled(r"\(x\)").accepts("(x)"));
}

#[test]
fn empty_class_is_the_control_characters() {
    let dfa = compiled("[]");
    assert!(dfa.accepts("\t"));
    assert!(dfa.accepts("\x01"));
    assert!(dfa.accepts(" "));
    assert!(!dfa.accepts("a"));
}

#[test]
fn negated_class_excludes_line_enders() {
    let dfa = compiled("[^ab]");
    assert!(dfa.accepts("c"));
    assert!(dfa.accepts("!"));
    assert!(!dfa.accepts("a"));
    assert!(!dfa.accepts("b"));
    assert!(!dfa.accepts("\n"));
    assert!(!dfa.accepts("\r"));
}

#[test]
fn literal_dashes_in_classes() {
    // Leading and trailing dashes are literals, not range operators
    assert!(compiled("[-x]").accepts("-"));
    assert!(compiled("[-x]").accepts("x"));
    assert!(compiled("[a-]").accepts("-"));
    assert!(compiled("[a-]").accepts("a"));
    assert!(!compiled("[a-]").accepts("b"));
}

#[test]
fn optional_operator() {
    let dfa = compiled("ab?c");
    assert!(dfa.accepts("ac"));
    assert!(dfa.accepts("abc"));
    assert!(!dfa.accepts("abbc"));
}

#[test]
fn empty_alternation_branch_matches_empty() {
    let dfa = compiled("a|");
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts(""));
    assert!(!dfa.accepts("b"));
}

#[test]
fn parse_errors_carry_offsets() {
    assert!(matches!(
        regex::parse("*a"),
        Err(ParseError::MisplacedPostfix { symbol: '*', offset: 0 })
    ));
    assert!(matches!(
        regex::parse("a+?"),
        Err(ParseError::MisplacedPostfix { symbol: '?', offset: 2 })
    ));
    assert!(matches!(
        regex::parse("a]"),
        Err(ParseError::StrayRightBracket { offset: 1 })
    ));
    assert!(matches!(
        regex::parse("ab^c"),
        Err(ParseError::StrayCaret { offset: 2 })
    ));
    assert!(matches!(
        regex::parse("(ab"),
        Err(ParseError::MissingRightParen { .. })
    ));
    assert!(matches!(
        regex::parse("ab)"),
        Err(ParseError::UnmatchedRightParen { offset: 2 })
    ));
    assert!(matches!(
        regex::parse(")"),
        Err(ParseError::UnmatchedRightParen { offset: 0 })
    ));
    assert!(matches!(
        regex::parse("[ab"),
        Err(ParseError::UnterminatedClass { offset: 0 })
    ));
    assert!(matches!(
        regex::parse("aé"),
        Err(ParseError::UnsupportedByte { offset: 1, .. })
    ));
}

#[test]
fn compaction_leaves_no_gaps() {
    // Concatenation discards one node per fused fragment pair; after the
    // final renumbering every successor index must be in range
    let nfa = regex::parse("abcde(fg|hi)*").unwrap();
    for node in nfa.nodes() {
        for successor in node.next().into_iter().flatten() {
            assert!(successor < nfa.nodes().len());
        }
    }
    assert!(nfa.start_index() < nfa.nodes().len());
}

#[test]
fn deterministic_output() {
    let source = "^[ \\t]*#[0-9]+.*$";
    let first = compiled(source);
    let second = compiled(source);
    assert_eq!(first.to_dot(), second.to_dot());
    assert_eq!(first.to_table().rows(), second.to_table().rows());
}

#[test]
fn transition_labels_are_disjoint() {
    for pattern in ["(ab)*c", "a|ab|abc", "[a-m]x|[h-z]y", ".*", "^a$b+"] {
        let dfa = compiled(pattern);
        for state in dfa.states() {
            for (index, first) in state.transitions().iter().enumerate() {
                for second in &state.transitions()[index + 1..] {
                    assert_eq!(first.chars().intersection_count(second.chars()), 0);
                }
            }
        }
    }
}

#[test]
fn subset_construction_soundness() {
    let nfa = regex::parse("(a|b)*abb").unwrap();
    let dfa = nfa.to_dfa();
    for (index, state) in dfa.states().iter().enumerate() {
        for c in 1..0x7Fu8 {
            let moved = nfa.move_on(state.nfa_set(), c);
            match dfa.goto_on(index, c) {
                None => assert!(moved.is_empty()),
                Some(target) => {
                    let mut closed = moved;
                    nfa.epsilon_closure(&mut closed);
                    assert_eq!(&closed, dfa.states()[target].nfa_set());
                }
            }
        }
    }
}

#[test]
fn table_is_faithful_to_the_dfa() {
    let dfa = compiled("(ab)*|c[0-9]?");
    let table = dfa.to_table();
    assert_eq!(table.num_states(), dfa.states().len());
    assert_eq!(table.start_row(), dfa.start_index() + 1);

    for c in 0..ASCII_COLUMNS {
        assert_eq!(table.next_state(0, c as u8), ERROR_SENTINEL);
    }
    for (index, state) in dfa.states().iter().enumerate() {
        assert_eq!(table.is_accepting(index + 1), state.is_accepting());
        for c in 0..ASCII_COLUMNS {
            let expected = dfa
                .goto_on(index, c as u8)
                .map_or(0, |target| target as i16 + 1);
            assert_eq!(table.next_state(index + 1, c as u8), expected);
        }
    }
}

#[test]
fn minimized_states_are_pairwise_distinguishable() {
    let dfa = compiled("(a|b)*abb");

    // Probe every pair with every string over {a, b} up to length 6
    let mut probes = vec![String::new()];
    for _ in 0..6 {
        let next: Vec<String> = probes
            .iter()
            .flat_map(|probe| [format!("{probe}a"), format!("{probe}b")])
            .collect();
        probes.extend(next);
    }

    for first in 0..dfa.states().len() {
        for second in first + 1..dfa.states().len() {
            assert!(
                probes
                    .iter()
                    .any(|probe| accepts_from(&dfa, first, probe)
                        != accepts_from(&dfa, second, probe)),
                "states {first} and {second} are equivalent"
            );
        }
    }
}

fn random_regex() -> impl Strategy<Value = String> {
    "[a-e]".prop_recursive(6, 64, 6, |inner| {
        prop_oneof![
            4 => prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|parts| parts.concat()),
            3 => prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|parts| format!("({})", parts.join("|"))),
            1 => inner.clone().prop_map(|r| format!("({r})*")),
            1 => inner.clone().prop_map(|r| format!("({r})+")),
            1 => inner.clone().prop_map(|r| format!("({r})?")),
        ]
    })
}

proptest! {
    /// Minimization must not change the language
    #[test]
    fn minimization_preserves_language(
        pattern in random_regex(),
        inputs in prop::collection::vec("[a-e]{0,8}", 32)
    ) {
        let nfa = regex::parse(&pattern).unwrap();
        let unminimized = nfa.to_dfa();
        let minimized = {
            let mut dfa = unminimized.clone();
            dfa.minimize();
            dfa
        };
        prop_assert!(minimized.states().len() <= unminimized.states().len());
        for input in &inputs {
            prop_assert_eq!(
                unminimized.accepts(input),
                minimized.accepts(input),
                "pattern {} disagrees on {:?}", &pattern, input
            );
        }
    }

    /// The compiled DFA must agree with the library regex engine on the
    /// shared syntax subset
    #[test]
    fn agrees_with_library_regex(
        pattern in random_regex(),
        inputs in prop::collection::vec("[a-e]{0,8}", 32)
    ) {
        let dfa = compiled(&pattern);
        let oracle = LibRegex::new(&format!("^(?:{pattern})$")).unwrap();
        for input in &inputs {
            prop_assert_eq!(
                dfa.accepts(input),
                oracle.is_match(input),
                "pattern {} disagrees on {:?}", &pattern, input
            );
        }
    }
}
