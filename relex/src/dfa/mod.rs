//! # Deterministic Finite Automaton
//! The DFA module holds the automaton produced by the subset construction
//! ([Nfa::to_dfa](crate::nfa::Nfa::to_dfa)), minimization by partition
//! refinement, and the two output artifacts of a compiled machine: a
//! graphviz listing ([Dfa::to_dot]) and the dense scanner table
//! ([Dfa::to_table]).
//!
//! Transitions are kept as `(label, target)` pairs where the label is a
//! [Bitset] of ASCII codes; the labels of one state's transitions are
//! pairwise disjoint, so at most one transition matches any given code.
//!
//! ## Example
//! ```
//! let nfa = relex::regex::parse("a|b").unwrap();
//! let mut dfa = nfa.to_dfa();
//! assert_eq!(dfa.states().len(), 3);
//!
//! // The two accepting states are indistinguishable and collapse into one,
//! // leaving a single transition labelled {'a','b'}.
//! dfa.minimize();
//! assert_eq!(dfa.states().len(), 2);
//! assert!(dfa.accepts("a") && dfa.accepts("b") && !dfa.accepts("ab"));
//! ```

use crate::bitset::Bitset;
use crate::nfa::Anchor;
use crate::table::TransitionTable;
use std::fmt::Write;
use std::rc::Rc;

/// A deterministic finite automaton over the ASCII codes `1..=126`.
#[derive(Clone, Debug)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: usize,
}

/// A DFA state: a diagnostic name, the set of NFA states it represents,
/// its outgoing transitions, and the acceptance data inherited from the
/// terminal NFA nodes it contains.
#[derive(Clone, Debug)]
pub struct DfaState {
    pub(crate) name: Rc<str>,
    pub(crate) nfa_set: Bitset,
    pub(crate) transitions: Vec<DfaTransition>,
    pub(crate) accepting: bool,
    pub(crate) anchor: Anchor,
}

/// One labelled transition: the set of ASCII codes taking it, and the
/// target state index.
#[derive(Clone, Debug)]
pub struct DfaTransition {
    pub(crate) chars: Bitset,
    pub(crate) target: usize,
}

impl DfaTransition {
    pub fn chars(&self) -> &Bitset {
        &self.chars
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

impl DfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The set of NFA node indices whose epsilon closure this state is.
    pub fn nfa_set(&self) -> &Bitset {
        &self.nfa_set
    }

    pub fn transitions(&self) -> &[DfaTransition] {
        self.transitions.as_slice()
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The anchor flags of the rule(s) this state accepts for.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }
}

/// Diagnostic names for states: `A`..`Z`, then `S26`, `S27`, ...
pub(crate) fn state_label(index: usize) -> Rc<str> {
    if index < 26 {
        Rc::from(((b'A' + index as u8) as char).to_string().as_str())
    } else {
        Rc::from(format!("S{index}").as_str())
    }
}

impl Dfa {
    pub fn states(&self) -> &[DfaState] {
        self.states.as_slice()
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    /// The target of the unique transition from `state` whose label
    /// contains `c`, if any.
    pub fn goto_on(&self, state: usize, c: u8) -> Option<usize> {
        self.states[state]
            .transitions
            .iter()
            .find(|t| t.chars.get(c as usize))
            .map(|t| t.target)
    }

    /// Runs the automaton over the whole input and reports whether it ends
    /// in an accepting state. Anchors are not interpreted here; this is the
    /// plain graph walk used to compare automata in tests and examples.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.start;
        for byte in input.bytes() {
            match self.goto_on(state, byte) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.states[state].accepting
    }

    /// Collapses indistinguishable states into one, producing the unique
    /// minimal DFA for the same language.
    ///
    /// States are seeded into an accepting and a non-accepting class, and
    /// classes are split whenever a member disagrees with its class
    /// representative about where some character leads (different class, or
    /// transition versus none). The pass over the class list repeats until
    /// it runs to completion without a split; splits may invalidate earlier
    /// classes, so a single pass is not enough.
    pub fn minimize(&mut self) {
        let (accepting, nonaccepting): (Vec<usize>, Vec<usize>) =
            (0..self.states.len()).partition(|&index| self.states[index].accepting);

        let mut partition_of = vec![0usize; self.states.len()];
        let mut partitions: Vec<Vec<usize>> = Vec::new();
        for class in [accepting, nonaccepting] {
            if class.is_empty() {
                continue;
            }
            for &member in &class {
                partition_of[member] = partitions.len();
            }
            partitions.push(class);
        }

        loop {
            let mut split = false;
            let mut index = 0;
            while index < partitions.len() {
                let representative = partitions[index][0];
                let moved: Vec<usize> = partitions[index][1..]
                    .iter()
                    .copied()
                    .filter(|&member| self.distinguishable(representative, member, &partition_of))
                    .collect();
                if !moved.is_empty() {
                    split = true;
                    let new_class = partitions.len();
                    partitions[index].retain(|member| !moved.contains(member));
                    for &member in &moved {
                        partition_of[member] = new_class;
                    }
                    partitions.push(moved);
                }
                index += 1;
            }
            if !split {
                break;
            }
        }

        let states: Vec<DfaState> = partitions
            .iter()
            .enumerate()
            .map(|(new_index, members)| {
                let representative = &self.states[members[0]];
                let mut transitions: Vec<DfaTransition> = Vec::new();
                for transition in &representative.transitions {
                    let target = partition_of[transition.target];
                    match transitions.iter_mut().find(|t| t.target == target) {
                        // Parallel edges into one class merge their labels
                        Some(merged) => merged.chars.union_with(&transition.chars),
                        None => transitions.push(DfaTransition {
                            chars: transition.chars.clone(),
                            target,
                        }),
                    }
                }
                let anchor = members
                    .iter()
                    .fold(Anchor::NONE, |acc, &member| acc | self.states[member].anchor);
                DfaState {
                    name: state_label(new_index),
                    nfa_set: representative.nfa_set.clone(),
                    transitions,
                    accepting: representative.accepting,
                    anchor,
                }
            })
            .collect();

        self.start = partition_of[self.start];
        self.states = states;
    }

    fn distinguishable(&self, a: usize, b: usize, partition_of: &[usize]) -> bool {
        (0..0x7Fu8).any(|c| match (self.goto_on(a, c), self.goto_on(b, c)) {
            (None, None) => false,
            (Some(ta), Some(tb)) => partition_of[ta] != partition_of[tb],
            _ => true,
        })
    }

    /// Renders the automaton as a graphviz `digraph`, one edge per
    /// transition. Control characters in labels print as `^X`, and `'`,
    /// `"` and `\` are escaped.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dfa {\n");
        for state in &self.states {
            for transition in &state.transitions {
                let _ = writeln!(
                    out,
                    "{} -> {} [ label = \"'{}'\" ]",
                    state.name,
                    self.states[transition.target].name,
                    dot_label(&transition.chars)
                );
            }
        }
        out.push_str("}\n");
        out
    }

    /// Flattens the automaton into the dense `states x ascii` table handed
    /// to emitters. See [TransitionTable] for the row layout.
    pub fn to_table(&self) -> TransitionTable {
        TransitionTable::new(self)
    }
}

fn dot_label(chars: &Bitset) -> String {
    let mut label = String::new();
    for code in chars.iter().take_while(|&code| code < 0x7F) {
        let code = code as u8;
        if matches!(code, b'\'' | b'"' | b'\\') {
            label.push('\\');
        }
        if code < b' ' {
            label.push('^');
            label.push((code + b'@') as char);
        } else {
            label.push(code as char);
        }
    }
    label
}
