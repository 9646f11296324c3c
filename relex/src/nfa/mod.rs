//! # Nondeterministic Finite Automaton
//! The NFA module holds the automaton produced by the Thompson construction
//! in [crate::regex], and the subset construction turning it into a
//! [Dfa](crate::dfa::Dfa).
//!
//! The automaton is an arena of [NfaNode]s addressed by index. Successors are
//! stored as indices rather than references, since the Kleene back-edges make
//! the graph cyclic. Each node carries one outgoing [Edge] label; a node with
//! [Edge::Epsilon] and both successors present is a branch point, and a node
//! with no successors at all is the terminal (accepting) end of a rule, which
//! also carries that rule's [Anchor] flags.
//!
//! ## Example
//! ```
//! use relex::regex;
//!
//! // `(ab)*` matches "", "ab", "abab", ...
//! let nfa = regex::parse("(ab)*").unwrap();
//! let dfa = nfa.to_dfa();
//! assert!(dfa.accepts("abab"));
//! assert!(!dfa.accepts("aba"));
//! ```

use crate::bitset::Bitset;
use crate::dfa::{state_label, Dfa, DfaState, DfaTransition};
use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The label of a node's outgoing transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Consumes no input. The only label under which the secondary
    /// successor is meaningful.
    Epsilon,
    /// Consumes exactly the given ASCII code, which is always in `1..=126`.
    Char(u8),
    /// Consumes any code in `set`, or any code *not* in `set` when
    /// `complement` is true.
    Class { set: Bitset, complement: bool },
}

/// Zero-width assertion flags recorded on a rule's terminal node: `^` sets
/// the line-start bit and `$` the line-end bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Anchor(u8);

impl Anchor {
    pub const NONE: Anchor = Anchor(0);
    pub const BOL: Anchor = Anchor(1);
    pub const EOL: Anchor = Anchor(2);
    pub const BOTH: Anchor = Anchor(3);

    pub fn contains(self, other: Anchor) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The raw mask, for table emission.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Anchor {
    type Output = Anchor;

    fn bitor(self, rhs: Anchor) -> Anchor {
        Anchor(self.0 | rhs.0)
    }
}

impl BitOrAssign for Anchor {
    fn bitor_assign(&mut self, rhs: Anchor) {
        self.0 |= rhs.0;
    }
}

/// One NFA state. Its index in the arena is its identity.
#[derive(Clone, Debug)]
pub struct NfaNode {
    pub(crate) edge: Edge,
    pub(crate) next: [Option<usize>; 2],
    pub(crate) anchor: Anchor,
}

impl NfaNode {
    fn new() -> Self {
        NfaNode {
            edge: Edge::Epsilon,
            next: [None, None],
            anchor: Anchor::NONE,
        }
    }

    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    /// The primary and secondary successors, by index.
    pub fn next(&self) -> [Option<usize>; 2] {
        self.next
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// A node without successors ends a rule and is accepting.
    pub fn is_terminal(&self) -> bool {
        self.next[0].is_none()
    }
}

/// Node storage for the construction phase. Discarded nodes leave a hole
/// which the next allocation reuses, so indices of live nodes stay stable
/// while fragments are being stitched together.
pub(crate) struct NfaArena {
    slots: Vec<Option<NfaNode>>,
    free: Vec<usize>,
}

impl NfaArena {
    pub(crate) fn new() -> Self {
        NfaArena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(NfaNode::new());
                index
            }
            None => {
                self.slots.push(Some(NfaNode::new()));
                self.slots.len() - 1
            }
        }
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut NfaNode {
        self.slots[index].as_mut().expect("node is live")
    }

    /// Moves the content of `src` into `dst` and frees the `src` slot.
    /// Used when concatenation fuses a fragment end with the following
    /// fragment start: `dst` keeps its identity as the join point.
    pub(crate) fn fuse(&mut self, dst: usize, src: usize) {
        let node = self.slots[src].take().expect("node is live");
        self.free.push(src);
        self.slots[dst] = Some(node);
    }

    /// Finishes construction: renumbers live nodes 0..N-1, rewrites all
    /// stored successor indices, and drops the holes left by freed slots.
    pub(crate) fn into_nfa(self, start: usize) -> Nfa {
        let mut remap = vec![usize::MAX; self.slots.len()];
        let mut nodes = Vec::with_capacity(self.slots.len());
        for (old_index, slot) in self.slots.into_iter().enumerate() {
            if let Some(node) = slot {
                remap[old_index] = nodes.len();
                nodes.push(node);
            }
        }
        for node in &mut nodes {
            for successor in &mut node.next {
                if let Some(target) = successor {
                    *target = remap[*target];
                }
            }
        }
        Nfa {
            nodes,
            start: remap[start],
        }
    }
}

/// A nondeterministic finite automaton with a designated start state.
/// Construct one from a regex with [crate::regex::parse].
#[derive(Clone, Debug)]
pub struct Nfa {
    pub(crate) nodes: Vec<NfaNode>,
    pub(crate) start: usize,
}

impl Nfa {
    pub fn nodes(&self) -> &[NfaNode] {
        self.nodes.as_slice()
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Extends `set` in place with everything reachable over epsilon moves,
    /// by a worklist over the newly added indices.
    pub(crate) fn epsilon_closure(&self, set: &mut Bitset) {
        let mut work: Vec<usize> = set.iter().collect();
        while let Some(index) = work.pop() {
            let node = &self.nodes[index];
            if node.edge != Edge::Epsilon {
                continue;
            }
            for successor in node.next.into_iter().flatten() {
                if !set.get(successor) {
                    set.set(successor);
                    work.push(successor);
                }
            }
        }
    }

    /// The states reachable from `set` over a single transition consuming
    /// the ASCII code `c`.
    pub(crate) fn move_on(&self, set: &Bitset, c: u8) -> Bitset {
        let mut moved = Bitset::new();
        for index in set.iter() {
            let node = &self.nodes[index];
            let matched = match &node.edge {
                Edge::Epsilon => false,
                Edge::Char(label) => *label == c,
                Edge::Class { set: class, complement } => {
                    *complement != class.get(c as usize)
                }
            };
            if matched {
                if let Some(target) = node.next[0] {
                    moved.set(target);
                }
            }
        }
        moved
    }

    fn terminal_set(&self) -> Bitset {
        let mut terminals = Bitset::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_terminal() {
                terminals.set(index);
            }
        }
        terminals
    }

    /// Converts this NFA to an equivalent DFA using the subset construction.
    /// Each DFA state represents the epsilon closure of a set of NFA states;
    /// two closures with equal sets share one DFA state, and all characters
    /// leading to the same target are consolidated into one labelled
    /// transition. State ids are assigned in creation order, so the result
    /// is deterministic for a given NFA.
    pub fn to_dfa(&self) -> Dfa {
        let terminals = self.terminal_set();

        let mut initial = Bitset::new();
        initial.set(self.start);
        self.epsilon_closure(&mut initial);

        let mut states = vec![self.dfa_state_for(initial.clone(), 0, &terminals)];
        let mut seen: HashMap<Bitset, usize> = HashMap::new();
        seen.insert(initial, 0);
        let mut work = vec![0usize];

        while let Some(current) = work.pop() {
            let current_set = states[current].nfa_set.clone();
            for c in 1..0x7Fu8 {
                let moved = self.move_on(&current_set, c);
                if moved.is_empty() {
                    continue;
                }
                let mut closed = moved;
                self.epsilon_closure(&mut closed);

                let target = match seen.get(&closed) {
                    Some(&existing) => existing,
                    None => {
                        let index = states.len();
                        states.push(self.dfa_state_for(closed.clone(), index, &terminals));
                        seen.insert(closed, index);
                        work.push(index);
                        index
                    }
                };

                let transitions = &mut states[current].transitions;
                match transitions.iter_mut().find(|t| t.target == target) {
                    Some(existing) => existing.chars.set(c as usize),
                    None => {
                        let mut chars = Bitset::new();
                        chars.set(c as usize);
                        transitions.push(DfaTransition { chars, target });
                    }
                }
            }
        }

        Dfa { states, start: 0 }
    }

    fn dfa_state_for(&self, nfa_set: Bitset, index: usize, terminals: &Bitset) -> DfaState {
        let accepting = nfa_set.intersection_count(terminals) > 0;
        let anchor = nfa_set
            .iter()
            .filter(|&i| self.nodes[i].is_terminal())
            .fold(Anchor::NONE, |acc, i| acc | self.nodes[i].anchor);
        DfaState {
            name: state_label(index),
            nfa_set,
            transitions: Vec::new(),
            accepting,
            anchor,
        }
    }
}

fn class_listing(set: &Bitset) -> String {
    let mut out = String::from("[");
    for code in set.iter().take_while(|&code| code < 0x7F) {
        let code = code as u8;
        if code < b' ' {
            out.push('^');
            out.push((code + b'@') as char);
        } else {
            out.push(code as char);
        }
    }
    out.push(']');
    out
}

/// A diagnostic listing of every state, its successors and its edge label.
impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.nodes.iter().enumerate() {
            write!(f, "NFA state {index:02}: ")?;
            match node.next[0] {
                None => write!(f, "(TERMINAL)")?,
                Some(primary) => {
                    write!(f, "--> {primary:02} ")?;
                    match node.next[1] {
                        Some(secondary) => write!(f, "({secondary:02}) on ")?,
                        None => write!(f, "(--) on ")?,
                    }
                    match &node.edge {
                        Edge::Epsilon => write!(f, "EPSILON")?,
                        Edge::Char(c) => write!(f, "'{}'", *c as char)?,
                        Edge::Class { set, complement } => {
                            if *complement {
                                write!(f, "~")?;
                            }
                            write!(f, "{}", class_listing(set))?;
                        }
                    }
                }
            }
            if index == self.start {
                write!(f, " (START STATE)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
