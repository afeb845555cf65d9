use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::regex_tree::Position;
use crate::regex_tree::PositionQuery;

/// DFA built directly from followpos sets, without an intermediate NFA.
#[derive(Debug, Clone)]
pub struct Dfa {
	states: Vec<DfaState>,
	/// Inverse of `states`: two states are the same iff their position sets are equal.
	kernels: BTreeMap<BTreeSet<Position>, StateId>,
	alphabet: Vec<char>,
	accepting: BTreeSet<StateId>,
	/// Partial; a missing entry is a transition to the implicit dead state.
	transitions: BTreeMap<(StateId, char), StateId>,
}

/// States are numbered in discovery order; the start state is always `0`.
#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StateId(usize);

#[derive(Debug, Clone)]
struct DfaState {
	positions: BTreeSet<Position>,
}

impl StateId {
	pub const START: Self = Self(0);

	pub const fn get(self) -> usize {
		self.0
	}
}

impl std::fmt::Display for StateId {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(fmt, "{}", self.0)
	}
}

impl Dfa {
	pub fn for_tree<Q>(tree: &Q) -> Self
	where
		Q: PositionQuery + ?Sized,
	{
		Self::from_query(tree)
	}

	/// Worklist subset construction where the successor of state `S` on `a`
	/// is the union of `followpos(p)` for every `p` in `S` labeled `a`.
	pub fn from_query<Q>(tree: &Q) -> Self
	where
		Q: PositionQuery + ?Sized,
	{
		let mut dfa: Self = Self {
			states: Vec::new(),
			kernels: BTreeMap::new(),
			alphabet: tree.alphabet().iter().copied().collect::<Vec<_>>(),
			accepting: BTreeSet::new(),
			transitions: BTreeMap::new(),
		};

		dfa.add_state(tree.first_pos_root().clone());

		// Note: New states are appended to `dfa.states` inside the loop;
		// every state below `i` has all of its transitions recorded.
		let mut i: usize = 0;
		while i < dfa.states.len() {
			let current: StateId = StateId(i);
			// `add_state` may push onto `dfa.states`, so we can't hold a reference into it.
			let positions: BTreeSet<Position> = dfa.states[i].positions.clone();

			for symbol_idx in 0..dfa.alphabet.len() {
				let symbol: char = dfa.alphabet[symbol_idx];
				let next: BTreeSet<Position> = Self::step_on_symbol(tree, &positions, symbol);
				if next.is_empty() {
					continue;
				}

				let destination: StateId = dfa.add_state(next);
				debug!("transition {current} --{symbol:?}--> {destination}");
				let old: Option<StateId> = dfa.transitions.insert((current, symbol), destination);
				assert!(old.is_none(), "state {current} already has a transition on {symbol:?}");
			}

			i += 1;
		}

		let end: Position = tree.end_pos();
		for (i, state) in dfa.states.iter().enumerate() {
			if state.positions.contains(&end) {
				dfa.accepting.insert(StateId(i));
			}
		}

		debug!(
			"dfa has {} states, accepting {:?}",
			dfa.states.len(),
			dfa.accepting
		);

		dfa
	}

	fn step_on_symbol<Q>(tree: &Q, positions: &BTreeSet<Position>, symbol: char) -> BTreeSet<Position>
	where
		Q: PositionQuery + ?Sized,
	{
		let mut next: BTreeSet<Position> = BTreeSet::new();
		for &pos in positions.iter() {
			if tree.char_at_pos(symbol, pos) {
				next.extend(tree.follow_pos(pos).iter().copied());
			}
		}
		next
	}

	/// Returns the existing state for `positions` if there is one.
	fn add_state(&mut self, positions: BTreeSet<Position>) -> StateId {
		if let Some(&id) = self.kernels.get(&positions) {
			return id;
		}

		let id: StateId = StateId(self.states.len());
		debug!("new state {id} = {positions:?}");
		self.kernels.insert(positions.clone(), id);
		self.states.push(DfaState { positions });
		id
	}
}

impl Dfa {
	pub fn start(&self) -> StateId {
		StateId::START
	}

	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	pub fn states(&self) -> impl Iterator<Item = (StateId, &BTreeSet<Position>)> {
		self.states
			.iter()
			.enumerate()
			.map(|(i, state)| (StateId(i), &state.positions))
	}

	pub fn state(&self, idx: usize) -> Option<StateId> {
		(idx < self.states.len()).then_some(StateId(idx))
	}

	/// `None` for an id that does not belong to this DFA.
	pub fn positions(&self, id: StateId) -> Option<&BTreeSet<Position>> {
		self.states.get(id.0).map(|state| &state.positions)
	}

	pub fn is_accepting(&self, id: StateId) -> bool {
		self.accepting.contains(&id)
	}

	pub fn accepting(&self) -> &BTreeSet<StateId> {
		&self.accepting
	}

	pub fn alphabet(&self) -> &[char] {
		&self.alphabet
	}

	pub fn transition(&self, from: StateId, symbol: char) -> Option<StateId> {
		self.transitions.get(&(from, symbol)).copied()
	}

	/// Ordered by source state, then symbol.
	pub fn transitions(&self) -> impl Iterator<Item = (StateId, char, StateId)> + '_ {
		self.transitions
			.iter()
			.map(|(&(from, symbol), &to)| (from, symbol, to))
	}
}
