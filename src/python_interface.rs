use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::dfa::Dfa;
use crate::dfa::StateId;
use crate::options::DanglingStar;
use crate::options::TreeOptions;
use crate::regex_tree::Position;
use crate::regex_tree::RegexTree;
use crate::render;

pyo3::create_exception!(followpos, FollowposException, PyRuntimeError);
pyo3::create_exception!(followpos, InvalidRegexPattern, FollowposException);

#[pyclass(name = "RegexTree", frozen)]
#[derive(Debug)]
struct PyRegexTree {
	tree: RegexTree,
}

#[pyclass(name = "Dfa", frozen)]
#[derive(Debug)]
struct PyDfa {
	dfa: Dfa,
}

#[pymethods]
impl PyRegexTree {
	#[new]
	#[pyo3(signature = (pattern, drop_dangling_star = false))]
	fn new(pattern: &str, drop_dangling_star: bool) -> PyResult<Self> {
		let dangling_star: DanglingStar = if drop_dangling_star {
			DanglingStar::Drop
		} else {
			DanglingStar::Wrap
		};
		let options: TreeOptions = TreeOptions::new().with_dangling_star(dangling_star);
		let tree: RegexTree = RegexTree::with_options(pattern, &options)
			.map_err(|err| InvalidRegexPattern::new_err(format!("Invalid pattern {pattern:?}: {err}")))?;
		Ok(Self { tree })
	}

	fn alphabet(&self) -> Vec<char> {
		self.tree.alphabet().iter().copied().collect::<Vec<_>>()
	}

	fn first_pos_root(&self) -> Vec<usize> {
		self.tree.first_pos_root().iter().map(|pos| pos.get()).collect::<Vec<_>>()
	}

	fn follow_pos(&self, pos: usize) -> Vec<usize> {
		self.tree
			.follow_pos(Position::new(pos))
			.iter()
			.map(|pos| pos.get())
			.collect::<Vec<_>>()
	}

	fn char_at_pos(&self, ch: char, pos: usize) -> bool {
		self.tree.char_at_pos(ch, Position::new(pos))
	}

	fn end_pos(&self) -> usize {
		self.tree.end_pos().get()
	}

	fn to_dot(&self) -> String {
		render::tree_to_dot(&self.tree)
	}

	fn followpos_table(&self) -> String {
		render::followpos_table(&self.tree)
	}
}

#[pymethods]
impl PyDfa {
	#[new]
	fn new(tree: PyRef<'_, PyRegexTree>) -> Self {
		Self {
			dfa: Dfa::for_tree(&tree.tree),
		}
	}

	fn start(&self) -> usize {
		self.dfa.start().get()
	}

	fn state_count(&self) -> usize {
		self.dfa.state_count()
	}

	fn positions(&self, state: usize) -> PyResult<Vec<usize>> {
		let id: StateId = self.lookup(state)?;
		Ok(self
			.dfa
			.positions(id)
			.into_iter()
			.flatten()
			.map(|pos| pos.get())
			.collect::<Vec<_>>())
	}

	fn is_accepting(&self, state: usize) -> PyResult<bool> {
		let id: StateId = self.lookup(state)?;
		Ok(self.dfa.is_accepting(id))
	}

	fn transition(&self, state: usize, symbol: char) -> PyResult<Option<usize>> {
		let id: StateId = self.lookup(state)?;
		Ok(self.dfa.transition(id, symbol).map(StateId::get))
	}

	fn to_dot(&self) -> String {
		render::dfa_to_dot(&self.dfa)
	}
}

impl PyDfa {
	fn lookup(&self, state: usize) -> PyResult<StateId> {
		self.dfa
			.state(state)
			.ok_or_else(|| FollowposException::new_err(format!("No state {state}")))
	}
}

#[pymodule]
mod followpos {
	use pyo3::prelude::*;

	#[pymodule_export]
	use super::PyDfa;
	#[pymodule_export]
	use super::PyRegexTree;

	#[pymodule_init]
	fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
		m.add("FollowposException", m.py().get_type::<super::FollowposException>())?;
		m.add("InvalidRegexPattern", m.py().get_type::<super::InvalidRegexPattern>())?;
		Ok(())
	}
}
